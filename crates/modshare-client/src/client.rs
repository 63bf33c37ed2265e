//! Query and mutation layer
//!
//! [`ModshareClient`] binds every backend call to a [`QueryKey`]:
//! - nothing is sent without a live session connection
//! - queries with an empty key parameter stay disabled
//! - query results are cached; transport failures are retried per key
//! - mutations apply the invalidation policy once they complete
//!
//! A response that arrives after the session was signed out or reconnected,
//! or after a mutation completed, is returned to its caller but never
//! written to the cache.

use crate::backend::{Backend, NewMod, ShowcaseFields, StoryModeFields};
use crate::cache::{KeyPattern, QueryCache, QueryKey};
use crate::config::ClientConfig;
use crate::error::{ClientError, RemoteError};
use crate::policy::{self, Mutation};
use crate::session::Session;
use dashmap::DashMap;
use modshare_core::{
    CharacterShowcase, ModFile, ModRecord, Principal, StoryMode, UnlistedId, UserProfile,
    UserRole,
};
use std::future::Future;
use std::sync::Arc;

/// Observable state of one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
    /// No connection, or a required parameter is empty
    Disabled,
    /// Enabled but nothing fetched yet
    Idle,
    /// Call in flight
    Loading,
    /// Cached value available
    Ready,
    /// Last call failed with this message
    Failed(String),
}

/// Client for the sharing platform backend
pub struct ModshareClient {
    session: Arc<Session>,
    cache: QueryCache,
    config: ClientConfig,
    pending: DashMap<QueryKey, QueryStatus>,
}

impl ModshareClient {
    /// Create client over a shared session
    #[must_use]
    pub fn new(session: Arc<Session>, config: ClientConfig) -> Self {
        let cache = match config.cache_ttl() {
            Some(ttl) => QueryCache::with_ttl(config.cache_capacity, ttl),
            None => QueryCache::new(config.cache_capacity),
        };
        Self {
            session,
            cache,
            config,
            pending: DashMap::new(),
        }
    }

    /// Session this client calls through
    #[inline]
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Request cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Identity of the live connection
    #[inline]
    #[must_use]
    pub fn identity(&self) -> Option<Principal> {
        self.session.identity()
    }

    /// Sign out and forget everything cached for the old identity
    pub fn sign_out(&self) {
        self.session.sign_out();
        self.cache.invalidate_all();
        self.pending.clear();
    }

    /// Status of the query bound to `key`
    #[must_use]
    pub fn status(&self, key: &QueryKey) -> QueryStatus {
        if !self.session.is_connected() || key.missing_param().is_some() {
            return QueryStatus::Disabled;
        }
        if let Some(status) = self.pending.get(key) {
            return status.clone();
        }
        if self.cache.contains(key) {
            QueryStatus::Ready
        } else {
            QueryStatus::Idle
        }
    }

    /// Retries allowed for transport failures of the query bound to `key`
    #[must_use]
    pub fn retry_limit(&self, key: &QueryKey) -> u32 {
        match key {
            QueryKey::CurrentUserProfile
            | QueryKey::ModByUnlistedId(_)
            | QueryKey::CharacterShowcaseByUnlistedId(_) => 0,
            QueryKey::ModEnabled(_) => 1,
            _ => self.config.default_retries,
        }
    }

    /// Drop cached entries so the next query refetches
    pub async fn invalidate(&self, pattern: &KeyPattern) -> usize {
        self.cache.invalidate(pattern).await
    }

    async fn query<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T, ClientError>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(Arc<dyn Backend>) -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let backend = self.session.backend()?;
        if let Some(param) = key.missing_param() {
            return Err(ClientError::MissingKey(param));
        }
        if let Some(hit) = self.cache.get::<T>(&key).await {
            tracing::debug!(%key, "cache hit");
            return Ok(hit);
        }

        let epoch = self.session.epoch();
        let generation = self.cache.generation();
        let retries = self.retry_limit(&key);
        self.pending.insert(key.clone(), QueryStatus::Loading);

        let mut attempt = 0;
        let result = loop {
            match fetch(Arc::clone(&backend)).await {
                Ok(value) => break Ok(value),
                Err(error) if error.is_retryable() && attempt < retries => {
                    attempt += 1;
                    tracing::warn!(%key, attempt, %error, "retrying query");
                }
                Err(error) => break Err(error),
            }
        };

        let current = self.session.epoch() == epoch;
        match result {
            Ok(value) => {
                self.pending.remove(&key);
                if current {
                    self.cache.insert_fetched(key, value.clone(), generation).await;
                }
                Ok(value)
            }
            Err(error) => {
                tracing::error!(%key, %error, "query failed");
                if current {
                    self.pending
                        .insert(key, QueryStatus::Failed(error.to_string()));
                } else {
                    self.pending.remove(&key);
                }
                Err(error.into())
            }
        }
    }

    async fn mutate<T, F, Fut>(&self, mutation: Mutation, call: F) -> Result<T, ClientError>
    where
        F: FnOnce(Arc<dyn Backend>) -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let backend = self.session.backend()?;
        let epoch = self.session.epoch();

        let value = call(backend).await.map_err(|error| {
            tracing::error!(?mutation, %error, "mutation failed");
            ClientError::from(error)
        })?;

        if self.session.epoch() == epoch {
            policy::apply(&self.cache, &mutation).await;
        }
        Ok(value)
    }

    // Queries

    /// Profile of the caller, if saved
    ///
    /// # Errors
    /// `NoConnection` or the backend failure.
    pub async fn caller_user_profile(&self) -> Result<Option<UserProfile>, ClientError> {
        self.query(QueryKey::CurrentUserProfile, |backend| async move {
            backend.get_caller_user_profile().await
        })
        .await
    }

    /// Role of the caller
    ///
    /// # Errors
    /// `NoConnection` or the backend failure.
    pub async fn caller_user_role(&self) -> Result<UserRole, ClientError> {
        self.query(QueryKey::CallerUserRole, |backend| async move {
            backend.get_caller_user_role().await
        })
        .await
    }

    /// Mod by id
    ///
    /// # Errors
    /// `NoConnection`, `MissingKey` for an empty id, or the backend failure.
    pub async fn mod_by_id(&self, mod_id: &str) -> Result<ModRecord, ClientError> {
        self.query(QueryKey::Mod(mod_id.to_string()), |backend| async move {
            backend.get_mod(mod_id).await
        })
        .await
    }

    /// Public mod behind a share token
    ///
    /// # Errors
    /// `ModUnavailable` when the token is malformed, unknown, or belongs to
    /// a disabled mod; otherwise `NoConnection`, `MissingKey`, or the
    /// backend failure.
    pub async fn mod_by_unlisted_id(&self, token: &str) -> Result<ModRecord, ClientError> {
        let key = QueryKey::ModByUnlistedId(token.to_string());
        let Ok(unlisted_id) = token.parse::<UnlistedId>() else {
            self.session.backend()?;
            if token.is_empty() {
                return Err(ClientError::MissingKey("unlisted id"));
            }
            return Err(ClientError::ModUnavailable);
        };

        let result = self
            .query(key, |backend| {
                let unlisted_id = unlisted_id.clone();
                async move { backend.get_mod_by_unlisted_id(&unlisted_id).await }
            })
            .await;

        match result {
            Err(ClientError::Remote(RemoteError::NotFound(_))) => Err(ClientError::ModUnavailable),
            other => other,
        }
    }

    /// Mods owned by `creator`
    ///
    /// # Errors
    /// `NoConnection` or the backend failure.
    pub async fn mods_for_creator(&self, creator: &Principal) -> Result<Vec<ModRecord>, ClientError> {
        self.query(
            QueryKey::ModsForCreator(creator.to_string()),
            |backend| async move { backend.list_mods_for_creator(creator).await },
        )
        .await
    }

    /// Whether a mod's share link resolves
    ///
    /// # Errors
    /// `NoConnection`, `MissingKey` for an empty id, or the backend failure.
    pub async fn mod_enabled_state(&self, mod_id: &str) -> Result<bool, ClientError> {
        self.query(QueryKey::ModEnabled(mod_id.to_string()), |backend| async move {
            backend.get_mod_enabled_state(mod_id).await
        })
        .await
    }

    /// Visible story modes
    ///
    /// # Errors
    /// `NoConnection` or the backend failure.
    pub async fn story_modes(&self) -> Result<Vec<StoryMode>, ClientError> {
        self.query(QueryKey::StoryModes, |backend| async move {
            backend.list_story_modes().await
        })
        .await
    }

    /// Story mode by id
    ///
    /// # Errors
    /// `NoConnection`, `MissingKey` for an empty id, or the backend failure.
    pub async fn story_mode(&self, story_mode_id: &str) -> Result<Option<StoryMode>, ClientError> {
        self.query(
            QueryKey::StoryMode(story_mode_id.to_string()),
            |backend| async move { backend.get_story_mode(story_mode_id).await },
        )
        .await
    }

    /// All character showcases
    ///
    /// # Errors
    /// `NoConnection` or the backend failure.
    pub async fn character_showcases(&self) -> Result<Vec<CharacterShowcase>, ClientError> {
        self.query(QueryKey::CharacterShowcases, |backend| async move {
            backend.list_character_showcases().await
        })
        .await
    }

    /// Showcase by id
    ///
    /// # Errors
    /// `NoConnection`, `MissingKey` for an empty id, or the backend failure.
    pub async fn character_showcase(
        &self,
        showcase_id: &str,
    ) -> Result<Option<CharacterShowcase>, ClientError> {
        self.query(
            QueryKey::CharacterShowcase(showcase_id.to_string()),
            |backend| async move { backend.get_character_showcase(showcase_id).await },
        )
        .await
    }

    /// Showcase behind a share token
    ///
    /// # Errors
    /// `NoConnection`, `MissingKey` for an empty token, or the backend
    /// failure; malformed tokens read as `NotFound`.
    pub async fn character_showcase_by_unlisted_id(
        &self,
        token: &str,
    ) -> Result<CharacterShowcase, ClientError> {
        let key = QueryKey::CharacterShowcaseByUnlistedId(token.to_string());
        let parsed = token.parse::<UnlistedId>();
        self.query(key, |backend| {
            let parsed = parsed.clone();
            async move {
                match parsed {
                    Ok(unlisted_id) => backend.get_character_showcase_by_unlisted_id(&unlisted_id).await,
                    Err(_) => Err(RemoteError::NotFound("Character showcase not found".into())),
                }
            }
        })
        .await
    }

    // Mutations

    /// Save the caller's profile
    ///
    /// # Errors
    /// `NoConnection` or the backend failure.
    pub async fn save_caller_user_profile(&self, profile: UserProfile) -> Result<(), ClientError> {
        self.mutate(Mutation::SaveProfile, |backend| async move {
            backend.save_caller_user_profile(profile).await
        })
        .await
    }

    /// Create a mod
    ///
    /// # Errors
    /// `NoConnection` or the backend failure.
    pub async fn create_mod(&self, new_mod: NewMod) -> Result<(), ClientError> {
        let mod_id = new_mod.id.clone();
        self.mutate(Mutation::CreateMod, |backend| async move {
            backend.create_mod(new_mod).await
        })
        .await?;
        tracing::info!(%mod_id, "mod created");
        Ok(())
    }

    /// Replace a mod's files
    ///
    /// # Errors
    /// `NoConnection` or the backend failure.
    pub async fn update_mod_files(&self, mod_id: &str, files: Vec<ModFile>) -> Result<(), ClientError> {
        let mutation = Mutation::UpdateModFiles {
            mod_id: mod_id.to_string(),
        };
        self.mutate(mutation, |backend| async move {
            backend.update_mod_files(mod_id, files).await
        })
        .await?;
        tracing::info!(%mod_id, "mod files updated");
        Ok(())
    }

    /// Toggle a mod's share link
    ///
    /// # Errors
    /// `NoConnection` or the backend failure.
    pub async fn set_mod_enabled_state(&self, mod_id: &str, enabled: bool) -> Result<(), ClientError> {
        let mutation = Mutation::SetModEnabled {
            mod_id: mod_id.to_string(),
            enabled,
        };
        self.mutate(mutation, |backend| async move {
            backend.set_mod_enabled_state(mod_id, enabled).await
        })
        .await?;
        tracing::info!(%mod_id, enabled, "mod enabled state changed");
        Ok(())
    }

    /// Create a story mode
    ///
    /// # Errors
    /// `NoConnection` or the backend failure.
    pub async fn create_story_mode(
        &self,
        id: String,
        fields: StoryModeFields,
        unlisted_id: UnlistedId,
    ) -> Result<(), ClientError> {
        self.mutate(Mutation::CreateStoryMode, |backend| async move {
            backend.create_story_mode(id, fields, unlisted_id).await
        })
        .await
    }

    /// Replace a story mode's content
    ///
    /// # Errors
    /// `NoConnection` or the backend failure.
    pub async fn update_story_mode(&self, id: &str, fields: StoryModeFields) -> Result<(), ClientError> {
        let mutation = Mutation::UpdateStoryMode {
            story_mode_id: id.to_string(),
        };
        self.mutate(mutation, |backend| async move {
            backend.update_story_mode(id, fields).await
        })
        .await
    }

    /// Toggle a story mode's visibility
    ///
    /// # Errors
    /// `NoConnection` or the backend failure.
    pub async fn set_story_mode_enabled_state(
        &self,
        id: &str,
        enabled: bool,
    ) -> Result<(), ClientError> {
        let mutation = Mutation::SetStoryModeEnabled {
            story_mode_id: id.to_string(),
        };
        self.mutate(mutation, |backend| async move {
            backend.update_story_mode_enabled_state(id, enabled).await
        })
        .await
    }

    /// Create a character showcase
    ///
    /// # Errors
    /// `NoConnection` or the backend failure.
    pub async fn create_character_showcase(
        &self,
        id: String,
        fields: ShowcaseFields,
        unlisted_id: UnlistedId,
    ) -> Result<(), ClientError> {
        self.mutate(Mutation::CreateShowcase, |backend| async move {
            backend.create_character_showcase(id, fields, unlisted_id).await
        })
        .await
    }

    /// Replace a showcase's content
    ///
    /// # Errors
    /// `NoConnection` or the backend failure.
    pub async fn update_character_showcase(
        &self,
        id: &str,
        fields: ShowcaseFields,
    ) -> Result<(), ClientError> {
        let mutation = Mutation::UpdateShowcase {
            showcase_id: id.to_string(),
        };
        self.mutate(mutation, |backend| async move {
            backend.update_character_showcase(id, fields).await
        })
        .await
    }
}

impl std::fmt::Debug for ModshareClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModshareClient")
            .field("session", &self.session)
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::MemoryBackend;
    use mockall::predicate::eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn client_with(backend: Arc<dyn Backend>) -> ModshareClient {
        let session = Arc::new(Session::connected(Principal::new("alice"), backend));
        ModshareClient::new(session, ClientConfig::default())
    }

    #[tokio::test]
    async fn no_connection_means_no_call() {
        let session = Arc::new(Session::new());
        let client = ModshareClient::new(session, ClientConfig::default());

        assert_eq!(
            client.caller_user_profile().await,
            Err(ClientError::NoConnection)
        );
        assert_eq!(
            client.status(&QueryKey::CurrentUserProfile),
            QueryStatus::Disabled
        );
    }

    #[tokio::test]
    async fn empty_key_short_circuits() {
        let mut mock = MockBackend::new();
        mock.expect_get_mod().never();
        let client = client_with(Arc::new(mock));

        assert_eq!(client.mod_by_id("").await, Err(ClientError::MissingKey("mod id")));
        assert_eq!(
            client.status(&QueryKey::Mod(String::new())),
            QueryStatus::Disabled
        );
    }

    #[tokio::test]
    async fn results_are_cached() {
        let mut mock = MockBackend::new();
        mock.expect_get_mod_enabled_state()
            .with(eq("m1"))
            .times(1)
            .returning(|_| Ok(true));
        let client = client_with(Arc::new(mock));

        assert_eq!(client.status(&QueryKey::ModEnabled("m1".into())), QueryStatus::Idle);
        assert_eq!(client.mod_enabled_state("m1").await, Ok(true));
        assert_eq!(client.mod_enabled_state("m1").await, Ok(true));
        assert_eq!(client.status(&QueryKey::ModEnabled("m1".into())), QueryStatus::Ready);
    }

    #[tokio::test]
    async fn enabled_state_retries_once_on_transport_errors() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut mock = MockBackend::new();
        mock.expect_get_mod_enabled_state().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(RemoteError::Transport("reset".into()))
        });
        let client = client_with(Arc::new(mock));

        let err = client.mod_enabled_state("m1").await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(matches!(
            client.status(&QueryKey::ModEnabled("m1".into())),
            QueryStatus::Failed(_)
        ));
    }

    #[tokio::test]
    async fn profile_never_retries() {
        let mut mock = MockBackend::new();
        mock.expect_get_caller_user_profile()
            .times(1)
            .returning(|| Err(RemoteError::Transport("offline".into())));
        let client = client_with(Arc::new(mock));

        assert!(client.caller_user_profile().await.is_err());
    }

    #[tokio::test]
    async fn default_policy_retries_transport_only() {
        let mut mock = MockBackend::new();
        mock.expect_get_mod()
            .times(1)
            .returning(|_| Err(RemoteError::NotFound("Mod not found".into())));
        mock.expect_list_story_modes()
            .times(4)
            .returning(|| Err(RemoteError::Transport("offline".into())));
        let client = client_with(Arc::new(mock));

        assert!(client.mod_by_id("m1").await.is_err());
        assert!(client.story_modes().await.is_err());
    }

    #[tokio::test]
    async fn unlisted_lookup_hides_disabled_mods() {
        let backend = MemoryBackend::new().as_caller(Principal::new("alice"));
        let client = client_with(Arc::new(backend.clone()));
        let token = modshare_core::generate_unlisted_id();
        client
            .create_mod(NewMod {
                id: "minecraft-1".into(),
                title: "Torch Fix".into(),
                description: "Fixes torch placement".into(),
                prompt: "Fix the bug".into(),
                version: "1.0.0".into(),
                game_name: "Minecraft".into(),
                files: vec![ModFile::new("fix.json", "application/json", vec![0; 512])],
                unlisted_id: token.clone(),
            })
            .await
            .unwrap();

        assert!(client.mod_by_unlisted_id(token.as_str()).await.is_ok());

        client.set_mod_enabled_state("minecraft-1", false).await.unwrap();
        assert_eq!(
            client.mod_by_unlisted_id(token.as_str()).await,
            Err(ClientError::ModUnavailable)
        );
        assert_eq!(
            client.mod_by_unlisted_id("not-a-token").await,
            Err(ClientError::ModUnavailable)
        );
        assert_eq!(
            client.mod_by_unlisted_id("").await,
            Err(ClientError::MissingKey("unlisted id"))
        );
    }

    #[tokio::test]
    async fn set_enabled_writes_new_state_into_cache() {
        let backend = MemoryBackend::new().as_caller(Principal::new("alice"));
        let client = client_with(Arc::new(backend.clone()));
        client
            .create_mod(NewMod {
                id: "m1".into(),
                title: "t".into(),
                description: "d".into(),
                prompt: "p".into(),
                version: "1".into(),
                game_name: "g".into(),
                files: Vec::new(),
                unlisted_id: modshare_core::generate_unlisted_id(),
            })
            .await
            .unwrap();
        assert_eq!(client.mod_enabled_state("m1").await, Ok(true));
        let _ = client.mod_by_id("m1").await.unwrap();

        client.set_mod_enabled_state("m1", false).await.unwrap();
        let calls_before = backend.call_count();

        assert_eq!(client.mod_enabled_state("m1").await, Ok(false));
        assert_eq!(backend.call_count(), calls_before);
        assert_eq!(client.status(&QueryKey::Mod("m1".into())), QueryStatus::Idle);
    }

    #[tokio::test]
    async fn failed_mutation_leaves_cache_alone() {
        let mut mock = MockBackend::new();
        mock.expect_get_caller_user_profile()
            .times(1)
            .returning(|| Ok(Some(UserProfile::new("Alice"))));
        mock.expect_save_caller_user_profile()
            .returning(|_| Err(RemoteError::Rejected("nope".into())));
        let client = client_with(Arc::new(mock));

        client.caller_user_profile().await.unwrap();
        assert!(client
            .save_caller_user_profile(UserProfile::new("Bob"))
            .await
            .is_err());
        assert_eq!(
            client.caller_user_profile().await,
            Ok(Some(UserProfile::new("Alice")))
        );
    }

    #[tokio::test]
    async fn sign_out_clears_cache_and_disables_queries() {
        let backend = Arc::new(MemoryBackend::new().as_caller(Principal::new("alice")));
        let client = client_with(backend);
        client.caller_user_role().await.unwrap();

        client.sign_out();

        assert_eq!(client.caller_user_role().await, Err(ClientError::NoConnection));
        assert_eq!(client.status(&QueryKey::CallerUserRole), QueryStatus::Disabled);
    }
}
