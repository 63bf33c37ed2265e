use async_trait::async_trait;
use modshare_client::{
    Backend, ClientConfig, MemoryBackend, ModshareClient, NewMod, QueryKey, RemoteError, Session,
    ShowcaseFields, StoryModeFields,
};
use modshare_core::{
    generate_unlisted_id, CharacterShowcase, ModFile, ModRecord, Principal, StoryMode,
    UnlistedId, UserProfile, UserRole,
};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Holds back the first enabled-state reply until released
struct SlowEnabledRead {
    inner: MemoryBackend,
    release: Arc<Notify>,
    hold: AtomicBool,
}

#[async_trait]
impl Backend for SlowEnabledRead {
    async fn create_mod(&self, new_mod: NewMod) -> Result<(), RemoteError> {
        self.inner.create_mod(new_mod).await
    }

    async fn get_mod(&self, mod_id: &str) -> Result<ModRecord, RemoteError> {
        self.inner.get_mod(mod_id).await
    }

    async fn get_mod_by_unlisted_id(
        &self,
        unlisted_id: &UnlistedId,
    ) -> Result<ModRecord, RemoteError> {
        self.inner.get_mod_by_unlisted_id(unlisted_id).await
    }

    async fn list_mods_for_creator(
        &self,
        creator: &Principal,
    ) -> Result<Vec<ModRecord>, RemoteError> {
        self.inner.list_mods_for_creator(creator).await
    }

    async fn update_mod_files(&self, mod_id: &str, files: Vec<ModFile>) -> Result<(), RemoteError> {
        self.inner.update_mod_files(mod_id, files).await
    }

    async fn get_mod_enabled_state(&self, mod_id: &str) -> Result<bool, RemoteError> {
        let reply = self.inner.get_mod_enabled_state(mod_id).await;
        if self.hold.swap(false, Ordering::SeqCst) {
            self.release.notified().await;
        }
        reply
    }

    async fn set_mod_enabled_state(&self, mod_id: &str, enabled: bool) -> Result<(), RemoteError> {
        self.inner.set_mod_enabled_state(mod_id, enabled).await
    }

    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>, RemoteError> {
        self.inner.get_caller_user_profile().await
    }

    async fn save_caller_user_profile(&self, profile: UserProfile) -> Result<(), RemoteError> {
        self.inner.save_caller_user_profile(profile).await
    }

    async fn get_caller_user_role(&self) -> Result<UserRole, RemoteError> {
        self.inner.get_caller_user_role().await
    }

    async fn create_story_mode(
        &self,
        id: String,
        fields: StoryModeFields,
        unlisted_id: UnlistedId,
    ) -> Result<(), RemoteError> {
        self.inner.create_story_mode(id, fields, unlisted_id).await
    }

    async fn get_story_mode(&self, story_mode_id: &str) -> Result<Option<StoryMode>, RemoteError> {
        self.inner.get_story_mode(story_mode_id).await
    }

    async fn list_story_modes(&self) -> Result<Vec<StoryMode>, RemoteError> {
        self.inner.list_story_modes().await
    }

    async fn update_story_mode(
        &self,
        id: &str,
        fields: StoryModeFields,
    ) -> Result<(), RemoteError> {
        self.inner.update_story_mode(id, fields).await
    }

    async fn update_story_mode_enabled_state(
        &self,
        story_mode_id: &str,
        enabled: bool,
    ) -> Result<(), RemoteError> {
        self.inner
            .update_story_mode_enabled_state(story_mode_id, enabled)
            .await
    }

    async fn create_character_showcase(
        &self,
        id: String,
        fields: ShowcaseFields,
        unlisted_id: UnlistedId,
    ) -> Result<(), RemoteError> {
        self.inner
            .create_character_showcase(id, fields, unlisted_id)
            .await
    }

    async fn get_character_showcase(
        &self,
        showcase_id: &str,
    ) -> Result<Option<CharacterShowcase>, RemoteError> {
        self.inner.get_character_showcase(showcase_id).await
    }

    async fn get_character_showcase_by_unlisted_id(
        &self,
        unlisted_id: &UnlistedId,
    ) -> Result<CharacterShowcase, RemoteError> {
        self.inner
            .get_character_showcase_by_unlisted_id(unlisted_id)
            .await
    }

    async fn list_character_showcases(&self) -> Result<Vec<CharacterShowcase>, RemoteError> {
        self.inner.list_character_showcases().await
    }

    async fn update_character_showcase(
        &self,
        id: &str,
        fields: ShowcaseFields,
    ) -> Result<(), RemoteError> {
        self.inner.update_character_showcase(id, fields).await
    }
}

fn torch_fix(id: &str) -> NewMod {
    NewMod {
        id: id.into(),
        title: "Torch Fix".into(),
        description: "Fixes torch placement".into(),
        prompt: "Fix the bug".into(),
        version: "1.0.0".into(),
        game_name: "Minecraft".into(),
        files: vec![ModFile::new("fix.json", "application/json", vec![b'{'; 512])],
        unlisted_id: generate_unlisted_id(),
    }
}

#[tokio::test]
async fn slow_read_does_not_overwrite_completed_toggle() {
    let alice = Principal::new("alice");
    let release = Arc::new(Notify::new());
    let backend = SlowEnabledRead {
        inner: MemoryBackend::new().as_caller(alice.clone()),
        release: Arc::clone(&release),
        hold: AtomicBool::new(true),
    };
    let session = Arc::new(Session::connected(alice, Arc::new(backend)));
    let client = ModshareClient::new(session, ClientConfig::default());
    client.create_mod(torch_fix("m1")).await.unwrap();

    let (read, toggle) = tokio::join!(client.mod_enabled_state("m1"), async {
        let toggled = client.set_mod_enabled_state("m1", false).await;
        release.notify_one();
        toggled
    });

    toggle.unwrap();
    // the slow read answered from before the toggle
    assert_eq!(read, Ok(true));

    let key = QueryKey::ModEnabled("m1".into());
    assert_eq!(client.cache().get::<bool>(&key).await, Some(false));
    assert_eq!(client.mod_enabled_state("m1").await, Ok(false));
}

#[tokio::test]
async fn read_after_toggle_is_cached() {
    let backend = MemoryBackend::new();
    let alice = Principal::new("alice");
    let view = backend.as_caller(alice.clone());
    let client = ModshareClient::new(
        Arc::new(Session::connected(alice, Arc::new(view))),
        ClientConfig::default(),
    );
    client.create_mod(torch_fix("m1")).await.unwrap();
    client.set_mod_enabled_state("m1", false).await.unwrap();
    client.cache().invalidate_all();

    assert_eq!(client.mod_enabled_state("m1").await, Ok(false));
    let calls = backend.call_count();
    assert_eq!(client.mod_enabled_state("m1").await, Ok(false));
    assert_eq!(backend.call_count(), calls);
}
