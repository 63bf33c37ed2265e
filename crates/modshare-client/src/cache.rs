//! Request cache keyed by operation and parameters
//!
//! Keys are hierarchical segment lists (`["mod", id, "enabled"]`) so a whole
//! family of entries can be dropped with one prefix pattern. Values are
//! type-erased; readers downcast to the type the query produced.
//!
//! Every completed mutation bumps the cache generation. A query records the
//! generation before it fetches and only keeps its response when no
//! mutation landed in between.

use moka::future::Cache;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Cache key of one query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// `["currentUserProfile"]`
    CurrentUserProfile,
    /// `["callerUserRole"]`
    CallerUserRole,
    /// `["mod", id]`
    Mod(String),
    /// `["mod", "unlisted", token]`
    ModByUnlistedId(String),
    /// `["mods", "creator", principal]`
    ModsForCreator(String),
    /// `["mod", id, "enabled"]`
    ModEnabled(String),
    /// `["storyModes"]`
    StoryModes,
    /// `["storyMode", id]`
    StoryMode(String),
    /// `["characterShowcases"]`
    CharacterShowcases,
    /// `["characterShowcase", id]`
    CharacterShowcase(String),
    /// `["characterShowcase", "unlisted", token]`
    CharacterShowcaseByUnlistedId(String),
}

impl QueryKey {
    /// Key segments in hierarchy order
    #[must_use]
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::CurrentUserProfile => vec!["currentUserProfile"],
            Self::CallerUserRole => vec!["callerUserRole"],
            Self::Mod(id) => vec!["mod", id],
            Self::ModByUnlistedId(token) => vec!["mod", "unlisted", token],
            Self::ModsForCreator(principal) => vec!["mods", "creator", principal],
            Self::ModEnabled(id) => vec!["mod", id, "enabled"],
            Self::StoryModes => vec!["storyModes"],
            Self::StoryMode(id) => vec!["storyMode", id],
            Self::CharacterShowcases => vec!["characterShowcases"],
            Self::CharacterShowcase(id) => vec!["characterShowcase", id],
            Self::CharacterShowcaseByUnlistedId(token) => {
                vec!["characterShowcase", "unlisted", token]
            }
        }
    }

    /// Name of the required parameter when it is empty
    ///
    /// Queries with a missing parameter stay disabled instead of calling
    /// the backend.
    #[must_use]
    pub fn missing_param(&self) -> Option<&'static str> {
        let (name, value) = match self {
            Self::CurrentUserProfile
            | Self::CallerUserRole
            | Self::StoryModes
            | Self::CharacterShowcases => return None,
            Self::Mod(id) | Self::ModEnabled(id) => ("mod id", id),
            Self::ModByUnlistedId(token) | Self::CharacterShowcaseByUnlistedId(token) => {
                ("unlisted id", token)
            }
            Self::ModsForCreator(principal) => ("creator", principal),
            Self::StoryMode(id) => ("story mode id", id),
            Self::CharacterShowcase(id) => ("showcase id", id),
        };
        value.is_empty().then_some(name)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments().join("/"))
    }
}

/// Exact or prefix match over key segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPattern {
    segments: Vec<String>,
    exact: bool,
}

impl KeyPattern {
    /// Match every key starting with `segments`
    #[must_use]
    pub fn prefix<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            exact: false,
        }
    }

    /// Match only `key`
    #[must_use]
    pub fn exact(key: &QueryKey) -> Self {
        Self {
            segments: key.segments().into_iter().map(str::to_string).collect(),
            exact: true,
        }
    }

    /// Check if `key` falls under this pattern
    #[must_use]
    pub fn matches(&self, key: &QueryKey) -> bool {
        let segments = key.segments();
        if self.exact && segments.len() != self.segments.len() {
            return false;
        }
        segments.len() >= self.segments.len()
            && self.segments.iter().zip(&segments).all(|(p, s)| p == s)
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))?;
        if !self.exact {
            f.write_str("*")?;
        }
        Ok(())
    }
}

/// Concurrent query cache
#[derive(Clone)]
pub struct QueryCache {
    inner: Cache<QueryKey, Arc<dyn Any + Send + Sync>>,
    generation: Arc<AtomicU64>,
}

impl QueryCache {
    /// Create cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create cache with time-based expiration
    #[inline]
    #[must_use]
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Cached value for `key`, if present with type `T`
    pub async fn get<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let entry = self.inner.get(key).await?;
        let value = entry.downcast_ref::<T>().cloned();
        if value.is_none() {
            tracing::warn!(%key, "cached value has unexpected type");
        }
        value
    }

    /// Store `value` under `key`
    pub async fn insert<T>(&self, key: QueryKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        tracing::debug!(%key, "cache write");
        self.inner.insert(key, Arc::new(value)).await;
    }

    /// Current write generation
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Start a new write generation; responses fetched under an older one
    /// are no longer stored
    #[inline]
    pub fn advance_generation(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Store a query response fetched under `generation`
    ///
    /// Returns `false`, leaving no entry for `key`, when a mutation landed
    /// since. The check runs again after the write so a mutation racing the
    /// insert cannot leave the older value behind.
    pub async fn insert_fetched<T>(&self, key: QueryKey, value: T, generation: u64) -> bool
    where
        T: Send + Sync + 'static,
    {
        if self.generation() != generation {
            tracing::debug!(%key, "stale response not cached");
            return false;
        }
        self.insert(key.clone(), value).await;
        if self.generation() != generation {
            self.inner.invalidate(&key).await;
            tracing::debug!(%key, "stale response dropped after write");
            return false;
        }
        true
    }

    /// Drop every entry matching `pattern`; returns how many were dropped
    pub async fn invalidate(&self, pattern: &KeyPattern) -> usize {
        let stale: Vec<QueryKey> = self
            .inner
            .iter()
            .filter(|(key, _)| pattern.matches(key))
            .map(|(key, _)| QueryKey::clone(&key))
            .collect();

        for key in &stale {
            self.inner.invalidate(key).await;
        }
        tracing::debug!(%pattern, dropped = stale.len(), "cache invalidated");
        stale.len()
    }

    /// Drop all entries
    #[inline]
    pub fn invalidate_all(&self) {
        self.advance_generation();
        self.inner.invalidate_all();
    }

    /// Check if `key` has an entry
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.contains_key(key)
    }

    /// Get approximate entry count
    #[inline]
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl Default for QueryCache {
    /// Create cache with default capacity (1,000 entries)
    fn default() -> Self {
        Self::new(1_000)
    }
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_segments() {
        assert_eq!(QueryKey::ModEnabled("m1".into()).to_string(), "mod/m1/enabled");
        assert_eq!(
            QueryKey::ModByUnlistedId("abc".into()).segments(),
            vec!["mod", "unlisted", "abc"]
        );
        assert_eq!(QueryKey::CurrentUserProfile.to_string(), "currentUserProfile");
    }

    #[test]
    fn missing_params() {
        assert_eq!(QueryKey::Mod(String::new()).missing_param(), Some("mod id"));
        assert_eq!(QueryKey::Mod("m1".into()).missing_param(), None);
        assert_eq!(QueryKey::StoryModes.missing_param(), None);
    }

    #[test]
    fn prefix_and_exact_patterns() {
        let mod_family = KeyPattern::prefix(["mod", "m1"]);
        assert!(mod_family.matches(&QueryKey::Mod("m1".into())));
        assert!(mod_family.matches(&QueryKey::ModEnabled("m1".into())));
        assert!(!mod_family.matches(&QueryKey::Mod("m10".into())));
        assert!(!mod_family.matches(&QueryKey::ModsForCreator("m1".into())));
        assert_eq!(mod_family.to_string(), "mod/m1*");

        let exact = KeyPattern::exact(&QueryKey::Mod("m1".into()));
        assert!(exact.matches(&QueryKey::Mod("m1".into())));
        assert!(!exact.matches(&QueryKey::ModEnabled("m1".into())));
    }

    #[tokio::test]
    async fn typed_get_and_insert() {
        let cache = QueryCache::new(100);
        let key = QueryKey::ModEnabled("m1".into());
        cache.insert(key.clone(), true).await;

        assert_eq!(cache.get::<bool>(&key).await, Some(true));
        assert_eq!(cache.get::<String>(&key).await, None);
        assert_eq!(cache.get::<bool>(&QueryKey::Mod("m1".into())).await, None);
    }

    #[tokio::test]
    async fn prefix_invalidation_drops_family_only() {
        let cache = QueryCache::new(100);
        cache.insert(QueryKey::Mod("m1".into()), 1u8).await;
        cache.insert(QueryKey::ModEnabled("m1".into()), true).await;
        cache.insert(QueryKey::Mod("m2".into()), 2u8).await;

        let dropped = cache.invalidate(&KeyPattern::prefix(["mod", "m1"])).await;

        assert_eq!(dropped, 2);
        assert!(!cache.contains(&QueryKey::Mod("m1".into())));
        assert!(!cache.contains(&QueryKey::ModEnabled("m1".into())));
        assert!(cache.contains(&QueryKey::Mod("m2".into())));
    }

    #[tokio::test]
    async fn response_from_older_generation_is_not_stored() {
        let cache = QueryCache::new(100);
        let key = QueryKey::ModEnabled("m1".into());

        let before = cache.generation();
        cache.advance_generation();
        cache.insert(key.clone(), false).await;

        assert!(!cache.insert_fetched(key.clone(), true, before).await);
        assert_eq!(cache.get::<bool>(&key).await, Some(false));

        let now = cache.generation();
        assert!(cache.insert_fetched(key.clone(), true, now).await);
        assert_eq!(cache.get::<bool>(&key).await, Some(true));
    }
}
