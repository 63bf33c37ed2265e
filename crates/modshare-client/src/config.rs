//! Client configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Modshare client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin share links are built on
    pub origin: String,
    /// Maximum cached query entries
    pub cache_capacity: u64,
    /// Time-to-live for cached entries, if any
    pub cache_ttl_secs: Option<u64>,
    /// Retries for queries without a specific policy
    pub default_retries: u32,
    /// Ad-gate countdown length
    pub ad_duration_secs: u64,
}

impl ClientConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With share-link origin
    #[inline]
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// With cache capacity
    #[inline]
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// With cache time-to-live
    #[inline]
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_secs = Some(ttl.as_secs());
        self
    }

    /// With default retry count
    #[inline]
    #[must_use]
    pub fn with_default_retries(mut self, retries: u32) -> Self {
        self.default_retries = retries;
        self
    }

    /// With ad-gate countdown length
    #[inline]
    #[must_use]
    pub fn with_ad_duration(mut self, duration: Duration) -> Self {
        self.ad_duration_secs = duration.as_secs();
        self
    }

    /// Cache time-to-live
    #[inline]
    #[must_use]
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }

    /// Ad-gate countdown length
    #[inline]
    #[must_use]
    pub fn ad_duration(&self) -> Duration {
        Duration::from_secs(self.ad_duration_secs)
    }

    /// Parse TOML text; missing keys take their defaults
    ///
    /// # Errors
    /// `Parse` on malformed TOML, `Invalid` on out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    ///
    /// # Errors
    /// `Io` if the file cannot be read, otherwise as [`Self::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// `Invalid` naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let origin = self.origin.trim();
        if !(origin.starts_with("http://") || origin.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "origin",
                reason: format!("expected an http(s) origin, got {origin:?}"),
            });
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "cache_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.ad_duration_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "ad_duration_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:3000".to_string(),
            cache_capacity: 1_000,
            cache_ttl_secs: None,
            default_retries: 3,
            ad_duration_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.origin, "http://localhost:3000");
        assert_eq!(config.default_retries, 3);
        assert_eq!(config.ad_duration(), Duration::from_secs(60));
        assert!(config.cache_ttl().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ClientConfig::from_toml_str(
            r#"
            origin = "https://mods.example"
            cache_ttl_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.origin, "https://mods.example");
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(30)));
        assert_eq!(config.cache_capacity, 1_000);
    }

    #[test]
    fn rejects_bad_values() {
        let err = ClientConfig::from_toml_str("origin = \"ftp://x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "origin", .. }));

        let err = ClientConfig::from_toml_str("cache_capacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "cache_capacity", .. }));

        assert!(matches!(
            ClientConfig::from_toml_str("origin = ").unwrap_err(),
            ConfigError::Parse(_)
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_retries = 5").unwrap();
        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.default_retries, 5);
    }

    #[test]
    fn builder_chain() {
        let config = ClientConfig::new()
            .with_origin("https://a.example")
            .with_cache_capacity(10)
            .with_cache_ttl(Duration::from_secs(5))
            .with_default_retries(0)
            .with_ad_duration(Duration::from_secs(3));
        assert_eq!(config.cache_ttl_secs, Some(5));
        assert_eq!(config.ad_duration_secs, 3);
        assert_eq!(config.default_retries, 0);
    }
}
