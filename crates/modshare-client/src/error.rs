//! Error types for the modshare client
//!
//! - [`RemoteError`]: failures reported by (or on the way to) the backend
//! - [`ClientError`]: everything a query or mutation can surface to the UI
//! - [`ConfigError`]: configuration loading failures

use modshare_core::FieldError;

/// Failure reported by a backend call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// Caller may not perform the operation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Requested record does not exist or is not visible
    #[error("{0}")]
    NotFound(String),

    /// Backend refused the request
    #[error("{0}")]
    Rejected(String),

    /// Call never reached the backend or the reply was lost
    #[error("transport error: {0}")]
    Transport(String),
}

impl RemoteError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if error is an authorization failure
    #[inline]
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

/// Error surfaced by the query and mutation layer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// No live backend connection
    #[error("Actor not available")]
    NoConnection,

    /// Query issued with an empty key parameter
    #[error("missing query parameter: {0}")]
    MissingKey(&'static str),

    /// Backend call failed
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Local validation refused the input
    #[error(transparent)]
    Validation(#[from] FieldError),

    /// Unlisted mod is missing or disabled; the two are indistinguishable
    #[error("This mod is currently unavailable. It may have been disabled by its creator or the link may be invalid.")]
    ModUnavailable,
}

impl ClientError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Remote(remote) => remote.is_retryable(),
            _ => false,
        }
    }

    /// Check if the backend denied the caller
    #[inline]
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Remote(remote) if remote.is_unauthorized())
    }
}

/// Configuration loading failure
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// TOML text is malformed
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Value out of range
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_errors_retry() {
        assert!(RemoteError::Transport("reset".into()).is_retryable());
        assert!(!RemoteError::NotFound("Mod not found".into()).is_retryable());
        assert!(ClientError::from(RemoteError::Transport("x".into())).is_retryable());
        assert!(!ClientError::NoConnection.is_retryable());
    }

    #[test]
    fn messages() {
        assert_eq!(ClientError::NoConnection.to_string(), "Actor not available");
        assert_eq!(
            ClientError::from(RemoteError::NotFound("Mod not found".into())).to_string(),
            "Mod not found"
        );
        let unauthorized = ClientError::from(RemoteError::Unauthorized("not the creator".into()));
        assert!(unauthorized.is_unauthorized());
        assert!(unauthorized.to_string().contains("Unauthorized"));
    }
}
