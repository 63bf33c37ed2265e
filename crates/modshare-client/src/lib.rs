//! Modshare Client
//!
//! Remote boundary of the sharing platform.
//!
//! # Overview
//!
//! - **Backend**: async actor interface, plus an in-memory implementation
//! - **Session**: injected identity and connection context
//! - **QueryCache**: moka-backed request cache keyed by operation + params
//! - **Policy**: one table of mutation → stale cache entries
//! - **ModshareClient**: queries and mutations tying the pieces together
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use modshare_client::{ClientConfig, MemoryBackend, ModshareClient, Session};
//! use modshare_core::Principal;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let backend = MemoryBackend::new().as_caller(Principal::new("alice"));
//! let session = Arc::new(Session::connected(Principal::new("alice"), Arc::new(backend)));
//! let client = ModshareClient::new(session, ClientConfig::default());
//!
//! assert_eq!(client.caller_user_profile().await.unwrap(), None);
//! # });
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod backend;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod memory;
pub mod policy;
pub mod session;

// Re-exports
pub use backend::{Backend, NewMod, ShowcaseFields, StoryModeFields};
pub use cache::{KeyPattern, QueryCache, QueryKey};
pub use client::{ModshareClient, QueryStatus};
pub use config::ClientConfig;
pub use error::{ClientError, ConfigError, RemoteError};
pub use memory::MemoryBackend;
pub use policy::{invalidation_plan, CacheAction, Mutation};
pub use session::{Connection, Session};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for talking to the backend
    pub use crate::{
        Backend, ClientConfig, ClientError, MemoryBackend, ModshareClient, QueryKey, RemoteError,
        Session,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
