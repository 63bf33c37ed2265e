//! Identity session and backend connection
//!
//! A [`Session`] is created once per process and handed to every client
//! that needs the backend. It is connected on mount with the caller's
//! identity and torn down on sign-out; while no connection is live, every
//! remote-dependent action reports [`ClientError::NoConnection`] instead of
//! being attempted.

use crate::backend::Backend;
use crate::error::ClientError;
use modshare_core::Principal;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Live connection to the backend
#[derive(Clone)]
pub struct Connection {
    identity: Principal,
    backend: Arc<dyn Backend>,
}

impl Connection {
    /// Identity calls are made as
    #[inline]
    #[must_use]
    pub fn identity(&self) -> &Principal {
        &self.identity
    }

    /// Backend handle
    #[inline]
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// Process-wide session context
#[derive(Debug, Default)]
pub struct Session {
    connection: RwLock<Option<Connection>>,
    epoch: AtomicU64,
}

impl Session {
    /// Create disconnected session
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create session already connected
    #[must_use]
    pub fn connected(identity: Principal, backend: Arc<dyn Backend>) -> Self {
        let session = Self::new();
        session.connect(identity, backend);
        session
    }

    /// Open a connection, replacing any previous one
    pub fn connect(&self, identity: Principal, backend: Arc<dyn Backend>) {
        tracing::info!(%identity, "session connected");
        *self.connection.write() = Some(Connection { identity, backend });
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Drop the connection
    pub fn sign_out(&self) {
        if self.connection.write().take().is_some() {
            tracing::info!("session signed out");
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Check if a connection is live
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.read().is_some()
    }

    /// Identity of the live connection
    #[must_use]
    pub fn identity(&self) -> Option<Principal> {
        self.connection.read().as_ref().map(|c| c.identity.clone())
    }

    /// Current connection
    ///
    /// # Errors
    /// `NoConnection` when signed out.
    pub fn connection(&self) -> Result<Connection, ClientError> {
        self.connection
            .read()
            .clone()
            .ok_or(ClientError::NoConnection)
    }

    /// Backend of the live connection
    ///
    /// # Errors
    /// `NoConnection` when signed out.
    pub fn backend(&self) -> Result<Arc<dyn Backend>, ClientError> {
        self.connection().map(|c| c.backend)
    }

    /// Counter bumped on every connect and sign-out
    ///
    /// Responses started under an older epoch belong to a torn-down view.
    #[inline]
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }
}
