use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::config::{Config, TokenStorageKind};

use super::storage::{FileStorage, KeyringStorage, MemoryStorage, TokenStorage};

/// Storage key holding the bearer token
pub const AUTH_TOKEN_KEY: &str = "access_token";

/// Holds the bearer token of the current user.
///
/// The only state is has-token / no-token: there is no expiry or signature
/// check, the server decides whether a token is still good. Clone is cheap
/// and every clone sees the same storage.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn TokenStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self { storage }
    }

    /// Session store backed by the storage the configuration selects.
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage: Arc<dyn TokenStorage> = match config.token_storage {
            TokenStorageKind::File => Arc::new(FileStorage::in_dir(&config.data_dir()?)),
            TokenStorageKind::Keyring => Arc::new(KeyringStorage::new()),
            TokenStorageKind::Memory => Arc::new(MemoryStorage::new()),
        };
        Ok(Self::new(storage))
    }

    /// Session store that forgets everything when the process exits.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Get the bearer token, if one is stored.
    ///
    /// An empty value counts as absent. A storage read failure is logged and
    /// treated as "not logged in".
    pub fn token(&self) -> Option<String> {
        match self.storage.get(AUTH_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read session token");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Persist a freshly issued token
    pub fn save(&self, token: &str) -> Result<()> {
        self.storage
            .set(AUTH_TOKEN_KEY, token)
            .context("Failed to save session token")?;
        debug!("Session token saved");
        Ok(())
    }

    /// Remove the stored token. Safe to call when already logged out.
    pub fn clear(&self) -> Result<()> {
        self.storage
            .remove(AUTH_TOKEN_KEY)
            .context("Failed to clear session token")?;
        debug!("Session cleared");
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.clear()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
