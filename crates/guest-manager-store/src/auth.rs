// ABOUTME: Single-account credential gate: seeds default admin credentials and issues a session token.
// ABOUTME: Plain case-sensitive comparison; a failed attempt reveals nothing about which field was wrong.

use std::fmt;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::adapter::{PersistentStore, StoreError};
use crate::kv::KeyValueStore;

/// Email of the account seeded on first run.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@eventapp.com";
/// Password of the account seeded on first run.
pub const DEFAULT_ADMIN_PASSWORD: &str = "password123";

/// The admin account record as persisted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

impl AdminCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    fn matches(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD)
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Login check against the single stored admin account.
#[derive(Debug, Clone)]
pub struct CredentialGate<S> {
    store: PersistentStore<S>,
}

impl<S: KeyValueStore> CredentialGate<S> {
    pub fn new(kv: S) -> Self {
        Self {
            store: PersistentStore::new(kv),
        }
    }

    /// Seed the default account if no record exists. Returns whether a
    /// record was written.
    pub fn initialize(&self) -> Result<bool, StoreError> {
        if self.store.admin_credentials()?.is_some() {
            return Ok(false);
        }
        self.store.save_admin_credentials(&AdminCredentials::default())?;
        tracing::info!("seeded default admin credentials");
        Ok(true)
    }

    /// The stored record, or the defaults when nothing is stored yet.
    pub fn credentials(&self) -> Result<AdminCredentials, StoreError> {
        Ok(self.store.admin_credentials()?.unwrap_or_default())
    }

    /// Check the submitted pair. On a match a fresh session token is stored.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<bool, StoreError> {
        if !self.credentials()?.matches(email, password) {
            tracing::warn!("rejected sign-in attempt");
            return Ok(false);
        }
        self.store.set_auth_token(&Ulid::new().to_string())?;
        tracing::info!("admin signed in");
        Ok(true)
    }

    pub fn logout(&self) -> Result<(), StoreError> {
        self.store.clear_auth_token()?;
        tracing::info!("admin signed out");
        Ok(())
    }

    /// Whether a session token is present.
    pub fn is_authenticated(&self) -> Result<bool, StoreError> {
        Ok(self.store.auth_token()?.is_some())
    }

    /// Replace the stored account. Existing sessions stay valid.
    pub fn set_credentials(&self, credentials: &AdminCredentials) -> Result<(), StoreError> {
        self.store.save_admin_credentials(credentials)?;
        tracing::info!("admin credentials updated for {}", credentials.email);
        Ok(())
    }
}
