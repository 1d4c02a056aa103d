// ABOUTME: Maps the persisted layout (events blob, session token, admin credentials) onto a key-value store.
// ABOUTME: The events blob is always rewritten whole; an undecodable blob loads as an empty collection.

use guest_manager_core::{Event, MutationError};
use thiserror::Error;

use crate::auth::AdminCredentials;
use crate::kv::{KeyValueStore, KvError};

/// Key holding the JSON array of events.
pub const EVENTS_KEY: &str = "guest_manager_events";
/// Key holding the opaque session token.
pub const AUTH_TOKEN_KEY: &str = "guest_manager_auth_token";
/// Key holding the admin `{email, password}` record.
pub const ADMIN_CREDENTIALS_KEY: &str = "guest_manager_admin_creds";

/// Errors that can occur while reading or writing persisted state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Kv(#[from] KvError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Mutation(#[from] MutationError),
}

/// Typed access to the three persisted keys.
#[derive(Debug, Clone)]
pub struct PersistentStore<S> {
    kv: S,
}

impl<S: KeyValueStore> PersistentStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// Read the events blob. A missing key is an empty collection. A blob
    /// that no longer decodes is logged and also treated as empty; the bad
    /// blob stays on disk until the next write replaces it.
    pub fn load_events(&self) -> Result<Vec<Event>, StoreError> {
        let Some(raw) = self.kv.get(EVENTS_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<Event>>(&raw) {
            Ok(events) => Ok(events),
            Err(e) => {
                tracing::error!("failed to decode stored events, starting empty: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Overwrite the events blob with the whole collection.
    pub fn save_events(&self, events: &[Event]) -> Result<(), StoreError> {
        let json = serde_json::to_string(events)?;
        self.kv.set(EVENTS_KEY, &json)?;
        Ok(())
    }

    pub fn auth_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.kv.get(AUTH_TOKEN_KEY)?)
    }

    pub fn set_auth_token(&self, token: &str) -> Result<(), StoreError> {
        Ok(self.kv.set(AUTH_TOKEN_KEY, token)?)
    }

    pub fn clear_auth_token(&self) -> Result<(), StoreError> {
        Ok(self.kv.remove(AUTH_TOKEN_KEY)?)
    }

    /// The stored admin record, if one has been written.
    pub fn admin_credentials(&self) -> Result<Option<AdminCredentials>, StoreError> {
        match self.kv.get(ADMIN_CREDENTIALS_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn save_admin_credentials(&self, credentials: &AdminCredentials) -> Result<(), StoreError> {
        let json = serde_json::to_string(credentials)?;
        self.kv.set(ADMIN_CREDENTIALS_KEY, &json)?;
        Ok(())
    }
}
