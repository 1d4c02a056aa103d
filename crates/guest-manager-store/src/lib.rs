// ABOUTME: Persistence layer for guest-manager, mapping the event collection onto key-value storage.
// ABOUTME: Provides the key-value backends, persisted layout adapter, credential gate, event store, and backups.

pub mod adapter;
pub mod auth;
pub mod backup;
pub mod kv;
pub mod manager;

pub use adapter::{ADMIN_CREDENTIALS_KEY, AUTH_TOKEN_KEY, EVENTS_KEY, PersistentStore, StoreError};
pub use auth::{AdminCredentials, CredentialGate, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD};
pub use backup::{BackupError, export_json, import_json, read_backup, write_backup, write_guest_csv};
pub use kv::{FileStore, KeyValueStore, KvError, MemoryStore};
pub use manager::EventStore;
