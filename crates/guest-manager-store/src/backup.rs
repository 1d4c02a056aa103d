// ABOUTME: File-level backup and export: dated JSON backups, validated imports, and guest-list CSV files.
// ABOUTME: Files are written atomically; an import that fails validation leaves the store untouched.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use guest_manager_core::export::{CSV_FILE_NAME, CsvExportError, export_guests_csv};
use guest_manager_core::{Event, GuestFilter, ImportError, backup_file_name, parse_backup, to_backup_json};
use thiserror::Error;

use crate::adapter::StoreError;
use crate::kv::{KeyValueStore, write_atomic};
use crate::manager::EventStore;

/// Errors that can occur while moving data in or out through files.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] CsvExportError),
}

/// The whole collection as pretty-printed backup JSON.
pub fn export_json<S: KeyValueStore>(store: &EventStore<S>) -> Result<String, BackupError> {
    Ok(to_backup_json(store.events())?)
}

/// Write a backup of the collection into `dir` under the dated file name.
pub fn write_backup<S: KeyValueStore>(
    store: &EventStore<S>,
    dir: &Path,
    date: NaiveDate,
) -> Result<PathBuf, BackupError> {
    let json = export_json(store)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(backup_file_name(date));
    write_atomic(&path, json.as_bytes())?;
    tracing::info!("exported {} events to {}", store.events().len(), path.display());
    Ok(path)
}

/// Read and validate a backup file without applying it.
pub fn read_backup(path: &Path) -> Result<Vec<Event>, BackupError> {
    let text = fs::read_to_string(path)?;
    Ok(parse_backup(&text)?)
}

/// Validate `text` and, if it passes, replace the collection with it.
/// Returns the number of imported events.
pub fn import_json<S: KeyValueStore>(
    store: &mut EventStore<S>,
    text: &str,
) -> Result<usize, BackupError> {
    let events = match parse_backup(text) {
        Ok(events) => events,
        Err(e) => {
            tracing::warn!("import rejected: {}", e);
            return Err(e.into());
        }
    };
    let count = events.len();
    store.import_events(events)?;
    Ok(count)
}

/// Write the filtered guest list of `event` to `<dir>/guests.csv`.
pub fn write_guest_csv(dir: &Path, event: &Event, filter: &GuestFilter) -> Result<PathBuf, BackupError> {
    let csv = export_guests_csv(event, filter)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(CSV_FILE_NAME);
    write_atomic(&path, csv.as_bytes())?;
    tracing::info!("wrote guest list for {} to {}", event.name, path.display());
    Ok(path)
}
