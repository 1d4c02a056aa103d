// ABOUTME: Module root for guest-list and event exporters (CSV, Markdown).
// ABOUTME: Re-exports the export functions for convenient access.

pub mod csv;
pub mod markdown;

pub use self::csv::{CsvExportError, export_guests_csv, CSV_FILE_NAME};
pub use self::markdown::export_event_markdown;
