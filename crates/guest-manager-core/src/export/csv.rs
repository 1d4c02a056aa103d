// ABOUTME: Exports a filtered guest list of one event as CSV.
// ABOUTME: Sub-event ids resolve to names ("Main Event" when unset); flags render as Yes/No.

use thiserror::Error;

use crate::model::Event;
use crate::report::{GuestFilter, filter_guests};

/// Default download name for a guest list.
pub const CSV_FILE_NAME: &str = "guests.csv";

const HEADERS: [&str; 8] = [
    "Name",
    "Designation",
    "Organization",
    "Contact",
    "Sub-Event",
    "Transport",
    "Accommodation",
    "Attendance",
];

#[derive(Debug, Error)]
pub enum CsvExportError {
    #[error("csv error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("csv buffer error: {0}")]
    Buffer(String),
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

/// Render the guests of `event` that pass `filter` as CSV text, header
/// first, one row per guest, rows separated by `\n`.
pub fn export_guests_csv(event: &Event, filter: &GuestFilter) -> Result<String, CsvExportError> {
    let mut writer = ::csv::WriterBuilder::new()
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADERS)?;
    for guest in filter_guests(event, filter) {
        writer.write_record([
            guest.name.as_str(),
            guest.designation.as_str(),
            guest.organization.as_str(),
            guest.contact.as_deref().unwrap_or(""),
            event.session_name(guest.sub_event_id.as_deref()),
            yes_no(guest.transport.required),
            yes_no(guest.accommodation.required),
            yes_no(guest.attendance),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CsvExportError::Buffer(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CsvExportError::Buffer(e.to_string()))
}
