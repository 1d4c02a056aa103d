// ABOUTME: JSON backup codec for the whole event collection: pretty export and validated import.
// ABOUTME: Import checks the top level is an array, decodes each Event, then checks ids and references.

use std::collections::HashSet;

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::Event;

/// Why a backup file was rejected. A rejected import never touches state.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid file format: expected an array of events, found {0}")]
    NotAnArray(&'static str),

    #[error("element {index} is not a valid event: {source}")]
    InvalidEvent {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("identifier {0} appears more than once")]
    DuplicateId(String),

    #[error("guest {guest_id} references sub-event {sub_event_id}, which is not part of event {event_id}")]
    DanglingSubEvent {
        event_id: String,
        guest_id: String,
        sub_event_id: String,
    },

    #[error("guest {guest_id} is stored under event {event_id} but points at event {claimed}")]
    MisplacedGuest {
        event_id: String,
        guest_id: String,
        claimed: String,
    },
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Suggested file name for a backup taken on `date`.
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("guest-manager-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Serialize the collection as an indented JSON array.
pub fn to_backup_json(events: &[Event]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(events)
}

/// Parse backup text into a collection ready to replace the current one.
pub fn parse_backup(text: &str) -> Result<Vec<Event>, ImportError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        other => return Err(ImportError::NotAnArray(json_kind(&other))),
    };

    let mut events = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<Event>(item)
                .map_err(|source| ImportError::InvalidEvent { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    validate_events(&events)?;
    for event in &mut events {
        for guest in &mut event.guests {
            if guest.normalize_logistics() {
                tracing::warn!("reset inconsistent logistics on imported guest {}", guest.id);
            }
        }
    }
    Ok(events)
}

/// Check collection-wide invariants: unique ids across every level, guests
/// filed under the event they point at, and sub-event references that stay
/// inside the owning event.
pub fn validate_events(events: &[Event]) -> Result<(), ImportError> {
    fn claim<'a>(seen: &mut HashSet<&'a str>, id: &'a str) -> Result<(), ImportError> {
        if seen.insert(id) {
            Ok(())
        } else {
            Err(ImportError::DuplicateId(id.to_string()))
        }
    }

    let mut seen = HashSet::new();
    for event in events {
        claim(&mut seen, &event.id)?;
        for sub_event in &event.sub_events {
            claim(&mut seen, &sub_event.id)?;
        }
        for guest in &event.guests {
            claim(&mut seen, &guest.id)?;
            if guest.event_id != event.id {
                return Err(ImportError::MisplacedGuest {
                    event_id: event.id.clone(),
                    guest_id: guest.id.clone(),
                    claimed: guest.event_id.clone(),
                });
            }
            if let Some(sub_event_id) = guest.sub_event_id.as_deref()
                && event.sub_event(sub_event_id).is_none()
            {
                return Err(ImportError::DanglingSubEvent {
                    event_id: event.id.clone(),
                    guest_id: guest.id.clone(),
                    sub_event_id: sub_event_id.to_string(),
                });
            }
        }
    }
    Ok(())
}
