// ABOUTME: Defines Event, SubEvent, and EventCategory, the top-level records of the collection.
// ABOUTME: An Event exclusively owns its ordered sub-events and guests.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use ulid::Ulid;

use crate::guest::Guest;

/// Generate a fresh opaque identifier. Identifiers are never reused.
pub fn new_id() -> String {
    Ulid::new().to_string()
}

/// The fixed set of event categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Workshop,
    Panel,
    Summit,
    Cultural,
    Other,
}

impl EventCategory {
    pub const ALL: [EventCategory; 5] = [
        EventCategory::Workshop,
        EventCategory::Panel,
        EventCategory::Summit,
        EventCategory::Cultural,
        EventCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Workshop => "Workshop",
            EventCategory::Panel => "Panel",
            EventCategory::Summit => "Summit",
            EventCategory::Cultural => "Cultural",
            EventCategory::Other => "Other",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown event category: {0} (expected Workshop, Panel, Summit, Cultural or Other)")]
pub struct UnknownCategory(pub String);

impl FromStr for EventCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A sub-session within an Event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubEvent {
    pub id: String,
    pub name: String,
    #[serde(alias = "dateTime", with = "crate::datetime::local")]
    pub date: NaiveDateTime,
}

impl SubEvent {
    pub fn new(name: String, date: NaiveDateTime) -> Self {
        Self {
            id: new_id(),
            name,
            date,
        }
    }
}

fn default_duration() -> u32 {
    1
}

/// Non-finite budgets serialize as `null`; read them back as zero.
fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// The top-level organizational unit: a dated, categorized event with a
/// budget, its sub-events, and its guests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    /// Length in days.
    #[serde(default = "default_duration")]
    pub duration: u32,
    pub category: EventCategory,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub budget: f64,
    #[serde(default)]
    pub sub_events: Vec<SubEvent>,
    #[serde(default)]
    pub guests: Vec<Guest>,
}

impl Event {
    /// Create an Event with a fresh id, no sub-events, no guests, and a zero budget.
    pub fn new(name: String, date: NaiveDate, duration: u32, category: EventCategory) -> Self {
        Self {
            id: new_id(),
            name,
            date,
            duration,
            category,
            budget: 0.0,
            sub_events: Vec::new(),
            guests: Vec::new(),
        }
    }

    /// Look up a sub-event of this event by id.
    pub fn sub_event(&self, sub_event_id: &str) -> Option<&SubEvent> {
        self.sub_events.iter().find(|se| se.id == sub_event_id)
    }

    /// Display name of the session a guest belongs to.
    pub fn session_name(&self, sub_event_id: Option<&str>) -> &str {
        sub_event_id
            .and_then(|id| self.sub_event(id))
            .map_or("Main Event", |se| se.name.as_str())
    }
}

/// Fields of an Event that can be replaced by an update. Absent fields are
/// left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub duration: Option<u32>,
    pub category: Option<EventCategory>,
    pub budget: Option<f64>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(self, event: &mut Event) {
        if let Some(name) = self.name {
            event.name = name;
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(duration) = self.duration {
            event.duration = duration;
        }
        if let Some(category) = self.category {
            event.category = category;
        }
        if let Some(budget) = self.budget {
            event.budget = budget;
        }
    }
}
