// ABOUTME: Core library for guest-manager: events, sub-events, guests, and their mutations.
// ABOUTME: Also hosts the backup codec, read-only reports, and the CSV/Markdown exporters.

pub mod backup;
pub mod collection;
pub mod datetime;
pub mod export;
pub mod guest;
pub mod model;
pub mod report;
pub mod state;

pub use backup::{ImportError, backup_file_name, parse_backup, to_backup_json, validate_events};
pub use collection::Identified;
pub use guest::{
    AccommodationDetails, AccommodationStatus, Guest, GuestPatch, NewGuest, TransportDetails,
};
pub use model::{Event, EventCategory, EventPatch, SubEvent, UnknownCategory, new_id};
pub use report::{GuestFilter, RequirementFilter};
pub use state::{EventCollection, Mutation, MutationError};
