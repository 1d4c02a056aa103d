// ABOUTME: Defines Guest and its embedded TransportDetails and AccommodationDetails records.
// ABOUTME: Turning a logistics record off resets its detail fields; marks carry their timestamps.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::model::new_id;

/// Treat `""` the same as a missing value. Forms submit empty strings for
/// "no selection".
fn empty_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
}

/// Pickup and drop-off logistics for a guest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportDetails {
    pub required: bool,
    #[serde(default, alias = "arrival", with = "crate::datetime::local_opt")]
    pub arrival_time: Option<NaiveDateTime>,
    #[serde(default, alias = "return", with = "crate::datetime::local_opt")]
    pub return_time: Option<NaiveDateTime>,
    #[serde(default, alias = "pickup")]
    pub pickup_location: String,
    #[serde(default, alias = "drop")]
    pub drop_location: String,
    #[serde(default)]
    pub arrival_marked: bool,
    #[serde(default)]
    pub arrival_marked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub return_marked: bool,
    #[serde(default)]
    pub return_marked_at: Option<DateTime<Utc>>,
}

impl TransportDetails {
    /// Switch transport on or off. Switching off clears every detail field.
    pub fn set_required(&mut self, required: bool) {
        if required {
            self.required = true;
        } else {
            *self = Self::default();
        }
    }

    /// Record (or retract) the guest's arrival. The timestamp is stamped on
    /// the false-to-true transition and cleared on true-to-false.
    pub fn set_arrival_marked(&mut self, marked: bool) {
        if self.arrival_marked != marked {
            self.arrival_marked = marked;
            self.arrival_marked_at = marked.then(Utc::now);
        }
    }

    pub fn set_return_marked(&mut self, marked: bool) {
        if self.return_marked != marked {
            self.return_marked = marked;
            self.return_marked_at = marked.then(Utc::now);
        }
    }

    /// Flip the arrival mark, returning its new value.
    pub fn toggle_arrival(&mut self) -> bool {
        self.set_arrival_marked(!self.arrival_marked);
        self.arrival_marked
    }

    /// Flip the return mark, returning its new value.
    pub fn toggle_return(&mut self) -> bool {
        self.set_return_marked(!self.return_marked);
        self.return_marked
    }

    /// Both legs of the journey are marked.
    pub fn is_complete(&self) -> bool {
        self.arrival_marked && self.return_marked
    }

    /// Enforce the reset invariant on a record supplied wholesale. Each
    /// mark timestamp is made to agree with its flag: cleared when unmarked,
    /// stamped now when marked without one.
    pub fn normalized(mut self) -> Self {
        if !self.required {
            return Self::default();
        }
        self.arrival_marked_at = match (self.arrival_marked, self.arrival_marked_at) {
            (false, _) => None,
            (true, at) => Some(at.unwrap_or_else(Utc::now)),
        };
        self.return_marked_at = match (self.return_marked, self.return_marked_at) {
            (false, _) => None,
            (true, at) => Some(at.unwrap_or_else(Utc::now)),
        };
        self
    }
}

/// Lodging status, advanced by the check-in desk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccommodationStatus {
    #[default]
    Booked,
    CheckedIn,
    CheckedOut,
}

impl AccommodationStatus {
    /// The next status in the booked -> checked-in -> checked-out cycle.
    pub fn next(self) -> Self {
        match self {
            AccommodationStatus::Booked => AccommodationStatus::CheckedIn,
            AccommodationStatus::CheckedIn => AccommodationStatus::CheckedOut,
            AccommodationStatus::CheckedOut => AccommodationStatus::Booked,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccommodationStatus::Booked => "booked",
            AccommodationStatus::CheckedIn => "checked-in",
            AccommodationStatus::CheckedOut => "checked-out",
        }
    }
}

impl fmt::Display for AccommodationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lodging logistics for a guest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccommodationDetails {
    pub required: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default, with = "crate::datetime::local_opt")]
    pub check_in: Option<NaiveDateTime>,
    #[serde(default, with = "crate::datetime::local_opt")]
    pub check_out: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: AccommodationStatus,
}

impl AccommodationDetails {
    /// Switch accommodation on or off. Switching off clears the venue and
    /// both dates; the status is kept.
    pub fn set_required(&mut self, required: bool) {
        self.required = required;
        if !required {
            self.name.clear();
            self.check_in = None;
            self.check_out = None;
        }
    }

    /// Move to the next status and return it.
    pub fn advance_status(&mut self) -> AccommodationStatus {
        self.status = self.status.next();
        self.status
    }

    pub fn normalized(mut self) -> Self {
        let required = self.required;
        self.set_required(required);
        self
    }
}

/// An attendee of one Event, optionally assigned to one of its sub-events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: String,
    pub event_id: String,
    /// `None` means the main event.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sub_event_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub contact: Option<String>,
    /// Image as a data URI.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub photo: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub attendance: bool,
    #[serde(default)]
    pub transport: TransportDetails,
    #[serde(default)]
    pub accommodation: AccommodationDetails,
}

impl Guest {
    /// Build a guest record for `event_id` with a fresh id, stamped now.
    pub fn from_new(event_id: &str, new: NewGuest) -> Self {
        Self {
            id: new_id(),
            event_id: event_id.to_string(),
            sub_event_id: new.sub_event_id,
            name: new.name,
            designation: new.designation,
            organization: new.organization,
            contact: new.contact,
            photo: new.photo,
            created_at: Utc::now(),
            attendance: new.attendance,
            transport: new.transport.normalized(),
            accommodation: new.accommodation.normalized(),
        }
    }

    /// Bring both logistics records in line with their `required` flags.
    /// Returns whether anything changed.
    pub fn normalize_logistics(&mut self) -> bool {
        let transport = self.transport.clone().normalized();
        let accommodation = self.accommodation.clone().normalized();
        let changed = transport != self.transport || accommodation != self.accommodation;
        self.transport = transport;
        self.accommodation = accommodation;
        changed
    }
}

/// Everything a caller supplies when registering a guest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewGuest {
    pub name: String,
    pub designation: String,
    pub organization: String,
    pub contact: Option<String>,
    pub photo: Option<String>,
    pub sub_event_id: Option<String>,
    pub attendance: bool,
    pub transport: TransportDetails,
    pub accommodation: AccommodationDetails,
}

impl NewGuest {
    pub fn new(name: String, designation: String, organization: String) -> Self {
        Self {
            name,
            designation,
            organization,
            ..Default::default()
        }
    }
}

/// A partial update to a Guest. `Option<Option<_>>` fields distinguish
/// "leave alone" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuestPatch {
    pub name: Option<String>,
    pub designation: Option<String>,
    pub organization: Option<String>,
    pub contact: Option<Option<String>>,
    pub photo: Option<Option<String>>,
    pub sub_event_id: Option<Option<String>>,
    pub attendance: Option<bool>,
    pub transport: Option<TransportDetails>,
    pub accommodation: Option<AccommodationDetails>,
}

impl GuestPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The sub-event this patch would assign, if it assigns one.
    pub fn target_sub_event(&self) -> Option<&str> {
        self.sub_event_id.as_ref().and_then(|id| id.as_deref())
    }

    pub fn apply(self, guest: &mut Guest) {
        if let Some(name) = self.name {
            guest.name = name;
        }
        if let Some(designation) = self.designation {
            guest.designation = designation;
        }
        if let Some(organization) = self.organization {
            guest.organization = organization;
        }
        if let Some(contact) = self.contact {
            guest.contact = contact;
        }
        if let Some(photo) = self.photo {
            guest.photo = photo;
        }
        if let Some(sub_event_id) = self.sub_event_id {
            guest.sub_event_id = sub_event_id;
        }
        if let Some(attendance) = self.attendance {
            guest.attendance = attendance;
        }
        if let Some(transport) = self.transport {
            guest.transport = transport.normalized();
        }
        if let Some(accommodation) = self.accommodation {
            guest.accommodation = accommodation.normalized();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn full_transport() -> TransportDetails {
        TransportDetails {
            required: true,
            arrival_time: Some(noon()),
            return_time: Some(noon()),
            pickup_location: "Airport".into(),
            drop_location: "Hotel".into(),
            arrival_marked: true,
            arrival_marked_at: Some(Utc::now()),
            return_marked: false,
            return_marked_at: None,
        }
    }

    #[test]
    fn transport_off_clears_every_field() {
        let mut transport = full_transport();
        transport.set_required(false);
        assert_eq!(transport, TransportDetails::default());
    }

    #[test]
    fn transport_on_keeps_details() {
        let mut transport = full_transport();
        transport.set_required(true);
        assert_eq!(transport.pickup_location, "Airport");
    }

    #[test]
    fn arrival_mark_stamps_and_clears() {
        let mut transport = TransportDetails {
            required: true,
            ..Default::default()
        };

        assert!(transport.toggle_arrival());
        let stamped = transport.arrival_marked_at.expect("stamped on mark");
        assert!(stamped <= Utc::now());

        // Re-asserting the same value keeps the first stamp.
        transport.set_arrival_marked(true);
        assert_eq!(transport.arrival_marked_at, Some(stamped));

        assert!(!transport.toggle_arrival());
        assert!(transport.arrival_marked_at.is_none());
    }

    #[test]
    fn return_mark_stamps_and_clears() {
        let mut transport = TransportDetails::default();
        assert!(transport.toggle_return());
        assert!(transport.return_marked_at.is_some());
        assert!(!transport.toggle_return());
        assert!(transport.return_marked_at.is_none());
    }

    #[test]
    fn status_cycles_in_order() {
        let mut acc = AccommodationDetails::default();
        assert_eq!(acc.status, AccommodationStatus::Booked);
        assert_eq!(acc.advance_status(), AccommodationStatus::CheckedIn);
        assert_eq!(acc.advance_status(), AccommodationStatus::CheckedOut);
        assert_eq!(acc.advance_status(), AccommodationStatus::Booked);
    }

    #[test]
    fn accommodation_off_clears_venue_and_dates() {
        let mut acc = AccommodationDetails {
            required: true,
            name: "Grand Hotel".into(),
            check_in: Some(noon()),
            check_out: Some(noon()),
            status: AccommodationStatus::CheckedIn,
        };
        acc.set_required(false);

        assert!(!acc.required);
        assert!(acc.name.is_empty());
        assert!(acc.check_in.is_none());
        assert!(acc.check_out.is_none());
    }

    #[test]
    fn patch_normalizes_wholesale_transport() {
        let mut guest = Guest::from_new("e1", NewGuest::new("Ada".into(), "Speaker".into(), "ACM".into()));
        let mut sloppy = full_transport();
        sloppy.required = false;

        GuestPatch {
            transport: Some(sloppy),
            ..Default::default()
        }
        .apply(&mut guest);

        assert_eq!(guest.transport, TransportDetails::default());
    }

    #[test]
    fn normalized_marks_agree_with_flags() {
        let marked_without_stamp = TransportDetails {
            required: true,
            arrival_marked: true,
            arrival_marked_at: None,
            return_marked: false,
            return_marked_at: Some(Utc::now()),
            ..Default::default()
        }
        .normalized();

        assert!(marked_without_stamp.arrival_marked_at.is_some());
        assert!(marked_without_stamp.return_marked_at.is_none());
    }

    #[test]
    fn normalized_keeps_existing_stamp() {
        let stamp = Utc::now();
        let transport = TransportDetails {
            required: true,
            arrival_marked: true,
            arrival_marked_at: Some(stamp),
            ..Default::default()
        }
        .normalized();
        assert_eq!(transport.arrival_marked_at, Some(stamp));
    }

    #[test]
    fn patch_stamps_marked_transport() {
        let mut guest = Guest::from_new("e1", NewGuest::new("Ada".into(), "Speaker".into(), "ACM".into()));
        GuestPatch {
            transport: Some(TransportDetails {
                required: true,
                arrival_marked: true,
                ..Default::default()
            }),
            ..Default::default()
        }
        .apply(&mut guest);

        assert!(guest.transport.arrival_marked);
        assert!(guest.transport.arrival_marked_at.is_some());
    }

    #[test]
    fn normalize_logistics_reports_changes() {
        let mut guest = Guest::from_new("e1", NewGuest::new("Ada".into(), "Speaker".into(), "ACM".into()));
        assert!(!guest.normalize_logistics());

        guest.transport.pickup_location = "Airport".into();
        guest.accommodation.name = "Grand".into();
        assert!(guest.normalize_logistics());
        assert_eq!(guest.transport, TransportDetails::default());
        assert!(guest.accommodation.name.is_empty());
    }

    #[test]
    fn patch_can_clear_contact() {
        let mut new = NewGuest::new("Ada".into(), "Speaker".into(), "ACM".into());
        new.contact = Some("555-0100".into());
        let mut guest = Guest::from_new("e1", new);

        GuestPatch {
            contact: Some(None),
            ..Default::default()
        }
        .apply(&mut guest);

        assert!(guest.contact.is_none());
        assert_eq!(guest.name, "Ada");
    }

    #[test]
    fn guest_decodes_form_output() {
        let json = r#"{
            "id": "g1",
            "eventId": "e1",
            "subEventId": "",
            "name": "Ada",
            "designation": "Speaker",
            "organization": "ACM",
            "contact": null,
            "photo": null,
            "createdAt": "2024-04-20T08:15:00.000Z",
            "attendance": false,
            "transport": {
                "required": true,
                "arrivalTime": "2024-05-01T09:30",
                "returnTime": "",
                "pickupLocation": "Airport",
                "dropLocation": "",
                "arrivalMarked": false,
                "arrivalMarkedAt": null,
                "returnMarked": false,
                "returnMarkedAt": null
            },
            "accommodation": {
                "required": false,
                "name": "",
                "checkIn": null,
                "checkOut": null,
                "status": "checked-in"
            }
        }"#;

        let guest: Guest = serde_json::from_str(json).unwrap();
        assert!(guest.sub_event_id.is_none());
        assert!(guest.transport.arrival_time.is_some());
        assert!(guest.transport.return_time.is_none());
        assert_eq!(guest.accommodation.status, AccommodationStatus::CheckedIn);
    }
}
