// ABOUTME: EventStore owns the in-memory collection and re-persists it after every change.
// ABOUTME: A mutation becomes visible only once the whole collection has been written back.

use chrono::{NaiveDate, NaiveDateTime};
use guest_manager_core::{
    Event, EventCategory, EventCollection, EventPatch, Guest, GuestPatch, Mutation, NewGuest,
    SubEvent,
};

use crate::adapter::{PersistentStore, StoreError};
use crate::kv::KeyValueStore;

/// The event/guest data store over a key-value backend.
#[derive(Debug)]
pub struct EventStore<S> {
    persistence: PersistentStore<S>,
    collection: EventCollection,
}

impl<S: KeyValueStore> EventStore<S> {
    /// Load the stored collection (or start empty) on top of `kv`.
    pub fn open(kv: S) -> Result<Self, StoreError> {
        let persistence = PersistentStore::new(kv);
        let events = persistence.load_events()?;
        let guests: usize = events.iter().map(|e| e.guests.len()).sum();
        tracing::info!("loaded {} events with {} guests", events.len(), guests);
        Ok(Self {
            persistence,
            collection: EventCollection::from_events(events),
        })
    }

    pub fn events(&self) -> &[Event] {
        self.collection.events()
    }

    pub fn get_event_by_id(&self, id: &str) -> Option<&Event> {
        self.collection.get(id)
    }

    pub fn guest(&self, event_id: &str, guest_id: &str) -> Option<&Guest> {
        self.collection.guest(event_id, guest_id)
    }

    /// Create an event and return its id.
    pub fn add_event(
        &mut self,
        name: String,
        date: NaiveDate,
        duration: u32,
        category: EventCategory,
    ) -> Result<String, StoreError> {
        let event = Event::new(name, date, duration, category);
        let id = event.id.clone();
        self.commit(Mutation::AddEvent { event })?;
        Ok(id)
    }

    pub fn update_event(&mut self, id: &str, patch: EventPatch) -> Result<bool, StoreError> {
        self.commit(Mutation::UpdateEvent {
            id: id.to_string(),
            patch,
        })
    }

    /// Set the budget as given. Range checks belong to the caller.
    pub fn update_budget(&mut self, id: &str, amount: f64) -> Result<bool, StoreError> {
        self.commit(Mutation::UpdateBudget {
            id: id.to_string(),
            amount,
        })
    }

    pub fn delete_event(&mut self, id: &str) -> Result<bool, StoreError> {
        self.commit(Mutation::DeleteEvent { id: id.to_string() })
    }

    /// Add a sub-event to `event_id`. Returns the new id, or `None` when the
    /// event does not exist.
    pub fn add_sub_event(
        &mut self,
        event_id: &str,
        name: String,
        date: NaiveDateTime,
    ) -> Result<Option<String>, StoreError> {
        let sub_event = SubEvent::new(name, date);
        let id = sub_event.id.clone();
        let added = self.commit(Mutation::AddSubEvent {
            event_id: event_id.to_string(),
            sub_event,
        })?;
        Ok(added.then_some(id))
    }

    pub fn delete_sub_event(&mut self, event_id: &str, sub_event_id: &str) -> Result<bool, StoreError> {
        self.commit(Mutation::DeleteSubEvent {
            event_id: event_id.to_string(),
            sub_event_id: sub_event_id.to_string(),
        })
    }

    /// Register a guest under `event_id`. Returns the new id, or `None` when
    /// the event does not exist.
    pub fn add_guest(&mut self, event_id: &str, new: NewGuest) -> Result<Option<String>, StoreError> {
        let guest = Guest::from_new(event_id, new);
        let id = guest.id.clone();
        let added = self.commit(Mutation::AddGuest {
            event_id: event_id.to_string(),
            guest,
        })?;
        Ok(added.then_some(id))
    }

    pub fn update_guest(
        &mut self,
        event_id: &str,
        guest_id: &str,
        patch: GuestPatch,
    ) -> Result<bool, StoreError> {
        self.commit(Mutation::UpdateGuest {
            event_id: event_id.to_string(),
            guest_id: guest_id.to_string(),
            patch,
        })
    }

    pub fn delete_guest(&mut self, event_id: &str, guest_id: &str) -> Result<bool, StoreError> {
        self.commit(Mutation::DeleteGuest {
            event_id: event_id.to_string(),
            guest_id: guest_id.to_string(),
        })
    }

    pub fn toggle_attendance(&mut self, event_id: &str, guest_id: &str) -> Result<bool, StoreError> {
        self.commit(Mutation::ToggleAttendance {
            event_id: event_id.to_string(),
            guest_id: guest_id.to_string(),
        })
    }

    pub fn set_transport_required(
        &mut self,
        event_id: &str,
        guest_id: &str,
        required: bool,
    ) -> Result<bool, StoreError> {
        self.commit(Mutation::SetTransportRequired {
            event_id: event_id.to_string(),
            guest_id: guest_id.to_string(),
            required,
        })
    }

    pub fn toggle_arrival(&mut self, event_id: &str, guest_id: &str) -> Result<bool, StoreError> {
        self.commit(Mutation::ToggleArrival {
            event_id: event_id.to_string(),
            guest_id: guest_id.to_string(),
        })
    }

    pub fn toggle_return(&mut self, event_id: &str, guest_id: &str) -> Result<bool, StoreError> {
        self.commit(Mutation::ToggleReturn {
            event_id: event_id.to_string(),
            guest_id: guest_id.to_string(),
        })
    }

    pub fn set_accommodation_required(
        &mut self,
        event_id: &str,
        guest_id: &str,
        required: bool,
    ) -> Result<bool, StoreError> {
        self.commit(Mutation::SetAccommodationRequired {
            event_id: event_id.to_string(),
            guest_id: guest_id.to_string(),
            required,
        })
    }

    pub fn advance_accommodation_status(
        &mut self,
        event_id: &str,
        guest_id: &str,
    ) -> Result<bool, StoreError> {
        self.commit(Mutation::AdvanceAccommodationStatus {
            event_id: event_id.to_string(),
            guest_id: guest_id.to_string(),
        })
    }

    /// Replace the entire collection. Callers validate first.
    pub fn import_events(&mut self, events: Vec<Event>) -> Result<(), StoreError> {
        let count = events.len();
        self.commit(Mutation::ReplaceAll { events })?;
        tracing::info!("replaced collection with {} imported events", count);
        Ok(())
    }

    /// Apply to a copy, persist the copy, then swap it in. A failed write
    /// leaves both memory and storage at the previous state.
    fn commit(&mut self, mutation: Mutation) -> Result<bool, StoreError> {
        let kind = mutation.kind();
        let mut next = self.collection.clone();
        if !next.apply(mutation)? {
            tracing::debug!("{}: no matching record", kind);
            return Ok(false);
        }
        self.persistence.save_events(next.events())?;
        self.collection = next;
        tracing::debug!("{}: persisted {} events", kind, self.collection.len());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::EVENTS_KEY;
    use crate::kv::{FileStore, KvError, MemoryStore};
    use guest_manager_core::AccommodationStatus;
    use std::io;
    use tempfile::TempDir;

    fn may(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn summit<S: KeyValueStore>(store: &mut EventStore<S>) -> String {
        store
            .add_event("Summit 2024".into(), may(1), 2, EventCategory::Summit)
            .unwrap()
    }

    fn ada() -> NewGuest {
        NewGuest::new("Ada".into(), "Speaker".into(), "ACM".into())
    }

    /// Accepts reads, refuses writes.
    struct ReadOnly(MemoryStore);

    impl KeyValueStore for ReadOnly {
        fn get(&self, key: &str) -> Result<Option<String>, KvError> {
            self.0.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), KvError> {
            Err(KvError::Io(io::Error::other("read-only store")))
        }

        fn remove(&self, _key: &str) -> Result<(), KvError> {
            Err(KvError::Io(io::Error::other("read-only store")))
        }
    }

    #[test]
    fn new_event_has_empty_children_and_zero_budget() {
        let mut store = EventStore::open(MemoryStore::new()).unwrap();
        let id = summit(&mut store);

        let event = store.get_event_by_id(&id).unwrap();
        assert_eq!(event.name, "Summit 2024");
        assert_eq!(event.budget, 0.0);
        assert!(event.sub_events.is_empty());
        assert!(event.guests.is_empty());
    }

    #[test]
    fn every_change_is_written_through() {
        let kv = MemoryStore::new();
        let mut store = EventStore::open(&kv).unwrap();
        let id = summit(&mut store);
        store.update_budget(&id, 5000.0).unwrap();

        let raw = kv.get(EVENTS_KEY).unwrap().unwrap();
        let stored: Vec<Event> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, store.events());
    }

    #[test]
    fn reopen_sees_previous_state() {
        let dir = TempDir::new().unwrap();
        let event_id = {
            let mut store = EventStore::open(FileStore::open(dir.path()).unwrap()).unwrap();
            let id = summit(&mut store);
            store.add_guest(&id, ada()).unwrap().unwrap();
            id
        };

        let store = EventStore::open(FileStore::open(dir.path()).unwrap()).unwrap();
        let event = store.get_event_by_id(&event_id).unwrap();
        assert_eq!(event.guests.len(), 1);
        assert_eq!(event.guests[0].name, "Ada");
    }

    #[test]
    fn corrupt_blob_opens_empty() {
        let kv = MemoryStore::new();
        kv.set(EVENTS_KEY, "[{\"broken\":").unwrap();
        let store = EventStore::open(&kv).unwrap();
        assert!(store.events().is_empty());
    }

    #[test]
    fn misses_report_false_and_skip_the_write() {
        let kv = MemoryStore::new();
        let mut store = EventStore::open(&kv).unwrap();

        assert!(!store.update_budget("missing", 1.0).unwrap());
        assert!(!store.delete_guest("missing", "nobody").unwrap());
        assert_eq!(store.add_guest("missing", ada()).unwrap(), None);
        assert_eq!(
            store
                .add_sub_event("missing", "Keynote".into(), may(1).and_hms_opt(9, 0, 0).unwrap())
                .unwrap(),
            None
        );
        assert!(kv.get(EVENTS_KEY).unwrap().is_none());
    }

    #[test]
    fn guest_gets_back_reference() {
        let mut store = EventStore::open(MemoryStore::new()).unwrap();
        let event_id = summit(&mut store);
        let guest_id = store.add_guest(&event_id, ada()).unwrap().unwrap();

        let guest = store.guest(&event_id, &guest_id).unwrap();
        assert_eq!(guest.event_id, event_id);
        assert!(!guest.attendance);
    }

    #[test]
    fn delete_event_takes_nested_records() {
        let mut store = EventStore::open(MemoryStore::new()).unwrap();
        let event_id = summit(&mut store);
        let other = store
            .add_event("Panel".into(), may(3), 1, EventCategory::Panel)
            .unwrap();
        store
            .add_sub_event(&event_id, "Keynote".into(), may(1).and_hms_opt(9, 0, 0).unwrap())
            .unwrap();
        let guest_id = store.add_guest(&event_id, ada()).unwrap().unwrap();

        assert!(store.delete_event(&event_id).unwrap());
        assert!(store.guest(&event_id, &guest_id).is_none());
        assert_eq!(store.events().len(), 1);
        assert_eq!(store.events()[0].id, other);
    }

    #[test]
    fn deleting_sub_event_moves_guests_to_main_event() {
        let mut store = EventStore::open(MemoryStore::new()).unwrap();
        let event_id = summit(&mut store);
        let se_id = store
            .add_sub_event(&event_id, "Workshop A".into(), may(2).and_hms_opt(14, 0, 0).unwrap())
            .unwrap()
            .unwrap();
        let mut new = ada();
        new.sub_event_id = Some(se_id.clone());
        let guest_id = store.add_guest(&event_id, new).unwrap().unwrap();

        assert!(store.delete_sub_event(&event_id, &se_id).unwrap());
        assert!(store.guest(&event_id, &guest_id).unwrap().sub_event_id.is_none());
    }

    #[test]
    fn foreign_sub_event_is_rejected_without_change() {
        let mut store = EventStore::open(MemoryStore::new()).unwrap();
        let event_id = summit(&mut store);
        let mut new = ada();
        new.sub_event_id = Some("nope".into());

        let err = store.add_guest(&event_id, new).unwrap_err();
        assert!(matches!(err, StoreError::Mutation(_)));
        assert!(store.get_event_by_id(&event_id).unwrap().guests.is_empty());
    }

    #[test]
    fn logistics_actions() {
        let mut store = EventStore::open(MemoryStore::new()).unwrap();
        let event_id = summit(&mut store);
        let guest_id = store.add_guest(&event_id, ada()).unwrap().unwrap();

        assert!(store.toggle_attendance(&event_id, &guest_id).unwrap());
        assert!(store.set_transport_required(&event_id, &guest_id, true).unwrap());
        assert!(store.toggle_arrival(&event_id, &guest_id).unwrap());
        assert!(store.toggle_return(&event_id, &guest_id).unwrap());
        assert!(store.set_accommodation_required(&event_id, &guest_id, true).unwrap());
        assert!(store.advance_accommodation_status(&event_id, &guest_id).unwrap());

        let guest = store.guest(&event_id, &guest_id).unwrap();
        assert!(guest.attendance);
        assert!(guest.transport.is_complete());
        assert!(guest.transport.return_marked_at.is_some());
        assert_eq!(guest.accommodation.status, AccommodationStatus::CheckedIn);

        store.set_transport_required(&event_id, &guest_id, false).unwrap();
        let guest = store.guest(&event_id, &guest_id).unwrap();
        assert!(!guest.transport.arrival_marked);
        assert!(guest.transport.arrival_marked_at.is_none());
    }

    #[test]
    fn marking_arrival_needs_transport() {
        let kv = MemoryStore::new();
        let mut store = EventStore::open(&kv).unwrap();
        let event_id = summit(&mut store);
        let guest_id = store.add_guest(&event_id, ada()).unwrap().unwrap();
        let stored = kv.get(EVENTS_KEY).unwrap();

        let err = store.toggle_arrival(&event_id, &guest_id).unwrap_err();
        assert!(matches!(err, StoreError::Mutation(_)));
        assert!(store.toggle_return(&event_id, &guest_id).is_err());

        let transport = &store.guest(&event_id, &guest_id).unwrap().transport;
        assert!(!transport.arrival_marked);
        assert!(transport.arrival_marked_at.is_none());
        assert_eq!(kv.get(EVENTS_KEY).unwrap(), stored);
    }

    #[test]
    fn update_event_merges_patch() {
        let mut store = EventStore::open(MemoryStore::new()).unwrap();
        let id = summit(&mut store);
        store
            .update_event(
                &id,
                EventPatch {
                    duration: Some(3),
                    ..Default::default()
                },
            )
            .unwrap();

        let event = store.get_event_by_id(&id).unwrap();
        assert_eq!(event.duration, 3);
        assert_eq!(event.name, "Summit 2024");
    }

    #[test]
    fn update_guest_merges_patch() {
        let mut store = EventStore::open(MemoryStore::new()).unwrap();
        let event_id = summit(&mut store);
        let guest_id = store.add_guest(&event_id, ada()).unwrap().unwrap();

        store
            .update_guest(
                &event_id,
                &guest_id,
                GuestPatch {
                    designation: Some("Keynote Speaker".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let guest = store.guest(&event_id, &guest_id).unwrap();
        assert_eq!(guest.designation, "Keynote Speaker");
        assert_eq!(guest.organization, "ACM");
    }

    #[test]
    fn import_replaces_everything() {
        let mut store = EventStore::open(MemoryStore::new()).unwrap();
        summit(&mut store);
        let replacement = vec![Event::new("Gala".into(), may(9), 1, EventCategory::Cultural)];

        store.import_events(replacement.clone()).unwrap();
        assert_eq!(store.events(), replacement.as_slice());
    }

    #[test]
    fn failed_write_leaves_memory_unchanged() {
        let inner = MemoryStore::new();
        let seeded = {
            let mut store = EventStore::open(&inner).unwrap();
            summit(&mut store);
            store.events().to_vec()
        };

        let mut store = EventStore::open(ReadOnly(inner)).unwrap();
        let id = seeded[0].id.clone();
        let err = store.update_budget(&id, 99.0).unwrap_err();

        assert!(matches!(err, StoreError::Kv(KvError::Io(_))));
        assert_eq!(store.events(), seeded.as_slice());
    }
}
