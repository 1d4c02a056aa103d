// ABOUTME: End-to-end smoke test for the full guest-manager lifecycle on a file-backed store.
// ABOUTME: Tests sign-in, event and guest CRUD, CSV output, backup export/import, and reopen.

use chrono::NaiveDate;
use guest_manager_core::export::export_guests_csv;
use guest_manager_core::{EventCategory, GuestFilter, ImportError, NewGuest};
use guest_manager_store::{
    AdminCredentials, BackupError, CredentialGate, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD,
    EventStore, FileStore, import_json, read_backup, write_backup,
};

#[test]
fn smoke_test_full_lifecycle() {
    // 1. File-backed store in a temp home
    let dir = tempfile::TempDir::new().unwrap();
    let home = dir.path().join("home");
    let kv = FileStore::open(&home).unwrap();

    // 2. First run seeds the default account, which can sign in
    let gate = CredentialGate::new(&kv);
    assert!(gate.initialize().unwrap());
    assert!(!gate.is_authenticated().unwrap());
    assert!(gate.authenticate(DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD).unwrap());
    assert!(gate.is_authenticated().unwrap());

    // 3. Create an event with a sub-event and two guests
    let mut store = EventStore::open(&kv).unwrap();
    let may_first = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let event_id = store
        .add_event("Summit 2024".into(), may_first, 2, EventCategory::Summit)
        .unwrap();
    assert!(store.update_budget(&event_id, 12000.0).unwrap());
    let keynote = store
        .add_sub_event(&event_id, "Keynote".into(), may_first.and_hms_opt(9, 0, 0).unwrap())
        .unwrap()
        .expect("event exists");

    let ada_id = store
        .add_guest(
            &event_id,
            NewGuest::new("Ada".into(), "Speaker".into(), "ACM".into()),
        )
        .unwrap()
        .expect("event exists");
    let mut grace = NewGuest::new("Grace".into(), "Admiral".into(), "Navy, Research".into());
    grace.sub_event_id = Some(keynote.clone());
    let grace_id = store.add_guest(&event_id, grace).unwrap().expect("event exists");

    assert!(store.toggle_attendance(&event_id, &ada_id).unwrap());
    assert!(store.set_transport_required(&event_id, &grace_id, true).unwrap());
    assert!(store.toggle_arrival(&event_id, &grace_id).unwrap());

    // 4. CSV: Ada has no transport, Grace's organization needs quoting
    let event = store.get_event_by_id(&event_id).unwrap();
    let csv = export_guests_csv(event, &GuestFilter::default()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "Name,Designation,Organization,Contact,Sub-Event,Transport,Accommodation,Attendance"
    );
    assert_eq!(lines[1], "Ada,Speaker,ACM,,Main Event,No,No,Yes");
    assert_eq!(lines[2], "Grace,Admiral,\"Navy, Research\",,Keynote,Yes,No,No");

    // 5. Export to a dated file, then import it into a fresh home
    let exports = dir.path().join("exports");
    let backup = write_backup(&store, &exports, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()).unwrap();
    assert!(backup.ends_with("guest-manager-backup-2024-06-01.json"));
    assert_eq!(read_backup(&backup).unwrap(), store.events());

    let other_kv = FileStore::open(&dir.path().join("other")).unwrap();
    let mut other = EventStore::open(&other_kv).unwrap();
    let text = std::fs::read_to_string(&backup).unwrap();
    assert_eq!(import_json(&mut other, &text).unwrap(), 1);
    assert_eq!(other.events(), store.events());

    // 6. A non-array import is rejected and nothing changes
    let before = store.events().to_vec();
    let err = import_json(&mut store, r#"{"foo":"bar"}"#).unwrap_err();
    assert!(matches!(err, BackupError::Import(ImportError::NotAnArray(_))));
    assert_eq!(store.events(), before.as_slice());

    // 7. Deleting the sub-event moves Grace back to the main event
    assert!(store.delete_sub_event(&event_id, &keynote).unwrap());
    assert!(store.guest(&event_id, &grace_id).unwrap().sub_event_id.is_none());

    // 8. Reopening sees everything that was written
    let after = store.events().to_vec();
    drop(store);
    let reopened = EventStore::open(FileStore::open(&home).unwrap()).unwrap();
    assert_eq!(reopened.events(), after.as_slice());
    let grace = reopened.guest(&event_id, &grace_id).unwrap();
    assert!(grace.transport.arrival_marked);
    assert!(grace.transport.arrival_marked_at.is_some());

    // 9. Rotating the password locks out the old one
    gate.logout().unwrap();
    gate.set_credentials(&AdminCredentials::new(DEFAULT_ADMIN_EMAIL, "new-secret"))
        .unwrap();
    assert!(!gate.authenticate(DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD).unwrap());
    assert!(!gate.is_authenticated().unwrap());
    assert!(gate.authenticate(DEFAULT_ADMIN_EMAIL, "new-secret").unwrap());

    // 10. Deleting the event removes every nested record
    let mut store = EventStore::open(&kv).unwrap();
    assert!(store.delete_event(&event_id).unwrap());
    assert!(store.guest(&event_id, &ada_id).is_none());
    assert!(store.events().is_empty());
}
