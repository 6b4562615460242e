use crate::{DeviceId, Ledger, LedgerEvent, Principal, ReleasePolicy};

fn principal(raw: &str) -> Principal {
    Principal::new(raw).unwrap()
}

#[test]
fn test_donation_received_event() {
    let mut ledger = Ledger::default();
    let id = ledger
        .donate(principal("charity"), 1_000, principal("donor"))
        .unwrap();

    assert_eq!(
        ledger.take_events(),
        vec![LedgerEvent::DonationReceived {
            donation_id: id,
            donor: principal("donor"),
            charity: principal("charity"),
            amount: 1_000,
        }]
    );
    assert!(ledger.take_events().is_empty());
}

#[test]
fn test_funds_released_event() {
    let mut ledger = Ledger::default();
    let id = ledger
        .donate(principal("charity"), 5, principal("donor"))
        .unwrap();
    ledger.take_events();

    ledger.release_funds(id, &principal("owner")).unwrap();

    let events = ledger.take_events();
    assert_eq!(
        events,
        vec![LedgerEvent::FundsReleased {
            donation_id: id,
            charity: principal("charity"),
            released_by: principal("owner"),
        }]
    );
    assert_eq!(events[0].topic(), "funds_released");
    assert_eq!(events[0].subject(), id.to_string());
    assert_eq!(events[0].project_id(), None);
}

#[test]
fn test_impact_events_carry_project() {
    let mut ledger = Ledger::default();
    let d1 = DeviceId::new("d1").unwrap();
    ledger
        .register_device(d1.clone(), 3, "flow-meter".into())
        .unwrap();
    ledger.update_device_reading(&d1, 50, 12).unwrap();

    let events = ledger.take_events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].topic(), "device_registered");
    assert_eq!(
        events[1],
        LedgerEvent::ReadingRecorded {
            device_id: d1,
            project_id: 3,
            timestamp: 50,
            value: 12,
        }
    );
    assert!(events.iter().all(|e| e.project_id() == Some(3)));
}

#[test]
fn test_failures_and_queries_emit_nothing() {
    let mut ledger = Ledger::new(ReleasePolicy::Owner(principal("owner")));
    let id = ledger
        .donate(principal("charity"), 5, principal("donor"))
        .unwrap();
    ledger.take_events();

    assert!(ledger.release_funds(id, &principal("donor")).is_err());
    assert!(ledger.release_funds(id + 1, &principal("owner")).is_err());
    assert!(ledger
        .update_device_reading(&DeviceId::new("ghost").unwrap(), 1, 1)
        .is_err());
    let _ = ledger.get_donation(id);
    let _ = ledger.get_charity_funds(&principal("charity"));
    let _ = ledger.get_project_impact(1);

    assert!(ledger.take_events().is_empty());
}

#[test]
fn test_restore_discards_pending_events() {
    let mut ledger = Ledger::default();
    let snapshot = ledger.state().clone();
    ledger
        .donate(principal("charity"), 5, principal("donor"))
        .unwrap();

    ledger.restore(snapshot);

    assert!(ledger.take_events().is_empty());
    assert!(ledger.get_donation(1).is_err());
    assert_eq!(ledger.state().donations.next_id(), 0);
}

#[test]
fn test_event_serializes_with_tag() {
    let event = LedgerEvent::DonationReceived {
        donation_id: 1,
        donor: principal("donor"),
        charity: principal("charity"),
        amount: 1_000,
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "event": "donation_received",
            "donation_id": 1,
            "donor": "donor",
            "charity": "charity",
            "amount": 1000
        })
    );
}
