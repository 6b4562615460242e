use serde_json::json;

use crate::{DeviceId, ErrorKind, Ledger, Operation, Outcome, Principal, Receipt};

const OWNER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
const DONOR: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";
const CHARITY: &str = "ST3AM1A56AK2C1XAFJ4115ZSV26EB49BVQ10MGCS0";

fn principal(raw: &str) -> Principal {
    Principal::new(raw).unwrap()
}

fn receipt(ledger: &mut Ledger, op: Operation) -> serde_json::Value {
    serde_json::to_value(Receipt::from(ledger.execute(op))).unwrap()
}

#[test]
fn test_donation_operations_through_dispatch() {
    let mut ledger = Ledger::default();

    let donate = Operation::Donate {
        charity: principal(CHARITY),
        amount: 1_000,
        caller: principal(DONOR),
    };
    assert_eq!(receipt(&mut ledger, donate), json!({"success": true, "value": 1}));

    assert_eq!(
        receipt(&mut ledger, Operation::GetDonation { donation_id: 1 }),
        json!({
            "success": true,
            "value": {
                "donor": DONOR,
                "charity": CHARITY,
                "amount": 1000,
                "status": "pending"
            }
        })
    );

    assert_eq!(
        receipt(
            &mut ledger,
            Operation::GetCharityFunds {
                charity: principal(CHARITY)
            }
        ),
        json!({"success": true, "value": {"total_funds": 1000}})
    );

    let release = Operation::ReleaseFunds {
        donation_id: 1,
        caller: principal(OWNER),
    };
    assert_eq!(
        receipt(&mut ledger, release.clone()),
        json!({"success": true, "value": true})
    );
    assert_eq!(
        receipt(&mut ledger, release),
        json!({"success": false, "error": "invalid donation or already released"})
    );

    assert_eq!(
        receipt(&mut ledger, Operation::GetDonation { donation_id: 9 }),
        json!({"success": false, "error": "invalid donation"})
    );
}

#[test]
fn test_telemetry_operations_through_dispatch() {
    let mut ledger = Ledger::default();
    let device_id = DeviceId::new("device-123").unwrap();

    let register = Operation::RegisterDevice {
        device_id: device_id.clone(),
        project_id: 1,
        device_type: "temperature-sensor".into(),
    };
    assert_eq!(receipt(&mut ledger, register), json!({"success": true, "value": true}));

    let update = Operation::UpdateDeviceReading {
        device_id: device_id.clone(),
        timestamp: 1_234_567_890,
        value: 25,
    };
    assert_eq!(receipt(&mut ledger, update), json!({"success": true, "value": true}));

    assert_eq!(
        receipt(&mut ledger, Operation::GetDeviceInfo { device_id }),
        json!({
            "success": true,
            "value": {
                "project_id": 1,
                "device_type": "temperature-sensor",
                "last_reading": {"timestamp": 1234567890u64, "value": 25}
            }
        })
    );

    assert_eq!(
        receipt(&mut ledger, Operation::GetProjectImpact { project_id: 1 }),
        json!({"success": true, "value": {"total_impact": 25, "last_updated": 1234567890u64}})
    );

    assert_eq!(
        receipt(
            &mut ledger,
            Operation::GetDeviceInfo {
                device_id: DeviceId::new("missing").unwrap()
            }
        ),
        json!({"success": false, "error": "invalid device"})
    );
}

#[test]
fn test_execute_returns_typed_outcomes() {
    let mut ledger = Ledger::default();
    let outcome = ledger
        .execute(Operation::GetProjectImpact { project_id: 5 })
        .unwrap();
    assert_eq!(outcome, Outcome::ProjectImpact(Default::default()));
}

#[test]
fn test_operation_names_and_classes() {
    let ops = [
        Operation::Donate {
            charity: principal(CHARITY),
            amount: 1,
            caller: principal(DONOR),
        },
        Operation::ReleaseFunds {
            donation_id: 1,
            caller: principal(OWNER),
        },
        Operation::GetDonation { donation_id: 1 },
        Operation::GetCharityFunds {
            charity: principal(CHARITY),
        },
        Operation::RegisterDevice {
            device_id: DeviceId::new("d").unwrap(),
            project_id: 1,
            device_type: "t".into(),
        },
        Operation::UpdateDeviceReading {
            device_id: DeviceId::new("d").unwrap(),
            timestamp: 0,
            value: 0,
        },
        Operation::GetDeviceInfo {
            device_id: DeviceId::new("d").unwrap(),
        },
        Operation::GetProjectImpact { project_id: 1 },
    ];
    let names: Vec<_> = ops.iter().map(Operation::name).collect();
    assert_eq!(
        names,
        [
            "donate",
            "release-funds",
            "get-donation",
            "get-charity-funds",
            "register-device",
            "update-device-reading",
            "get-device-info",
            "get-project-impact",
        ]
    );
    let read_only: Vec<_> = ops.iter().map(Operation::is_read_only).collect();
    assert_eq!(read_only, [false, false, true, true, false, false, true, true]);
}

#[test]
fn test_receipt_success_flag_follows_result() {
    let mut ledger = Ledger::default();

    let found = Receipt::from(ledger.execute(Operation::GetProjectImpact { project_id: 7 }));
    assert!(found.is_success());

    let missing = Receipt::from(ledger.execute(Operation::GetDonation { donation_id: 1 }));
    assert!(!missing.is_success());
    assert_eq!(missing, Receipt::failure("invalid donation"));
}

#[test]
fn test_error_kind_codes_are_stable() {
    let codes: Vec<_> = [
        ErrorKind::NotFound,
        ErrorKind::InvalidState,
        ErrorKind::Unauthorized,
        ErrorKind::InvalidArgument,
    ]
    .into_iter()
    .map(ErrorKind::code)
    .collect();
    assert_eq!(codes, [1, 2, 3, 4]);
}
