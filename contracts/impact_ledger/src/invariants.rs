#![allow(dead_code)]

use std::collections::BTreeMap;

use crate::types::{Donation, DonationStatus, Principal, ProjectId};
use crate::{DonationLedger, ImpactRegistry};

/// Donation ids are exactly 1..=next_id with no gaps.
pub fn assert_sequential_ids(ledger: &DonationLedger) {
    for (expected, (id, _)) in (1u64..).zip(ledger.donations()) {
        assert_eq!(*id, expected, "expected donation id {expected}, got {id}");
    }
    assert_eq!(
        ledger.donations().count() as u64,
        ledger.next_id(),
        "next_id {} does not match the number of donations",
        ledger.next_id()
    );
}

/// Every charity total equals the sum of all its donations, released or not.
pub fn assert_charity_funds_match_donations(ledger: &DonationLedger) {
    let mut sums: BTreeMap<&Principal, u128> = BTreeMap::new();
    for (_, donation) in ledger.donations() {
        *sums.entry(&donation.charity).or_default() += donation.amount;
    }
    for (charity, funds) in ledger.charity_funds() {
        assert_eq!(
            funds.total_funds,
            sums.get(charity).copied().unwrap_or(0),
            "charity {charity} total drifted from its donations"
        );
    }
    assert_eq!(
        sums.len(),
        ledger.charity_funds().count(),
        "a charity with donations has no funds entry"
    );
}

/// Project impact totals equal the expected per-project sums.
pub fn assert_project_impact_matches(
    registry: &ImpactRegistry,
    expected: &BTreeMap<ProjectId, i128>,
) {
    for (project_id, total) in expected {
        assert_eq!(
            registry.get_project_impact(*project_id).total_impact,
            *total,
            "project {project_id} impact drifted"
        );
    }
    assert_eq!(
        registry.project_impacts().count(),
        expected.len(),
        "unexpected project impact entries"
    );
}

/// Only `Pending -> Released` is a legal transition.
pub fn assert_valid_status_transition(from: DonationStatus, to: DonationStatus) {
    assert!(
        matches!((from, to), (DonationStatus::Pending, DonationStatus::Released)),
        "invalid status transition from {from:?} to {to:?}"
    );
}

/// Release touches nothing but the status.
pub fn assert_donation_immutable_fields(original: &Donation, current: &Donation) {
    assert_eq!(original.donor, current.donor, "donation donor changed");
    assert_eq!(original.charity, current.charity, "donation charity changed");
    assert_eq!(original.amount, current.amount, "donation amount changed");
}
