//! # Donation Ledger
//!
//! Escrows pledged funds per charity and marks them released on authorization.
//!
//! | Map             | Key         | Value            |
//! |-----------------|-------------|------------------|
//! | `donations`     | `DonationId`| [`Donation`]     |
//! | `charity_funds` | `Principal` | [`CharityFunds`] |
//!
//! `next_id` holds the last assigned id (0 before the first donation), so ids
//! run 1, 2, 3, ... regardless of donor or charity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::Authorizer;
use crate::types::{CharityFunds, Donation, DonationId, DonationStatus, Principal};
use crate::{LedgerError, ReleaseRejection, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationLedger {
    next_id: DonationId,
    donations: BTreeMap<DonationId, Donation>,
    charity_funds: BTreeMap<Principal, CharityFunds>,
}

impl DonationLedger {
    /// Rebuild a ledger from persisted records.
    pub fn from_records(
        next_id: DonationId,
        donations: impl IntoIterator<Item = (DonationId, Donation)>,
        charity_funds: impl IntoIterator<Item = (Principal, CharityFunds)>,
    ) -> Result<Self> {
        let donations: BTreeMap<_, _> = donations.into_iter().collect();
        if donations.contains_key(&0) {
            return Err(LedgerError::InvalidArgument(
                "donation id 0 is reserved".into(),
            ));
        }
        if let Some(&highest) = donations.keys().next_back() {
            if highest > next_id {
                return Err(LedgerError::InvalidArgument(format!(
                    "next id {next_id} is behind stored donation {highest}"
                )));
            }
        }
        Ok(Self {
            next_id,
            donations,
            charity_funds: charity_funds.into_iter().collect(),
        })
    }

    /// Last assigned donation id.
    pub fn next_id(&self) -> DonationId {
        self.next_id
    }

    pub fn donations(&self) -> impl Iterator<Item = (&DonationId, &Donation)> {
        self.donations.iter()
    }

    pub fn charity_funds(&self) -> impl Iterator<Item = (&Principal, &CharityFunds)> {
        self.charity_funds.iter()
    }

    // ─────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────

    /// Record a pending donation from `caller` and add `amount` to the
    /// charity's running total.
    pub fn donate(
        &mut self,
        charity: Principal,
        amount: u128,
        caller: Principal,
    ) -> Result<DonationId> {
        let id = self
            .next_id
            .checked_add(1)
            .ok_or(LedgerError::Overflow("donation id"))?;
        let total_funds = self
            .get_charity_funds(&charity)
            .total_funds
            .checked_add(amount)
            .ok_or(LedgerError::Overflow("charity funds"))?;

        debug!(donation_id = id, %charity, %amount, donor = %caller, "donation recorded");

        self.donations.insert(
            id,
            Donation {
                donor: caller,
                charity: charity.clone(),
                amount,
                status: DonationStatus::Pending,
            },
        );
        self.charity_funds.insert(charity, CharityFunds { total_funds });
        self.next_id = id;
        Ok(id)
    }

    /// Transition a donation from `Pending` to `Released`.
    ///
    /// The authorizer runs first. Every rejection carries the same message;
    /// only [`LedgerError::kind`] tells them apart. The charity total is left
    /// untouched.
    pub fn release_funds<A>(
        &mut self,
        donation_id: DonationId,
        caller: &Principal,
        authorizer: &A,
    ) -> Result<()>
    where
        A: Authorizer + ?Sized,
    {
        let reject = |reason| LedgerError::ReleaseRejected {
            donation_id,
            reason,
        };

        if !authorizer.is_authorized(caller) {
            debug!(donation_id, %caller, "release refused: caller not authorized");
            return Err(reject(ReleaseRejection::Unauthorized));
        }

        let donation = self
            .donations
            .get_mut(&donation_id)
            .ok_or(reject(ReleaseRejection::NotFound))?;

        match donation.status {
            DonationStatus::Pending => {}
            DonationStatus::Released => return Err(reject(ReleaseRejection::AlreadyReleased)),
        }

        donation.status = DonationStatus::Released;
        debug!(donation_id, %caller, "donation released");
        Ok(())
    }

    pub fn get_donation(&self, donation_id: DonationId) -> Result<&Donation> {
        self.donations
            .get(&donation_id)
            .ok_or(LedgerError::DonationNotFound(donation_id))
    }

    /// Zero for a charity that never received a donation.
    pub fn get_charity_funds(&self, charity: &Principal) -> CharityFunds {
        self.charity_funds.get(charity).copied().unwrap_or_default()
    }
}
