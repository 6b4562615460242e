//! # Impact Ledger
//!
//! Two small authoritative ledgers, each a deterministic state machine over
//! its own key-value maps:
//!
//! | Component            | Maps                              | Entry Point(s)                                   |
//! |----------------------|-----------------------------------|--------------------------------------------------|
//! | [`DonationLedger`]   | `donations`, `charity_funds`      | `donate`, `release_funds`, `get_donation`, `get_charity_funds` |
//! | [`ImpactRegistry`]   | `devices`, `project_impact`       | `register_device`, `update_device_reading`, `get_device_info`, `get_project_impact` |
//!
//! ## Architecture
//!
//! [`Ledger`] owns a [`LedgerState`] (both components), the [`Authorizer`]
//! consulted by `release_funds`, and the pending [`LedgerEvent`] journal.
//! A host drives it either through the typed entry points or through
//! [`Ledger::execute`] with a decoded [`Operation`].
//!
//! Every operation is all-or-nothing: all validation happens before the first
//! write, so a failed call leaves the state exactly as it was.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod auth;
pub mod dispatch;
pub mod donation;
pub mod events;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_dispatch;
#[cfg(test)]
mod test_events;

pub use auth::{Authorizer, ReleasePolicy};
pub use dispatch::{Operation, Outcome, Receipt};
pub use donation::DonationLedger;
pub use events::LedgerEvent;
pub use telemetry::ImpactRegistry;
pub use types::{
    CharityFunds, Device, DeviceId, Donation, DonationId, DonationStatus, Principal, ProjectId,
    ProjectImpact, Reading,
};

// ─────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────

/// Coarse failure class, stable across releases.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum ErrorKind {
    NotFound = 1,
    InvalidState = 2,
    Unauthorized = 3,
    InvalidArgument = 4,
}

impl ErrorKind {
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Why `release_funds` refused a donation. Not part of the public message.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ReleaseRejection {
    Unauthorized,
    NotFound,
    AlreadyReleased,
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum LedgerError {
    #[error("invalid donation")]
    DonationNotFound(DonationId),

    #[error("invalid donation or already released")]
    ReleaseRejected {
        donation_id: DonationId,
        reason: ReleaseRejection,
    },

    #[error("invalid device")]
    DeviceNotFound(DeviceId),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DonationNotFound(_) | Self::DeviceNotFound(_) => ErrorKind::NotFound,
            Self::ReleaseRejected { reason, .. } => match reason {
                ReleaseRejection::NotFound => ErrorKind::NotFound,
                ReleaseRejection::AlreadyReleased => ErrorKind::InvalidState,
                ReleaseRejection::Unauthorized => ErrorKind::Unauthorized,
            },
            Self::InvalidArgument(_) | Self::Overflow(_) => ErrorKind::InvalidArgument,
        }
    }
}

pub type Result<T> = core::result::Result<T, LedgerError>;

// ─────────────────────────────────────────────────────────
// Ledger
// ─────────────────────────────────────────────────────────

/// The persistent part of the ledger: exactly the four maps plus the id counter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub donations: DonationLedger,
    pub telemetry: ImpactRegistry,
}

pub struct Ledger<A = ReleasePolicy> {
    state: LedgerState,
    authorizer: A,
    journal: Vec<LedgerEvent>,
}

impl<A: Authorizer> Ledger<A> {
    pub fn new(authorizer: A) -> Self {
        Self::with_state(LedgerState::default(), authorizer)
    }

    pub fn with_state(state: LedgerState, authorizer: A) -> Self {
        Self {
            state,
            authorizer,
            journal: Vec::new(),
        }
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// Roll back to a previously captured state. Discards any undrained events.
    pub fn restore(&mut self, state: LedgerState) {
        self.state = state;
        self.journal.clear();
    }

    /// Drain the events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        core::mem::take(&mut self.journal)
    }

    /// Run one decoded operation.
    pub fn execute(&mut self, op: Operation) -> Result<Outcome> {
        match op {
            Operation::Donate {
                charity,
                amount,
                caller,
            } => self.donate(charity, amount, caller).map(Outcome::DonationId),
            Operation::ReleaseFunds {
                donation_id,
                caller,
            } => self.release_funds(donation_id, &caller).map(Outcome::Flag),
            Operation::GetDonation { donation_id } => {
                self.get_donation(donation_id).map(Outcome::Donation)
            }
            Operation::GetCharityFunds { charity } => {
                Ok(Outcome::CharityFunds(self.get_charity_funds(&charity)))
            }
            Operation::RegisterDevice {
                device_id,
                project_id,
                device_type,
            } => self
                .register_device(device_id, project_id, device_type)
                .map(Outcome::Flag),
            Operation::UpdateDeviceReading {
                device_id,
                timestamp,
                value,
            } => self
                .update_device_reading(&device_id, timestamp, value)
                .map(Outcome::Flag),
            Operation::GetDeviceInfo { device_id } => {
                self.get_device_info(&device_id).map(Outcome::Device)
            }
            Operation::GetProjectImpact { project_id } => {
                Ok(Outcome::ProjectImpact(self.get_project_impact(project_id)))
            }
        }
    }

    // ─────────────────────────────────────────────────────────
    // Donation ledger entry points
    // ─────────────────────────────────────────────────────────

    /// Escrow `amount` for `charity` on behalf of `caller`. Returns the new id.
    pub fn donate(&mut self, charity: Principal, amount: u128, caller: Principal) -> Result<DonationId> {
        let donation_id = self
            .state
            .donations
            .donate(charity.clone(), amount, caller.clone())?;
        self.journal.push(LedgerEvent::DonationReceived {
            donation_id,
            donor: caller,
            charity,
            amount,
        });
        Ok(donation_id)
    }

    /// Mark a pending donation as released. `caller` must pass the authorizer.
    pub fn release_funds(&mut self, donation_id: DonationId, caller: &Principal) -> Result<bool> {
        self.state
            .donations
            .release_funds(donation_id, caller, &self.authorizer)?;
        let charity = self.state.donations.get_donation(donation_id)?.charity.clone();
        self.journal.push(LedgerEvent::FundsReleased {
            donation_id,
            charity,
            released_by: caller.clone(),
        });
        Ok(true)
    }

    pub fn get_donation(&self, donation_id: DonationId) -> Result<Donation> {
        self.state.donations.get_donation(donation_id).cloned()
    }

    pub fn get_charity_funds(&self, charity: &Principal) -> CharityFunds {
        self.state.donations.get_charity_funds(charity)
    }

    // ─────────────────────────────────────────────────────────
    // Impact registry entry points
    // ─────────────────────────────────────────────────────────

    /// Register (or re-register, resetting the reading) a device.
    pub fn register_device(
        &mut self,
        device_id: DeviceId,
        project_id: ProjectId,
        device_type: String,
    ) -> Result<bool> {
        self.state
            .telemetry
            .register_device(device_id.clone(), project_id, device_type.clone())?;
        self.journal.push(LedgerEvent::DeviceRegistered {
            device_id,
            project_id,
            device_type,
        });
        Ok(true)
    }

    /// Record a reading and fold it into the owning project's impact.
    pub fn update_device_reading(
        &mut self,
        device_id: &DeviceId,
        timestamp: u64,
        value: i128,
    ) -> Result<bool> {
        let project_id = self
            .state
            .telemetry
            .update_device_reading(device_id, timestamp, value)?;
        self.journal.push(LedgerEvent::ReadingRecorded {
            device_id: device_id.clone(),
            project_id,
            timestamp,
            value,
        });
        Ok(true)
    }

    pub fn get_device_info(&self, device_id: &DeviceId) -> Result<Device> {
        self.state.telemetry.get_device_info(device_id).cloned()
    }

    pub fn get_project_impact(&self, project_id: ProjectId) -> ProjectImpact {
        self.state.telemetry.get_project_impact(project_id)
    }
}

impl Default for Ledger<ReleasePolicy> {
    fn default() -> Self {
        Self::new(ReleasePolicy::Open)
    }
}
