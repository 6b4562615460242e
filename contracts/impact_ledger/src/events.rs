use serde::Serialize;

use crate::types::{DeviceId, DonationId, Principal, ProjectId};

/// One successful state transition, as recorded in the ledger journal.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    DonationReceived {
        donation_id: DonationId,
        donor: Principal,
        charity: Principal,
        amount: u128,
    },
    FundsReleased {
        donation_id: DonationId,
        charity: Principal,
        released_by: Principal,
    },
    DeviceRegistered {
        device_id: DeviceId,
        project_id: ProjectId,
        device_type: String,
    },
    ReadingRecorded {
        device_id: DeviceId,
        project_id: ProjectId,
        timestamp: u64,
        value: i128,
    },
}

impl LedgerEvent {
    /// Short identifier suitable for storage.
    pub fn topic(&self) -> &'static str {
        match self {
            Self::DonationReceived { .. } => "donation_received",
            Self::FundsReleased { .. } => "funds_released",
            Self::DeviceRegistered { .. } => "device_registered",
            Self::ReadingRecorded { .. } => "reading_recorded",
        }
    }

    /// The project an impact event belongs to. `None` for donation events.
    pub fn project_id(&self) -> Option<ProjectId> {
        match self {
            Self::DeviceRegistered { project_id, .. } | Self::ReadingRecorded { project_id, .. } => {
                Some(*project_id)
            }
            Self::DonationReceived { .. } | Self::FundsReleased { .. } => None,
        }
    }

    /// The record the event is about: a donation id or a device id.
    pub fn subject(&self) -> String {
        match self {
            Self::DonationReceived { donation_id, .. } | Self::FundsReleased { donation_id, .. } => {
                donation_id.to_string()
            }
            Self::DeviceRegistered { device_id, .. } | Self::ReadingRecorded { device_id, .. } => {
                device_id.to_string()
            }
        }
    }
}
