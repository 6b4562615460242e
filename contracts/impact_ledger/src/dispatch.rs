//! # Dispatch
//!
//! The closed set of operations a host may invoke, and the tagged result shape
//! it hands back to its own caller:
//!
//! ```text
//! {"success": true,  "value": <Outcome>}
//! {"success": false, "error": "<message>"}
//! ```

use serde::Serialize;

use crate::types::{
    CharityFunds, Device, DeviceId, Donation, DonationId, Principal, ProjectId, ProjectImpact,
};
use crate::LedgerError;

/// A fully decoded invocation. Operations that act on behalf of someone carry
/// the caller explicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Donate {
        charity: Principal,
        amount: u128,
        caller: Principal,
    },
    ReleaseFunds {
        donation_id: DonationId,
        caller: Principal,
    },
    GetDonation {
        donation_id: DonationId,
    },
    GetCharityFunds {
        charity: Principal,
    },
    RegisterDevice {
        device_id: DeviceId,
        project_id: ProjectId,
        device_type: String,
    },
    UpdateDeviceReading {
        device_id: DeviceId,
        timestamp: u64,
        value: i128,
    },
    GetDeviceInfo {
        device_id: DeviceId,
    },
    GetProjectImpact {
        project_id: ProjectId,
    },
}

impl Operation {
    /// Wire name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Donate { .. } => "donate",
            Self::ReleaseFunds { .. } => "release-funds",
            Self::GetDonation { .. } => "get-donation",
            Self::GetCharityFunds { .. } => "get-charity-funds",
            Self::RegisterDevice { .. } => "register-device",
            Self::UpdateDeviceReading { .. } => "update-device-reading",
            Self::GetDeviceInfo { .. } => "get-device-info",
            Self::GetProjectImpact { .. } => "get-project-impact",
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Self::GetDonation { .. }
                | Self::GetCharityFunds { .. }
                | Self::GetDeviceInfo { .. }
                | Self::GetProjectImpact { .. }
        )
    }
}

/// Success value of an operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    DonationId(DonationId),
    Flag(bool),
    Donation(Donation),
    CharityFunds(CharityFunds),
    Device(Device),
    ProjectImpact(ProjectImpact),
}

/// Tagged result handed back to the host's caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Receipt {
    Success { success: bool, value: Outcome },
    Failure { success: bool, error: String },
}

impl Receipt {
    pub fn success(value: Outcome) -> Self {
        Self::Success {
            success: true,
            value,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            success: false,
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<Result<Outcome, LedgerError>> for Receipt {
    fn from(result: Result<Outcome, LedgerError>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}
