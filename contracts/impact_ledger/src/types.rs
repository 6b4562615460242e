//! # Types
//!
//! Shared data structures used by both ledgers.
//!
//! ## Identifiers
//!
//! [`Principal`] and [`DeviceId`] are validated newtypes: once constructed they
//! are known to be well-formed, so the ledgers never re-check them.
//!
//! ## Donation status as a Finite-State Machine
//!
//! ```text
//! Pending ──release-funds──► Released
//! ```
//!
//! `Released` is terminal. Nothing transitions back to `Pending`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// Sequential donation identifier, starting at 1.
pub type DonationId = u64;

/// Identifier of the project a device reports impact for. Always >= 1.
pub type ProjectId = u64;

const PRINCIPAL_MAX_LEN: usize = 150;
const DEVICE_ID_MAX_LEN: usize = 64;
const DEVICE_TYPE_MAX_LEN: usize = 32;

// ─────────────────────────────────────────────────────────
// Identifiers
// ─────────────────────────────────────────────────────────

/// Opaque account identifier for a donor, charity or caller.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    pub fn new(raw: impl Into<String>) -> Result<Self, LedgerError> {
        let raw = raw.into();
        if raw.is_empty() || raw.len() > PRINCIPAL_MAX_LEN {
            return Err(LedgerError::InvalidArgument(format!(
                "principal must be 1..={PRINCIPAL_MAX_LEN} characters"
            )));
        }
        let well_formed = raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !well_formed {
            return Err(LedgerError::InvalidArgument(format!(
                "malformed principal `{raw}`"
            )));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Principal {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Principal {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Principal> for String {
    fn from(value: Principal) -> Self {
        value.0
    }
}

/// Opaque, unique token naming a telemetry device (e.g. a serial number).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(raw: impl Into<String>) -> Result<Self, LedgerError> {
        let raw = raw.into();
        if raw.is_empty() || raw.len() > DEVICE_ID_MAX_LEN {
            return Err(LedgerError::InvalidArgument(format!(
                "device id must be 1..={DEVICE_ID_MAX_LEN} characters"
            )));
        }
        if !raw.chars().all(|c| c.is_ascii_graphic()) {
            return Err(LedgerError::InvalidArgument(format!(
                "malformed device id `{raw}`"
            )));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DeviceId {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DeviceId> for String {
    fn from(value: DeviceId) -> Self {
        value.0
    }
}

/// Validate a device type label such as `temperature-sensor`.
pub fn validate_device_type(label: &str) -> Result<(), LedgerError> {
    if label.trim().is_empty() || label.len() > DEVICE_TYPE_MAX_LEN {
        return Err(LedgerError::InvalidArgument(format!(
            "device type must be 1..={DEVICE_TYPE_MAX_LEN} non-blank characters"
        )));
    }
    if !label.chars().all(|c| c == ' ' || c.is_ascii_graphic()) {
        return Err(LedgerError::InvalidArgument(format!(
            "malformed device type `{label}`"
        )));
    }
    Ok(())
}

/// Reject the reserved project id 0.
pub fn validate_project_id(project_id: ProjectId) -> Result<(), LedgerError> {
    if project_id == 0 {
        return Err(LedgerError::InvalidArgument(
            "project id must be a positive integer".into(),
        ));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Donation ledger records
// ─────────────────────────────────────────────────────────

/// Lifecycle status of a donation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    /// Escrowed; awaiting release.
    Pending,
    /// Disbursed. Terminal.
    Released,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Released => "released",
        }
    }
}

impl FromStr for DonationStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "released" => Ok(Self::Released),
            other => Err(LedgerError::InvalidArgument(format!(
                "unknown donation status `{other}`"
            ))),
        }
    }
}

/// A single pledge. Only `status` ever changes after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    pub donor: Principal,
    pub charity: Principal,
    pub amount: u128,
    pub status: DonationStatus,
}

/// Running total pledged to a charity.
///
/// Releasing a donation does not withdraw from this total: it counts every
/// amount ever donated, pending or released.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharityFunds {
    pub total_funds: u128,
}

// ─────────────────────────────────────────────────────────
// Telemetry registry records
// ─────────────────────────────────────────────────────────

/// One sensor sample. `Reading::default()` is the zero reading a freshly
/// registered device starts with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: u64,
    pub value: i128,
}

/// A registered IoT device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub project_id: ProjectId,
    pub device_type: String,
    pub last_reading: Reading,
}

/// Cumulative impact reported for a project.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectImpact {
    pub total_impact: i128,
    /// Timestamp carried by the most recent contributing call, not the
    /// largest timestamp seen.
    pub last_updated: u64,
}
