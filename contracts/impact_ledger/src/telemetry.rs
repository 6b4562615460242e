//! # Impact Telemetry Registry
//!
//! Records IoT device readings and folds them into per-project impact.
//!
//! | Map              | Key         | Value             |
//! |------------------|-------------|-------------------|
//! | `devices`        | `DeviceId`  | [`Device`]        |
//! | `project_impact` | `ProjectId` | [`ProjectImpact`] |
//!
//! `project_impact[p].total_impact` is the sum of every accepted reading from a
//! device registered to `p`. `last_updated` follows the latest call, even when
//! its timestamp is older than one seen before.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{
    validate_device_type, validate_project_id, Device, DeviceId, ProjectId, ProjectImpact, Reading,
};
use crate::{LedgerError, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactRegistry {
    devices: BTreeMap<DeviceId, Device>,
    project_impact: BTreeMap<ProjectId, ProjectImpact>,
}

impl ImpactRegistry {
    /// Rebuild a registry from persisted records.
    pub fn from_records(
        devices: impl IntoIterator<Item = (DeviceId, Device)>,
        project_impact: impl IntoIterator<Item = (ProjectId, ProjectImpact)>,
    ) -> Result<Self> {
        let devices: BTreeMap<_, _> = devices.into_iter().collect();
        for device in devices.values() {
            validate_project_id(device.project_id)?;
            validate_device_type(&device.device_type)?;
        }
        Ok(Self {
            devices,
            project_impact: project_impact.into_iter().collect(),
        })
    }

    pub fn devices(&self) -> impl Iterator<Item = (&DeviceId, &Device)> {
        self.devices.iter()
    }

    pub fn project_impacts(&self) -> impl Iterator<Item = (&ProjectId, &ProjectImpact)> {
        self.project_impact.iter()
    }

    // ─────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────

    /// Insert or overwrite a device. Re-registering resets its last reading to
    /// the zero reading; the project's accumulated impact is kept.
    pub fn register_device(
        &mut self,
        device_id: DeviceId,
        project_id: ProjectId,
        device_type: String,
    ) -> Result<()> {
        validate_project_id(project_id)?;
        validate_device_type(&device_type)?;

        debug!(%device_id, project_id, %device_type, "device registered");
        self.devices.insert(
            device_id,
            Device {
                project_id,
                device_type,
                last_reading: Reading::default(),
            },
        );
        Ok(())
    }

    /// Store the reading on the device and add `value` to its project's impact.
    /// Returns the project the reading was credited to.
    pub fn update_device_reading(
        &mut self,
        device_id: &DeviceId,
        timestamp: u64,
        value: i128,
    ) -> Result<ProjectId> {
        let device = self
            .devices
            .get_mut(device_id)
            .ok_or_else(|| LedgerError::DeviceNotFound(device_id.clone()))?;
        let project_id = device.project_id;

        let impact = self
            .project_impact
            .get(&project_id)
            .copied()
            .unwrap_or_default();
        let total_impact = impact
            .total_impact
            .checked_add(value)
            .ok_or(LedgerError::Overflow("project impact"))?;

        device.last_reading = Reading { timestamp, value };
        self.project_impact.insert(
            project_id,
            ProjectImpact {
                total_impact,
                last_updated: timestamp,
            },
        );

        debug!(%device_id, project_id, timestamp, %value, "reading recorded");
        Ok(project_id)
    }

    pub fn get_device_info(&self, device_id: &DeviceId) -> Result<&Device> {
        self.devices
            .get(device_id)
            .ok_or_else(|| LedgerError::DeviceNotFound(device_id.clone()))
    }

    /// `{0, 0}` for a project no reading has reached yet.
    pub fn get_project_impact(&self, project_id: ProjectId) -> ProjectImpact {
        self.project_impact
            .get(&project_id)
            .copied()
            .unwrap_or_default()
    }
}
