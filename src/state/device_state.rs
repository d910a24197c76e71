// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InvariantViolation;
use crate::types::{CleanerStatus, CleaningMode, DeviceId};

use super::{Maintenance, Mapping, Position, Schedule, Sensors, Stats};

/// Half-width of the square the robot may move in, in metres.
pub const ARENA_HALF_WIDTH: f64 = 50.0;

/// Full state of one simulated cleaner.
///
/// There is exactly one instance per simulated device. It is created once at
/// start-up and then only mutated by the simulation engine and the command
/// handler, both running on the simulator task. Nothing is persisted.
///
/// Serializes to the camelCase JSON document published as telemetry.
///
/// # Examples
///
/// ```
/// use cleaner_sim::state::DeviceState;
/// use cleaner_sim::types::{CleanerStatus, DeviceId};
///
/// let state = DeviceState::new(DeviceId::new("cleaner-1"), chrono::Utc::now());
/// assert_eq!(state.status, CleanerStatus::Docked);
/// assert!((state.battery - 100.0).abs() < f64::EPSILON);
/// assert!(state.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceState {
    /// Stable device identifier.
    pub device_id: DeviceId,
    /// Battery level, percent.
    pub battery: f64,
    /// Position relative to the dock.
    pub position: Position,
    /// What the robot is doing.
    pub status: CleanerStatus,
    /// Selected cleaning pattern.
    pub cleaning_mode: CleaningMode,
    /// Whether power is flowing into the battery.
    pub is_charging: bool,
    /// Sensor readings.
    pub sensors: Sensors,
    /// Map knowledge.
    pub mapping: Mapping,
    /// Consumable wear.
    pub maintenance: Maintenance,
    /// Cleaning schedule.
    pub schedule: Schedule,
    /// Usage counters.
    pub stats: Stats,
}

impl DeviceState {
    /// Creates the initial state: docked, full battery, fresh consumables.
    #[must_use]
    pub fn new(device_id: DeviceId, now: DateTime<Utc>) -> Self {
        Self {
            device_id,
            battery: 100.0,
            position: Position::ORIGIN,
            status: CleanerStatus::Docked,
            cleaning_mode: CleaningMode::Auto,
            is_charging: false,
            sensors: Sensors::default(),
            mapping: Mapping::default(),
            maintenance: Maintenance::new(now),
            schedule: Schedule::default(),
            stats: Stats::default(),
        }
    }

    /// Moves to `status` and returns the previous status.
    pub fn set_status(&mut self, status: CleanerStatus) -> CleanerStatus {
        std::mem::replace(&mut self.status, status)
    }

    /// Checks every numeric invariant of the record.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found. Non-finite values are
    /// always violations.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        check("battery", self.battery, 0.0, 100.0)?;
        check("position.x", self.position.x, -ARENA_HALF_WIDTH, ARENA_HALF_WIDTH)?;
        check("position.y", self.position.y, -ARENA_HALF_WIDTH, ARENA_HALF_WIDTH)?;
        check_half_open("position.heading", self.position.heading, 0.0, 360.0)?;
        check("sensors.dirt", f64::from(self.sensors.dirt), 0.0, 100.0)?;
        check("maintenance.filterLife", self.maintenance.filter_life, 0.0, 100.0)?;
        check(
            "maintenance.brushHours",
            self.maintenance.brush_hours,
            0.0,
            f64::MAX,
        )?;
        check(
            "maintenance.totalCleaningTime",
            self.maintenance.total_cleaning_time,
            0.0,
            f64::MAX,
        )?;
        check("mapping.cleanedAreas", self.mapping.cleaned_areas, 0.0, f64::MAX)?;
        Ok(())
    }
}

fn check(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), InvariantViolation> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(InvariantViolation {
            field,
            value,
            min,
            max,
        })
    }
}

fn check_half_open(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), InvariantViolation> {
    if value.is_finite() && (min..max).contains(&value) {
        Ok(())
    } else {
        Err(InvariantViolation {
            field,
            value,
            min,
            max,
        })
    }
}
