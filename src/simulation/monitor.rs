// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic maintenance checks.

use chrono::{DateTime, TimeDelta, Utc};

use crate::event::DeviceEvent;
use crate::state::DeviceState;

/// Alert raised when the filter is nearly worn out.
pub const FILTER_ALERT: &str = "Filter needs replacement";
/// Alert raised when the brushes are nearly worn out.
pub const BRUSH_ALERT: &str = "Brushes need maintenance";
/// Alert raised when the device has not been serviced for a month.
pub const SERVICE_ALERT: &str = "Device needs cleaning and maintenance";
/// Alert raised while the dust bin is full.
pub const DUST_BIN_ALERT: &str = "Dust bin is full";

const FILTER_LIFE_THRESHOLD: f64 = 10.0;
const BRUSH_HOURS_THRESHOLD: f64 = 10.0;
const SERVICE_INTERVAL_DAYS: i64 = 30;

/// Returns the maintenance alerts currently applicable to `state`.
///
/// Each condition is checked independently. There is no debounce: a
/// condition that still holds on the next check raises its alert again.
#[must_use]
pub fn maintenance_alerts(state: &DeviceState, now: DateTime<Utc>) -> Vec<DeviceEvent> {
    let maintenance = &state.maintenance;
    let mut alerts = Vec::new();

    if maintenance.filter_life < FILTER_LIFE_THRESHOLD {
        alerts.push(DeviceEvent::alert(FILTER_ALERT));
    }
    if maintenance.brush_hours < BRUSH_HOURS_THRESHOLD {
        alerts.push(DeviceEvent::alert(BRUSH_ALERT));
    }
    if maintenance.since_cleaned(now) > TimeDelta::days(SERVICE_INTERVAL_DAYS) {
        alerts.push(DeviceEvent::alert(SERVICE_ALERT));
    }
    if state.sensors.dust_bin {
        alerts.push(DeviceEvent::alert(DUST_BIN_ALERT));
    }

    alerts
}
