// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state simulation.
//!
//! Everything in this module is synchronous and free of I/O. The
//! [`TickEngine`] advances a [`DeviceState`](crate::state::DeviceState) one
//! tick at a time, [`maintenance_alerts`] derives periodic service reminders
//! and [`schedule_due`] decides whether a scheduled run should start.
//! Randomness is injected through [`RandomSource`] so every rule can be
//! driven deterministically.

mod monitor;
mod params;
mod random;
mod scheduler;
mod tick;

pub use monitor::{BRUSH_ALERT, DUST_BIN_ALERT, FILTER_ALERT, SERVICE_ALERT, maintenance_alerts};
pub use params::SimulationParams;
pub use random::{RandomSource, SequenceRandom, StdRandom};
pub use scheduler::{SCHEDULE_MIN_BATTERY, ScheduleTrigger, schedule_due};
pub use tick::{BIN_FULL_ALERT, DOCKED_ALERT, LOW_BATTERY_ALERT, TickEngine};
