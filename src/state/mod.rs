// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state of the simulated cleaner.
//!
//! [`DeviceState`] is the single mutable record describing the robot:
//! battery, position, status, sensors, map, maintenance, schedule and usage
//! counters. The sub-records live in their own types so they can be published
//! on their own (the schedule and maintenance status topics).
//!
//! # Examples
//!
//! ```
//! use cleaner_sim::state::DeviceState;
//! use cleaner_sim::types::{CleanerStatus, DeviceId};
//!
//! let mut state = DeviceState::new(DeviceId::generate(), chrono::Utc::now());
//! let previous = state.set_status(CleanerStatus::Cleaning);
//!
//! assert_eq!(previous, CleanerStatus::Docked);
//! assert_eq!(state.status, CleanerStatus::Cleaning);
//! ```

mod components;
mod device_state;

pub use components::{Maintenance, Mapping, Obstacle, Position, Schedule, Sensors, Stats};
pub use device_state::{ARENA_HALF_WIDTH, DeviceState};
