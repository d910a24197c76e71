// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for the simulated cleaner.
//!
//! # Types
//!
//! - [`DeviceId`] - Stable identifier of the simulated device
//! - [`CleanerStatus`] - Docked/cleaning/returning/paused/charging/error
//! - [`CleaningMode`] - Auto/spot/edge/manual
//! - [`BrushCondition`], [`WheelCondition`] - Mechanical sensor readings
//! - [`ScheduleTime`] - `HH:MM` time of day for scheduled cleaning
//! - [`Weekday`] - Day of the week for scheduled cleaning

mod condition;
mod device_id;
mod schedule;
mod status;

pub use condition::{BrushCondition, WheelCondition};
pub use device_id::DeviceId;
pub use schedule::{ScheduleTime, Weekday};
pub use status::{CleanerStatus, CleaningMode};
