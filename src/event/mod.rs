// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events raised by the simulated device.
//!
//! Every rule that changes something worth telling the outside world about
//! returns a [`DeviceEvent`]. The simulator maps events to MQTT topics and
//! re-broadcasts them on an [`EventBus`] for in-process observers.
//!
//! # Examples
//!
//! ```
//! use cleaner_sim::event::{DeviceEvent, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(DeviceEvent::alert("Low battery - returning to dock"));
//! ```

mod device_event;
mod event_bus;

pub use device_event::{DeviceEvent, Report, TransientSensor};
pub use event_bus::EventBus;
