// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport channel between the simulated device and the outside world.
//!
//! The simulator only needs two things from a transport: a non-blocking
//! [`Transport::publish`] for outbound documents and a channel of raw inbound
//! control payloads. Two implementations are provided:
//!
//! - [`MqttTransport`]: MQTT over TCP or mutual TLS using `rumqttc`
//!   (feature `mqtt`, enabled by default)
//! - [`MemoryTransport`]: records publishes in memory, for tests and
//!   embedding
//!
//! # Topics
//!
//! | Topic | Direction | Content |
//! |-------|-----------|---------|
//! | `cleaner/telemetry` | out | Full state every tick |
//! | `cleaner/device/register` | out | Descriptor at start-up |
//! | `cleaner/status` | out | Status transitions |
//! | `cleaner/alerts` | out | Informational alerts |
//! | `cleaner/errors` | out | Faults |
//! | `cleaner/schedule/status` | out | Schedule on demand |
//! | `cleaner/maintenance/status` | out | Maintenance on demand |
//! | `cleaner/control` | in | Control commands |

mod memory;
mod message;
#[cfg(feature = "mqtt")]
mod mqtt;

pub use memory::{MemoryTransport, PublishedMessage};
pub use message::{
    AlertLevel, AlertMessage, ErrorMessage, MaintenanceReport, OutboundMessage, RegisterMessage,
    ScheduleReport, StatusMessage, TelemetryMessage,
};
#[cfg(feature = "mqtt")]
pub use mqtt::MqttTransport;

use crate::error::ProtocolError;

/// Topic names.
pub mod topic {
    /// Full state snapshots.
    pub const TELEMETRY: &str = "cleaner/telemetry";
    /// Device announcement.
    pub const REGISTER: &str = "cleaner/device/register";
    /// Status transitions.
    pub const STATUS: &str = "cleaner/status";
    /// Informational alerts.
    pub const ALERTS: &str = "cleaner/alerts";
    /// Fault reports.
    pub const ERRORS: &str = "cleaner/errors";
    /// Schedule reports.
    pub const SCHEDULE_STATUS: &str = "cleaner/schedule/status";
    /// Maintenance reports.
    pub const MAINTENANCE_STATUS: &str = "cleaner/maintenance/status";
    /// Inbound control commands.
    pub const CONTROL: &str = "cleaner/control";
}

/// Outbound half of a transport channel.
///
/// Publishing must not block: implementations queue the message or fail
/// immediately. Delivery is best effort.
pub trait Transport: Send + Sync {
    /// Queues `payload` for publication on `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the message could not be queued.
    fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), ProtocolError>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), ProtocolError> {
        (**self).publish(topic, payload)
    }
}
