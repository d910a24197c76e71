// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device event types.

use std::fmt;
use std::time::Duration;

use crate::types::CleanerStatus;

/// A sensor whose reading resets itself after a fixed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransientSensor {
    /// Front bumper contact.
    Bump,
    /// Downward-facing drop detector.
    Cliff,
}

impl TransientSensor {
    /// Returns the sensor name as used in the state document.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bump => "bump",
            Self::Cliff => "cliff",
        }
    }
}

impl fmt::Display for TransientSensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sub-record that can be published on its own status topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Report {
    /// The cleaning schedule.
    Schedule,
    /// Consumable wear and service history.
    Maintenance,
}

/// Something that happened to the device and may need publishing.
///
/// Events are produced by the tick engine, the maintenance monitor and the
/// command handler. The simulator turns each of them into an outbound message
/// and also forwards them to the [`EventBus`](super::EventBus).
///
/// # Examples
///
/// ```
/// use cleaner_sim::event::DeviceEvent;
/// use cleaner_sim::types::CleanerStatus;
///
/// let event = DeviceEvent::status_changed(CleanerStatus::Cleaning, CleanerStatus::Returning);
/// assert!(event.is_status_change());
///
/// let alert = DeviceEvent::alert("Dust bin is full");
/// assert_eq!(alert.alert_message(), Some("Dust bin is full"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// The operating status changed.
    StatusChanged {
        /// Status before the change.
        from: CleanerStatus,
        /// Status after the change.
        to: CleanerStatus,
    },

    /// An informational alert for the user.
    Alert {
        /// Human-readable alert text.
        message: String,
    },

    /// A transient sensor fired and must be cleared after `clear_after`.
    SensorTriggered {
        /// Which sensor fired.
        sensor: TransientSensor,
        /// Delay before the reading resets.
        clear_after: Duration,
    },

    /// The state broke an invariant; the device is now in error.
    Fault {
        /// Description of the fault.
        message: String,
    },

    /// A sub-record report was requested.
    ReportRequested(Report),
}

impl DeviceEvent {
    /// Creates a status change event.
    #[must_use]
    pub fn status_changed(from: CleanerStatus, to: CleanerStatus) -> Self {
        Self::StatusChanged { from, to }
    }

    /// Creates an alert event.
    #[must_use]
    pub fn alert(message: impl Into<String>) -> Self {
        Self::Alert {
            message: message.into(),
        }
    }

    /// Creates a fault event.
    #[must_use]
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a status change.
    #[must_use]
    pub fn is_status_change(&self) -> bool {
        matches!(self, Self::StatusChanged { .. })
    }

    /// Returns the alert text if this is an alert.
    #[must_use]
    pub fn alert_message(&self) -> Option<&str> {
        match self {
            Self::Alert { message } => Some(message),
            _ => None,
        }
    }
}
