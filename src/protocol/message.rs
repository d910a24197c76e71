// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound JSON documents.
//!
//! Every message carries a `timestamp` in milliseconds since the Unix epoch.
//! Field names are camelCase.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::capabilities::DeviceDescriptor;
use crate::error::ProtocolError;
use crate::state::{DeviceState, Maintenance, Position, Schedule};
use crate::types::{CleanerStatus, DeviceId};

use super::topic;

/// A document published on a fixed topic.
pub trait OutboundMessage: Serialize {
    /// Topic the message is published on.
    const TOPIC: &'static str;

    /// Serializes the message to its JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Serialize`] if serialization fails.
    fn to_payload(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Severity of an alert document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// Informational alert.
    Info,
    /// Fault report.
    Error,
}

/// Full state snapshot, published every tick.
#[derive(Debug, Serialize)]
pub struct TelemetryMessage<'a> {
    /// Publication time.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// The device state, flattened into the document.
    #[serde(flatten)]
    pub state: &'a DeviceState,
}

impl OutboundMessage for TelemetryMessage<'_> {
    const TOPIC: &'static str = topic::TELEMETRY;
}

/// Device announcement, published once at start-up.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMessage<'a> {
    /// Publication time.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Device id.
    pub device_id: &'a DeviceId,
    /// Model name.
    pub model: &'a str,
    /// Firmware version.
    pub firmware: &'a str,
    /// Supported feature names.
    pub capabilities: Vec<&'static str>,
}

impl<'a> RegisterMessage<'a> {
    /// Builds the announcement for `descriptor`.
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        device_id: &'a DeviceId,
        descriptor: &'a DeviceDescriptor,
    ) -> Self {
        Self {
            timestamp,
            device_id,
            model: &descriptor.model,
            firmware: &descriptor.firmware,
            capabilities: descriptor.capabilities.names(),
        }
    }
}

impl OutboundMessage for RegisterMessage<'_> {
    const TOPIC: &'static str = topic::REGISTER;
}

/// Status transition report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusMessage<'a> {
    /// Publication time.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Device id.
    pub device_id: &'a DeviceId,
    /// Status before the transition.
    pub old_status: CleanerStatus,
    /// Status after the transition.
    pub new_status: CleanerStatus,
    /// Battery level at the transition.
    pub battery: f64,
    /// Position at the transition.
    pub position: Position,
}

impl OutboundMessage for StatusMessage<'_> {
    const TOPIC: &'static str = topic::STATUS;
}

/// Informational alert.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertMessage<'a> {
    /// Publication time.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Device id.
    pub device_id: &'a DeviceId,
    /// Always [`AlertLevel::Info`].
    pub level: AlertLevel,
    /// Alert text.
    pub message: &'a str,
    /// Where the robot was.
    pub position: Position,
}

impl OutboundMessage for AlertMessage<'_> {
    const TOPIC: &'static str = topic::ALERTS;
}

/// Fault report, with the offending state attached.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage<'a> {
    /// Publication time.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Device id.
    pub device_id: &'a DeviceId,
    /// Always [`AlertLevel::Error`].
    pub level: AlertLevel,
    /// Fault description.
    pub message: &'a str,
    /// Snapshot of the state after the fault.
    pub device_state: &'a DeviceState,
}

impl OutboundMessage for ErrorMessage<'_> {
    const TOPIC: &'static str = topic::ERRORS;
}

/// Schedule report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleReport<'a> {
    /// Publication time.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Device id.
    pub device_id: &'a DeviceId,
    /// The schedule.
    pub schedule: &'a Schedule,
}

impl OutboundMessage for ScheduleReport<'_> {
    const TOPIC: &'static str = topic::SCHEDULE_STATUS;
}

/// Maintenance report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceReport<'a> {
    /// Publication time.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Device id.
    pub device_id: &'a DeviceId,
    /// The maintenance record.
    pub maintenance: &'a Maintenance,
}

impl OutboundMessage for MaintenanceReport<'_> {
    const TOPIC: &'static str = topic::MAINTENANCE_STATUS;
}
