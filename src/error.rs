// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the cleaner simulator.
//!
//! Nothing raised while the simulator is running is fatal: command errors and
//! publish failures are logged and dropped, invariant violations are reported
//! on the error topic. Only startup (configuration, TLS material, connecting
//! to the broker) surfaces errors to the caller.

use thiserror::Error;

use crate::types::CleanerStatus;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while talking to the broker.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing an inbound payload.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A control command could not be applied.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// The simulator configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The device state broke one of its invariants.
    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A schedule time is not a valid `HH:MM` string.
    #[error("invalid schedule time: {0}")]
    InvalidTime(String),

    /// A weekday name was not recognized.
    #[error("invalid weekday: {0}")]
    InvalidWeekday(String),

    /// A cleaning mode name was not recognized.
    #[error("invalid cleaning mode: {0}")]
    InvalidCleaningMode(String),

    /// A status name was not recognized.
    #[error("invalid status: {0}")]
    InvalidStatus(String),
}

/// Errors related to the transport channel.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// MQTT client rejected the request.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connection to the broker failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// TLS material could not be loaded.
    #[error("TLS setup failed: {0}")]
    Tls(String),

    /// Outbound payload could not be serialized.
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Publish was refused by the transport.
    #[error("publish to {topic} failed: {reason}")]
    PublishFailed {
        /// Topic the message was addressed to.
        topic: String,
        /// Why the transport refused it.
        reason: String,
    },
}

/// Errors related to parsing inbound payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the payload.
    #[error("missing field in command: {0}")]
    MissingField(String),
}

/// Errors raised when a control command cannot be applied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The action name is not one the device understands.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// The action needs a field that was not supplied.
    #[error("action {action} requires field {field}")]
    MissingArgument {
        /// The action that was requested.
        action: &'static str,
        /// The field it needs.
        field: &'static str,
    },

    /// The action is not valid from the current status.
    #[error("cannot {action} while {status}")]
    InvalidTransition {
        /// The action that was requested.
        action: &'static str,
        /// The status the device is in.
        status: CleanerStatus,
    },

    /// A field carried an invalid value.
    #[error(transparent)]
    InvalidValue(#[from] ValueError),
}

/// Errors related to simulator configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting is missing.
    #[error("missing setting: {0}")]
    Missing(&'static str),

    /// A setting has an invalid value.
    #[error("invalid value for {name}: {value}")]
    Invalid {
        /// Setting name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },

    /// Only part of the TLS material was configured.
    #[error("TLS needs a CA, a certificate and a private key; got only some of them")]
    IncompleteTls,
}

/// A numeric field of the device state left its allowed range.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{field} = {value} is outside [{min}, {max}]")]
pub struct InvariantViolation {
    /// Name of the offending field, in its JSON spelling.
    pub field: &'static str,
    /// The value found.
    pub value: f64,
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
