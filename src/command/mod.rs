// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Control commands received on `cleaner/control`.
//!
//! A control message is a JSON object with an `action` and optional
//! arguments:
//!
//! | Action | Arguments | Effect |
//! |--------|-----------|--------|
//! | `start_cleaning` | `mode?` | Start a run, optionally in a given mode |
//! | `pause` | | Pause a run or a return |
//! | `resume` | | Resume a paused run |
//! | `return_to_dock` | | Head home |
//! | `set_mode` | `mode` | Change the cleaning mode |
//! | `empty_bin` | | Empty the dust bin |
//! | `reset_maintenance` | | Fresh filter and brushes |
//! | `set_schedule` | `enabled?`, `time?`, `days?` | Update the schedule |
//! | `get_schedule` | | Publish the schedule |
//! | `get_maintenance` | | Publish the maintenance record |
//! | `clear_error` | | Leave the error state |
//!
//! Parsing validates arguments up front, so a [`ControlCommand`] is always
//! well formed; whether it can be applied depends on the device status and
//! is decided by [`apply`].
//!
//! # Examples
//!
//! ```
//! use cleaner_sim::command::ControlCommand;
//! use cleaner_sim::types::CleaningMode;
//!
//! let cmd = ControlCommand::from_json(br#"{"action":"start_cleaning","mode":"spot"}"#).unwrap();
//! assert_eq!(cmd, ControlCommand::StartCleaning { mode: Some(CleaningMode::Spot) });
//!
//! assert!(ControlCommand::from_json(b"not json").is_err());
//! assert!(ControlCommand::from_json(br#"{"action":"fly"}"#).is_err());
//! ```

mod action;
mod handler;

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::error::{CommandError, Error, ParseError};
use crate::types::{CleaningMode, ScheduleTime, Weekday};

pub use action::Action;
pub use handler::apply;

/// A validated control command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    /// Start a cleaning run.
    StartCleaning {
        /// Mode to clean in; keeps the current mode if absent.
        mode: Option<CleaningMode>,
    },
    /// Pause the current run.
    Pause,
    /// Resume a paused run.
    Resume,
    /// Head back to the dock.
    ReturnToDock,
    /// Change the cleaning mode.
    SetMode(CleaningMode),
    /// Empty the dust bin.
    EmptyBin,
    /// Record a service.
    ResetMaintenance,
    /// Update the schedule.
    SetSchedule(ScheduleUpdate),
    /// Publish the schedule.
    GetSchedule,
    /// Publish the maintenance record.
    GetMaintenance,
    /// Leave the error state.
    ClearError,
}

/// Partial schedule update; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleUpdate {
    /// New enabled flag.
    pub enabled: Option<bool>,
    /// New start time.
    pub time: Option<ScheduleTime>,
    /// New set of days.
    pub days: Option<BTreeSet<Weekday>>,
}

/// Control message as it appears on the wire.
#[derive(Debug, Deserialize)]
struct RawCommand {
    action: Option<String>,
    mode: Option<String>,
    enabled: Option<bool>,
    time: Option<String>,
    days: Option<Vec<String>>,
}

impl ControlCommand {
    /// Parses a control message payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the payload is not a JSON object with an
    /// `action` string, and [`Error::Command`] if the action is unknown or an
    /// argument is missing or invalid.
    pub fn from_json(payload: &[u8]) -> Result<Self, Error> {
        let raw: RawCommand = serde_json::from_slice(payload).map_err(ParseError::from)?;
        let action = raw
            .action
            .as_deref()
            .ok_or_else(|| ParseError::MissingField("action".to_string()))?;
        let action: Action = action.parse()?;
        Ok(Self::from_raw(action, raw)?)
    }

    fn from_raw(action: Action, raw: RawCommand) -> Result<Self, CommandError> {
        let command = match action {
            Action::StartCleaning => Self::StartCleaning {
                mode: raw
                    .mode
                    .as_deref()
                    .map(str::parse::<CleaningMode>)
                    .transpose()?,
            },
            Action::Pause => Self::Pause,
            Action::Resume => Self::Resume,
            Action::ReturnToDock => Self::ReturnToDock,
            Action::SetMode => {
                let mode = raw.mode.ok_or(CommandError::MissingArgument {
                    action: action.as_str(),
                    field: "mode",
                })?;
                Self::SetMode(mode.parse::<CleaningMode>()?)
            }
            Action::EmptyBin => Self::EmptyBin,
            Action::ResetMaintenance => Self::ResetMaintenance,
            Action::SetSchedule => Self::SetSchedule(ScheduleUpdate {
                enabled: raw.enabled,
                time: raw
                    .time
                    .as_deref()
                    .map(str::parse::<ScheduleTime>)
                    .transpose()?,
                days: raw
                    .days
                    .map(|days| {
                        days.iter()
                            .map(|d| d.parse::<Weekday>())
                            .collect::<Result<BTreeSet<_>, _>>()
                    })
                    .transpose()?,
            }),
            Action::GetSchedule => Self::GetSchedule,
            Action::GetMaintenance => Self::GetMaintenance,
            Action::ClearError => Self::ClearError,
        };
        Ok(command)
    }

    /// Returns the action this command performs.
    #[must_use]
    pub const fn action(&self) -> Action {
        match self {
            Self::StartCleaning { .. } => Action::StartCleaning,
            Self::Pause => Action::Pause,
            Self::Resume => Action::Resume,
            Self::ReturnToDock => Action::ReturnToDock,
            Self::SetMode(_) => Action::SetMode,
            Self::EmptyBin => Action::EmptyBin,
            Self::ResetMaintenance => Action::ResetMaintenance,
            Self::SetSchedule(_) => Action::SetSchedule,
            Self::GetSchedule => Action::GetSchedule,
            Self::GetMaintenance => Action::GetMaintenance,
            Self::ClearError => Action::ClearError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValueError;

    #[test]
    fn parse_start_cleaning_without_mode() {
        let cmd = ControlCommand::from_json(br#"{"action":"start_cleaning"}"#).unwrap();
        assert_eq!(cmd, ControlCommand::StartCleaning { mode: None });
    }

    #[test]
    fn parse_ignores_unknown_fields() {
        let cmd = ControlCommand::from_json(br#"{"action":"pause","requestId":42}"#).unwrap();
        assert_eq!(cmd, ControlCommand::Pause);
    }

    #[test]
    fn parse_set_mode_requires_mode() {
        let err = ControlCommand::from_json(br#"{"action":"set_mode"}"#).unwrap_err();
        assert!(matches!(
            err,
            Error::Command(CommandError::MissingArgument {
                action: "set_mode",
                field: "mode"
            })
        ));
    }

    #[test]
    fn parse_rejects_unknown_mode() {
        let err =
            ControlCommand::from_json(br#"{"action":"set_mode","mode":"turbo"}"#).unwrap_err();
        assert!(matches!(
            err,
            Error::Command(CommandError::InvalidValue(ValueError::InvalidCleaningMode(_)))
        ));
    }

    #[test]
    fn parse_set_schedule() {
        let cmd = ControlCommand::from_json(
            br#"{"action":"set_schedule","enabled":true,"time":"07:30","days":["Sat","sunday"]}"#,
        )
        .unwrap();

        let ControlCommand::SetSchedule(update) = cmd else {
            panic!("expected set_schedule, got {cmd:?}");
        };
        assert_eq!(update.enabled, Some(true));
        assert_eq!(update.time, Some(ScheduleTime::new(7, 30).unwrap()));
        assert_eq!(
            update.days,
            Some([Weekday::Saturday, Weekday::Sunday].into_iter().collect())
        );
    }

    #[test]
    fn parse_set_schedule_rejects_bad_time() {
        let err =
            ControlCommand::from_json(br#"{"action":"set_schedule","time":"25:00"}"#).unwrap_err();
        assert!(matches!(
            err,
            Error::Command(CommandError::InvalidValue(ValueError::InvalidTime(_)))
        ));
    }

    #[test]
    fn parse_missing_action() {
        let err = ControlCommand::from_json(br#"{"mode":"spot"}"#).unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::MissingField(_))));
    }

    #[test]
    fn parse_unknown_action() {
        let err = ControlCommand::from_json(br#"{"action":"self_destruct"}"#).unwrap_err();
        assert!(matches!(
            err,
            Error::Command(CommandError::UnknownAction(a)) if a == "self_destruct"
        ));
    }

    #[test]
    fn parse_malformed_json() {
        let err = ControlCommand::from_json(b"{action:").unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::Json(_))));
    }

    #[test]
    fn action_matches_variant() {
        for action in Action::ALL {
            let payload = format!(r#"{{"action":"{action}","mode":"edge"}}"#);
            let cmd = ControlCommand::from_json(payload.as_bytes()).unwrap();
            assert_eq!(cmd.action(), action);
        }
    }
}
