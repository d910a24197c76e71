// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Action names understood on the control topic.

use std::fmt;
use std::str::FromStr;

use crate::error::CommandError;

/// The `action` field of a control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Start a cleaning run.
    StartCleaning,
    /// Pause the current run.
    Pause,
    /// Resume a paused run.
    Resume,
    /// Head back to the dock.
    ReturnToDock,
    /// Change the cleaning mode.
    SetMode,
    /// Empty the dust bin.
    EmptyBin,
    /// Record a service: fresh filter and brushes.
    ResetMaintenance,
    /// Update the cleaning schedule.
    SetSchedule,
    /// Publish the cleaning schedule.
    GetSchedule,
    /// Publish the maintenance record.
    GetMaintenance,
    /// Leave the error state.
    ClearError,
}

impl Action {
    /// Every action, in documentation order.
    pub const ALL: [Self; 11] = [
        Self::StartCleaning,
        Self::Pause,
        Self::Resume,
        Self::ReturnToDock,
        Self::SetMode,
        Self::EmptyBin,
        Self::ResetMaintenance,
        Self::SetSchedule,
        Self::GetSchedule,
        Self::GetMaintenance,
        Self::ClearError,
    ];

    /// Returns the wire name of the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StartCleaning => "start_cleaning",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::ReturnToDock => "return_to_dock",
            Self::SetMode => "set_mode",
            Self::EmptyBin => "empty_bin",
            Self::ResetMaintenance => "reset_maintenance",
            Self::SetSchedule => "set_schedule",
            Self::GetSchedule => "get_schedule",
            Self::GetMaintenance => "get_maintenance",
            Self::ClearError => "clear_error",
        }
    }

    /// Returns `true` if the action is accepted while the device is in error.
    #[must_use]
    pub const fn allowed_in_error(&self) -> bool {
        matches!(self, Self::ClearError | Self::GetSchedule | Self::GetMaintenance)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| CommandError::UnknownAction(s.to_string()))
    }
}
