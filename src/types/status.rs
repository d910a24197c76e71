// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operating status and cleaning mode of the cleaner.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// What the cleaner is currently doing.
///
/// The status decides which simulation rules apply on a tick: only
/// [`Cleaning`](Self::Cleaning) drains the battery and makes progress, and
/// only [`Cleaning`](Self::Cleaning) and [`Returning`](Self::Returning) move
/// the robot.
///
/// # Examples
///
/// ```
/// use cleaner_sim::types::CleanerStatus;
///
/// assert_eq!(CleanerStatus::Returning.as_str(), "returning");
/// assert_eq!("docked".parse::<CleanerStatus>().unwrap(), CleanerStatus::Docked);
/// assert!(CleanerStatus::Cleaning.is_moving());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanerStatus {
    /// Sitting on the dock.
    #[default]
    Docked,
    /// Actively cleaning.
    Cleaning,
    /// Heading back to the dock.
    Returning,
    /// Cleaning interrupted by the user.
    Paused,
    /// Charging outside of a normal docking sequence.
    Charging,
    /// Faulted; stays here until cleared by a command.
    Error,
}

impl CleanerStatus {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Docked => "docked",
            Self::Cleaning => "cleaning",
            Self::Returning => "returning",
            Self::Paused => "paused",
            Self::Charging => "charging",
            Self::Error => "error",
        }
    }

    /// Returns `true` for statuses in which the robot drives around.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        matches!(self, Self::Cleaning | Self::Returning)
    }
}

impl fmt::Display for CleanerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CleanerStatus {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "docked" => Ok(Self::Docked),
            "cleaning" => Ok(Self::Cleaning),
            "returning" => Ok(Self::Returning),
            "paused" => Ok(Self::Paused),
            "charging" => Ok(Self::Charging),
            "error" => Ok(Self::Error),
            _ => Err(ValueError::InvalidStatus(s.to_string())),
        }
    }
}

/// Cleaning pattern selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleaningMode {
    /// Whole-room cleaning.
    #[default]
    Auto,
    /// Concentrated cleaning around one spot.
    Spot,
    /// Follows walls and edges.
    Edge,
    /// Driven remotely.
    Manual,
}

impl CleaningMode {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Spot => "spot",
            Self::Edge => "edge",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for CleaningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CleaningMode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "spot" => Ok(Self::Spot),
            "edge" => Ok(Self::Edge),
            "manual" => Ok(Self::Manual),
            _ => Err(ValueError::InvalidCleaningMode(s.to_string())),
        }
    }
}
