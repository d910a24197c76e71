// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mechanical condition readings for brushes and wheels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Condition reported by the brush sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushCondition {
    /// Spinning freely.
    #[default]
    Normal,
    /// Hair or string wrapped around the roller.
    Tangled,
    /// Brush not fitted.
    Missing,
}

impl BrushCondition {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Tangled => "tangled",
            Self::Missing => "missing",
        }
    }
}

impl fmt::Display for BrushCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition reported by the wheel sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelCondition {
    /// Wheels turning normally.
    #[default]
    Normal,
    /// Wheels blocked.
    Stuck,
    /// Wheel hardware fault.
    Damaged,
}

impl WheelCondition {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Stuck => "stuck",
            Self::Damaged => "damaged",
        }
    }
}

impl fmt::Display for WheelCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_normal() {
        assert_eq!(BrushCondition::default(), BrushCondition::Normal);
        assert_eq!(WheelCondition::default(), WheelCondition::Normal);
    }

    #[test]
    fn serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&BrushCondition::Tangled).unwrap(),
            "\"tangled\""
        );
        assert_eq!(
            serde_json::to_string(&WheelCondition::Stuck).unwrap(),
            "\"stuck\""
        );
    }
}
