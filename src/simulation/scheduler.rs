// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scheduled cleaning checks.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike};

use crate::state::DeviceState;
use crate::types::{CleanerStatus, Weekday};

/// Minimum battery level for a scheduled start.
pub const SCHEDULE_MIN_BATTERY: f64 = 50.0;

/// Returns `true` if a scheduled cleaning should start now.
///
/// `day` is a weekday name (any case, full or three-letter) and `time` a
/// `"HH:MM"` string compared exactly against the configured time. The robot
/// must also be docked with more than half a battery.
///
/// # Examples
///
/// ```
/// use cleaner_sim::simulation::schedule_due;
/// use cleaner_sim::state::DeviceState;
/// use cleaner_sim::types::DeviceId;
///
/// let mut state = DeviceState::new(DeviceId::new("cleaner-1"), chrono::Utc::now());
/// state.schedule.enabled = true;
///
/// assert!(schedule_due(&state, "Monday", "09:00"));
/// assert!(!schedule_due(&state, "Tuesday", "09:00"));
/// assert!(!schedule_due(&state, "Monday", "09:01"));
/// ```
#[must_use]
pub fn schedule_due(state: &DeviceState, day: &str, time: &str) -> bool {
    let schedule = &state.schedule;
    if !schedule.enabled {
        return false;
    }
    let Ok(day) = day.parse::<Weekday>() else {
        return false;
    };
    schedule.runs_on(day)
        && schedule.time.to_string() == time
        && state.status == CleanerStatus::Docked
        && state.battery > SCHEDULE_MIN_BATTERY
}

/// Fires a schedule at most once per matching minute.
///
/// The runtime polls more often than once a minute, so the same `HH:MM`
/// would otherwise match several times.
#[derive(Debug, Clone, Default)]
pub struct ScheduleTrigger {
    last_fired: Option<(NaiveDate, u32, u32)>,
}

impl ScheduleTrigger {
    /// Creates a trigger that has never fired.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks the schedule at local time `now`.
    ///
    /// Returns `true` the first time [`schedule_due`] holds for a given date
    /// and minute, and `false` on every later check within that minute.
    pub fn poll<Tz: TimeZone>(&mut self, state: &DeviceState, now: &DateTime<Tz>) -> bool {
        let local = now.naive_local();
        let key = (local.date(), local.hour(), local.minute());
        if self.last_fired == Some(key) {
            return false;
        }

        let day = Weekday::from(local.weekday());
        let time = local.format("%H:%M").to_string();
        if !schedule_due(state, day.as_str(), &time) {
            return false;
        }

        self.last_fired = Some(key);
        true
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::types::DeviceId;

    fn scheduled_state() -> DeviceState {
        let mut state = DeviceState::new(DeviceId::new("cleaner-s"), Utc::now());
        state.schedule.enabled = true;
        state
    }

    #[test]
    fn disabled_schedule_never_fires() {
        let mut state = scheduled_state();
        state.schedule.enabled = false;
        assert!(!schedule_due(&state, "monday", "09:00"));
    }

    #[test]
    fn day_matching_ignores_case() {
        let state = scheduled_state();
        assert!(schedule_due(&state, "WEDNESDAY", "09:00"));
        assert!(schedule_due(&state, "fri", "09:00"));
        assert!(!schedule_due(&state, "someday", "09:00"));
    }

    #[test]
    fn time_must_match_exactly() {
        let state = scheduled_state();
        assert!(!schedule_due(&state, "monday", "9:00"));
        assert!(!schedule_due(&state, "monday", "09:00:00"));
    }

    #[test]
    fn requires_docked_with_enough_battery() {
        let mut state = scheduled_state();
        state.battery = 50.0;
        assert!(!schedule_due(&state, "monday", "09:00"));

        state.battery = 50.1;
        assert!(schedule_due(&state, "monday", "09:00"));

        state.status = CleanerStatus::Paused;
        assert!(!schedule_due(&state, "monday", "09:00"));
    }

    #[test]
    fn trigger_fires_once_per_minute() {
        let state = scheduled_state();
        let mut trigger = ScheduleTrigger::new();
        // 2024-01-01 is a Monday
        let first = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 5).unwrap();
        let second = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 35).unwrap();
        let next_week = Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap();

        assert!(trigger.poll(&state, &first));
        assert!(!trigger.poll(&state, &second));
        assert!(trigger.poll(&state, &next_week));
    }

    #[test]
    fn trigger_ignores_other_minutes() {
        let state = scheduled_state();
        let mut trigger = ScheduleTrigger::new();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 9, 1, 0).unwrap();
        assert!(!trigger.poll(&state, &at));
    }
}
