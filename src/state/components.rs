// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sub-records of [`DeviceState`](super::DeviceState).

use std::collections::BTreeSet;

use chrono::{Datelike, DateTime, Days, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{BrushCondition, ScheduleTime, WheelCondition, Weekday};

/// Position on the floor plan, in metres, with the dock at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// East-west offset from the dock.
    pub x: f64,
    /// North-south offset from the dock.
    pub y: f64,
    /// Heading in degrees, within `[0, 360)`.
    pub heading: f64,
}

impl Position {
    /// The dock.
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        heading: 0.0,
    };

    /// Straight-line distance to the dock.
    #[must_use]
    pub fn distance_from_origin(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// A point where the bump sensor fired.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// East-west offset from the dock.
    pub x: f64,
    /// North-south offset from the dock.
    pub y: f64,
}

/// Onboard sensor readings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensors {
    /// Dust bin full flag.
    pub dust_bin: bool,
    /// Brush condition.
    pub brushes: BrushCondition,
    /// Wheel condition.
    pub wheels: WheelCondition,
    /// Cliff sensor; clears itself shortly after firing.
    pub cliff: bool,
    /// Bump sensor; clears itself shortly after firing.
    pub bump: bool,
    /// Dirt level, 0-100.
    pub dirt: u8,
}

/// What the robot knows about the home.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    /// Names of rooms seen so far.
    pub rooms_discovered: BTreeSet<String>,
    /// Room the robot is in.
    pub current_room: String,
    /// Obstacles hit, oldest first.
    pub obstacles_detected: Vec<Obstacle>,
    /// Area cleaned since the bin was last emptied, in m².
    pub cleaned_areas: f64,
    /// Total floor area of the home, in m².
    pub total_area: f64,
}

impl Default for Mapping {
    fn default() -> Self {
        Self {
            rooms_discovered: ["Kitchen", "Living Room"]
                .into_iter()
                .map(String::from)
                .collect(),
            current_room: "Living Room".to_string(),
            obstacles_detected: Vec::new(),
            cleaned_areas: 0.0,
            total_area: 85.0,
        }
    }
}

/// Consumable wear and service history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Maintenance {
    /// Remaining filter life, percent.
    pub filter_life: f64,
    /// Remaining brush life, in hours.
    pub brush_hours: f64,
    /// When the device itself was last serviced.
    pub last_cleaned: DateTime<Utc>,
    /// Lifetime cleaning time, in minutes.
    pub total_cleaning_time: f64,
}

impl Maintenance {
    /// Filter life of a fresh filter.
    pub const FRESH_FILTER_LIFE: f64 = 100.0;
    /// Brush life of a fresh brush set.
    pub const FRESH_BRUSH_HOURS: f64 = 150.0;

    /// Maintenance record for a device serviced at `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            filter_life: Self::FRESH_FILTER_LIFE,
            brush_hours: Self::FRESH_BRUSH_HOURS,
            last_cleaned: now,
            total_cleaning_time: 0.0,
        }
    }

    /// Time elapsed since the last service, partial days included.
    #[must_use]
    pub fn since_cleaned(&self, now: DateTime<Utc>) -> TimeDelta {
        now - self.last_cleaned
    }
}

/// Recurring cleaning schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Whether scheduled cleaning is active.
    pub enabled: bool,
    /// Local time of day to start.
    pub time: ScheduleTime,
    /// Days on which to start.
    pub days: BTreeSet<Weekday>,
    /// Next planned start, if any.
    pub next_clean: Option<DateTime<Utc>>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            enabled: false,
            time: ScheduleTime::default(),
            days: [Weekday::Monday, Weekday::Wednesday, Weekday::Friday]
                .into_iter()
                .collect(),
            next_clean: None,
        }
    }
}

impl Schedule {
    /// Returns `true` if the schedule includes `day`.
    #[must_use]
    pub fn runs_on(&self, day: Weekday) -> bool {
        self.days.contains(&day)
    }

    /// Next start strictly after `now`, evaluated in `now`'s timezone.
    ///
    /// Returns `None` when the schedule is disabled or has no days.
    #[must_use]
    pub fn next_occurrence<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
        if !self.enabled || self.days.is_empty() {
            return None;
        }
        let local_now = now.naive_local();
        let tz = now.timezone();
        (0..=7u64).find_map(|offset| {
            let date = local_now.date().checked_add_days(Days::new(offset))?;
            if !self.runs_on(date.weekday().into()) {
                return None;
            }
            let candidate = date.and_time(self.time.to_naive_time());
            if candidate <= local_now {
                return None;
            }
            tz.from_local_datetime(&candidate)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
        })
    }

    /// Recomputes [`next_clean`](Self::next_clean) relative to `now`.
    pub fn refresh_next_clean<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) {
        self.next_clean = self.next_occurrence(now);
    }
}

/// Usage counters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Number of cleaning runs started.
    pub total_cleans: u32,
    /// Lifetime runtime while cleaning, in minutes.
    pub total_runtime: f64,
    /// Average cleaning time per run, in minutes.
    pub average_clean_time: f64,
}

impl Stats {
    /// Recomputes the average from the lifetime cleaning time.
    pub fn refresh_average(&mut self, total_cleaning_time: f64) {
        self.average_clean_time = if self.total_cleans == 0 {
            0.0
        } else {
            total_cleaning_time / f64::from(self.total_cleans)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn distance_from_origin() {
        let pos = Position {
            x: 3.0,
            y: 4.0,
            heading: 0.0,
        };
        assert!((pos.distance_from_origin() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn since_cleaned_keeps_partial_days() {
        let maintenance = Maintenance::new(utc(2024, 1, 1, 12, 0));
        assert_eq!(
            maintenance.since_cleaned(utc(2024, 1, 31, 11, 0)),
            TimeDelta::days(29) + TimeDelta::hours(23)
        );
        assert_eq!(maintenance.since_cleaned(utc(2024, 2, 1, 12, 0)), TimeDelta::days(31));
    }

    #[test]
    fn disabled_schedule_has_no_next_clean() {
        let schedule = Schedule::default();
        assert!(schedule.next_occurrence(&utc(2024, 1, 1, 8, 0)).is_none());
    }

    #[test]
    fn next_occurrence_same_day_when_still_ahead() {
        // 2024-01-01 is a Monday.
        let schedule = Schedule {
            enabled: true,
            ..Schedule::default()
        };
        let next = schedule.next_occurrence(&utc(2024, 1, 1, 8, 0)).unwrap();
        assert_eq!(next, utc(2024, 1, 1, 9, 0));
    }

    #[test]
    fn next_occurrence_skips_to_next_scheduled_day() {
        let schedule = Schedule {
            enabled: true,
            ..Schedule::default()
        };
        // Monday 09:00 exactly is not strictly after now; next is Wednesday.
        let next = schedule.next_occurrence(&utc(2024, 1, 1, 9, 0)).unwrap();
        assert_eq!(next, utc(2024, 1, 3, 9, 0));
    }

    #[test]
    fn next_occurrence_wraps_a_full_week() {
        let schedule = Schedule {
            enabled: true,
            days: [Weekday::Monday].into_iter().collect(),
            ..Schedule::default()
        };
        let next = schedule.next_occurrence(&utc(2024, 1, 1, 10, 0)).unwrap();
        assert_eq!(next, utc(2024, 1, 8, 9, 0));
    }

    #[test]
    fn average_clean_time_guards_zero_cleans() {
        let mut stats = Stats::default();
        stats.refresh_average(30.0);
        assert!(stats.average_clean_time.abs() < f64::EPSILON);

        stats.total_cleans = 3;
        stats.refresh_average(30.0);
        assert!((stats.average_clean_time - 10.0).abs() < f64::EPSILON);
    }
}
