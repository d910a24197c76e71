// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tunable constants of the simulation.

use std::time::Duration;

/// Per-tick rates, probabilities and thresholds used by the tick engine.
///
/// The defaults reproduce the reference device: a 2 second tick, 0.8 %
/// battery per cleaning tick, 0.1 m² cleaned per tick, low-battery return at
/// 15 % and a bin that fills after 50 m².
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use cleaner_sim::simulation::SimulationParams;
///
/// let params = SimulationParams::default().with_tick_interval(Duration::from_secs(1));
/// assert!((params.minutes_per_tick() - 1.0 / 60.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    /// Simulated time covered by one tick.
    pub tick_interval: Duration,
    /// Battery percent gained per tick while charging.
    pub charge_rate: f64,
    /// Battery percent lost per tick while cleaning.
    pub discharge_rate: f64,
    /// Maximum displacement per axis per tick, in metres.
    pub move_step: f64,
    /// Maximum heading change per tick, in degrees.
    pub turn_step: f64,
    /// Floor area cleaned per tick, in m².
    pub area_per_tick: f64,
    /// Filter life lost per cleaning tick, percent.
    pub filter_wear_per_tick: f64,
    /// Brush life lost per cleaning tick, hours.
    pub brush_wear_per_tick: f64,
    /// Chance per cleaning tick that the bumper fires.
    pub bump_probability: f64,
    /// Chance per cleaning tick that the cliff sensor fires.
    pub cliff_probability: f64,
    /// How long a bump reading stays set.
    pub bump_clear_after: Duration,
    /// How long a cliff reading stays set.
    pub cliff_clear_after: Duration,
    /// Battery level at or below which the robot heads home.
    pub low_battery_threshold: f64,
    /// Distance from the dock within which a returning robot docks.
    pub dock_radius: f64,
    /// Cleaned area after which the dust bin is full, in m².
    pub bin_full_area: f64,
    /// Number of obstacles kept in the map.
    pub max_obstacles: usize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(2000),
            charge_rate: 2.0,
            discharge_rate: 0.8,
            move_step: 0.5,
            turn_step: 15.0,
            area_per_tick: 0.1,
            filter_wear_per_tick: 0.01,
            brush_wear_per_tick: 0.001,
            bump_probability: 0.05,
            cliff_probability: 0.02,
            bump_clear_after: Duration::from_secs(3),
            cliff_clear_after: Duration::from_secs(2),
            low_battery_threshold: 15.0,
            dock_radius: 2.0,
            bin_full_area: 50.0,
            max_obstacles: 50,
        }
    }
}

impl SimulationParams {
    /// Sets the tick interval.
    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Disables random bump and cliff events.
    #[must_use]
    pub fn without_transient_events(mut self) -> Self {
        self.bump_probability = 0.0;
        self.cliff_probability = 0.0;
        self
    }

    /// Cleaning minutes accounted per tick.
    #[must_use]
    pub fn minutes_per_tick(&self) -> f64 {
        self.tick_interval.as_secs_f64() / 60.0
    }
}
