// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-tick state transition rules.
//!
//! # Rule order
//!
//! Each tick evaluates the rules below once, in this order. A rule sees the
//! changes made by the rules before it in the same tick, but nothing is
//! re-evaluated: a robot that starts returning in rule 6 can dock in rule 7
//! of the same tick if it is already close to the dock.
//!
//! 1. Charging (only while `isCharging`)
//! 2. Discharge (otherwise, only while cleaning)
//! 3. Locomotion (cleaning or returning)
//! 4. Cleaning progress and consumable wear
//! 5. Transient bump/cliff readings
//! 6. Low-battery return
//! 7. Docking
//! 8. Dust bin full
//!
//! Random draws happen in a fixed order (x, y, heading, bump, cliff) so a
//! [`SequenceRandom`](super::SequenceRandom) can script a tick exactly.

use crate::event::{DeviceEvent, TransientSensor};
use crate::state::{ARENA_HALF_WIDTH, DeviceState, Obstacle, Position};
use crate::types::CleanerStatus;

use super::{RandomSource, SimulationParams};

/// Alert raised when the robot heads home on low battery.
pub const LOW_BATTERY_ALERT: &str = "Low battery - returning to dock";
/// Alert raised when the robot reaches the dock.
pub const DOCKED_ALERT: &str = "Successfully docked and charging";
/// Alert raised when the dust bin fills up.
pub const BIN_FULL_ALERT: &str = "Dust bin is full - please empty";

/// Advances a [`DeviceState`] one tick at a time.
///
/// The engine owns the random source and the tuning constants but not the
/// state, so the caller decides how access to the state is serialized.
///
/// # Examples
///
/// ```
/// use cleaner_sim::simulation::{SequenceRandom, SimulationParams, TickEngine};
/// use cleaner_sim::state::DeviceState;
/// use cleaner_sim::types::{CleanerStatus, DeviceId};
///
/// let mut engine = TickEngine::new(SimulationParams::default(), SequenceRandom::constant(0.5));
/// let mut state = DeviceState::new(DeviceId::new("cleaner-1"), chrono::Utc::now());
/// state.status = CleanerStatus::Cleaning;
///
/// let events = engine.advance(&mut state);
/// assert!(events.is_empty());
/// assert!((state.battery - 99.2).abs() < 1e-9);
/// ```
pub struct TickEngine {
    params: SimulationParams,
    rng: Box<dyn RandomSource>,
}

impl TickEngine {
    /// Creates an engine with the given parameters and random source.
    #[must_use]
    pub fn new(params: SimulationParams, rng: impl RandomSource + 'static) -> Self {
        Self {
            params,
            rng: Box::new(rng),
        }
    }

    /// Returns the simulation parameters.
    #[must_use]
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Advances `state` by one tick and returns the events raised.
    ///
    /// Pure apart from the random source: no I/O, no clock. If the rules
    /// leave the state outside its invariants the device is faulted (see
    /// [`enforce_invariants`](Self::enforce_invariants)).
    pub fn advance(&mut self, state: &mut DeviceState) -> Vec<DeviceEvent> {
        let mut events = Vec::new();

        self.apply_power(state);
        self.apply_locomotion(state);
        self.apply_cleaning_progress(state);
        self.apply_transient_sensors(state, &mut events);
        self.apply_low_battery_return(state, &mut events);
        self.apply_docking(state, &mut events);
        self.apply_bin_full(state, &mut events);

        events.extend(Self::enforce_invariants(state));
        events
    }

    /// Faults the device if `state` violates an invariant.
    ///
    /// Moves to [`CleanerStatus::Error`] and returns the status change and a
    /// fault event. Returns nothing if the state is valid or the device is
    /// already faulted: a violation is reported once, and again only after
    /// `clear_error` if it is still there.
    pub fn enforce_invariants(state: &mut DeviceState) -> Vec<DeviceEvent> {
        let Err(violation) = state.validate() else {
            return Vec::new();
        };
        if state.status == CleanerStatus::Error {
            tracing::trace!(device = %state.device_id, error = %violation, "Device still faulted");
            return Vec::new();
        }
        tracing::error!(
            device = %state.device_id,
            error = %violation,
            "Device state invariant violated"
        );
        let old = state.set_status(CleanerStatus::Error);
        vec![
            DeviceEvent::status_changed(old, CleanerStatus::Error),
            DeviceEvent::fault(violation.to_string()),
        ]
    }

    /// Rules 1 and 2: charging, else discharging while cleaning.
    fn apply_power(&self, state: &mut DeviceState) {
        if state.is_charging && state.battery < 100.0 {
            state.battery = (state.battery + self.params.charge_rate).min(100.0);
        } else if state.status == CleanerStatus::Cleaning && state.battery > 0.0 {
            state.battery = (state.battery - self.params.discharge_rate).max(0.0);
        }
    }

    /// Rule 3: bounded random walk and turn.
    fn apply_locomotion(&mut self, state: &mut DeviceState) {
        if !state.status.is_moving() {
            return;
        }
        let dx = self.rng.symmetric(self.params.move_step);
        let dy = self.rng.symmetric(self.params.move_step);
        let turn = self.rng.symmetric(self.params.turn_step);

        let pos = &mut state.position;
        pos.x = (pos.x + dx).clamp(-ARENA_HALF_WIDTH, ARENA_HALF_WIDTH);
        pos.y = (pos.y + dy).clamp(-ARENA_HALF_WIDTH, ARENA_HALF_WIDTH);
        pos.heading = wrap_heading(pos.heading + turn);
    }

    /// Rule 4: cleaned area, cleaning time and consumable wear.
    fn apply_cleaning_progress(&self, state: &mut DeviceState) {
        if state.status != CleanerStatus::Cleaning {
            return;
        }
        let minutes = self.params.minutes_per_tick();

        state.mapping.cleaned_areas += self.params.area_per_tick;
        state.maintenance.total_cleaning_time += minutes;
        state.stats.total_runtime += minutes;
        state
            .stats
            .refresh_average(state.maintenance.total_cleaning_time);

        let maintenance = &mut state.maintenance;
        maintenance.filter_life =
            (maintenance.filter_life - self.params.filter_wear_per_tick).max(0.0);
        maintenance.brush_hours =
            (maintenance.brush_hours - self.params.brush_wear_per_tick).max(0.0);
    }

    /// Rule 5: random bump and cliff readings.
    fn apply_transient_sensors(&mut self, state: &mut DeviceState, events: &mut Vec<DeviceEvent>) {
        if state.status != CleanerStatus::Cleaning {
            return;
        }
        if self.rng.chance(self.params.bump_probability) {
            state.sensors.bump = true;
            self.record_obstacle(state);
            events.push(DeviceEvent::SensorTriggered {
                sensor: TransientSensor::Bump,
                clear_after: self.params.bump_clear_after,
            });
        }
        if self.rng.chance(self.params.cliff_probability) {
            state.sensors.cliff = true;
            events.push(DeviceEvent::SensorTriggered {
                sensor: TransientSensor::Cliff,
                clear_after: self.params.cliff_clear_after,
            });
        }
    }

    fn record_obstacle(&self, state: &mut DeviceState) {
        let obstacles = &mut state.mapping.obstacles_detected;
        obstacles.push(Obstacle {
            x: state.position.x,
            y: state.position.y,
        });
        if obstacles.len() > self.params.max_obstacles {
            let excess = obstacles.len() - self.params.max_obstacles;
            obstacles.drain(..excess);
        }
    }

    /// Rule 6: head home on low battery.
    fn apply_low_battery_return(&self, state: &mut DeviceState, events: &mut Vec<DeviceEvent>) {
        if state.battery <= self.params.low_battery_threshold
            && state.status == CleanerStatus::Cleaning
        {
            let old = state.set_status(CleanerStatus::Returning);
            events.push(DeviceEvent::status_changed(old, CleanerStatus::Returning));
            events.push(DeviceEvent::alert(LOW_BATTERY_ALERT));
        }
    }

    /// Rule 7: dock once close enough to the origin.
    fn apply_docking(&self, state: &mut DeviceState, events: &mut Vec<DeviceEvent>) {
        if state.status == CleanerStatus::Returning
            && state.position.distance_from_origin() < self.params.dock_radius
        {
            let old = state.set_status(CleanerStatus::Docked);
            state.is_charging = true;
            state.position = Position::ORIGIN;
            events.push(DeviceEvent::status_changed(old, CleanerStatus::Docked));
            events.push(DeviceEvent::alert(DOCKED_ALERT));
        }
    }

    /// Rule 8: flag the bin once enough area has been cleaned.
    fn apply_bin_full(&self, state: &mut DeviceState, events: &mut Vec<DeviceEvent>) {
        if state.mapping.cleaned_areas > self.params.bin_full_area && !state.sensors.dust_bin {
            state.sensors.dust_bin = true;
            events.push(DeviceEvent::alert(BIN_FULL_ALERT));
        }
    }
}

impl std::fmt::Debug for TickEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickEngine")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Wraps a heading into `[0, 360)`.
fn wrap_heading(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::simulation::{SequenceRandom, StdRandom};
    use crate::types::DeviceId;

    const EPS: f64 = 1e-9;

    fn state_with(status: CleanerStatus) -> DeviceState {
        let mut state = DeviceState::new(DeviceId::new("cleaner-test"), Utc::now());
        state.status = status;
        state
    }

    fn still_engine() -> TickEngine {
        TickEngine::new(SimulationParams::default(), SequenceRandom::constant(0.5))
    }

    fn alerts(events: &[DeviceEvent]) -> Vec<&str> {
        events.iter().filter_map(DeviceEvent::alert_message).collect()
    }

    #[test]
    fn charging_caps_at_full() {
        let mut engine = still_engine();
        let mut state = state_with(CleanerStatus::Docked);
        state.is_charging = true;
        state.battery = 99.0;

        engine.advance(&mut state);
        assert!((state.battery - 100.0).abs() < EPS);

        engine.advance(&mut state);
        assert!((state.battery - 100.0).abs() < EPS);
    }

    #[test]
    fn charging_and_discharge_are_exclusive() {
        let mut engine = still_engine();
        let mut state = state_with(CleanerStatus::Cleaning);
        state.is_charging = true;
        state.battery = 50.0;

        engine.advance(&mut state);
        assert!((state.battery - 52.0).abs() < EPS);
    }

    #[test]
    fn full_battery_while_charging_still_discharges_when_cleaning() {
        let mut engine = still_engine();
        let mut state = state_with(CleanerStatus::Cleaning);
        state.is_charging = true;
        state.battery = 100.0;

        engine.advance(&mut state);
        assert!((state.battery - 99.2).abs() < EPS);
    }

    #[test]
    fn discharge_floors_at_zero() {
        let mut engine = still_engine();
        let mut state = state_with(CleanerStatus::Cleaning);
        state.battery = 0.5;

        engine.advance(&mut state);
        assert!(state.battery.abs() < EPS);
    }

    #[test]
    fn docked_robot_does_not_move_or_drain() {
        let mut engine =
            TickEngine::new(SimulationParams::default(), SequenceRandom::constant(0.0));
        let mut state = state_with(CleanerStatus::Docked);

        let events = engine.advance(&mut state);

        assert!(events.is_empty());
        assert_eq!(state.position, Position::ORIGIN);
        assert!((state.battery - 100.0).abs() < EPS);
    }

    #[test]
    fn locomotion_applies_scripted_perturbation() {
        // dx = +0.5, dy = -0.5, turn = +15, no bump, no cliff
        let rng = SequenceRandom::new(vec![1.0, 0.0, 1.0, 0.99, 0.99]);
        let mut engine = TickEngine::new(SimulationParams::default(), rng);
        let mut state = state_with(CleanerStatus::Cleaning);
        state.position.x = 10.0;
        state.position.y = 10.0;
        state.position.heading = 350.0;

        engine.advance(&mut state);

        assert!((state.position.x - 10.5).abs() < EPS);
        assert!((state.position.y - 9.5).abs() < EPS);
        assert!((state.position.heading - 5.0).abs() < EPS);
    }

    #[test]
    fn locomotion_clamps_to_arena() {
        let mut engine =
            TickEngine::new(SimulationParams::default(), SequenceRandom::constant(0.999));
        let mut state = state_with(CleanerStatus::Returning);
        state.position.x = 49.9;
        state.position.y = 49.9;

        engine.advance(&mut state);

        assert!((state.position.x - ARENA_HALF_WIDTH).abs() < EPS);
        assert!((state.position.y - ARENA_HALF_WIDTH).abs() < EPS);
    }

    #[test]
    fn heading_wraps_below_zero() {
        let rng = SequenceRandom::new(vec![0.5, 0.5, 0.0, 0.99, 0.99]);
        let mut engine = TickEngine::new(SimulationParams::default(), rng);
        let mut state = state_with(CleanerStatus::Cleaning);
        state.position.heading = 5.0;

        engine.advance(&mut state);

        assert!((state.position.heading - 350.0).abs() < EPS);
    }

    #[test]
    fn wrap_heading_never_returns_360() {
        assert!(wrap_heading(-1e-20) < 360.0);
        assert!(wrap_heading(720.0).abs() < EPS);
        assert!((wrap_heading(-90.0) - 270.0).abs() < EPS);
    }

    #[test]
    fn cleaning_progress_accumulates() {
        let mut engine = still_engine();
        let mut state = state_with(CleanerStatus::Cleaning);

        engine.advance(&mut state);

        assert!((state.mapping.cleaned_areas - 0.1).abs() < EPS);
        assert!((state.maintenance.total_cleaning_time - 2.0 / 60.0).abs() < EPS);
        assert!((state.stats.total_runtime - 2.0 / 60.0).abs() < EPS);
        assert!((state.maintenance.filter_life - 99.99).abs() < EPS);
        assert!((state.maintenance.brush_hours - 149.999).abs() < EPS);
    }

    #[test]
    fn wear_floors_at_zero() {
        let mut engine = still_engine();
        let mut state = state_with(CleanerStatus::Cleaning);
        state.maintenance.filter_life = 0.005;
        state.maintenance.brush_hours = 0.0;

        engine.advance(&mut state);

        assert!(state.maintenance.filter_life.abs() < EPS);
        assert!(state.maintenance.brush_hours.abs() < EPS);
    }

    #[test]
    fn bump_sets_flag_records_obstacle_and_requests_clear() {
        // no movement, bump fires, cliff does not
        let rng = SequenceRandom::new(vec![0.5, 0.5, 0.5, 0.0, 0.99]);
        let mut engine = TickEngine::new(SimulationParams::default(), rng);
        let mut state = state_with(CleanerStatus::Cleaning);
        state.position.x = 3.0;

        let events = engine.advance(&mut state);

        assert!(state.sensors.bump);
        assert!(!state.sensors.cliff);
        assert_eq!(state.mapping.obstacles_detected, vec![Obstacle { x: 3.0, y: 0.0 }]);
        assert_eq!(
            events,
            vec![DeviceEvent::SensorTriggered {
                sensor: TransientSensor::Bump,
                clear_after: std::time::Duration::from_secs(3),
            }]
        );
    }

    #[test]
    fn cliff_requests_two_second_clear() {
        let rng = SequenceRandom::new(vec![0.5, 0.5, 0.5, 0.99, 0.0]);
        let mut engine = TickEngine::new(SimulationParams::default(), rng);
        let mut state = state_with(CleanerStatus::Cleaning);

        let events = engine.advance(&mut state);

        assert!(state.sensors.cliff);
        assert_eq!(
            events,
            vec![DeviceEvent::SensorTriggered {
                sensor: TransientSensor::Cliff,
                clear_after: std::time::Duration::from_secs(2),
            }]
        );
    }

    #[test]
    fn transients_only_fire_while_cleaning() {
        let mut engine =
            TickEngine::new(SimulationParams::default(), SequenceRandom::constant(0.0));
        let mut state = state_with(CleanerStatus::Returning);
        state.position.x = 30.0;

        let events = engine.advance(&mut state);

        assert!(!state.sensors.bump);
        assert!(!state.sensors.cliff);
        assert!(events.is_empty());
    }

    #[test]
    fn obstacle_history_is_bounded() {
        let params = SimulationParams {
            max_obstacles: 3,
            ..SimulationParams::default()
        };
        let rng = SequenceRandom::new(vec![0.5, 0.5, 0.5, 0.0, 0.99]);
        let mut engine = TickEngine::new(params, rng);
        let mut state = state_with(CleanerStatus::Cleaning);

        for i in 0..5 {
            state.position.x = f64::from(i);
            engine.advance(&mut state);
        }

        let xs: Vec<f64> = state.mapping.obstacles_detected.iter().map(|o| o.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn low_battery_returns_on_second_tick() {
        let mut engine = still_engine();
        let mut state = state_with(CleanerStatus::Cleaning);
        state.battery = 16.0;
        state.position.x = 20.0;

        let first = engine.advance(&mut state);
        assert!((state.battery - 15.2).abs() < EPS);
        assert_eq!(state.status, CleanerStatus::Cleaning);
        assert!(first.is_empty());

        let second = engine.advance(&mut state);
        assert!((state.battery - 14.4).abs() < EPS);
        assert_eq!(state.status, CleanerStatus::Returning);
        assert_eq!(alerts(&second), vec![LOW_BATTERY_ALERT]);
        assert_eq!(
            second[0],
            DeviceEvent::status_changed(CleanerStatus::Cleaning, CleanerStatus::Returning)
        );

        // Returning no longer drains nor repeats the alert
        let third = engine.advance(&mut state);
        assert!((state.battery - 14.4).abs() < EPS);
        assert!(alerts(&third).is_empty());
    }

    #[test]
    fn returning_near_origin_docks() {
        let mut engine = still_engine();
        let mut state = state_with(CleanerStatus::Returning);
        state.position = Position {
            x: 1.0,
            y: 1.0,
            heading: 90.0,
        };

        let events = engine.advance(&mut state);

        assert_eq!(state.status, CleanerStatus::Docked);
        assert!(state.is_charging);
        assert_eq!(state.position, Position::ORIGIN);
        assert_eq!(alerts(&events), vec![DOCKED_ALERT]);
        assert_eq!(
            events[0],
            DeviceEvent::status_changed(CleanerStatus::Returning, CleanerStatus::Docked)
        );
    }

    #[test]
    fn returning_far_from_origin_keeps_returning() {
        let mut engine = still_engine();
        let mut state = state_with(CleanerStatus::Returning);
        state.position.x = 2.0;

        let events = engine.advance(&mut state);

        assert_eq!(state.status, CleanerStatus::Returning);
        assert!(events.is_empty());
    }

    #[test]
    fn low_battery_near_dock_returns_and_docks_in_one_tick() {
        let mut engine = still_engine();
        let mut state = state_with(CleanerStatus::Cleaning);
        state.battery = 15.5;
        state.position.x = 0.5;

        let events = engine.advance(&mut state);

        assert_eq!(state.status, CleanerStatus::Docked);
        assert!(state.is_charging);
        assert_eq!(alerts(&events), vec![LOW_BATTERY_ALERT, DOCKED_ALERT]);
    }

    #[test]
    fn bin_full_alerts_once() {
        let mut engine = still_engine();
        let mut state = state_with(CleanerStatus::Cleaning);
        state.mapping.cleaned_areas = 49.95;

        let first = engine.advance(&mut state);
        assert!(state.sensors.dust_bin);
        assert_eq!(alerts(&first), vec![BIN_FULL_ALERT]);

        let second = engine.advance(&mut state);
        assert!(alerts(&second).is_empty());
    }

    #[test]
    fn invariant_violation_faults_device() {
        let mut engine = still_engine();
        let mut state = state_with(CleanerStatus::Docked);
        state.maintenance.filter_life = 150.0;

        let events = engine.advance(&mut state);

        assert_eq!(state.status, CleanerStatus::Error);
        assert_eq!(
            events[0],
            DeviceEvent::status_changed(CleanerStatus::Docked, CleanerStatus::Error)
        );
        assert!(matches!(
            &events[1],
            DeviceEvent::Fault { message } if message.contains("filterLife")
        ));
    }

    #[test]
    fn fault_is_reported_once_while_faulted() {
        let mut engine = still_engine();
        let mut state = state_with(CleanerStatus::Docked);
        state.maintenance.filter_life = 150.0;

        let faults: usize = (0..5)
            .map(|_| {
                engine
                    .advance(&mut state)
                    .iter()
                    .filter(|e| matches!(e, DeviceEvent::Fault { .. }))
                    .count()
            })
            .sum();

        assert_eq!(faults, 1);
        assert_eq!(state.status, CleanerStatus::Error);
    }

    #[test]
    fn fault_is_reported_again_after_recovery() {
        let mut engine = still_engine();
        let mut state = state_with(CleanerStatus::Docked);
        state.maintenance.filter_life = 150.0;
        engine.advance(&mut state);

        // what clear_error does to the status
        state.status = CleanerStatus::Docked;
        let events = TickEngine::enforce_invariants(&mut state);

        assert_eq!(events.len(), 2);
        assert!(matches!(&events[1], DeviceEvent::Fault { .. }));
    }

    #[test]
    fn random_ticks_preserve_invariants() {
        let mut engine = TickEngine::new(SimulationParams::default(), StdRandom::seeded(1234));
        let mut state = state_with(CleanerStatus::Cleaning);

        for _ in 0..5000 {
            let events = engine.advance(&mut state);
            assert!(
                !events.iter().any(|e| matches!(e, DeviceEvent::Fault { .. })),
                "fault raised: {events:?}"
            );
            assert!((0.0..=100.0).contains(&state.battery));
            assert!((0.0..=100.0).contains(&state.maintenance.filter_life));
            assert!(state.maintenance.brush_hours >= 0.0);
            assert!((0.0..360.0).contains(&state.position.heading));
            assert!((-ARENA_HALF_WIDTH..=ARENA_HALF_WIDTH).contains(&state.position.x));
            assert!((-ARENA_HALF_WIDTH..=ARENA_HALF_WIDTH).contains(&state.position.y));

            // keep the robot busy once it docks
            if state.status == CleanerStatus::Docked && state.battery >= 100.0 {
                state.is_charging = false;
                state.status = CleanerStatus::Cleaning;
            }
        }
    }
}
