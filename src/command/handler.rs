// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Applying control commands to the device state.

use chrono::{DateTime, TimeZone, Utc};

use crate::error::CommandError;
use crate::event::{DeviceEvent, Report};
use crate::state::{DeviceState, Maintenance, Position};
use crate::types::{BrushCondition, CleanerStatus, WheelCondition};

use super::{Action, ControlCommand, ScheduleUpdate};

/// Applies `command` to `state` and returns the events raised.
///
/// `now` is the device's local wall clock; it stamps a maintenance reset and
/// anchors the next scheduled run.
///
/// # Errors
///
/// Returns [`CommandError::InvalidTransition`] if the command does not apply
/// to the current status. The state is left untouched in that case.
///
/// # Examples
///
/// ```
/// use cleaner_sim::command::{ControlCommand, apply};
/// use cleaner_sim::state::DeviceState;
/// use cleaner_sim::types::{CleanerStatus, CleaningMode, DeviceId};
///
/// let now = chrono::Utc::now();
/// let mut state = DeviceState::new(DeviceId::new("cleaner-1"), now);
///
/// let cmd = ControlCommand::StartCleaning { mode: Some(CleaningMode::Spot) };
/// apply(&mut state, &cmd, &now).unwrap();
///
/// assert_eq!(state.status, CleanerStatus::Cleaning);
/// assert_eq!(state.cleaning_mode, CleaningMode::Spot);
/// assert!(apply(&mut state, &ControlCommand::Resume, &now).is_err());
/// ```
pub fn apply<Tz: TimeZone>(
    state: &mut DeviceState,
    command: &ControlCommand,
    now: &DateTime<Tz>,
) -> Result<Vec<DeviceEvent>, CommandError> {
    let action = command.action();
    if state.status == CleanerStatus::Error && !action.allowed_in_error() {
        return Err(rejected(action, state));
    }

    let mut events = Vec::new();
    match command {
        ControlCommand::StartCleaning { mode } => {
            require(action, state, |s| s != CleanerStatus::Cleaning)?;
            transition(state, CleanerStatus::Cleaning, &mut events);
            state.is_charging = false;
            if let Some(mode) = mode {
                state.cleaning_mode = *mode;
            }
            state.stats.total_cleans = state.stats.total_cleans.saturating_add(1);
            state
                .stats
                .refresh_average(state.maintenance.total_cleaning_time);
        }
        ControlCommand::Pause => {
            require(action, state, |s| {
                matches!(s, CleanerStatus::Cleaning | CleanerStatus::Returning)
            })?;
            transition(state, CleanerStatus::Paused, &mut events);
        }
        ControlCommand::Resume => {
            require(action, state, |s| s == CleanerStatus::Paused)?;
            transition(state, CleanerStatus::Cleaning, &mut events);
        }
        ControlCommand::ReturnToDock => {
            require(action, state, |s| {
                matches!(s, CleanerStatus::Cleaning | CleanerStatus::Paused)
            })?;
            transition(state, CleanerStatus::Returning, &mut events);
        }
        ControlCommand::SetMode(mode) => {
            state.cleaning_mode = *mode;
        }
        ControlCommand::EmptyBin => {
            state.sensors.dust_bin = false;
            state.mapping.cleaned_areas = 0.0;
        }
        ControlCommand::ResetMaintenance => {
            let maintenance = &mut state.maintenance;
            maintenance.filter_life = Maintenance::FRESH_FILTER_LIFE;
            maintenance.brush_hours = Maintenance::FRESH_BRUSH_HOURS;
            maintenance.last_cleaned = now.with_timezone(&Utc);
            state.sensors.brushes = BrushCondition::Normal;
            state.sensors.wheels = WheelCondition::Normal;
            events.push(DeviceEvent::ReportRequested(Report::Maintenance));
        }
        ControlCommand::SetSchedule(update) => {
            update_schedule(state, update, now);
            events.push(DeviceEvent::ReportRequested(Report::Schedule));
        }
        ControlCommand::GetSchedule => {
            events.push(DeviceEvent::ReportRequested(Report::Schedule));
        }
        ControlCommand::GetMaintenance => {
            events.push(DeviceEvent::ReportRequested(Report::Maintenance));
        }
        ControlCommand::ClearError => {
            require(action, state, |s| s == CleanerStatus::Error)?;
            // A faulted robot is picked up and put back on its dock
            state.position = Position::ORIGIN;
            transition(state, CleanerStatus::Docked, &mut events);
        }
    }

    tracing::debug!(device = %state.device_id, %action, status = %state.status, "Command applied");
    Ok(events)
}

fn update_schedule<Tz: TimeZone>(
    state: &mut DeviceState,
    update: &ScheduleUpdate,
    now: &DateTime<Tz>,
) {
    let schedule = &mut state.schedule;
    if let Some(enabled) = update.enabled {
        schedule.enabled = enabled;
    }
    if let Some(time) = update.time {
        schedule.time = time;
    }
    if let Some(days) = &update.days {
        schedule.days.clone_from(days);
    }
    schedule.refresh_next_clean(now);
}

fn require(
    action: Action,
    state: &DeviceState,
    allowed: impl FnOnce(CleanerStatus) -> bool,
) -> Result<(), CommandError> {
    if allowed(state.status) {
        Ok(())
    } else {
        Err(rejected(action, state))
    }
}

fn rejected(action: Action, state: &DeviceState) -> CommandError {
    CommandError::InvalidTransition {
        action: action.as_str(),
        status: state.status,
    }
}

fn transition(state: &mut DeviceState, to: CleanerStatus, events: &mut Vec<DeviceEvent>) {
    let from = state.set_status(to);
    if from != to {
        events.push(DeviceEvent::status_changed(from, to));
    }
}
