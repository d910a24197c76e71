// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The simulator runtime.
//!
//! A [`Simulator`] owns the [`DeviceState`] and is its only writer. Its
//! [`run`](Simulator::run) loop serializes every mutation:
//!
//! - a tick every `tick_interval`, followed by a telemetry publish
//! - a maintenance check every `maintenance_interval`
//! - a schedule check every `schedule_interval`
//! - inbound control payloads, applied between ticks
//! - delayed bump and cliff resets
//!
//! Publishing goes through a [`Transport`] and never blocks the loop; a
//! failed publish is logged and dropped.

mod transient;

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, Utc};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};

use crate::command::{self, ControlCommand};
use crate::config::SimulatorConfig;
use crate::event::{DeviceEvent, EventBus, Report, TransientSensor};
use crate::protocol::{
    AlertLevel, AlertMessage, ErrorMessage, MaintenanceReport, OutboundMessage, RegisterMessage,
    ScheduleReport, StatusMessage, TelemetryMessage, Transport,
};
use crate::simulation::{RandomSource, ScheduleTrigger, StdRandom, TickEngine, maintenance_alerts};
use crate::state::DeviceState;

use transient::{TransientClear, TransientTimers};

/// Source of the device's local wall-clock time.
pub type Clock = Arc<dyn Fn() -> DateTime<FixedOffset> + Send + Sync>;

/// Runs one simulated cleaner.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use cleaner_sim::{Simulator, SimulatorConfig};
/// use cleaner_sim::protocol::MemoryTransport;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let config = SimulatorConfig::builder().device_id("cleaner-doc").build().unwrap();
/// let transport = MemoryTransport::new();
/// let simulator = Simulator::new(config, transport.clone());
///
/// let (commands, inbound) = tokio::sync::mpsc::channel(8);
/// drop(commands);
///
/// // The loop ends as soon as the inbound channel is closed.
/// let state = simulator.run(inbound, std::future::pending()).await;
/// assert_eq!(state.device_id.as_str(), "cleaner-doc");
/// assert_eq!(transport.published_on("cleaner/device/register").len(), 1);
/// # }
/// ```
pub struct Simulator<T> {
    config: SimulatorConfig,
    state: DeviceState,
    engine: TickEngine,
    transport: T,
    events: EventBus,
    snapshot: watch::Sender<DeviceState>,
    clock: Clock,
}

impl<T: Transport> Simulator<T> {
    /// Creates a simulator for a freshly unboxed device.
    #[must_use]
    pub fn new(config: SimulatorConfig, transport: T) -> Self {
        let clock: Clock = Arc::new(|| Local::now().fixed_offset());
        let state = DeviceState::new(config.device_id.clone(), clock().with_timezone(&Utc));
        let engine = TickEngine::new(config.params.clone(), StdRandom::from_entropy());
        let (snapshot, _) = watch::channel(state.clone());

        Self {
            config,
            state,
            engine,
            transport,
            events: EventBus::new(),
            snapshot,
            clock,
        }
    }

    /// Replaces the random source.
    #[must_use]
    pub fn with_random(mut self, rng: impl RandomSource + 'static) -> Self {
        self.engine = TickEngine::new(self.config.params.clone(), rng);
        self
    }

    /// Replaces the wall clock used for timestamps and schedule checks.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Starts from an existing state instead of a fresh one.
    ///
    /// The device id of `state` is kept.
    #[must_use]
    pub fn with_state(mut self, state: DeviceState) -> Self {
        self.snapshot.send_replace(state.clone());
        self.state = state;
        self
    }

    /// Returns a receiver that always holds the latest state.
    #[must_use]
    pub fn state(&self) -> watch::Receiver<DeviceState> {
        self.snapshot.subscribe()
    }

    /// Returns the bus every handled event is re-broadcast on.
    #[must_use]
    pub fn events(&self) -> EventBus {
        self.events.clone()
    }

    /// Runs the device until `shutdown` resolves or `commands` is closed.
    ///
    /// Publishes the device descriptor first, then serves ticks, checks and
    /// control payloads. Returns the final state.
    pub async fn run<F>(mut self, mut commands: mpsc::Receiver<Vec<u8>>, shutdown: F) -> DeviceState
    where
        F: Future<Output = ()>,
    {
        let (clear_tx, mut clear_rx) = mpsc::unbounded_channel();
        let mut transients = TransientTimers::new(clear_tx);
        let mut trigger = ScheduleTrigger::new();

        let params = self.config.params.clone();
        let start = Instant::now();
        let mut tick = tokio::time::interval_at(start + params.tick_interval, params.tick_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut maintenance = tokio::time::interval_at(
            start + self.config.maintenance_interval,
            self.config.maintenance_interval,
        );
        maintenance.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut schedule = tokio::time::interval_at(
            start + self.config.schedule_interval,
            self.config.schedule_interval,
        );
        schedule.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.announce();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!(device = %self.state.device_id, "Shutdown requested");
                    break;
                }
                _ = tick.tick() => self.on_tick(&mut transients),
                _ = maintenance.tick() => self.on_maintenance_check(),
                _ = schedule.tick() => self.on_schedule_check(&mut trigger, &mut transients),
                Some(clear) = clear_rx.recv() => self.on_transient_clear(clear, &mut transients),
                payload = commands.recv() => match payload {
                    Some(payload) => self.on_control(&payload, &mut transients),
                    None => {
                        tracing::info!(device = %self.state.device_id, "Control channel closed");
                        break;
                    }
                },
            }
        }

        transients.abort_all();
        tracing::info!(device = %self.state.device_id, "Simulator stopped");
        self.state
    }

    fn announce(&mut self) {
        let now = (self.clock)();
        self.state.schedule.refresh_next_clean(&now);
        let message = RegisterMessage::new(
            now.with_timezone(&Utc),
            &self.state.device_id,
            &self.config.descriptor,
        );
        self.send(&message);
        tracing::info!(
            device = %self.state.device_id,
            model = %self.config.descriptor.model,
            firmware = %self.config.descriptor.firmware,
            "Device registered"
        );
        self.sync_snapshot();
    }

    fn on_tick(&mut self, transients: &mut TransientTimers) {
        let events = self.engine.advance(&mut self.state);
        self.dispatch(events, transients);

        let message = TelemetryMessage {
            timestamp: self.now_utc(),
            state: &self.state,
        };
        self.send(&message);
        self.sync_snapshot();
    }

    fn on_maintenance_check(&mut self) {
        let events = maintenance_alerts(&self.state, self.now_utc());
        if !events.is_empty() {
            tracing::debug!(
                device = %self.state.device_id,
                alerts = events.len(),
                "Maintenance due"
            );
        }
        for event in events {
            self.dispatch_one(event, None);
        }
    }

    fn on_schedule_check(
        &mut self,
        trigger: &mut ScheduleTrigger,
        transients: &mut TransientTimers,
    ) {
        let now = (self.clock)();
        if trigger.poll(&self.state, &now) {
            tracing::info!(
                device = %self.state.device_id,
                time = %self.state.schedule.time,
                "Scheduled cleaning due"
            );
            self.execute(&ControlCommand::StartCleaning { mode: None }, &now, transients);
        } else if self
            .state
            .schedule
            .next_clean
            .is_some_and(|next| next <= now.with_timezone(&Utc))
        {
            // slot passed without starting: not docked or battery too low
            tracing::debug!(device = %self.state.device_id, "Scheduled cleaning skipped");
        } else {
            return;
        }
        self.state.schedule.refresh_next_clean(&now);
        self.sync_snapshot();
    }

    fn on_control(&mut self, payload: &[u8], transients: &mut TransientTimers) {
        match ControlCommand::from_json(payload) {
            Ok(command) => {
                let now = (self.clock)();
                self.execute(&command, &now, transients);
            }
            Err(e) => {
                tracing::warn!(
                    device = %self.state.device_id,
                    error = %e,
                    payload = %String::from_utf8_lossy(payload),
                    "Ignoring malformed control message"
                );
            }
        }
    }

    fn execute(
        &mut self,
        command: &ControlCommand,
        now: &DateTime<FixedOffset>,
        transients: &mut TransientTimers,
    ) {
        match command::apply(&mut self.state, command, now) {
            Ok(mut events) => {
                tracing::info!(
                    device = %self.state.device_id,
                    action = %command.action(),
                    "Command applied"
                );
                events.extend(TickEngine::enforce_invariants(&mut self.state));
                self.dispatch(events, transients);
                self.sync_snapshot();
            }
            Err(e) => {
                tracing::warn!(
                    device = %self.state.device_id,
                    action = %command.action(),
                    error = %e,
                    "Rejected control command"
                );
            }
        }
    }

    fn on_transient_clear(&mut self, clear: TransientClear, transients: &mut TransientTimers) {
        if !transients.accept(clear) {
            return;
        }
        match clear.sensor {
            TransientSensor::Bump => self.state.sensors.bump = false,
            TransientSensor::Cliff => self.state.sensors.cliff = false,
        }
        tracing::debug!(
            device = %self.state.device_id,
            sensor = %clear.sensor,
            "Sensor reading reset"
        );
        self.sync_snapshot();
    }

    fn dispatch(&self, events: Vec<DeviceEvent>, transients: &mut TransientTimers) {
        for event in events {
            self.dispatch_one(event, Some(transients));
        }
    }

    /// Publishes one event and re-broadcasts it on the bus.
    fn dispatch_one(&self, event: DeviceEvent, transients: Option<&mut TransientTimers>) {
        let timestamp = self.now_utc();
        let device_id = &self.state.device_id;

        match &event {
            DeviceEvent::StatusChanged { from, to } => {
                tracing::info!(device = %device_id, from = %from, to = %to, "Status changed");
                self.send(&StatusMessage {
                    timestamp,
                    device_id,
                    old_status: *from,
                    new_status: *to,
                    battery: self.state.battery,
                    position: self.state.position,
                });
            }
            DeviceEvent::Alert { message } => {
                tracing::info!(device = %device_id, alert = %message, "Alert raised");
                self.send(&AlertMessage {
                    timestamp,
                    device_id,
                    level: AlertLevel::Info,
                    message,
                    position: self.state.position,
                });
            }
            DeviceEvent::SensorTriggered { sensor, clear_after } => {
                tracing::debug!(device = %device_id, %sensor, ?clear_after, "Sensor triggered");
                if let Some(transients) = transients {
                    transients.schedule(*sensor, *clear_after);
                }
            }
            DeviceEvent::Fault { message } => {
                tracing::error!(device = %device_id, fault = %message, "Device fault");
                self.send(&ErrorMessage {
                    timestamp,
                    device_id,
                    level: AlertLevel::Error,
                    message,
                    device_state: &self.state,
                });
            }
            DeviceEvent::ReportRequested(Report::Schedule) => {
                self.send(&ScheduleReport {
                    timestamp,
                    device_id,
                    schedule: &self.state.schedule,
                });
            }
            DeviceEvent::ReportRequested(Report::Maintenance) => {
                self.send(&MaintenanceReport {
                    timestamp,
                    device_id,
                    maintenance: &self.state.maintenance,
                });
            }
        }

        self.events.publish(event);
    }

    /// Publishes `message`, logging instead of failing.
    fn send<M: OutboundMessage>(&self, message: &M) {
        let result = message
            .to_payload()
            .and_then(|payload| self.transport.publish(M::TOPIC, payload));
        if let Err(e) = result {
            tracing::warn!(topic = M::TOPIC, error = %e, "Publish failed");
        }
    }

    fn sync_snapshot(&self) {
        self.snapshot.send_replace(self.state.clone());
    }

    fn now_utc(&self) -> DateTime<Utc> {
        (self.clock)().with_timezone(&Utc)
    }
}

impl<T> std::fmt::Debug for Simulator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("device_id", &self.state.device_id)
            .field("status", &self.state.status)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
