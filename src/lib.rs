// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `cleaner_sim` - a simulated robotic vacuum cleaner speaking MQTT.
//!
//! The crate emulates one smart cleaner: it keeps an in-memory device state,
//! advances it on a fixed tick with randomized movement and sensor readings,
//! publishes JSON telemetry, status changes and alerts, and reacts to control
//! commands. It is meant for exercising IoT backends (AWS IoT Core or any
//! MQTT broker) without real hardware.
//!
//! # Layout
//!
//! - [`simulation`]: the synchronous rules (tick engine, maintenance
//!   monitor, schedule check)
//! - [`command`]: parsing and applying control commands
//! - [`state`], [`types`]: the device state record and its value types
//! - [`protocol`]: outbound documents and the transport channel
//! - [`Simulator`]: the runtime loop tying everything together
//!
//! # Quick Start
//!
//! ```no_run
//! use cleaner_sim::{Simulator, SimulatorConfig};
//! use cleaner_sim::protocol::MqttTransport;
//!
//! #[tokio::main]
//! async fn main() -> cleaner_sim::Result<()> {
//!     let config = SimulatorConfig::builder()
//!         .broker_url("mqtt://localhost:1883")
//!         .build()?;
//!
//!     let (transport, commands) = MqttTransport::connect(&config.broker).await?;
//!     let simulator = Simulator::new(config, transport);
//!
//!     let shutdown = async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     };
//!     simulator.run(commands, shutdown).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Without a broker
//!
//! ```
//! use cleaner_sim::simulation::{SequenceRandom, SimulationParams, TickEngine};
//! use cleaner_sim::command::{ControlCommand, apply};
//! use cleaner_sim::state::DeviceState;
//! use cleaner_sim::types::{CleanerStatus, DeviceId};
//!
//! let now = chrono::Utc::now();
//! let mut state = DeviceState::new(DeviceId::new("cleaner-1"), now);
//! let mut engine = TickEngine::new(SimulationParams::default(), SequenceRandom::constant(0.5));
//!
//! let start = ControlCommand::from_json(br#"{"action":"start_cleaning","mode":"edge"}"#).unwrap();
//! apply(&mut state, &start, &now).unwrap();
//!
//! for _ in 0..10 {
//!     engine.advance(&mut state);
//! }
//! assert_eq!(state.status, CleanerStatus::Cleaning);
//! assert!((state.battery - 92.0).abs() < 1e-9);
//! ```

mod capabilities;
pub mod command;
mod config;
pub mod error;
pub mod event;
pub mod protocol;
pub mod simulation;
mod simulator;
pub mod state;
pub mod types;

pub use capabilities::{
    Capabilities, CapabilitiesBuilder, DEFAULT_FIRMWARE, DEFAULT_MODEL, DeviceDescriptor,
};
pub use command::{Action, ControlCommand};
pub use config::{
    BrokerConfig, DEFAULT_BROKER_URL, DEFAULT_MAINTENANCE_INTERVAL, DEFAULT_SCHEDULE_INTERVAL,
    SimulatorConfig, SimulatorConfigBuilder, TlsFiles,
};
pub use error::{
    CommandError, ConfigError, Error, InvariantViolation, ParseError, ProtocolError, Result,
    ValueError,
};
pub use event::{DeviceEvent, EventBus};
pub use simulator::{Clock, Simulator};
pub use state::DeviceState;
pub use types::{CleanerStatus, CleaningMode, DeviceId};
