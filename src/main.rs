// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `cleaner-sim`: runs one simulated cleaner against an MQTT broker.
//!
//! Configured through `CLEANER_*` environment variables (see
//! [`SimulatorConfig::from_env`]); log verbosity through `RUST_LOG`.

use cleaner_sim::protocol::MqttTransport;
use cleaner_sim::{Simulator, SimulatorConfig};
use tracing::info;

#[tokio::main]
async fn main() -> cleaner_sim::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cleaner_sim=info".into()),
        )
        .init();

    let config = SimulatorConfig::from_env()?;
    info!(
        device = %config.device_id,
        broker = %config.broker.url,
        tick_ms = config.params.tick_interval.as_millis(),
        "Cleaner simulator starting"
    );

    let (transport, commands) = MqttTransport::connect(&config.broker).await?;
    let simulator = Simulator::new(config, transport.clone());

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    let state = simulator.run(commands, shutdown).await;

    if let Err(e) = transport.disconnect().await {
        tracing::warn!(error = %e, "Disconnect failed");
    }
    info!(
        device = %state.device_id,
        status = %state.status,
        battery = state.battery,
        total_cleans = state.stats.total_cleans,
        "Cleaner simulator stopped"
    );
    Ok(())
}
