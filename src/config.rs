// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Simulator configuration.
//!
//! Configuration comes either from the [`SimulatorConfig`] builder or from
//! environment variables via [`SimulatorConfig::from_env`]:
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `CLEANER_BROKER_URL` | Broker URL, `mqtt://`, `tcp://`, `mqtts://` or `ssl://` | `mqtt://localhost:1883` |
//! | `CLEANER_CLIENT_ID` | MQTT client id | the device id |
//! | `CLEANER_DEVICE_ID` | Device id | `cleaner-<random>` |
//! | `CLEANER_CA_PATH` | PEM file with the broker CA | none |
//! | `CLEANER_CERT_PATH` | PEM client certificate | none |
//! | `CLEANER_KEY_PATH` | PEM client private key | none |
//! | `CLEANER_TICK_MS` | Tick interval in milliseconds | `2000` |
//!
//! The three TLS paths must be set together.

use std::path::PathBuf;
use std::time::Duration;

use crate::capabilities::DeviceDescriptor;
use crate::error::ConfigError;
use crate::simulation::SimulationParams;
use crate::types::DeviceId;

/// Default broker when none is configured.
pub const DEFAULT_BROKER_URL: &str = "mqtt://localhost:1883";

/// Default interval between maintenance checks.
pub const DEFAULT_MAINTENANCE_INTERVAL: Duration = Duration::from_secs(60);

/// Default interval between schedule checks.
pub const DEFAULT_SCHEDULE_INTERVAL: Duration = Duration::from_secs(30);

const ENV_BROKER_URL: &str = "CLEANER_BROKER_URL";
const ENV_CLIENT_ID: &str = "CLEANER_CLIENT_ID";
const ENV_DEVICE_ID: &str = "CLEANER_DEVICE_ID";
const ENV_CA_PATH: &str = "CLEANER_CA_PATH";
const ENV_CERT_PATH: &str = "CLEANER_CERT_PATH";
const ENV_KEY_PATH: &str = "CLEANER_KEY_PATH";
const ENV_TICK_MS: &str = "CLEANER_TICK_MS";

/// PEM files for mutual TLS, as issued by AWS IoT Core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
    /// Root CA the broker certificate chains to.
    pub ca: PathBuf,
    /// Client certificate.
    pub cert: PathBuf,
    /// Client private key.
    pub key: PathBuf,
}

/// Where and how to connect to the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    /// Broker URL.
    pub url: String,
    /// MQTT client id.
    pub client_id: String,
    /// TLS material; plain TCP when absent.
    pub tls: Option<TlsFiles>,
    /// Keep-alive interval.
    pub keep_alive: Duration,
}

/// Complete simulator configuration.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use cleaner_sim::SimulatorConfig;
///
/// let config = SimulatorConfig::builder()
///     .device_id("cleaner-lab")
///     .broker_url("mqtt://broker.local:1883")
///     .tick_interval(Duration::from_millis(500))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.device_id.as_str(), "cleaner-lab");
/// assert_eq!(config.broker.client_id, "cleaner-lab");
/// assert_eq!(config.params.tick_interval, Duration::from_millis(500));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Identifier of the simulated device.
    pub device_id: DeviceId,
    /// Broker connection settings.
    pub broker: BrokerConfig,
    /// Simulation tuning.
    pub params: SimulationParams,
    /// Interval between maintenance checks.
    pub maintenance_interval: Duration,
    /// Interval between schedule checks.
    pub schedule_interval: Duration,
    /// Descriptor announced at start-up.
    pub descriptor: DeviceDescriptor,
}

impl SimulatorConfig {
    /// Returns a builder with default settings.
    #[must_use]
    pub fn builder() -> SimulatorConfigBuilder {
        SimulatorConfigBuilder::default()
    }

    /// Reads the configuration from `CLEANER_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `CLEANER_TICK_MS` is not a positive
    /// integer and [`ConfigError::IncompleteTls`] if only some of the TLS
    /// paths are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut builder = Self::builder();

        if let Some(url) = var(ENV_BROKER_URL) {
            builder = builder.broker_url(url);
        }
        if let Some(client_id) = var(ENV_CLIENT_ID) {
            builder = builder.client_id(client_id);
        }
        if let Some(device_id) = var(ENV_DEVICE_ID) {
            builder = builder.device_id(device_id);
        }
        if let Some(tick) = var(ENV_TICK_MS) {
            let millis = tick
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    name: ENV_TICK_MS,
                    value: tick.clone(),
                })?;
            builder = builder.tick_interval(Duration::from_millis(millis));
        }

        match (var(ENV_CA_PATH), var(ENV_CERT_PATH), var(ENV_KEY_PATH)) {
            (None, None, None) => {}
            (Some(ca), Some(cert), Some(key)) => {
                builder = builder.tls(TlsFiles {
                    ca: ca.into(),
                    cert: cert.into(),
                    key: key.into(),
                });
            }
            _ => return Err(ConfigError::IncompleteTls),
        }

        builder.build()
    }
}

/// Builder for [`SimulatorConfig`].
#[derive(Debug, Clone)]
pub struct SimulatorConfigBuilder {
    device_id: Option<DeviceId>,
    broker_url: String,
    client_id: Option<String>,
    tls: Option<TlsFiles>,
    keep_alive: Duration,
    params: SimulationParams,
    maintenance_interval: Duration,
    schedule_interval: Duration,
    descriptor: DeviceDescriptor,
}

impl Default for SimulatorConfigBuilder {
    fn default() -> Self {
        Self {
            device_id: None,
            broker_url: DEFAULT_BROKER_URL.to_string(),
            client_id: None,
            tls: None,
            keep_alive: Duration::from_secs(30),
            params: SimulationParams::default(),
            maintenance_interval: DEFAULT_MAINTENANCE_INTERVAL,
            schedule_interval: DEFAULT_SCHEDULE_INTERVAL,
            descriptor: DeviceDescriptor::default(),
        }
    }
}

impl SimulatorConfigBuilder {
    /// Sets the device id. A random `cleaner-xxxxxxxx` id is used otherwise.
    #[must_use]
    pub fn device_id(mut self, id: impl Into<DeviceId>) -> Self {
        self.device_id = Some(id.into());
        self
    }

    /// Sets the broker URL.
    #[must_use]
    pub fn broker_url(mut self, url: impl Into<String>) -> Self {
        self.broker_url = url.into();
        self
    }

    /// Sets the MQTT client id. Defaults to the device id.
    #[must_use]
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    /// Enables mutual TLS with the given files.
    #[must_use]
    pub fn tls(mut self, files: TlsFiles) -> Self {
        self.tls = Some(files);
        self
    }

    /// Sets the MQTT keep-alive interval.
    #[must_use]
    pub fn keep_alive(mut self, interval: Duration) -> Self {
        self.keep_alive = interval;
        self
    }

    /// Replaces the simulation parameters.
    #[must_use]
    pub fn params(mut self, params: SimulationParams) -> Self {
        self.params = params;
        self
    }

    /// Sets the tick interval.
    #[must_use]
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.params.tick_interval = interval;
        self
    }

    /// Sets the maintenance check interval.
    #[must_use]
    pub fn maintenance_interval(mut self, interval: Duration) -> Self {
        self.maintenance_interval = interval;
        self
    }

    /// Sets the schedule check interval.
    #[must_use]
    pub fn schedule_interval(mut self, interval: Duration) -> Self {
        self.schedule_interval = interval;
        self
    }

    /// Sets the descriptor announced at start-up.
    #[must_use]
    pub fn descriptor(mut self, descriptor: DeviceDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if an interval is zero or the broker
    /// URL or device id is empty.
    pub fn build(self) -> Result<SimulatorConfig, ConfigError> {
        for (name, interval) in [
            ("tick_interval", self.params.tick_interval),
            ("maintenance_interval", self.maintenance_interval),
            ("schedule_interval", self.schedule_interval),
        ] {
            if interval.is_zero() {
                return Err(ConfigError::Invalid {
                    name,
                    value: "0".to_string(),
                });
            }
        }
        if self.broker_url.trim().is_empty() {
            return Err(ConfigError::Missing("broker_url"));
        }

        let device_id = self.device_id.unwrap_or_else(DeviceId::generate);
        if device_id.as_str().is_empty() {
            return Err(ConfigError::Missing("device_id"));
        }
        let client_id = self
            .client_id
            .unwrap_or_else(|| device_id.as_str().to_string());

        Ok(SimulatorConfig {
            device_id,
            broker: BrokerConfig {
                url: self.broker_url,
                client_id,
                tls: self.tls,
                keep_alive: self.keep_alive,
            },
            params: self.params,
            maintenance_interval: self.maintenance_interval,
            schedule_interval: self.schedule_interval,
            descriptor: self.descriptor,
        })
    }
}
