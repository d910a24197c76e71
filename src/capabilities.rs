// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Static device descriptor announced at start-up.
//!
//! The simulator publishes a [`DeviceDescriptor`] once on
//! `cleaner/device/register` so a backend can learn what the device is and
//! which features it supports before the first telemetry arrives.

/// Default model name of the simulated cleaner.
pub const DEFAULT_MODEL: &str = "SmartClean Pro X1";

/// Default firmware version of the simulated cleaner.
pub const DEFAULT_FIRMWARE: &str = "2.1.0";

/// Features of a cleaner.
///
/// # Examples
///
/// ```
/// use cleaner_sim::Capabilities;
///
/// let full = Capabilities::default();
/// assert!(full.mapping);
/// assert_eq!(full.names()[0], "mapping");
///
/// let basic = Capabilities::builder().with_bump_detection().build();
/// assert_eq!(basic.names(), vec!["bump_detection"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
// Each flag is an independent feature.
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// Builds a room map while cleaning.
    pub mapping: bool,

    /// Starts runs on a weekly schedule.
    pub scheduling: bool,

    /// Detects drops such as stairs.
    pub cliff_detection: bool,

    /// Detects collisions with the front bumper.
    pub bump_detection: bool,

    /// Reports when the dust bin is full.
    pub dust_bin_monitoring: bool,

    /// Tracks filter and brush wear.
    pub maintenance_tracking: bool,

    /// Supports auto, spot, edge and manual cleaning modes.
    pub cleaning_modes: bool,
}

impl Default for Capabilities {
    /// Everything the simulator emulates.
    fn default() -> Self {
        Self {
            mapping: true,
            scheduling: true,
            cliff_detection: true,
            bump_detection: true,
            dust_bin_monitoring: true,
            maintenance_tracking: true,
            cleaning_modes: true,
        }
    }
}

impl Capabilities {
    /// Returns a builder starting from no capabilities.
    #[must_use]
    pub fn builder() -> CapabilitiesBuilder {
        CapabilitiesBuilder::new()
    }

    /// Returns the wire names of the supported features, in a fixed order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        [
            (self.mapping, "mapping"),
            (self.scheduling, "scheduling"),
            (self.cliff_detection, "cliff_detection"),
            (self.bump_detection, "bump_detection"),
            (self.dust_bin_monitoring, "dust_bin_monitoring"),
            (self.maintenance_tracking, "maintenance_tracking"),
            (self.cleaning_modes, "cleaning_modes"),
        ]
        .into_iter()
        .filter_map(|(enabled, name)| enabled.then_some(name))
        .collect()
    }
}

/// Builder for custom [`Capabilities`].
#[derive(Debug, Clone)]
pub struct CapabilitiesBuilder {
    capabilities: Capabilities,
}

impl CapabilitiesBuilder {
    /// Creates a builder with every capability disabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            capabilities: Capabilities {
                mapping: false,
                scheduling: false,
                cliff_detection: false,
                bump_detection: false,
                dust_bin_monitoring: false,
                maintenance_tracking: false,
                cleaning_modes: false,
            },
        }
    }

    /// Enables room mapping.
    #[must_use]
    pub fn with_mapping(mut self) -> Self {
        self.capabilities.mapping = true;
        self
    }

    /// Enables scheduled cleaning.
    #[must_use]
    pub fn with_scheduling(mut self) -> Self {
        self.capabilities.scheduling = true;
        self
    }

    /// Enables cliff detection.
    #[must_use]
    pub fn with_cliff_detection(mut self) -> Self {
        self.capabilities.cliff_detection = true;
        self
    }

    /// Enables bump detection.
    #[must_use]
    pub fn with_bump_detection(mut self) -> Self {
        self.capabilities.bump_detection = true;
        self
    }

    /// Enables dust bin monitoring.
    #[must_use]
    pub fn with_dust_bin_monitoring(mut self) -> Self {
        self.capabilities.dust_bin_monitoring = true;
        self
    }

    /// Enables maintenance tracking.
    #[must_use]
    pub fn with_maintenance_tracking(mut self) -> Self {
        self.capabilities.maintenance_tracking = true;
        self
    }

    /// Enables selectable cleaning modes.
    #[must_use]
    pub fn with_cleaning_modes(mut self) -> Self {
        self.capabilities.cleaning_modes = true;
        self
    }

    /// Builds the capabilities.
    #[must_use]
    pub fn build(self) -> Capabilities {
        self.capabilities
    }
}

impl Default for CapabilitiesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// What the device announces about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Model name.
    pub model: String,
    /// Firmware version.
    pub firmware: String,
    /// Supported features.
    pub capabilities: Capabilities,
}

impl Default for DeviceDescriptor {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            firmware: DEFAULT_FIRMWARE.to_string(),
            capabilities: Capabilities::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_lists_every_feature() {
        assert_eq!(
            Capabilities::default().names(),
            vec![
                "mapping",
                "scheduling",
                "cliff_detection",
                "bump_detection",
                "dust_bin_monitoring",
                "maintenance_tracking",
                "cleaning_modes",
            ]
        );
    }

    #[test]
    fn builder_starts_empty() {
        assert!(CapabilitiesBuilder::new().build().names().is_empty());
    }

    #[test]
    fn builder_enables_selected() {
        let caps = Capabilities::builder()
            .with_mapping()
            .with_cliff_detection()
            .with_maintenance_tracking()
            .build();

        assert!(caps.mapping);
        assert!(!caps.scheduling);
        assert_eq!(
            caps.names(),
            vec!["mapping", "cliff_detection", "maintenance_tracking"]
        );
    }

    #[test]
    fn descriptor_defaults() {
        let descriptor = DeviceDescriptor::default();
        assert_eq!(descriptor.model, DEFAULT_MODEL);
        assert_eq!(descriptor.firmware, DEFAULT_FIRMWARE);
    }
}
