//! The post-discovery sensor registry.
//!
//! The registry maps sensor display names to sensors. It is populated
//! exactly once, by [`crate::discovery::DiscoveryService`], before the
//! command server starts, and is never mutated afterwards - concurrent
//! lookups while refresh tasks publish new values are safe because the
//! map itself is frozen and each value crosses tasks through a
//! [`wattmon_core::PowerCell`].
//!
//! A `BTreeMap` keeps the `monitors` listing deterministic (sorted by
//! display name). The protocol guarantees no particular order, so this
//! is a convenience, not a contract.

use std::collections::BTreeMap;

use tracing::warn;

use wattmon_core::Sensor;

/// Mapping from sensor display name to sensor.
#[derive(Default)]
pub struct SensorRegistry {
    sensors: BTreeMap<String, Box<dyn Sensor>>,
}

impl SensorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a sensor under its display name.
    ///
    /// Powercap zones are not required to carry unique labels; a
    /// duplicate name replaces the earlier sensor (last write wins) and
    /// is logged as a diagnostic, not treated as an error.
    pub fn insert(&mut self, sensor: Box<dyn Sensor>) {
        let name = sensor.name().to_string();
        if self.sensors.insert(name.clone(), sensor).is_some() {
            warn!(sensor = %name, "Duplicate sensor name, keeping the later source");
        }
    }

    /// Looks up a sensor by exact display name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Sensor> {
        self.sensors.get(name).map(|s| &**s)
    }

    /// Iterates sensors in display-name order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Sensor> {
        self.sensors.values().map(|s| &**s)
    }

    /// Number of registered sensors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// Returns true when discovery found no sensors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}
