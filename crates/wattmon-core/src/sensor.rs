//! The abstract sensor capability.

use crate::kind::SensorKind;

/// A named source of one textual value.
///
/// This is the whole contract the command server needs: a display name
/// (the registry key), a [`SensorKind`] tag for the `monitors` listing,
/// and a non-blocking read of the current value. Concrete sensors own
/// whatever background machinery keeps that value fresh.
///
/// `read_value` must never block or wait for a refresh to complete; it
/// observes the latest value the sensor has published.
pub trait Sensor: Send + Sync {
    /// The display name, unique within a registry.
    fn name(&self) -> &str;

    /// The value type tag reported by the `monitors` command.
    fn kind(&self) -> SensorKind;

    /// The current value, rendered as the protocol's decimal string.
    fn read_value(&self) -> String;
}
