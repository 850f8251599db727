//! Sensor value type tags.

use std::fmt;

/// The value type a sensor reports over the protocol.
///
/// Every powercap energy sensor today is [`SensorKind::Float`];
/// [`SensorKind::Integer`] is reserved for future sensor variants so the
/// protocol's `monitors` listing does not need to change shape when one
/// appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Decimal-valued sensor (e.g. watts).
    Float,
    /// Integer-valued sensor (reserved).
    Integer,
}

impl SensorKind {
    /// Returns the protocol string for this kind, as printed in the
    /// `monitors` listing.
    pub const fn as_str(self) -> &'static str {
        match self {
            SensorKind::Float => "float",
            SensorKind::Integer => "integer",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
