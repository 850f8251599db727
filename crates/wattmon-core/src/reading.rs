//! Cumulative energy samples and the energy-to-power computation.

use std::time::Instant;

/// Microjoules per joule.
const MICROJOULES_PER_JOULE: f64 = 1_000_000.0;

/// One sample of a cumulative energy counter.
///
/// The timestamp is taken from the monotonic clock, so the elapsed time
/// between two consecutive samples can never be negative. A zero elapsed
/// interval (two samples inside the clock's resolution) is still possible
/// and is handled by [`EnergyReading::power_since`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnergyReading {
    /// Cumulative energy in microjoules, as exposed by the counter file.
    pub energy_uj: u64,

    /// When the counter was sampled.
    pub taken_at: Instant,
}

impl EnergyReading {
    /// Creates a reading timestamped now.
    #[must_use]
    pub fn now(energy_uj: u64) -> Self {
        Self {
            energy_uj,
            taken_at: Instant::now(),
        }
    }

    /// Creates a reading with an explicit timestamp.
    #[must_use]
    pub fn at(energy_uj: u64, taken_at: Instant) -> Self {
        Self { energy_uj, taken_at }
    }

    /// Average power in watts between `previous` and this sample.
    ///
    /// Defined as `0` when the elapsed interval is degenerate (zero or,
    /// through clock anomalies, unmeasurable) and when the counter has
    /// wrapped or reset (a negative delta). Both cases re-baseline
    /// naturally because the caller stores this sample as the new
    /// `previous`.
    #[must_use]
    pub fn power_since(&self, previous: &EnergyReading) -> f64 {
        let elapsed = match self.taken_at.checked_duration_since(previous.taken_at) {
            Some(d) => d.as_secs_f64(),
            None => return 0.0,
        };
        if elapsed <= 0.0 {
            return 0.0;
        }

        // Counter reset or wraparound: report 0 for this tick.
        let delta_uj = match self.energy_uj.checked_sub(previous.energy_uj) {
            Some(d) => d,
            None => return 0.0,
        };

        (delta_uj as f64 / MICROJOULES_PER_JOULE) / elapsed
    }
}
