//! Atomically published power values.

use std::sync::atomic::{AtomicU64, Ordering};

/// The most recently computed power estimate, shared between one writer
/// and any number of readers.
///
/// The value is stored as the bit pattern of an `f64` inside an
/// `AtomicU64`, so a load observes either the previous or the new value
/// in full - never a torn mix of the two.
///
/// # Single-writer discipline
///
/// Exactly one refresh task calls [`PowerCell::publish`]; everything else
/// only calls [`PowerCell::load`]. There is no compare-and-swap because
/// there is nothing to race with on the write side.
#[derive(Debug)]
pub struct PowerCell {
    bits: AtomicU64,
}

impl PowerCell {
    /// Creates a cell holding `watts`.
    #[must_use]
    pub fn new(watts: f64) -> Self {
        Self {
            bits: AtomicU64::new(watts.to_bits()),
        }
    }

    /// Publishes a new power value.
    pub fn publish(&self, watts: f64) {
        self.bits.store(watts.to_bits(), Ordering::Release);
    }

    /// Returns the last published power value.
    #[must_use]
    pub fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }
}

impl Default for PowerCell {
    fn default() -> Self {
        Self::new(0.0)
    }
}
