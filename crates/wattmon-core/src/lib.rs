//! Wattmon Core - Shared types for powercap power monitoring
//!
//! This crate provides the domain types shared between the daemon
//! (wattmond) and the wire protocol (wattmon-protocol):
//!
//! - [`Sensor`] - the single-operation sensor capability
//! - [`SensorKind`] - value type tag reported over the protocol
//! - [`EnergyReading`] - one cumulative energy sample and the power math
//! - [`PowerCell`] - the atomically published power value
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, `todo!()`, or direct indexing `[i]`.

pub mod cell;
pub mod error;
pub mod kind;
pub mod reading;
pub mod sensor;

// Re-exports for convenience
pub use cell::PowerCell;
pub use error::{SensorError, SensorResult};
pub use kind::SensorKind;
pub use reading::EnergyReading;
pub use sensor::Sensor;
