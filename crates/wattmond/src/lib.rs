//! Wattmon Daemon - powercap sensor registry and command server
//!
//! This crate provides the core infrastructure for the wattmond daemon:
//! - `discovery` - scans the powercap root for energy sources at startup
//! - `sensor` - energy-to-power sensors with per-sensor refresh tasks
//! - `registry` - the post-discovery, read-only sensor registry
//! - `server` - the stdin/stdout command loop
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     wattmond daemon                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  ┌─────────────────┐      ┌─────────────────────────────┐   │
//! │  │ DiscoveryService│─────▶│      SensorRegistry         │   │
//! │  │ (startup scan)  │      │  (name -> Sensor, frozen)   │   │
//! │  └─────────────────┘      └──────────────┬──────────────┘   │
//! │           │ spawns                       │ lookups          │
//! │           ▼                              ▼                  │
//! │  ┌─────────────────┐      ┌─────────────────────────────┐   │
//! │  │  refresh tasks  │─────▶│       CommandServer         │   │
//! │  │  (1 per sensor) │ cell │     (stdin/stdout loop)     │   │
//! │  └─────────────────┘      └─────────────────────────────┘   │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The registry is written exactly once, during discovery, and only read
//! afterwards. Each sensor's power value crosses tasks through a
//! [`wattmon_core::PowerCell`], so the command server never observes a
//! torn value.
//!
//! # Panic-Free Guarantees
//!
//! All production code in this crate follows the panic-free policy:
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - All fallible operations return `Result` or `Option`
//! - Read failures inside refresh loops skip the tick, never the daemon

pub mod discovery;
pub mod registry;
pub mod sensor;
pub mod server;
