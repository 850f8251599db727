//! Wire protocol for the wattmond stdin/stdout command loop.
//!
//! The protocol is a prompt-driven text exchange with one whitespace
//! delimited token per request:
//!
//! ```text
//! wattmond 0.2.0
//! wattmond> monitors
//! core        float
//! package-0   float
//! wattmond> package-0
//! 1.25
//! wattmond> package-0?
//! wattmond>
//! ```
//!
//! (`monitors` columns are tab-separated; the `name?` metadata form is
//! reserved and currently answered with no output.)

pub mod command;
pub mod format;

pub use command::Command;
pub use format::{banner, monitor_line, DAEMON_NAME, PROMPT};
