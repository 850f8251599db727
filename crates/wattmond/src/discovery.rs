//! Powercap source discovery - finds energy sensors at startup.
//!
//! Scans the immediate subdirectories of the powercap root (by default
//! `/sys/class/powercap`) and builds one [`PowercapEnergySensor`] per
//! valid source. The root mixes energy sources with control entries, so
//! a subdirectory only counts as a source when it carries both the
//! `energy_uj` counter and the `name` label.
//!
//! # Async Safety
//!
//! The filesystem scan runs via `spawn_blocking` to avoid blocking the
//! async runtime.
//!
//! # Panic-Free Guarantees
//!
//! This module follows the panic-free policy:
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - A missing or unreadable root yields an empty registry, never a crash
//! - Per-candidate failures exclude only that candidate

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::registry::SensorRegistry;
use crate::sensor::{PowercapEnergySensor, ENERGY_COUNTER_FILE, SOURCE_LABEL_FILE};

/// Default powercap root directory on Linux.
pub const DEFAULT_POWERCAP_ROOT: &str = "/sys/class/powercap";

/// Errors that can occur during discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The powercap root is missing or unreadable. Recoverable: the
    /// daemon starts with zero sensors.
    #[error("powercap root {path} is not accessible: {reason}")]
    RootUnavailable { path: PathBuf, reason: String },
}

/// Result of a discovery run.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscoveryResult {
    /// Number of sensors successfully registered
    pub discovered: u32,
    /// Number of valid-looking candidates excluded by a failed read
    pub failed: u32,
}

/// A powercap subdirectory that carries both required files.
#[derive(Debug, Clone)]
struct Candidate {
    /// Source directory under the powercap root
    dir: PathBuf,
    /// Directory name, kept as the sensor's stable source id
    source_id: String,
    /// Trimmed contents of the label file, used as the display name
    label: String,
}

/// Service for discovering powercap energy sources.
///
/// Runs once at startup, before the command server; the registry it
/// returns is read-only from then on.
pub struct DiscoveryService {
    root: PathBuf,
    refresh_interval: Duration,
    cancel: CancellationToken,
}

impl DiscoveryService {
    /// Creates a discovery service scanning `root`.
    ///
    /// `refresh_interval` and `cancel` are handed to every sensor the
    /// scan constructs.
    #[must_use]
    pub fn new(
        root: impl Into<PathBuf>,
        refresh_interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            root: root.into(),
            refresh_interval,
            cancel,
        }
    }

    /// Scans the powercap root and builds the sensor registry.
    ///
    /// Every failure mode short of a runtime error is absorbed here:
    /// a missing root or a failed candidate read is logged and the scan
    /// carries on (or returns an empty registry). The daemon must come
    /// up regardless of what the platform exposes.
    pub async fn discover(&self) -> (SensorRegistry, DiscoveryResult) {
        let mut registry = SensorRegistry::new();
        let mut result = DiscoveryResult::default();

        let root = self.root.clone();
        let candidates = match tokio::task::spawn_blocking(move || scan_candidates(&root)).await {
            Ok(Ok(c)) => c,
            Ok(Err(e)) => {
                warn!(error = %e, "Powercap scan failed, starting with no sensors");
                return (registry, result);
            }
            Err(e) => {
                warn!(error = %e, "Powercap scan task panicked");
                return (registry, result);
            }
        };

        if candidates.is_empty() {
            debug!(root = %self.root.display(), "No powercap energy sources found");
            return (registry, result);
        }

        for candidate in candidates {
            match PowercapEnergySensor::spawn(
                &candidate.dir,
                candidate.label.clone(),
                self.refresh_interval,
                self.cancel.child_token(),
            ) {
                Ok(sensor) => {
                    debug!(
                        sensor = %candidate.label,
                        source = %candidate.source_id,
                        "Discovered energy sensor"
                    );
                    registry.insert(Box::new(sensor));
                    result.discovered += 1;
                }
                Err(e) => {
                    // Baseline read failed after the existence check;
                    // the candidate is excluded, the scan continues.
                    debug!(
                        source = %candidate.source_id,
                        error = %e,
                        "Excluding candidate, baseline read failed"
                    );
                    result.failed += 1;
                }
            }
        }

        if result.discovered > 0 || result.failed > 0 {
            info!(
                discovered = result.discovered,
                failed = result.failed,
                "Discovery complete"
            );
        }

        (registry, result)
    }
}

/// Enumerates valid powercap candidates under `root`.
///
/// This function performs blocking I/O and should be called via
/// `spawn_blocking`.
fn scan_candidates(root: &Path) -> Result<Vec<Candidate>, DiscoveryError> {
    let entries = std::fs::read_dir(root).map_err(|e| DiscoveryError::RootUnavailable {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut candidates = Vec::new();
    for entry in entries.flatten() {
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }

        // Control entries under the root lack one of the two files;
        // skipping them is normal, not an error.
        if !dir.join(ENERGY_COUNTER_FILE).is_file() || !dir.join(SOURCE_LABEL_FILE).is_file() {
            debug!(candidate = %dir.display(), "Skipping, not an energy source");
            continue;
        }

        let source_id = entry.file_name().to_string_lossy().into_owned();
        let label = match read_label(&dir.join(SOURCE_LABEL_FILE)) {
            Ok(label) => label,
            Err(e) => {
                debug!(source = %source_id, error = %e, "Skipping, label unreadable");
                continue;
            }
        };

        candidates.push(Candidate {
            dir,
            source_id,
            label,
        });
    }

    Ok(candidates)
}

/// Reads the label file's entire trimmed contents.
fn read_label(path: &Path) -> std::io::Result<String> {
    Ok(std::fs::read_to_string(path)?.trim().to_string())
}
