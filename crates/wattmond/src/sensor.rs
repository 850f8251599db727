//! Powercap energy sensors.
//!
//! Each sensor owns one powercap source directory and a background
//! refresh task that re-samples the cumulative `energy_uj` counter on a
//! fixed interval, converts consecutive samples into an average power
//! estimate, and publishes it through a [`PowerCell`].
//!
//! Construction performs one synchronous baseline read, so a sensor
//! never exposes an uninitialized value, and returns before the first
//! refresh tick - callers never block on the loop's cadence.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use wattmon_core::{EnergyReading, PowerCell, Sensor, SensorError, SensorKind, SensorResult};

/// Cumulative energy counter file inside a powercap source directory.
pub const ENERGY_COUNTER_FILE: &str = "energy_uj";

/// Human-readable label file inside a powercap source directory.
pub const SOURCE_LABEL_FILE: &str = "name";

/// Default interval between counter samples.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// An energy source exposed through the powercap framework, read as an
/// instantaneous power estimate.
///
/// The display name is the registry key; `source_id` is the stable
/// directory name under the powercap root (e.g. `intel-rapl:0`), kept
/// distinct because labels are not guaranteed unique.
pub struct PowercapEnergySensor {
    name: String,
    source_id: String,
    kind: SensorKind,
    power: Arc<PowerCell>,

    /// Retained so a future graceful shutdown can await the refresh
    /// task; today the cancellation token stops it and the handle is
    /// dropped with the registry at process exit.
    _task: JoinHandle<()>,
}

impl PowercapEnergySensor {
    /// Reads the baseline sample and starts the refresh task.
    ///
    /// Must be called from within a tokio runtime. Fails only if the
    /// baseline counter read fails, in which case the candidate is
    /// excluded from discovery.
    pub fn spawn(
        source_dir: &Path,
        name: String,
        refresh_interval: Duration,
        cancel: CancellationToken,
    ) -> SensorResult<Self> {
        let source_id = source_dir
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| source_dir.display().to_string());
        let counter_path = source_dir.join(ENERGY_COUNTER_FILE);

        let baseline = EnergyReading::now(read_energy_uj(&counter_path)?);
        let power = Arc::new(PowerCell::new(0.0));

        let task = tokio::spawn(refresh_loop(
            counter_path,
            baseline,
            Arc::clone(&power),
            refresh_interval,
            cancel,
            name.clone(),
        ));

        debug!(sensor = %name, source = %source_id, "Sensor started");

        Ok(Self {
            name,
            source_id,
            kind: SensorKind::Float,
            power,
            _task: task,
        })
    }

    /// The powercap directory name backing this sensor.
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// The last published power estimate in watts.
    pub fn power_watts(&self) -> f64 {
        self.power.load()
    }
}

impl Sensor for PowercapEnergySensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SensorKind {
        self.kind
    }

    fn read_value(&self) -> String {
        format!("{}", self.power.load())
    }
}

/// Re-samples the counter forever, publishing one power estimate per tick.
///
/// A failed read skips the tick and leaves the previous baseline in
/// place, so the next successful sample averages over the whole gap.
async fn refresh_loop(
    counter_path: PathBuf,
    mut last: EnergyReading,
    power: Arc<PowerCell>,
    refresh_interval: Duration,
    cancel: CancellationToken,
    name: String,
) {
    let mut tick = interval(refresh_interval);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of a tokio interval completes immediately; consume
    // it so the first sample lands one full interval after the baseline.
    tick.tick().await;

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!(sensor = %name, "Refresh loop shutting down");
                break;
            }

            _ = tick.tick() => {
                match read_energy_uj_async(&counter_path).await {
                    Ok(energy_uj) => {
                        let sample = EnergyReading::now(energy_uj);
                        let watts = sample.power_since(&last);
                        power.publish(watts);
                        last = sample;
                        trace!(sensor = %name, watts, "Published power estimate");
                    }
                    Err(e) => {
                        // Source may have been detached or be mid-update;
                        // treated as transient.
                        debug!(
                            sensor = %name,
                            error = %e,
                            "Counter read failed, retrying next tick"
                        );
                    }
                }
            }
        }
    }
}

/// Reads and parses the counter file synchronously (baseline read).
pub(crate) fn read_energy_uj(path: &Path) -> SensorResult<u64> {
    let contents = std::fs::read_to_string(path).map_err(|source| SensorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_energy_uj(&contents, path)
}

/// Reads and parses the counter file from the refresh task.
async fn read_energy_uj_async(path: &Path) -> SensorResult<u64> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SensorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_energy_uj(&contents, path)
}

fn parse_energy_uj(contents: &str, path: &Path) -> SensorResult<u64> {
    contents
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| SensorError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}
