//! Integration tests for the wattmond daemon.
//!
//! These tests drive the real components end to end: a fake powercap
//! tree on disk, the discovery scan, live refresh tasks, and the
//! command server over in-memory pipes.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use wattmon_protocol::Command;
use wattmond::discovery::DiscoveryService;
use wattmond::registry::SensorRegistry;
use wattmond::server::{dispatch, CommandServer};

// ============================================================================
// Constants
// ============================================================================

/// Refresh interval used by tests that wait for a tick.
const FAST_INTERVAL: Duration = Duration::from_millis(20);

/// Deadline for eventually-consistent assertions.
const EVENTUALLY: Duration = Duration::from_secs(5);

/// The expected startup banner line.
fn banner_line() -> String {
    format!("wattmond {}\n", env!("CARGO_PKG_VERSION"))
}

const PROMPT: &str = "wattmond> ";

// ============================================================================
// Test Helpers
// ============================================================================

/// Creates one powercap source directory under `root`.
fn add_source(root: &Path, source_id: &str, label: &str, energy_uj: u64) {
    let dir = root.join(source_id);
    fs::create_dir_all(&dir).expect("create source dir");
    fs::write(dir.join("energy_uj"), format!("{energy_uj}\n")).expect("write counter");
    fs::write(dir.join("name"), format!("{label}\n")).expect("write label");
}

/// Runs discovery over `root` and freezes the registry.
async fn discover(root: &Path, interval: Duration) -> Arc<SensorRegistry> {
    let service = DiscoveryService::new(root, interval, CancellationToken::new());
    let (registry, _) = service.discover().await;
    Arc::new(registry)
}

/// Feeds `input` to a command server over in-memory pipes and returns
/// everything it wrote.
async fn run_session(registry: Arc<SensorRegistry>, input: &str) -> String {
    let (mut client, server_side) = tokio::io::duplex(64 * 1024);
    let (read_half, write_half) = tokio::io::split(server_side);

    let server = CommandServer::new(registry, CancellationToken::new());
    let task = tokio::spawn(async move { server.run(BufReader::new(read_half), write_half).await });

    client.write_all(input.as_bytes()).await.expect("send input");
    client.shutdown().await.expect("close input");

    let mut output = String::new();
    client
        .read_to_string(&mut output)
        .await
        .expect("read output");
    task.await.expect("server task").expect("server result");
    output
}

// ============================================================================
// Protocol Surface
// ============================================================================

#[tokio::test]
async fn test_banner_then_prompt_on_empty_input() {
    let registry = Arc::new(SensorRegistry::new());
    let output = run_session(registry, "").await;
    assert_eq!(output, format!("{}{}", banner_line(), PROMPT));
}

#[tokio::test]
async fn test_monitors_lists_discovered_sensors() {
    let temp = TempDir::new().expect("temp dir");
    add_source(temp.path(), "intel-rapl:0", "package-0", 1_000_000);
    add_source(temp.path(), "intel-rapl:0:0", "core", 500_000);

    let registry = discover(temp.path(), Duration::from_secs(1)).await;
    let output = run_session(registry, "monitors\n").await;

    // Banner, prompt, the listing (name-ordered), then the next prompt.
    let expected = format!(
        "{}{}core\tfloat\npackage-0\tfloat\n{}",
        banner_line(),
        PROMPT,
        PROMPT
    );
    assert_eq!(output, expected);
}

#[tokio::test]
async fn test_value_query_returns_initial_zero() {
    let temp = TempDir::new().expect("temp dir");
    add_source(temp.path(), "intel-rapl:0", "package-0", 1_000_000);

    let registry = discover(temp.path(), Duration::from_secs(1)).await;
    let output = run_session(registry, "package-0\n").await;

    assert_eq!(
        output,
        format!("{}{}0\n{}", banner_line(), PROMPT, PROMPT)
    );
}

#[tokio::test]
async fn test_unknown_token_twice_is_silent_and_changes_nothing() {
    let temp = TempDir::new().expect("temp dir");
    add_source(temp.path(), "intel-rapl:0", "package-0", 1_000_000);

    let registry = discover(temp.path(), Duration::from_secs(1)).await;
    let before: Vec<String> = dispatch(&registry, &Command::Monitors);

    // Two unknown tokens on one line: a prompt per token, no output.
    let output = run_session(Arc::clone(&registry), "bogus bogus\n").await;
    let expected = format!("{}{}{}{}", banner_line(), PROMPT, PROMPT, PROMPT);
    assert_eq!(output, expected);

    let after: Vec<String> = dispatch(&registry, &Command::Monitors);
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_metadata_form_is_reserved_and_silent() {
    let temp = TempDir::new().expect("temp dir");
    add_source(temp.path(), "intel-rapl:0", "package-0", 1_000_000);

    let registry = discover(temp.path(), Duration::from_secs(1)).await;
    let output = run_session(registry, "package-0?\n").await;

    assert_eq!(output, format!("{}{}{}", banner_line(), PROMPT, PROMPT));
}

#[tokio::test]
async fn test_empty_environment_answers_every_query_with_nothing() {
    let temp = TempDir::new().expect("temp dir");
    // Root never created: zero sensors, daemon still serves.
    let registry = discover(&temp.path().join("powercap"), Duration::from_secs(1)).await;
    assert!(registry.is_empty());

    let output = run_session(registry, "monitors\npackage-0\n").await;
    let expected = format!("{}{}{}{}", banner_line(), PROMPT, PROMPT, PROMPT);
    assert_eq!(output, expected);
}

// ============================================================================
// Refresh Loop Through the Protocol
// ============================================================================

#[tokio::test]
async fn test_growing_counter_becomes_positive_power_over_protocol() {
    let temp = TempDir::new().expect("temp dir");
    add_source(temp.path(), "intel-rapl:0", "package-0", 1_000_000);
    let counter = temp.path().join("intel-rapl:0").join("energy_uj");

    let registry = discover(temp.path(), FAST_INTERVAL).await;

    let deadline = Instant::now() + EVENTUALLY;
    let mut energy = 1_000_000u64;
    let mut last_seen = 0.0f64;
    while Instant::now() < deadline {
        energy += 5_000_000;
        fs::write(&counter, format!("{energy}\n")).expect("bump counter");

        let output = run_session(Arc::clone(&registry), "package-0\n").await;
        let value_line = output
            .lines()
            .nth(1)
            .map(|line| line.trim_start_matches(PROMPT))
            .unwrap_or_default();
        last_seen = value_line.parse().expect("decimal value");
        if last_seen > 0.0 {
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }
    assert!(
        last_seen > 0.0,
        "never observed a positive power value, last seen {last_seen}"
    );
}

#[tokio::test]
async fn test_concurrent_listing_and_value_reads_never_tear() {
    let temp = TempDir::new().expect("temp dir");
    add_source(temp.path(), "intel-rapl:0", "package-0", 1_000_000);
    let counter = temp.path().join("intel-rapl:0").join("energy_uj");

    let registry = discover(temp.path(), FAST_INTERVAL).await;

    // Readers hammer the registry while the refresh task publishes.
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                let stop = Instant::now() + Duration::from_millis(300);
                while Instant::now() < stop {
                    let listing = dispatch(&registry, &Command::Monitors);
                    assert_eq!(listing, vec!["package-0\tfloat".to_string()]);

                    let lines = dispatch(&registry, &Command::Query("package-0".to_string()));
                    let value = lines.first().expect("value line");
                    let watts: f64 = value.parse().expect("decimal value");
                    assert!(watts.is_finite() && watts >= 0.0, "torn value: {watts}");
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    // Writer keeps the counter moving so the refresh loop publishes
    // fresh values the whole time.
    let mut energy = 1_000_000u64;
    let stop = Instant::now() + Duration::from_millis(300);
    while Instant::now() < stop {
        energy += 1_000_000;
        fs::write(&counter, format!("{energy}\n")).expect("bump counter");
        sleep(Duration::from_millis(5)).await;
    }

    for reader in readers {
        reader.await.expect("reader task");
    }
}
