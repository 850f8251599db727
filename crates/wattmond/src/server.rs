//! The stdin/stdout command loop.
//!
//! The server prints the startup banner once, then repeats: print the
//! prompt, read one whitespace-delimited token, dispatch it against the
//! registry, write the response lines. Exactly one request is in flight
//! at a time; the loop suspends only while waiting for input.
//!
//! Responses:
//! - `monitors` - one `<name>\t<kind>` line per registered sensor
//! - a registered sensor name - one line with its current value
//! - the reserved `name?` metadata form, and anything unrecognized - no
//!   output
//!
//! End of input ends the loop; so does process-wide cancellation.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use wattmon_protocol::{banner, monitor_line, Command, PROMPT};

use crate::registry::SensorRegistry;

/// Errors that can occur in the command loop.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("command stream error: {0}")]
    Io(#[from] std::io::Error),
}

/// The synchronous read-eval-print server over the sensor registry.
pub struct CommandServer {
    registry: Arc<SensorRegistry>,
    cancel: CancellationToken,
}

impl CommandServer {
    /// Creates a server over a populated (and now frozen) registry.
    pub fn new(registry: Arc<SensorRegistry>, cancel: CancellationToken) -> Self {
        Self { registry, cancel }
    }

    /// Runs the command loop until end of input or cancellation.
    ///
    /// Generic over the streams so tests can drive it with in-memory
    /// pipes; the daemon passes stdin/stdout.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> Result<(), ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        output
            .write_all(banner(env!("CARGO_PKG_VERSION")).as_bytes())
            .await?;
        output.write_all(b"\n").await?;

        let mut tokens = TokenReader::new(input);

        loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;

            let token = tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    info!("Command server shutting down");
                    break;
                }

                token = tokens.next_token() => token?,
            };

            let Some(token) = token else {
                debug!("Command stream closed");
                break;
            };

            let command = Command::parse(&token);
            for line in dispatch(&self.registry, &command) {
                output.write_all(line.as_bytes()).await?;
                output.write_all(b"\n").await?;
            }
            output.flush().await?;
        }

        output.flush().await?;
        Ok(())
    }
}

/// Produces the response lines for one command.
///
/// An empty vector means no output - the protocol's answer for the
/// reserved metadata form and for tokens that match nothing.
pub fn dispatch(registry: &SensorRegistry, command: &Command) -> Vec<String> {
    match command {
        Command::Monitors => registry
            .iter()
            .map(|sensor| monitor_line(sensor.name(), sensor.kind()))
            .collect(),
        Command::Query(name) => match registry.get(name) {
            Some(sensor) => vec![sensor.read_value()],
            None => Vec::new(),
        },
        // Reserved: parsed so the syntax can never be repurposed, but
        // currently answered with no output.
        Command::Metadata(_) => Vec::new(),
    }
}

/// Yields whitespace-delimited tokens from a line-based reader.
///
/// A line may carry several tokens; each is handed out in order, so the
/// prompt/dispatch cycle runs once per token just as it would for one
/// token per line.
struct TokenReader<R> {
    lines: Lines<R>,
    pending: VecDeque<String>,
}

impl<R: AsyncBufRead + Unpin> TokenReader<R> {
    fn new(input: R) -> Self {
        Self {
            lines: input.lines(),
            pending: VecDeque::new(),
        }
    }

    /// Next token, or `None` at end of input.
    async fn next_token(&mut self) -> std::io::Result<Option<String>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }
            match self.lines.next_line().await? {
                Some(line) => self
                    .pending
                    .extend(line.split_whitespace().map(str::to_string)),
                None => return Ok(None),
            }
        }
    }
}
