//! Parsing incoming command tokens.

/// The listing command token.
pub const MONITORS: &str = "monitors";

/// One parsed request token.
///
/// Parsing is infallible: any token that is not `monitors` and does not
/// use the reserved `name?` metadata syntax is a value query, and whether
/// it names a registered sensor is decided at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `monitors` - list every registered sensor with its kind.
    Monitors,

    /// A bare token - read the named sensor's current value.
    Query(String),

    /// `name?` - reserved per-sensor metadata query.
    ///
    /// The syntax is claimed so nothing else can ever be implemented
    /// under it, but the daemon currently answers it with no output.
    Metadata(String),
}

impl Command {
    /// Parses one whitespace-delimited token.
    #[must_use]
    pub fn parse(token: &str) -> Command {
        if token == MONITORS {
            Command::Monitors
        } else if let Some(name) = token.strip_suffix('?') {
            Command::Metadata(name.to_string())
        } else {
            Command::Query(token.to_string())
        }
    }
}
