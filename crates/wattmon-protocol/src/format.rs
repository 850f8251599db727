//! Response and prompt formatting.

use wattmon_core::SensorKind;

/// Daemon name as printed in the banner and prompt.
pub const DAEMON_NAME: &str = "wattmond";

/// Prompt printed before each request, with no trailing newline.
pub const PROMPT: &str = "wattmond> ";

/// The startup banner line: daemon name and version.
#[must_use]
pub fn banner(version: &str) -> String {
    format!("{DAEMON_NAME} {version}")
}

/// One line of the `monitors` listing: `<name>\t<kind>`.
#[must_use]
pub fn monitor_line(name: &str, kind: SensorKind) -> String {
    format!("{name}\t{kind}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_contains_name_and_version() {
        assert_eq!(banner("0.2.0"), "wattmond 0.2.0");
    }

    #[test]
    fn test_prompt_has_no_trailing_newline() {
        assert_eq!(PROMPT, "wattmond> ");
        assert!(!PROMPT.ends_with('\n'));
    }

    #[test]
    fn test_monitor_line_is_tab_separated() {
        assert_eq!(
            monitor_line("package-0", SensorKind::Float),
            "package-0\tfloat"
        );
    }
}
