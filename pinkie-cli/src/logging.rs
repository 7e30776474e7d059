//! Log level selection and subscriber setup.

use std::fmt;

/// Environment variable holding an `EnvFilter` directive. Overrides the flags.
pub const LOG_ENV: &str = "PINKIE_LOG";

/// Logging verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "error" | "err" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }

    /// `value_parser` adapter for clap.
    pub fn from_arg(text: &str) -> Result<Self, String> {
        Self::parse(text).ok_or_else(|| format!("unknown log level '{text}'"))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        f.write_str(text)
    }
}

/// An explicit `--log-level` wins over `-v`, which means debug.
pub fn effective_level(explicit: Option<LogLevel>, verbose: bool) -> LogLevel {
    match explicit {
        Some(level) => level,
        None if verbose => LogLevel::Debug,
        None => LogLevel::Info,
    }
}

/// Install the stderr subscriber. `PINKIE_LOG`, when set and valid, replaces
/// `level` entirely.
pub fn init(level: LogLevel) {
    use std::io::IsTerminal;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let use_ansi = std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();

    let subscriber = fmt::fmt()
        .with_env_filter(filter)
        .with_ansi(use_ansi)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parse_expected_values() {
        assert_eq!(LogLevel::parse("error"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("Info"), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("debug"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("trace"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::parse("loud"), None);
    }

    #[test]
    fn from_arg_reports_bad_level() {
        assert_eq!(LogLevel::from_arg("debug"), Ok(LogLevel::Debug));
        assert_eq!(
            LogLevel::from_arg("loud"),
            Err("unknown log level 'loud'".to_string())
        );
    }

    #[test]
    fn display_is_a_filter_directive() {
        assert_eq!(LogLevel::Trace.to_string(), "trace");
        assert_eq!(LogLevel::Warn.to_string(), "warn");
    }

    #[test]
    fn effective_level_precedence() {
        assert_eq!(effective_level(None, false), LogLevel::Info);
        assert_eq!(effective_level(None, true), LogLevel::Debug);
        assert_eq!(
            effective_level(Some(LogLevel::Error), true),
            LogLevel::Error
        );
    }
}
