//! Logging via `tracing` and `tracing-subscriber`.
//!
//! Diagnostics go to stderr so they never mix with command output.
//!
//! # Log Levels
//!
//! - `warn` (default): failed saves, storage fallbacks, cycle guard anomalies
//! - `info` (`-v`): committed moves
//! - `debug` (`-vv`): validation verdicts, state transitions, config resolution
//! - `trace` (`-vvv`): everything else
//!
//! `RUST_LOG` overrides the verbosity flag entirely.

use std::io;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub with_target: bool,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            with_target: false,
            with_ansi: console::colors_enabled_stderr(),
        }
    }
}

impl LogConfig {
    /// Map the `-v` count to a level.
    #[must_use]
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            // Module paths help once the output gets chatty.
            with_target: verbosity >= 2,
            ..Default::default()
        }
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(config: &LogConfig) {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(config.with_target)
        .without_time();

    let _ = tracing_subscriber::registry()
        .with(build_env_filter(config.level))
        .with(layer)
        .try_init();
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// Our crates at `level`, everything else at warn.
fn default_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    format!("warn,shelf={level},shelfapp={level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(LogConfig::from_verbosity(0).level, Level::WARN);
        assert_eq!(LogConfig::from_verbosity(1).level, Level::INFO);
        assert_eq!(LogConfig::from_verbosity(2).level, Level::DEBUG);
        assert_eq!(LogConfig::from_verbosity(9).level, Level::TRACE);
    }

    #[test]
    fn test_target_shown_from_debug_up() {
        assert!(!LogConfig::from_verbosity(1).with_target);
        assert!(LogConfig::from_verbosity(2).with_target);
    }

    #[test]
    fn test_default_directives_scope_our_crates() {
        assert_eq!(
            default_directives(Level::DEBUG),
            "warn,shelf=debug,shelfapp=debug"
        );
    }
}
