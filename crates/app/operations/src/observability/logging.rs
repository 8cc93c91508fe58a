//! Structured logging setup.
//!
//! Uses `tracing-subscriber` with an `EnvFilter`, so `RUST_LOG` overrides the
//! configured level. Output goes to stderr; stdout is reserved for the
//! operator-facing report.

use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Log format for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON format for machine parsing.
    Json,
    /// Human-readable format.
    #[default]
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = std::convert::Infallible;

    /// Parse from string, case-insensitive. Defaults to Pretty for unknown values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        })
    }
}

/// Parse log level from string.
pub fn parse_level(s: &str) -> Level {
    match s.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" | "critical" | "crit" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy()
}

/// Initialize the global subscriber from configuration strings.
pub fn init_logging_from_config(level: &str, format: &str) {
    let format: LogFormat = format.parse().unwrap_or_default();
    init_logging(parse_level(level), format);
}

/// Initialize the global subscriber.
///
/// Later calls are ignored, which keeps tests that share a process harmless.
pub fn init_logging(level: Level, format: LogFormat) {
    let builder = fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    if let Err(e) = result {
        eprintln!("Warning: logging already initialized: {}", e);
    }
}
