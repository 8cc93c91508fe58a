//! Observability infrastructure for the bootstrapper.

pub mod logging;

pub use logging::{init_logging, init_logging_from_config, parse_level, LogFormat};
