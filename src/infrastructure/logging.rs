//! Logging system configuration and initialization
//!
//! Sets up tracing with a console layer and an optional non-blocking file
//! layer. The level comes from the configuration file unless `RUST_LOG`
//! overrides it.

use std::sync::Mutex;

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

// Re-export LoggingConfig from config module
pub use crate::infrastructure::config::LoggingConfig;

// Global guard keeping the non-blocking log writer alive
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<non_blocking::WorkerGuard>> = Mutex::new(Vec::new());
}

/// Initialize the logging system with default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LoggingConfig::default())
}

/// Initialize the logging system from a loaded configuration.
///
/// Safe to call once per process; a second call errors because the global
/// subscriber is already set.
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let console_layer = fmt::layer().with_target(true);

    if config.file_output {
        let appender = rolling::daily(&config.log_dir, "record-grid.log");
        let (writer, guard) = non_blocking(appender);
        LOG_GUARDS
            .lock()
            .expect("log guard mutex poisoned")
            .push(guard);

        let file_layer = fmt::layer().with_writer(writer).with_ansi(false);
        Registry::default()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .context("Failed to initialize logging with file output")?;
    } else {
        Registry::default()
            .with(filter)
            .with(console_layer)
            .try_init()
            .context("Failed to initialize logging")?;
    }

    tracing::info!("Logging initialized at level '{}'", config.level);
    Ok(())
}
