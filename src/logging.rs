use crate::config::LoggingSettings;
use crate::error::{ProcessingError, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Install the global subscriber: stderr always, plus a plain-text file
/// layer when `log_file` is given. `verbose` forces `debug`.
pub fn init(verbose: bool, log_file: Option<&Path>, settings: &LoggingSettings) -> Result<()> {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        parse_level(&settings.level)?
    };

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(level);

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(level),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ProcessingError::Config(format!("Failed to initialise logging: {}", e)))
}

pub fn parse_level(level: &str) -> Result<LevelFilter> {
    level
        .parse::<LevelFilter>()
        .map_err(|e| ProcessingError::Config(format!("Invalid log level '{}': {}", level, e)))
}
