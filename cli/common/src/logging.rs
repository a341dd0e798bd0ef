//! Logging initialization utilities.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::LogLevel;

/// Initialize logging with the specified level.
///
/// Logs are written to stderr so stdout remains clean for program output.
/// Each entry in `always_on` is a log target that is enabled at `INFO` even
/// when `level` is quieter.
pub fn init_logging(level: LogLevel, always_on: &[&str]) -> Result<()> {
    let level: Level = level.into();

    let mut targets = Targets::new().with_default(level);
    for target in always_on {
        targets = targets.with_target(*target, level.max(Level::INFO));
    }

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(targets)
        .try_init()?;

    Ok(())
}
