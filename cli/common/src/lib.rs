//! Shared utilities for sieve CLI binaries.
//!
//! Log level selection, stderr logging setup, and human-readable number
//! formatting for run summaries.

pub mod args;
pub mod format;
pub mod logging;

pub use args::LogLevel;
pub use format::{format_bytes, format_duration, format_number};
pub use logging::init_logging;
