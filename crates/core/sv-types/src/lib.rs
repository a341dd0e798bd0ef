//! Core data types for sieve.
//!
//! This crate defines the types shared across sieve components:
//! - [`RunOptions`] - Per-run configuration, built once and read-only afterwards
//! - [`ObjectStoreConfig`] - Client settings passed through to object storage
//! - [`RunStats`] - Found/removed/error counters produced by a run

mod options;
mod stats;

pub use options::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_OUTPUT_DESTINATION, DEFAULT_READ_BUFFER_SIZE,
    ObjectStoreConfig, RunOptions,
};
pub use stats::RunStats;
