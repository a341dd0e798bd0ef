//! sv-runner - streaming NDJSON filter runs for sieve.
//!
//! This crate wires the source side ([`sv_reader_ndjson`]) to a record
//! filter and an output file:
//!
//! - [`RecordPipeline`] parses each line, applies the filter and keeps the
//!   found/removed/error counters
//! - [`SinkWriter`] appends kept records to the destination, optionally gzip
//!   compressed
//! - [`run`] and [`Runner`] execute one complete run and return its
//!   [`RunStats`](sv_types::RunStats)
//!
//! # Example
//!
//! ```ignore
//! use sv_runner::run;
//! use sv_traits::FnFilter;
//! use sv_types::RunOptions;
//!
//! let options = RunOptions::new()
//!     .with_decompress_input(true)
//!     .with_output_destination("./even.ld-json")
//!     .with_clear_output_on_start(true);
//!
//! let even = FnFilter::new(|record| {
//!     let a = record.get("a")?.as_i64()?;
//!     (a % 2 == 0).then_some(record)
//! });
//!
//! match run("s3://bucket/events.ndjson.gz", &options, &even).await? {
//!     Some(stats) => eprintln!("{stats}"),
//!     None => eprintln!("nothing to process"),
//! }
//! ```

pub mod pipeline;
pub mod runner;
pub mod sink;

pub use pipeline::{LineOutcome, RecordPipeline, VERBOSE_TARGET};
pub use runner::{Runner, run};
pub use sink::SinkWriter;
