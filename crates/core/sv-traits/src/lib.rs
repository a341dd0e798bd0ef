//! Core traits for sieve.
//!
//! This crate defines the seams between the pipeline and its collaborators:
//! - [`RecordFilter`] - The caller-supplied per-record filter/transform
//! - [`ObjectSource`] - The object storage client that opens remote sources

mod filter;
mod source;

pub use filter::{FilterChain, FnFilter, IdentityFilter, RecordFilter, TryFnFilter};
pub use source::{ByteStream, ObjectSource};
