//! NDJSON source handling for sieve.
//!
//! This crate covers everything between a source identifier and a sequence
//! of input lines:
//!
//! - [`SourceResolver`] classifies an identifier ([`SourceDescriptor`]) and
//!   opens either a local file or a remote object through an [`ObjectSource`]
//! - [`S3ObjectSource`] is the `object_store`-backed S3 client
//! - [`decode`] optionally wraps the source in a streaming gzip decoder
//! - [`LineSplitter`] yields one [`Line`] at a time with bounded memory
//!
//! # Example
//!
//! ```ignore
//! use sv_reader_ndjson::{Compression, LineSplitter, SourceResolver, decode};
//!
//! let resolver = SourceResolver::from_config(&options.object_store);
//! if let Some(reader) = resolver.resolve("s3://bucket/events.ndjson.gz").await? {
//!     let mut lines = LineSplitter::new(decode(reader, Compression::Gzip, 8192));
//!     while let Some(line) = lines.next_line().await? {
//!         println!("{}: {} bytes", line.number, line.bytes.len());
//!     }
//! }
//! ```
//!
//! [`ObjectSource`]: sv_traits::ObjectSource

mod codec;
mod lines;
mod s3;
mod source;
mod store;

pub use codec::{Compression, DecodedReader, decode, decode_error};
pub use lines::{Line, LineSplitter};
pub use s3::{S3_PREFIX, parse_s3_location};
pub use source::{SourceDescriptor, SourceReader, SourceResolver};
pub use store::S3ObjectSource;
