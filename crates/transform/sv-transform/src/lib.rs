//! Rhai-scripted record filters for sieve.
//!
//! [`RhaiFilter`] runs a user script once per record. The parsed record is
//! bound to the variable `record`; the script's value is the output record,
//! and returning `()` drops it.
//!
//! # Example
//!
//! ```rust,ignore
//! use sv_transform::{FilterConfig, RhaiFilter};
//!
//! let config = FilterConfig::with_script(r#"
//!     if record.level == "DEBUG" {
//!         return ();
//!     }
//!     record.seen_at = timestamp();
//!     record
//! "#);
//!
//! let filter = RhaiFilter::new(&config)?;
//! ```

mod builtin;
mod config;
mod rhai_filter;

pub use config::FilterConfig;
pub use rhai_filter::RhaiFilter;
