//! Record processing between the line splitter and the sink.

mod processor;

pub use processor::{LineOutcome, RecordPipeline, VERBOSE_TARGET};
