//! Output side of a run.

mod writer;

pub use writer::SinkWriter;
