//! Per-line record processing.

use serde_json::Value;
use sv_error::{ProcessingStage, RecordError, Result, SinkError, SvError};
use sv_reader_ndjson::{Compression, Line, LineSplitter, decode_error};
use sv_traits::RecordFilter;
use sv_types::RunStats;
use tokio::io::AsyncBufRead;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

/// Log target for verbose record echo.
pub const VERBOSE_TARGET: &str = "sieve::verbose";

/// What happened to one input line.
#[derive(Debug)]
pub enum LineOutcome {
    /// The filter kept the record; this value goes to the sink
    Kept(Value),

    /// The filter dropped the record
    Dropped,

    /// The line could not be parsed or the filter failed
    Errored(RecordError),
}

/// Turns lines into output records and owns the run's statistics.
///
/// Each line is parsed as one JSON value and passed through the filter.
/// Per-line failures are counted and logged, never propagated.
pub struct RecordPipeline<'a> {
    filter: &'a dyn RecordFilter,
    verbose: bool,
    stats: RunStats,
}

impl<'a> RecordPipeline<'a> {
    pub fn new(filter: &'a dyn RecordFilter, verbose: bool) -> Self {
        Self {
            filter,
            verbose,
            stats: RunStats::new(),
        }
    }

    /// Statistics accumulated so far.
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Parse and filter one line, updating the counters.
    pub fn process_line(&mut self, line: &Line) -> LineOutcome {
        let record = match parse_line(line) {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    line = line.number,
                    stage = %ProcessingStage::Parse,
                    error = %e,
                    "Skipping unparseable line"
                );
                self.stats.record_error();
                return LineOutcome::Errored(e);
            }
        };

        if self.verbose {
            info!(target: VERBOSE_TARGET, line = line.number, record = %record, "Parsed record");
        }

        match self.filter.apply(record) {
            // A filter yielding JSON null drops the record like `None`
            Ok(Some(Value::Null)) | Ok(None) => {
                trace!(line = line.number, "Record removed");
                self.stats.record_removed();
                LineOutcome::Dropped
            }
            Ok(Some(value)) => {
                self.stats.record_found();
                LineOutcome::Kept(value)
            }
            Err(e) => {
                let err = RecordError::Filter {
                    line: line.number,
                    message: e.to_string(),
                };
                warn!(
                    line = line.number,
                    stage = %ProcessingStage::Filter,
                    filter = self.filter.name(),
                    error = %e,
                    "Filter failed for record"
                );
                self.stats.record_error();
                LineOutcome::Errored(err)
            }
        }
    }

    /// Drive every line of `lines` through the pipeline, sending kept
    /// records to `tx` in input order.
    ///
    /// Sending waits while the channel is full, so the reader never runs more
    /// than the channel's capacity ahead of the sink.
    ///
    /// # Errors
    ///
    /// - [`SvError::Decode`] if the byte stream breaks or gzip data is invalid
    /// - [`SinkError::Disconnected`] if the sink stopped receiving
    pub async fn run<R>(
        &mut self,
        lines: &mut LineSplitter<R>,
        compression: Compression,
        tx: mpsc::Sender<Value>,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    let err = decode_error(e, compression);
                    error!(
                        after_line = lines.lines_read(),
                        stage = %ProcessingStage::LineRead,
                        error = %err,
                        "Source stream failed"
                    );
                    return Err(SvError::Decode(err));
                }
            };

            if let LineOutcome::Kept(value) = self.process_line(&line) {
                tx.send(value)
                    .await
                    .map_err(|_| SvError::Sink(SinkError::Disconnected))?;
            }
        }

        debug!(lines = lines.lines_read(), stats = %self.stats, "Source exhausted");
        Ok(())
    }
}

fn parse_line(line: &Line) -> std::result::Result<Value, RecordError> {
    serde_json::from_slice(&line.bytes).map_err(|e| RecordError::Parse {
        line: line.number,
        message: e.to_string(),
    })
}
