//! Run orchestration.

use crate::pipeline::RecordPipeline;
use crate::sink::SinkWriter;
use std::time::Instant;
use sv_error::{ProcessingStage, Result, SvError};
use sv_reader_ndjson::{Compression, LineSplitter, SourceResolver, decode};
use sv_traits::RecordFilter;
use sv_types::{RunOptions, RunStats};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Executes runs against one source resolver.
///
/// A run streams one source through the filter into the output destination:
///
/// ```text
/// resolve ──▶ decompress ──▶ split lines ──▶ parse + filter ══▶ write ──▶ compress ──▶ file
///                                                            bounded
///                                                            channel
/// ```
///
/// The producer and the sink run cooperatively on the calling task. The
/// channel holds at most `options.channel_capacity` records, so a slow
/// destination stalls reading instead of growing memory.
pub struct Runner {
    resolver: SourceResolver,
}

impl Runner {
    pub fn new(resolver: SourceResolver) -> Self {
        Self { resolver }
    }

    /// Runner with the default object storage client for `options`.
    pub fn from_options(options: &RunOptions) -> Self {
        Self::new(SourceResolver::from_config(&options.object_store))
    }

    /// Process `source` into `options.output_destination`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(stats))` - the source was fully consumed and the output closed
    /// - `Ok(None)` - the source is a remote object with no body; nothing was touched
    /// - `Err(e)` - the run failed; see [`SvError::kind`]
    ///
    /// The source is resolved before the destination is opened, so an
    /// unavailable source leaves existing output alone. After any later fatal
    /// error this run's partial output is discarded.
    pub async fn run(
        &self,
        source: &str,
        options: &RunOptions,
        filter: &dyn RecordFilter,
    ) -> Result<Option<RunStats>> {
        options.validate().map_err(SvError::Config)?;

        let start = Instant::now();
        let destination = options.output_destination.display().to_string();

        info!(
            source = source,
            output = %destination,
            filter = filter.name(),
            "Starting run"
        );

        let reader = match self.resolver.resolve(source).await {
            Ok(Some(reader)) => reader,
            Ok(None) => {
                info!(source = source, "Source is empty, nothing to process");
                return Ok(None);
            }
            Err(e) => {
                error!(
                    source = source,
                    stage = %ProcessingStage::SourceOpen,
                    error = %e,
                    "Failed to open source"
                );
                return Err(e);
            }
        };

        let input = Compression::from_flag(options.decompress_input);
        let output = Compression::from_flag(options.compress_output);

        let mut writer = SinkWriter::open(
            &options.output_destination,
            options.clear_output_on_start,
            output,
        )
        .await
        .map_err(|e| {
            error!(output = %destination, error = %e, "Failed to open output");
            SvError::Sink(e)
        })?;

        let mut lines = LineSplitter::new(decode(reader, input, options.read_buffer_size));
        let mut pipeline = RecordPipeline::new(filter, options.verbose);
        let (tx, rx) = mpsc::channel(options.channel_capacity);

        let (produced, drained) = tokio::join!(
            pipeline.run(&mut lines, input, tx),
            writer.drain(rx)
        );

        // A sink failure shows up on the producer side as a disconnect;
        // report the sink's own error.
        let failure = match (produced, drained) {
            (_, Err(e)) => {
                error!(
                    output = %destination,
                    stage = %ProcessingStage::SinkWrite,
                    error = %e,
                    "Failed to write output"
                );
                Some(SvError::Sink(e))
            }
            (Err(e), Ok(_)) => Some(e),
            (Ok(()), Ok(written)) => {
                debug!(records = written, "Sink drained");
                None
            }
        };

        if let Some(err) = failure {
            discard(writer).await;
            return Err(err);
        }

        if let Err(e) = writer.close().await {
            error!(
                output = %destination,
                stage = %ProcessingStage::SinkClose,
                error = %e,
                "Failed to close output"
            );
            discard(writer).await;
            return Err(SvError::Sink(e));
        }

        let stats = pipeline.stats();
        let duration = start.elapsed();

        info!(
            source = source,
            output = %destination,
            found = stats.found,
            removed = stats.removed,
            errors = stats.error,
            lines = lines.lines_read(),
            duration_ms = duration.as_millis() as u64,
            "Run complete"
        );

        Ok(Some(stats))
    }
}

async fn discard(writer: SinkWriter) {
    let path = writer.path().display().to_string();
    if let Err(e) = writer.abort().await {
        warn!(output = %path, error = %e, "Failed to discard partial output");
    }
}

/// Process `source` into `options.output_destination` with the default
/// object storage client.
///
/// See [`Runner::run`].
pub async fn run(
    source: &str,
    options: &RunOptions,
    filter: &dyn RecordFilter,
) -> Result<Option<RunStats>> {
    Runner::from_options(options).run(source, options, filter).await
}
