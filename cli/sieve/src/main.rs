//! sieve CLI
//!
//! Streams NDJSON from a local file or S3 through a record filter into an
//! output file.

use clap::Parser;
use sv_cli_common::{format_bytes, format_duration, format_number, init_logging};
use sv_error::{ErrorKind, SvError};
use sv_runner::VERBOSE_TARGET;

mod args;
mod run;

use args::Cli;

/// Exit status when `--strict` is set and some lines failed.
const EXIT_RECORD_ERRORS: i32 = 4;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Logs go to stderr, so stdout stays free
    init_logging(args.log_level, &[VERBOSE_TARGET])?;

    let summary = match run::execute(&args).await {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_code(&e));
        }
    };

    let Some(stats) = summary.stats else {
        eprintln!("Source is empty, nothing to process.");
        return Ok(());
    };

    eprintln!();
    eprintln!("Run completed:");
    eprintln!("  Found:      {}", format_number(stats.found));
    eprintln!("  Removed:    {}", format_number(stats.removed));
    eprintln!("  Errors:     {}", format_number(stats.error));
    eprintln!("  Lines:      {}", format_number(stats.lines()));
    eprintln!("  Output:     {}", summary.output.display());
    if let Some(bytes) = summary.output_bytes {
        eprintln!("  Size:       {}", format_bytes(bytes));
    }
    eprintln!("  Duration:   {}", format_duration(summary.duration));

    let secs = summary.duration.as_secs_f64();
    if secs > 0.0 && stats.lines() > 0 {
        eprintln!(
            "  Throughput: {} lines/sec",
            format_number((stats.lines() as f64 / secs) as u64)
        );
    }

    if args.strict && stats.has_errors() {
        std::process::exit(EXIT_RECORD_ERRORS);
    }

    Ok(())
}

/// Map a failed run onto a process exit status.
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<SvError>().map(SvError::kind) {
        Some(ErrorKind::SourceUnavailable) => 2,
        Some(ErrorKind::DecodeError) => 3,
        Some(ErrorKind::SinkWriteError) => 5,
        Some(ErrorKind::RecordError) | Some(ErrorKind::Config) | None => 1,
    }
}
