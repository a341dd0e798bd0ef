//! CLI argument definitions for sieve.

use clap::Parser;
use std::path::PathBuf;
pub use sv_cli_common::LogLevel;

/// Stream newline-delimited JSON through a record filter.
///
/// Reads SOURCE line by line, optionally gunzipping it, parses each line as
/// JSON, runs it through the filter script, and appends every kept record to
/// the output file.
///
/// ## Examples
///
/// Keep records with an even `a`, replacing any previous output:
///   sieve events.ndjson --clear --script 'if record.a % 2 == 0 { record } else { () }'
///
/// Chain scripts, each seeing the previous script's output:
///   sieve events.ndjson --script 'record.level = to_uppercase(record.level); record' \
///     --script 'if record.level == "DEBUG" { () } else { record }'
///
/// Gzipped object in S3 to a gzipped local file:
///   sieve s3://logs/2024/01/app.ndjson.gz --inflate --deflate -o app.ld-json.gz
///
/// Against LocalStack:
///   sieve s3://test-bucket/in.ndjson --s3-endpoint http://localhost:4566 --allow-http
#[derive(Parser, Debug)]
#[command(name = "sieve")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Source to read: a local path, file:// URL, or s3://bucket/key
    pub source: String,

    // === Output ===
    /// Output file [default: ./tmp-output.ld-json]
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Clear the output file before writing instead of appending
    #[arg(long)]
    pub clear: bool,

    /// Gunzip the source
    #[arg(long)]
    pub inflate: bool,

    /// Gzip the output
    #[arg(long)]
    pub deflate: bool,

    /// Echo every parsed record to stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,

    // === Filter ===
    /// Inline Rhai filter script; `record` holds the parsed line.
    /// Repeat to chain scripts; a record dropped by one skips the rest
    #[arg(long, conflicts_with = "script_file")]
    pub script: Vec<String>,

    /// Path to a Rhai filter script
    #[arg(long)]
    pub script_file: Option<PathBuf>,

    /// YAML file with run options and filter settings; flags override it
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    // === Object storage ===
    /// AWS region
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Custom S3 endpoint URL (for LocalStack)
    #[arg(long, env = "SIEVE_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS access key ID
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub access_key: Option<String>,

    /// AWS secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// AWS session token (for temporary credentials)
    #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
    pub session_token: Option<String>,

    /// Send unsigned requests (public buckets)
    #[arg(long)]
    pub anonymous: bool,

    /// Allow plain HTTP endpoints
    #[arg(long)]
    pub allow_http: bool,

    // === Processing ===
    /// Records buffered between parsing and writing (must be >= 1)
    #[arg(long, value_parser = parse_positive_usize)]
    pub channel_capacity: Option<usize>,

    /// Exit with status 4 if any line failed to parse or filter
    #[arg(long)]
    pub strict: bool,

    // === Logging ===
    /// Log level
    #[arg(short = 'l', long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,
}

/// Parse a positive usize (>= 1).
fn parse_positive_usize(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if value < 1 {
        return Err(format!("{} is not in 1..", value));
    }
    Ok(value)
}
