//! Main execution logic for the sieve CLI.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use sv_traits::{FilterChain, IdentityFilter, RecordFilter};
use sv_transform::{FilterConfig, RhaiFilter};
use sv_types::{RunOptions, RunStats};
use tracing::{debug, info};

use crate::args::Cli;

/// Contents of a `--config` file.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(flatten)]
    pub run: RunOptions,

    #[serde(default)]
    pub filter: FilterConfig,
}

/// Result of one CLI invocation.
#[derive(Debug)]
pub struct Summary {
    /// `None` when the source had nothing to process
    pub stats: Option<RunStats>,
    pub output: PathBuf,
    /// Size of the output file after the run
    pub output_bytes: Option<u64>,
    pub duration: Duration,
}

/// Load the config file, or defaults if none was given.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile> {
    let Some(path) = path else {
        return Ok(ConfigFile::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: ConfigFile = serde_yaml::from_str(&text)
        .with_context(|| format!("Invalid config file {}", path.display()))?;

    debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Layer command-line flags over the loaded options.
pub fn apply_overrides(mut options: RunOptions, args: &Cli) -> RunOptions {
    if let Some(output) = &args.output {
        options.output_destination = output.clone();
    }
    options.clear_output_on_start |= args.clear;
    options.decompress_input |= args.inflate;
    options.compress_output |= args.deflate;
    options.verbose |= args.verbose;

    if let Some(capacity) = args.channel_capacity {
        options.channel_capacity = capacity;
    }

    let store = &mut options.object_store;
    if let Some(region) = &args.region {
        store.region = Some(region.clone());
    }
    if let Some(endpoint) = &args.s3_endpoint {
        store.endpoint = Some(endpoint.clone());
    }
    if let (Some(access_key), Some(secret_key)) = (&args.access_key, &args.secret_key) {
        store.access_key = Some(access_key.clone());
        store.secret_key = Some(secret_key.clone());
        store.session_token = args.session_token.clone();
    }
    store.anonymous |= args.anonymous;
    store.allow_http |= args.allow_http;

    options
}

/// Pick the filter: flags first, then the config file, then keep-everything.
///
/// Several `--script` flags become a [`FilterChain`] applied in flag order.
pub async fn build_filter(args: &Cli, from_file: &FilterConfig) -> Result<Box<dyn RecordFilter>> {
    if args.script.len() > 1 {
        let mut chain = FilterChain::new().with_name("scripts");
        for (i, script) in args.script.iter().enumerate() {
            let filter = RhaiFilter::new(&FilterConfig::with_script(script.clone()))
                .with_context(|| format!("Invalid --script #{}", i + 1))?
                .with_name(format!("script-{}", i + 1));
            chain = chain.push(Box::new(filter));
        }
        debug!(scripts = chain.len(), "Chaining filter scripts");
        return Ok(Box::new(chain));
    }

    let config = if let Some(script) = args.script.first() {
        FilterConfig::with_script(script.clone())
    } else if let Some(path) = &args.script_file {
        FilterConfig::with_script_file(path.display().to_string())
    } else {
        from_file.clone()
    };

    if config.is_empty() {
        debug!("No filter script, keeping every record");
        return Ok(Box::new(IdentityFilter));
    }

    let filter = RhaiFilter::from_config(&config).await?;
    Ok(Box::new(filter))
}

/// Execute one run with the provided arguments.
pub async fn execute(args: &Cli) -> Result<Summary> {
    let config = load_config(args.config.as_deref())?;
    let options = apply_overrides(config.run, args);
    let filter = build_filter(args, &config.filter).await?;

    info!(options = ?options, "Resolved run options");

    let start = Instant::now();
    let stats = sv_runner::run(&args.source, &options, filter.as_ref()).await?;
    let duration = start.elapsed();

    let output_bytes = match stats {
        Some(_) => tokio::fs::metadata(&options.output_destination)
            .await
            .ok()
            .map(|m| m.len()),
        None => None,
    };

    Ok(Summary {
        stats,
        output: options.output_destination,
        output_bytes,
        duration,
    })
}
