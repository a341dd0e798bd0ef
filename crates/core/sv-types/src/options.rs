//! Run configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output path used when the caller does not name one.
pub const DEFAULT_OUTPUT_DESTINATION: &str = "./tmp-output.ld-json";

/// Records allowed in flight between the pipeline and the sink.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Read buffer size for the source stream (and the decompressed stream).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8192;

/// Options for a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOptions {
    /// Delete the output destination before the run starts
    #[serde(default)]
    pub clear_output_on_start: bool,

    /// Gunzip the source stream
    #[serde(default)]
    pub decompress_input: bool,

    /// Gzip the output stream
    #[serde(default)]
    pub compress_output: bool,

    /// Echo every parsed record to the diagnostic log
    #[serde(default)]
    pub verbose: bool,

    /// Where accepted records are written
    #[serde(default = "default_output_destination")]
    pub output_destination: PathBuf,

    /// Object storage client settings (used for `s3://` sources)
    #[serde(default)]
    pub object_store: ObjectStoreConfig,

    /// Capacity of the bounded handoff between pipeline and sink
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Buffer size for reading the source
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
}

fn default_output_destination() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DESTINATION)
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

fn default_read_buffer_size() -> usize {
    DEFAULT_READ_BUFFER_SIZE
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            clear_output_on_start: false,
            decompress_input: false,
            compress_output: false,
            verbose: false,
            output_destination: default_output_destination(),
            object_store: ObjectStoreConfig::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

impl RunOptions {
    /// Create run options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete the output destination before the run.
    pub fn with_clear_output_on_start(mut self, clear: bool) -> Self {
        self.clear_output_on_start = clear;
        self
    }

    /// Gunzip the source stream.
    pub fn with_decompress_input(mut self, decompress: bool) -> Self {
        self.decompress_input = decompress;
        self
    }

    /// Gzip the output stream.
    pub fn with_compress_output(mut self, compress: bool) -> Self {
        self.compress_output = compress;
        self
    }

    /// Echo every parsed record to the diagnostic log.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the output destination.
    pub fn with_output_destination(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_destination = path.into();
        self
    }

    /// Set the object storage client settings.
    pub fn with_object_store(mut self, config: ObjectStoreConfig) -> Self {
        self.object_store = config;
        self
    }

    /// Set the capacity of the pipeline-to-sink handoff.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Set the source read buffer size.
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Validate the options.
    pub fn validate(&self) -> Result<(), String> {
        if self.channel_capacity == 0 {
            return Err("channel_capacity must be at least 1".to_string());
        }
        if self.read_buffer_size == 0 {
            return Err("read_buffer_size must be at least 1".to_string());
        }
        if self.output_destination.as_os_str().is_empty() {
            return Err("output_destination must not be empty".to_string());
        }
        Ok(())
    }
}

/// Object storage client settings.
///
/// Values left unset fall back to the standard `AWS_*` environment variables
/// when the client is built.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    /// AWS region
    #[serde(default)]
    pub region: Option<String>,

    /// Custom endpoint URL (for LocalStack or S3-compatible stores)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// AWS access key ID
    #[serde(default)]
    pub access_key: Option<String>,

    /// AWS secret access key
    #[serde(default)]
    pub secret_key: Option<String>,

    /// AWS session token (for temporary credentials)
    #[serde(default)]
    pub session_token: Option<String>,

    /// Skip request signing (public buckets)
    #[serde(default)]
    pub anonymous: bool,

    /// Allow plain HTTP endpoints
    #[serde(default)]
    pub allow_http: bool,
}

impl std::fmt::Debug for ObjectStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreConfig")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .field("anonymous", &self.anonymous)
            .field("allow_http", &self.allow_http)
            .finish()
    }
}

impl ObjectStoreConfig {
    /// Create an empty configuration (environment defaults).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set a custom endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set explicit credentials.
    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self.session_token = session_token;
        self
    }

    /// Skip request signing.
    pub fn with_anonymous(mut self, anonymous: bool) -> Self {
        self.anonymous = anonymous;
        self
    }

    /// Allow plain HTTP endpoints.
    pub fn with_allow_http(mut self, allow: bool) -> Self {
        self.allow_http = allow;
        self
    }
}
