//! Source identifier classification and opening.

use crate::s3::{S3_PREFIX, parse_s3_location};
use crate::store::S3ObjectSource;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use sv_error::{Result, SourceError, SvError};
use sv_traits::ObjectSource;
use sv_types::ObjectStoreConfig;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use tracing::{debug, info};

/// An opened source byte stream.
pub type SourceReader = Pin<Box<dyn AsyncRead + Send>>;

const FILE_PREFIX: &str = "file://";

/// Where a run reads its input from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDescriptor {
    /// A file on the local filesystem
    LocalPath(PathBuf),

    /// An object in S3-compatible storage; `key` is percent-decoded
    ObjectStore { bucket: String, key: String },
}

impl SourceDescriptor {
    /// Classify a source identifier.
    ///
    /// `s3://bucket/key` selects object storage; anything else is a local
    /// path, with an optional `file://` prefix.
    pub fn parse(identifier: &str) -> Result<Self> {
        if identifier.starts_with(S3_PREFIX) {
            let (bucket, key) = parse_s3_location(identifier)?;
            return Ok(Self::ObjectStore { bucket, key });
        }

        let path = identifier.strip_prefix(FILE_PREFIX).unwrap_or(identifier);
        if path.is_empty() {
            return Err(SourceError::InvalidLocation("Empty source path".to_string()).into());
        }

        Ok(Self::LocalPath(PathBuf::from(path)))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::ObjectStore { .. })
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalPath(path) => write!(f, "{}", path.display()),
            Self::ObjectStore { bucket, key } => write!(f, "{S3_PREFIX}{bucket}/{key}"),
        }
    }
}

/// Opens sources by identifier.
///
/// Local paths are opened directly; `s3://` identifiers go through the
/// configured [`ObjectSource`].
pub struct SourceResolver {
    objects: Arc<dyn ObjectSource>,
}

impl SourceResolver {
    pub fn new(objects: Arc<dyn ObjectSource>) -> Self {
        Self { objects }
    }

    /// Resolver backed by an [`S3ObjectSource`] built from `config`.
    pub fn from_config(config: &ObjectStoreConfig) -> Self {
        Self::new(Arc::new(S3ObjectSource::new(config.clone())))
    }

    /// Classify and open `identifier`.
    ///
    /// Returns `Ok(None)` when the identifier names a remote object with no
    /// body; there is nothing to process.
    pub async fn resolve(&self, identifier: &str) -> Result<Option<SourceReader>> {
        let descriptor = SourceDescriptor::parse(identifier)?;
        self.open(&descriptor).await
    }

    /// Open an already classified source.
    pub async fn open(&self, descriptor: &SourceDescriptor) -> Result<Option<SourceReader>> {
        match descriptor {
            SourceDescriptor::LocalPath(path) => {
                let reader = open_local(path).await?;
                Ok(Some(reader))
            }
            SourceDescriptor::ObjectStore { bucket, key } => {
                debug!(bucket = %bucket, key = %key, "Opening remote object");
                match self.objects.open(bucket, key).await? {
                    Some(stream) => Ok(Some(Box::pin(StreamReader::new(stream)))),
                    None => {
                        info!(source = %descriptor, "Remote object has no body");
                        Ok(None)
                    }
                }
            }
        }
    }
}

async fn open_local(path: &Path) -> Result<SourceReader> {
    let location = path.display().to_string();

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| local_error(e, &location))?;
    if !metadata.is_file() {
        return Err(SvError::Source(SourceError::InvalidLocation(format!(
            "{location} is not a regular file"
        ))));
    }

    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| local_error(e, &location))?;

    debug!(path = %location, size = metadata.len(), "Opened local file");
    Ok(Box::pin(file))
}

fn local_error(err: io::Error, location: &str) -> SvError {
    let source = match err.kind() {
        io::ErrorKind::NotFound => SourceError::NotFound(location.to_string()),
        io::ErrorKind::PermissionDenied => SourceError::AccessDenied(location.to_string()),
        _ => SourceError::Io(format!("{location}: {err}")),
    };
    SvError::Source(source)
}
