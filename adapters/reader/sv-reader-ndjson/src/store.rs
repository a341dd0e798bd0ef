//! Object storage client backed by `object_store`.

use async_trait::async_trait;
use futures::StreamExt;
use object_store::ClientOptions;
use object_store::ObjectStore;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use sv_error::{Result, SourceError, SvError};
use sv_traits::{ByteStream, ObjectSource};
use sv_types::ObjectStoreConfig;
use tracing::debug;

/// HTTP client options for streaming whole objects.
fn create_s3_client_options() -> ClientOptions {
    ClientOptions::new()
        .with_pool_idle_timeout(Duration::from_secs(90))
        // Large objects stream for a long time
        .with_timeout(Duration::from_secs(300))
        .with_connect_timeout(Duration::from_secs(10))
}

/// S3-compatible [`ObjectSource`].
///
/// One client is built per bucket on first use and cached for the lifetime of
/// the source. Credentials come from the config when given, otherwise from
/// the standard `AWS_*` environment variables.
pub struct S3ObjectSource {
    config: ObjectStoreConfig,
    store_cache: RwLock<HashMap<String, Arc<dyn ObjectStore>>>,
}

impl S3ObjectSource {
    pub fn new(config: ObjectStoreConfig) -> Self {
        Self {
            config,
            store_cache: RwLock::new(HashMap::new()),
        }
    }

    /// Use `store` for every request against `bucket`.
    pub fn with_store(self, bucket: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        self.store_cache.write().insert(bucket.into(), store);
        self
    }

    fn get_or_create_store(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>> {
        {
            let cache = self.store_cache.read();
            if let Some(store) = cache.get(bucket) {
                debug!(bucket = bucket, "Using cached object store");
                return Ok(Arc::clone(store));
            }
        }

        let mut cache = self.store_cache.write();

        // Another task may have built it while we waited for the write lock
        if let Some(store) = cache.get(bucket) {
            return Ok(Arc::clone(store));
        }

        debug!(bucket = bucket, "Creating new S3 object store");
        let store: Arc<dyn ObjectStore> = Arc::new(self.build_store(bucket)?);
        cache.insert(bucket.to_string(), Arc::clone(&store));
        Ok(store)
    }

    fn build_store(&self, bucket: &str) -> Result<object_store::aws::AmazonS3> {
        let config = &self.config;
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_client_options(create_s3_client_options());

        if let Some(region) = &config.region {
            builder = builder.with_region(region);
        }

        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            builder = builder
                .with_access_key_id(access_key)
                .with_secret_access_key(secret_key);

            if let Some(token) = &config.session_token {
                builder = builder.with_token(token);
            }
        }

        if config.anonymous {
            builder = builder.with_skip_signature(true);
        }

        if let Some(endpoint) = &config.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_virtual_hosted_style_request(false);
        }

        if config.allow_http {
            builder = builder.with_allow_http(true);
        }

        builder.build().map_err(|e| {
            SvError::Source(SourceError::ObjectStore(format!(
                "Failed to create S3 client for bucket '{bucket}': {e}"
            )))
        })
    }
}

/// Build the store path for an already decoded key, byte for byte.
///
/// `ObjectPath::from` would percent-encode characters such as `%` and `[`
/// and collapse empty segments, fetching a different object. Keys the store
/// cannot address verbatim are rejected instead.
fn object_path(bucket: &str, key: &str) -> std::result::Result<ObjectPath, SourceError> {
    let invalid = |reason: String| {
        SourceError::InvalidLocation(format!("s3://{bucket}/{key}: {reason}"))
    };

    let path = ObjectPath::parse(key).map_err(|e| invalid(e.to_string()))?;
    if path.as_ref() != key {
        return Err(invalid(format!(
            "key would be fetched as '{}'",
            path.as_ref()
        )));
    }
    Ok(path)
}

/// Map a client failure onto the source error taxonomy.
fn map_store_error(err: object_store::Error, bucket: &str, key: &str) -> SourceError {
    let location = format!("s3://{bucket}/{key}");
    match err {
        object_store::Error::NotFound { .. } => SourceError::NotFound(location),
        object_store::Error::PermissionDenied { source, .. }
        | object_store::Error::Unauthenticated { source, .. } => {
            SourceError::AccessDenied(format!("{location}: {source}"))
        }
        other => SourceError::ObjectStore(format!("{location}: {other}")),
    }
}

#[async_trait]
impl ObjectSource for S3ObjectSource {
    async fn open(&self, bucket: &str, key: &str) -> Result<Option<ByteStream>> {
        let path = object_path(bucket, key)?;
        let store = self.get_or_create_store(bucket)?;

        let result = store
            .get(&path)
            .await
            .map_err(|e| map_store_error(e, bucket, key))?;

        if result.meta.size == 0 {
            debug!(bucket = bucket, key = key, "Object is empty");
            return Ok(None);
        }

        debug!(
            bucket = bucket,
            key = key,
            size = result.meta.size,
            "Opened object"
        );

        let stream = result.into_stream().map(|chunk| chunk.map_err(std::io::Error::other));
        Ok(Some(Box::pin(stream)))
    }
}
