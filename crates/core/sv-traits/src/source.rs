//! Object storage collaborator trait.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use sv_error::Result;

/// A stream of raw bytes from a remote object.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

/// Trait for object storage clients that can open a remote object for reading.
///
/// Any conforming client satisfies the contract: given a bucket and an
/// already percent-decoded key, return the object's body as a byte stream
/// or fail.
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Opens an object for streaming read.
    ///
    /// # Arguments
    ///
    /// * `bucket` - Bucket name
    /// * `key` - Object key (percent-decoded)
    ///
    /// # Returns
    ///
    /// - `Ok(Some(stream))` - the object body
    /// - `Ok(None)` - the object exists but has no body to process
    /// - `Err(e)` - the object is missing or the client failed
    async fn open(&self, bucket: &str, key: &str) -> Result<Option<ByteStream>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::collections::HashMap;
    use sv_error::{SourceError, SvError};

    struct StaticSource {
        objects: HashMap<(String, String), &'static [u8]>,
    }

    #[async_trait]
    impl ObjectSource for StaticSource {
        async fn open(&self, bucket: &str, key: &str) -> Result<Option<ByteStream>> {
            let body = self
                .objects
                .get(&(bucket.to_string(), key.to_string()))
                .ok_or_else(|| SvError::Source(SourceError::NotFound(format!("{bucket}/{key}"))))?;

            if body.is_empty() {
                return Ok(None);
            }

            let chunks = vec![Ok(Bytes::from_static(body))];
            Ok(Some(Box::pin(futures::stream::iter(chunks))))
        }
    }

    #[tokio::test]
    async fn test_object_source_contract() {
        let mut objects = HashMap::new();
        objects.insert(("b".to_string(), "k".to_string()), &b"{}\n"[..]);
        objects.insert(("b".to_string(), "empty".to_string()), &b""[..]);
        let source = StaticSource { objects };

        let mut stream = source.open("b", "k").await.unwrap().unwrap();
        let chunk = stream.next().await.unwrap().unwrap();
        assert_eq!(&chunk[..], b"{}\n");

        assert!(source.open("b", "empty").await.unwrap().is_none());
        assert!(source.open("b", "missing").await.is_err());
    }
}
