//! S3 location parsing.

use sv_error::{Result, SourceError};

/// Identifier prefix that selects object storage.
pub const S3_PREFIX: &str = "s3://";

/// Parse an `s3://bucket/key` identifier into bucket and percent-decoded key.
///
/// The bucket is everything up to the first `/` after the prefix; the key is
/// the remainder, which may itself contain `/`.
pub fn parse_s3_location(identifier: &str) -> Result<(String, String)> {
    let rest = identifier.strip_prefix(S3_PREFIX).ok_or_else(|| {
        SourceError::InvalidLocation(format!("Expected s3:// location, got: {identifier}"))
    })?;

    let (bucket, raw_key) = rest.split_once('/').ok_or_else(|| {
        SourceError::InvalidLocation(format!("Missing key in S3 location: {identifier}"))
    })?;

    if bucket.is_empty() {
        return Err(SourceError::InvalidLocation(format!(
            "Missing bucket in S3 location: {identifier}"
        ))
        .into());
    }

    if raw_key.is_empty() {
        return Err(SourceError::InvalidLocation(format!(
            "Missing key in S3 location: {identifier}"
        ))
        .into());
    }

    let key = urlencoding::decode(raw_key).map_err(|e| {
        SourceError::InvalidLocation(format!("Key in '{identifier}' is not valid UTF-8: {e}"))
    })?;

    Ok((bucket.to_string(), key.into_owned()))
}
