//! Decompression stage.

use crate::source::SourceReader;
use async_compression::tokio::bufread::GzipDecoder;
use std::io;
use std::pin::Pin;
use sv_error::DecodeError;
use tokio::io::{AsyncBufRead, BufReader};

/// A buffered, possibly decompressed, source stream.
pub type DecodedReader = Pin<Box<dyn AsyncBufRead + Send>>;

/// Compression applied to a byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
}

impl Compression {
    /// Gzip when the flag is set, otherwise none.
    pub fn from_flag(gzip: bool) -> Self {
        if gzip { Compression::Gzip } else { Compression::None }
    }

    pub fn is_compressed(self) -> bool {
        self != Compression::None
    }
}

/// Wrap a source stream in the decompression stage, then buffer it.
///
/// Gzip decoding is streaming: memory stays at a couple of `buffer_size`
/// buffers regardless of input length. Concatenated gzip members are decoded
/// as one stream.
pub fn decode(reader: SourceReader, compression: Compression, buffer_size: usize) -> DecodedReader {
    match compression {
        Compression::None => Box::pin(BufReader::with_capacity(buffer_size, reader)),
        Compression::Gzip => {
            let mut decoder = GzipDecoder::new(BufReader::with_capacity(buffer_size, reader));
            decoder.multiple_members(true);
            Box::pin(BufReader::with_capacity(buffer_size, decoder))
        }
    }
}

/// Map a read failure on a decoded stream to a [`DecodeError`].
///
/// Invalid or truncated data behind a gzip decoder is a malformed compressed
/// stream; anything else is a break in the underlying byte stream.
pub fn decode_error(err: io::Error, compression: Compression) -> DecodeError {
    match (compression, err.kind()) {
        (Compression::Gzip, io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof) => {
            DecodeError::Decompression(err.to_string())
        }
        _ => DecodeError::Io(err.to_string()),
    }
}
