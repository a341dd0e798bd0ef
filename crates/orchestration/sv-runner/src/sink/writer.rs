//! Output file writer.

use async_compression::tokio::write::GzipEncoder;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use sv_error::SinkError;
use sv_reader_ndjson::Compression;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tracing::{debug, warn};

const WRITE_BUFFER_SIZE: usize = 64 * 1024;

enum Output {
    Plain(BufWriter<File>),
    Gzip(GzipEncoder<BufWriter<File>>),
}

impl Output {
    async fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Output::Plain(w) => w.write_all(buf).await,
            Output::Gzip(w) => w.write_all(buf).await,
        }
    }

    /// Flush everything, write the gzip trailer, and hand back the file.
    async fn finish(self) -> io::Result<File> {
        match self {
            Output::Plain(mut w) => {
                w.flush().await?;
                Ok(w.into_inner())
            }
            Output::Gzip(mut w) => {
                w.shutdown().await?;
                Ok(w.into_inner().into_inner())
            }
        }
    }

    /// Wait for in-flight file writes without writing anything buffered.
    async fn settle(mut self) {
        let file = match &mut self {
            Output::Plain(w) => w.get_mut(),
            Output::Gzip(w) => w.get_mut().get_mut(),
        };
        if let Err(e) = file.flush().await {
            debug!(error = %e, "Pending output write failed during abort");
        }
    }
}

/// Writes records to the output destination, one compact JSON value per line.
///
/// With clearing enabled the destination is truncated on open; otherwise
/// records are appended after any existing content. With gzip enabled each
/// run appends one complete gzip member, finished on [`close`](Self::close).
///
/// A writer that is [aborted](Self::abort) restores the destination to the
/// length it had right after opening, or removes it if this writer created it.
pub struct SinkWriter {
    path: PathBuf,
    output: Option<Output>,
    base_len: u64,
    created: bool,
    records_written: u64,
    bytes_written: u64,
}

impl SinkWriter {
    /// Open `path` for writing.
    pub async fn open(
        path: impl AsRef<Path>,
        clear_old: bool,
        compression: Compression,
    ) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();

        let existing_len = match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => {
                return Err(SinkError::Open {
                    path: path.display().to_string(),
                    message: "destination is a directory".to_string(),
                });
            }
            Ok(meta) => Some(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(open_error(&path, e)),
        };

        let mut options = OpenOptions::new();
        options.create(true);
        if clear_old {
            options.write(true).truncate(true);
        } else {
            options.append(true);
        }

        let file = options.open(&path).await.map_err(|e| open_error(&path, e))?;

        let base_len = if clear_old { 0 } else { existing_len.unwrap_or(0) };
        let created = existing_len.is_none();

        let buffered = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
        let output = match compression {
            Compression::None => Output::Plain(buffered),
            Compression::Gzip => Output::Gzip(GzipEncoder::new(buffered)),
        };

        debug!(
            path = %path.display(),
            clear_old = clear_old,
            gzip = compression.is_compressed(),
            existing_bytes = base_len,
            "Opened output"
        );

        Ok(Self {
            path,
            output: Some(output),
            base_len,
            created,
            records_written: 0,
            bytes_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records written so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Uncompressed bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Serialize `record` and write it followed by `\n`.
    pub async fn write(&mut self, record: &Value) -> Result<(), SinkError> {
        let mut buf = serde_json::to_vec(record).map_err(|e| SinkError::Serialize(e.to_string()))?;
        buf.push(b'\n');

        let output = self.output.as_mut().ok_or_else(|| SinkError::Write {
            path: self.path.display().to_string(),
            message: "writer already closed".to_string(),
        })?;

        output.write_all(&buf).await.map_err(|e| SinkError::Write {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        self.records_written += 1;
        self.bytes_written += buf.len() as u64;
        Ok(())
    }

    /// Write every record received on `rx` until the sender side closes.
    ///
    /// On failure the receiver is dropped, so the producer sees the sink as
    /// disconnected on its next send.
    pub async fn drain(&mut self, mut rx: mpsc::Receiver<Value>) -> Result<u64, SinkError> {
        let mut count = 0;
        while let Some(record) = rx.recv().await {
            self.write(&record).await?;
            count += 1;
        }
        Ok(count)
    }

    /// Flush, finish compression, and sync the destination to disk.
    pub async fn close(&mut self) -> Result<(), SinkError> {
        let Some(output) = self.output.take() else {
            return Ok(());
        };

        let close_error = |e: io::Error| SinkError::Close {
            path: self.path.display().to_string(),
            message: e.to_string(),
        };

        let file = output.finish().await.map_err(close_error)?;
        file.sync_all().await.map_err(close_error)?;

        debug!(
            path = %self.path.display(),
            records = self.records_written,
            bytes = self.bytes_written,
            "Closed output"
        );
        Ok(())
    }

    /// Discard everything this writer wrote.
    pub async fn abort(mut self) -> Result<(), SinkError> {
        // Buffered records are dropped, not written
        if let Some(output) = self.output.take() {
            output.settle().await;
        }

        let path = self.path.display().to_string();

        if self.created {
            match tokio::fs::remove_file(&self.path).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(SinkError::Close {
                        path,
                        message: e.to_string(),
                    });
                }
            }
            warn!(path = %path, "Removed partial output");
            return Ok(());
        }

        let file = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .await
            .map_err(|e| SinkError::Close {
                path: path.clone(),
                message: e.to_string(),
            })?;
        file.set_len(self.base_len).await.map_err(|e| SinkError::Close {
            path: path.clone(),
            message: e.to_string(),
        })?;

        warn!(path = %path, restored_bytes = self.base_len, "Discarded partial output");
        Ok(())
    }
}

fn open_error(path: &Path, err: io::Error) -> SinkError {
    SinkError::Open {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
