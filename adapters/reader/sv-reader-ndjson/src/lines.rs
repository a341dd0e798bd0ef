//! Line splitter over a buffered byte stream.

use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// One input line, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based position of the line in the source
    pub number: u64,

    /// Raw line content; `\n` and a single trailing `\r` are stripped
    pub bytes: Vec<u8>,
}

/// Splits a byte stream into lines.
///
/// Lines are produced lazily, one per [`next_line`](Self::next_line) call.
/// Only the line currently being assembled is held in memory, so a line cut
/// across any number of read chunks comes out whole. A final line without a
/// trailing newline is still produced; a trailing newline does not produce an
/// extra empty line.
///
/// The sequence is not restartable: once it returns `None` or an error it
/// stays finished.
pub struct LineSplitter<R> {
    reader: R,
    line_number: u64,
    finished: bool,
}

impl<R: AsyncBufRead + Unpin> LineSplitter<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            finished: false,
        }
    }

    /// Read the next line.
    ///
    /// Returns `Ok(None)` at end of stream. A read error ends the sequence.
    pub async fn next_line(&mut self) -> io::Result<Option<Line>> {
        if self.finished {
            return Ok(None);
        }

        let mut bytes = Vec::new();
        let read = match self.reader.read_until(b'\n', &mut bytes).await {
            Ok(read) => read,
            Err(e) => {
                self.finished = true;
                return Err(e);
            }
        };

        if read == 0 {
            self.finished = true;
            return Ok(None);
        }

        if bytes.last() == Some(&b'\n') {
            bytes.pop();
        }
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }

        self.line_number += 1;
        Ok(Some(Line {
            number: self.line_number,
            bytes,
        }))
    }

    /// Number of lines produced so far.
    pub fn lines_read(&self) -> u64 {
        self.line_number
    }
}
