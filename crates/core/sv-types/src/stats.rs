//! Run statistics.

use serde::{Deserialize, Serialize};

/// Counters produced by one run.
///
/// Owned by the record pipeline for the duration of the run and handed back
/// to the caller only when the source reached end-of-stream. Counters only
/// ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Records kept by the filter and written to the output
    pub found: u64,

    /// Records the filter dropped
    pub removed: u64,

    /// Lines that failed to parse or whose filter call failed
    pub error: u64,
}

impl RunStats {
    /// Create zeroed statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a kept record.
    #[inline]
    pub fn record_found(&mut self) {
        self.found += 1;
    }

    /// Count a dropped record.
    #[inline]
    pub fn record_removed(&mut self) {
        self.removed += 1;
    }

    /// Count a failed line.
    #[inline]
    pub fn record_error(&mut self) {
        self.error += 1;
    }

    /// Total number of lines accounted for.
    pub fn lines(&self) -> u64 {
        self.found + self.removed + self.error
    }

    /// Returns true if any line failed.
    pub fn has_errors(&self) -> bool {
        self.error > 0
    }
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "found={} removed={} error={}",
            self.found, self.removed, self.error
        )
    }
}
