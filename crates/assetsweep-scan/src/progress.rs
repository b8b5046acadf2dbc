//! Scan progress reporting.

use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Which pass of the sweep is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    /// Walking the project tree for candidate files.
    Walking,
    /// Reading files and matching asset names.
    Matching,
}

/// Progress information during a reference scan.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Current phase.
    pub phase: ScanPhase,
    /// Eligible files found (walking) or files matched so far (matching).
    pub files_processed: u64,
    /// Eligible files in total, known once walking is done.
    pub total_files: u64,
    /// Most recent path seen.
    pub current_path: PathBuf,
    /// Time elapsed since the scan started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            phase: ScanPhase::Walking,
            files_processed: 0,
            total_files: 0,
            current_path: PathBuf::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Calculate scan rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_processed as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Fraction of files matched, if the total is known.
    pub fn fraction(&self) -> Option<f64> {
        match self.phase {
            ScanPhase::Matching if self.total_files > 0 => {
                Some(self.files_processed as f64 / self.total_files as f64)
            }
            _ => None,
        }
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Start time for progress snapshots.
#[derive(Debug)]
pub(crate) struct ProgressClock {
    start_time: Instant,
}

impl ProgressClock {
    pub(crate) fn start() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    pub(crate) fn snapshot(
        &self,
        phase: ScanPhase,
        files_processed: u64,
        total_files: u64,
        current_path: PathBuf,
    ) -> ScanProgress {
        ScanProgress {
            phase,
            files_processed,
            total_files,
            current_path,
            elapsed: self.start_time.elapsed(),
        }
    }
}
