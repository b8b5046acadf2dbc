//! Scan outcome container and statistics.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::asset::Asset;
use crate::config::SweepConfig;
use crate::error::SweepWarning;

/// Whether a scan ran to the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// Every eligible file was checked.
    #[default]
    Complete,
    /// The caller aborted the scan; results are partial.
    Cancelled,
}

impl ScanStatus {
    /// Check if the scan was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ScanStatus::Cancelled)
    }
}

/// Counters gathered by the reference walk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceStats {
    /// Directories entered.
    pub dirs_visited: u64,
    /// Directories pruned before descent.
    pub dirs_pruned: u64,
    /// Regular files that passed the eligibility filter.
    pub files_eligible: u64,
    /// Files rejected by name, extension or type.
    pub files_skipped: u64,
    /// Eligible files that could not be decoded as text.
    pub files_skipped_binary: u64,
    /// Eligible files that produced at least one occurrence.
    pub files_matched: u64,
    /// Bytes of text content read.
    pub bytes_read: u64,
}

impl ReferenceStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visited directory.
    pub fn record_dir(&mut self) {
        self.dirs_visited += 1;
    }

    /// Record a pruned directory.
    pub fn record_pruned(&mut self) {
        self.dirs_pruned += 1;
    }

    /// Fold another set of counters into this one.
    pub fn merge(&mut self, other: &ReferenceStats) {
        self.dirs_visited += other.dirs_visited;
        self.dirs_pruned += other.dirs_pruned;
        self.files_eligible += other.files_eligible;
        self.files_skipped += other.files_skipped;
        self.files_skipped_binary += other.files_skipped_binary;
        self.files_matched += other.files_matched;
        self.bytes_read += other.bytes_read;
    }
}

/// Assets after inventory and reference scanning, before classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// All inventoried assets, in inventory order.
    pub assets: Vec<Asset>,

    /// Canonical project root that was searched.
    pub scan_root: PathBuf,

    /// Canonical root the asset locations are relative to.
    pub assets_root: PathBuf,

    /// Configuration used.
    pub config: SweepConfig,

    /// Whether the reference scan completed.
    pub status: ScanStatus,

    /// Reference walk counters.
    pub stats: ReferenceStats,

    /// When the sweep finished.
    pub scanned_at: SystemTime,

    /// Wall time of inventory plus reference scan.
    pub scan_duration: Duration,

    /// Non-fatal problems encountered.
    pub warnings: Vec<SweepWarning>,
}

impl ScanOutcome {
    /// Create a new outcome.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        assets: Vec<Asset>,
        scan_root: PathBuf,
        assets_root: PathBuf,
        config: SweepConfig,
        status: ScanStatus,
        stats: ReferenceStats,
        scan_duration: Duration,
        warnings: Vec<SweepWarning>,
    ) -> Self {
        Self {
            assets,
            scan_root,
            assets_root,
            config,
            status,
            stats,
            scanned_at: SystemTime::now(),
            scan_duration,
            warnings,
        }
    }

    /// Check if the scan ran to the end.
    pub fn is_complete(&self) -> bool {
        self.status == ScanStatus::Complete
    }

    /// Check if there were any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
