//! Traversal filters shared by the inventory and reference walks.

use std::fs::FileType;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use assetsweep_core::{SweepConfig, SweepError};
use tracing::debug;

/// Why a file was or was not searched for references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEligibility {
    /// Regular, visible, source-like file.
    Eligible,
    /// Not a regular file (directory, socket, dangling symlink, ...).
    NotRegular,
    /// Name starts with the hidden marker.
    Hidden,
    /// Name or extension is in the excluded sets.
    Excluded,
}

/// Directory and file rules for one sweep.
///
/// Cheap to clone; jwalk's `process_read_dir` callback needs an owned,
/// `'static` copy.
#[derive(Debug, Clone)]
pub struct TraversalFilter {
    config: Arc<SweepConfig>,
    /// Assets root to prune from the reference walk, when nested in it.
    nested_assets_root: Option<PathBuf>,
    pruned: Arc<AtomicU64>,
}

impl TraversalFilter {
    /// Create a filter for the given config.
    pub fn new(config: &SweepConfig) -> Self {
        Self {
            config: Arc::new(config.clone()),
            nested_assets_root: None,
            pruned: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Also prune `assets_root` from the reference walk if it lies strictly
    /// inside `scan_root`. Both paths must be canonical.
    pub fn with_assets_root(mut self, scan_root: &Path, assets_root: &Path) -> Self {
        self.nested_assets_root = (assets_root != scan_root && assets_root.starts_with(scan_root))
            .then(|| assets_root.to_path_buf());
        self
    }

    /// Check if a directory is pruned from the reference walk.
    pub fn prunes_reference_dir(&self, name: &str, path: &Path) -> bool {
        let pruned = self.config.is_excluded_dir(name)
            || self.nested_assets_root.as_deref() == Some(path);
        if pruned {
            debug!(path = %path.display(), "pruning directory from reference walk");
            self.pruned.fetch_add(1, Ordering::Relaxed);
        }
        pruned
    }

    /// Check if a directory is pruned from the inventory walk.
    pub fn prunes_inventory_dir(&self, name: &str) -> bool {
        self.config.is_inventory_excluded(name)
    }

    /// Classify a walked file for the reference scan.
    pub fn file_eligibility(&self, name: &str, file_type: FileType) -> FileEligibility {
        if !file_type.is_file() {
            FileEligibility::NotRegular
        } else if self.config.is_hidden(name) {
            FileEligibility::Hidden
        } else if self.config.is_excluded_file(name) {
            FileEligibility::Excluded
        } else {
            FileEligibility::Eligible
        }
    }

    /// Number of directories pruned so far.
    pub fn pruned_count(&self) -> u64 {
        self.pruned.load(Ordering::Relaxed)
    }

    /// The config this filter was built from.
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }
}

/// File type of `path`, looking through a symlink to its target.
///
/// Symlinked files count as the files they point to. Anything else, including
/// a dangling link, keeps the type reported by the walk.
pub fn resolve_file_type(path: &Path, file_type: FileType) -> FileType {
    if !file_type.is_symlink() {
        return file_type;
    }
    std::fs::metadata(path)
        .map(|m| m.file_type())
        .unwrap_or(file_type)
}

/// Canonicalize a configured root and check it is a directory.
pub fn resolve_root(path: &Path) -> Result<PathBuf, SweepError> {
    let root = path.canonicalize().map_err(|e| SweepError::io(path, e))?;
    if !root.is_dir() {
        return Err(SweepError::NotADirectory { path: root });
    }
    Ok(root)
}
