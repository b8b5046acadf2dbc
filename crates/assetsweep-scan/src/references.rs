//! Reference scanner: searches project text files for quoted asset names.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use dashmap::DashMap;
use jwalk::WalkDir;
use rayon::prelude::*;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use assetsweep_core::{
    Asset, MatchMode, Occurrence, ReferenceStats, ScanStatus, SweepConfig, SweepError,
    SweepWarning,
};

use crate::cancel::CancelToken;
use crate::filter::{resolve_file_type, resolve_root, FileEligibility, TraversalFilter};
use crate::inventory::{walk_parallelism, walk_warning};
use crate::progress::{ProgressClock, ScanPhase, ScanProgress};
use crate::text::{count_occurrences, read_text, TextReadError};

/// How often (in files) a progress snapshot is broadcast.
const PROGRESS_INTERVAL: u64 = 500;

/// Result of one reference scan.
#[derive(Debug, Clone)]
pub struct ReferenceScan {
    /// Whether every eligible file was checked.
    pub status: ScanStatus,
    /// Walk and read counters.
    pub stats: ReferenceStats,
    /// Canonical project root that was searched.
    pub scan_root: PathBuf,
    /// Canonical assets root.
    pub assets_root: PathBuf,
    /// Entries that could not be read.
    pub warnings: Vec<SweepWarning>,
}

/// Scans a project tree for quoted references to asset names.
///
/// Files are numbered in sorted traversal order and matched in parallel.
/// An asset's evidence is always the lowest-numbered matching file, so the
/// result does not depend on thread scheduling.
pub struct ReferenceScanner {
    progress_tx: broadcast::Sender<ScanProgress>,
    cancel: CancelToken,
}

/// A quoted name to look for, tied to its asset's index.
struct Target {
    asset: usize,
    needle: String,
}

/// One matching file for one asset.
#[derive(Debug, Clone, Copy)]
struct Hit {
    file: usize,
    count: usize,
}

/// What happened to a single eligible file.
enum FileOutcome {
    Read { bytes: u64, matched: bool },
    Binary,
    Failed(SweepWarning),
    Cancelled,
}

/// Shared state for the matching pass.
struct MatchContext<'a> {
    targets: &'a [Target],
    mode: MatchMode,
    /// Lowest file index that resolved each asset (`usize::MAX` = none yet).
    resolved_at: Vec<AtomicUsize>,
    hits: DashMap<usize, Vec<Hit>>,
    processed: AtomicU64,
    total: u64,
    clock: &'a ProgressClock,
}

impl ReferenceScanner {
    /// Create a new scanner with its own cancellation token.
    pub fn new() -> Self {
        Self::with_cancel_token(CancelToken::new())
    }

    /// Create a scanner that observes an existing cancellation token.
    pub fn with_cancel_token(cancel: CancelToken) -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            progress_tx,
            cancel,
        }
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Token that aborts this scanner when cancelled.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Search the project tree and record occurrences on `assets`.
    ///
    /// Only unresolved assets are checked (all assets in
    /// [`MatchMode::Exhaustive`]). Fails only if a configured root is
    /// missing or not a directory.
    pub fn scan(
        &self,
        config: &SweepConfig,
        assets: &mut [Asset],
    ) -> Result<ReferenceScan, SweepError> {
        let scan_root = resolve_root(&config.scan_root)?;
        let assets_root = resolve_root(config.effective_assets_root())?;
        self.scan_at(config, scan_root, assets_root, assets)
    }

    /// Like [`scan`](Self::scan), with both roots already resolved.
    ///
    /// The roots must be canonical, as returned by [`resolve_root`]. Fails
    /// only if the matching thread pool cannot be built.
    pub fn scan_at(
        &self,
        config: &SweepConfig,
        scan_root: PathBuf,
        assets_root: PathBuf,
        assets: &mut [Asset],
    ) -> Result<ReferenceScan, SweepError> {
        let clock = ProgressClock::start();

        let filter = TraversalFilter::new(config).with_assets_root(&scan_root, &assets_root);
        let mut stats = ReferenceStats::new();
        let mut warnings = Vec::new();

        let (files, walk_complete) =
            self.collect_files(config, &scan_root, &filter, &clock, &mut stats, &mut warnings);
        stats.dirs_pruned = filter.pruned_count();

        if !walk_complete {
            info!(files = files.len(), "reference walk cancelled");
            return Ok(ReferenceScan {
                status: ScanStatus::Cancelled,
                stats,
                scan_root,
                assets_root,
                warnings,
            });
        }
        debug!(files = files.len(), "reference walk finished");

        let targets: Vec<Target> = assets
            .iter()
            .enumerate()
            .filter(|(_, asset)| config.match_mode == MatchMode::Exhaustive || asset.is_unresolved())
            .map(|(asset, a)| Target {
                asset,
                needle: a.needle(),
            })
            .collect();

        let ctx = MatchContext {
            targets: &targets,
            mode: config.match_mode,
            resolved_at: assets.iter().map(|_| AtomicUsize::new(usize::MAX)).collect(),
            hits: DashMap::new(),
            processed: AtomicU64::new(0),
            total: files.len() as u64,
            clock: &clock,
        };

        let outcomes = self.match_files(config.threads, &files, &ctx)?;

        let mut status = ScanStatus::Complete;
        for outcome in outcomes {
            match outcome {
                FileOutcome::Read { bytes, matched } => {
                    stats.bytes_read += bytes;
                    if matched {
                        stats.files_matched += 1;
                    }
                }
                FileOutcome::Binary => stats.files_skipped_binary += 1,
                FileOutcome::Failed(warning) => warnings.push(warning),
                FileOutcome::Cancelled => status = ScanStatus::Cancelled,
            }
        }

        for (asset, mut hits) in ctx.hits.into_iter() {
            hits.sort_by_key(|h| h.file);
            for hit in hits {
                let file = relative_to(&files[hit.file], &scan_root);
                assets[asset].record_occurrence(Occurrence::new(file, hit.count));
            }
        }

        info!(
            files = stats.files_eligible,
            matched = stats.files_matched,
            binary = stats.files_skipped_binary,
            cancelled = status.is_cancelled(),
            "reference scan finished"
        );

        Ok(ReferenceScan {
            status,
            stats,
            scan_root,
            assets_root,
            warnings,
        })
    }

    /// Walk the project tree and collect eligible files in traversal order.
    ///
    /// Returns `false` as the second value if the walk was cancelled.
    fn collect_files(
        &self,
        config: &SweepConfig,
        root: &Path,
        filter: &TraversalFilter,
        clock: &ProgressClock,
        stats: &mut ReferenceStats,
        warnings: &mut Vec<SweepWarning>,
    ) -> (Vec<PathBuf>, bool) {
        let prune = filter.clone();
        let walker = WalkDir::new(root)
            .sort(true)
            .skip_hidden(false)
            .follow_links(config.follow_symlinks)
            .parallelism(walk_parallelism(config.threads))
            .process_read_dir(move |depth, _path, _state, children| {
                // The root itself arrives with no depth; it is never pruned.
                if depth.is_none() {
                    return;
                }
                children.retain(|child| match child {
                    Ok(entry) if entry.file_type.is_dir() => {
                        let name = entry.file_name.to_string_lossy();
                        !prune.prunes_reference_dir(&name, &entry.path())
                    }
                    _ => true,
                });
            });

        let mut files = Vec::new();
        for entry_result in walker {
            if self.cancel.is_cancelled() {
                return (files, false);
            }

            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    warn!(path = %path.display(), error = %err, "skipping unreadable entry");
                    warnings.push(walk_warning(path, &err));
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                stats.record_dir();
                if let Some(err) = &entry.read_children_error {
                    warn!(path = %entry.path().display(), error = %err, "skipping unreadable directory");
                    warnings.push(walk_warning(entry.path(), err));
                }
                continue;
            }

            let path = entry.path();
            let file_type = resolve_file_type(&path, file_type);
            let name = entry.file_name().to_string_lossy();
            match filter.file_eligibility(&name, file_type) {
                FileEligibility::Eligible => {
                    stats.files_eligible += 1;
                    if stats.files_eligible % PROGRESS_INTERVAL == 0 {
                        let _ = self.progress_tx.send(clock.snapshot(
                            ScanPhase::Walking,
                            stats.files_eligible,
                            0,
                            path.clone(),
                        ));
                    }
                    files.push(path);
                }
                _ => stats.files_skipped += 1,
            }
        }

        (files, true)
    }

    /// Match every file, sequentially or on a rayon pool.
    fn match_files(
        &self,
        threads: usize,
        files: &[PathBuf],
        ctx: &MatchContext<'_>,
    ) -> Result<Vec<FileOutcome>, SweepError> {
        let run = |(index, path): (usize, &PathBuf)| self.match_file(index, path, ctx);

        let outcomes: Vec<FileOutcome> = match threads {
            1 => files.iter().enumerate().map(run).collect(),
            0 => files.par_iter().enumerate().map(run).collect(),
            n => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SweepError::ThreadPool {
                        message: e.to_string(),
                    })?;
                pool.install(|| files.par_iter().enumerate().map(run).collect())
            }
        };
        Ok(outcomes)
    }

    /// Read one file and record hits for every target still worth checking.
    fn match_file(&self, index: usize, path: &Path, ctx: &MatchContext<'_>) -> FileOutcome {
        if self.cancel.is_cancelled() {
            return FileOutcome::Cancelled;
        }

        let text = match read_text(path) {
            Ok(text) => text,
            Err(TextReadError::Decode) => return FileOutcome::Binary,
            Err(TextReadError::PermissionDenied) => {
                warn!(path = %path.display(), "permission denied reading file");
                return FileOutcome::Failed(SweepWarning::permission_denied(path));
            }
            Err(TextReadError::Io(err)) => {
                warn!(path = %path.display(), error = %err, "failed to read file");
                return FileOutcome::Failed(SweepWarning::from_io(path, &err));
            }
        };

        let first_only = ctx.mode == MatchMode::FirstOccurrence;
        let mut matched = false;

        for target in ctx.targets {
            // Already resolved by an earlier file; this one can never win.
            if first_only && ctx.resolved_at[target.asset].load(Ordering::Relaxed) < index {
                continue;
            }

            let count = count_occurrences(&text, &target.needle);
            if count == 0 {
                continue;
            }
            matched = true;

            let hit = Hit { file: index, count };
            let mut slot = ctx.hits.entry(target.asset).or_default();
            if first_only {
                ctx.resolved_at[target.asset].fetch_min(index, Ordering::Relaxed);
                if slot.first().is_none_or(|current| index < current.file) {
                    slot.clear();
                    slot.push(hit);
                }
            } else {
                slot.push(hit);
            }
        }

        let processed = ctx.processed.fetch_add(1, Ordering::Relaxed) + 1;
        if processed % PROGRESS_INTERVAL == 0 {
            let _ = self.progress_tx.send(ctx.clock.snapshot(
                ScanPhase::Matching,
                processed,
                ctx.total,
                path.to_path_buf(),
            ));
        }

        FileOutcome::Read {
            bytes: text.len() as u64,
            matched,
        }
    }
}

impl Default for ReferenceScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn relative_to(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}
