//! Asset inventory and reference scanning engine for assetsweep.
//!
//! # Overview
//!
//! `assetsweep-scan` performs the two file-system passes of a sweep:
//!
//! - **Inventory** - find asset-unit directories (`*.imageset` by default)
//!   under the assets root and measure their on-disk size
//! - **Reference scan** - walk the project tree once, pruning vendored,
//!   hidden and bundle directories, and count quoted occurrences of each
//!   unresolved asset name in every eligible text file
//!
//! Both walks use jwalk with sorted traversal, so results are deterministic.
//! Matching runs on rayon; the evidence kept for an asset is always the
//! first matching file in traversal order.
//!
//! # Example
//!
//! ```rust,no_run
//! use assetsweep_scan::{AssetInventory, ReferenceScanner, SweepConfig};
//!
//! let config = SweepConfig::new("/path/to/project");
//! let mut inventory = AssetInventory::new().build(&config).unwrap();
//! let scan = ReferenceScanner::new()
//!     .scan(&config, &mut inventory.assets)
//!     .unwrap();
//!
//! let unused = inventory.assets.iter().filter(|a| a.is_unused()).count();
//! println!("{unused} unused assets ({:?})", scan.status);
//! ```
//!
//! # Cancellation
//!
//! ```rust,no_run
//! use assetsweep_scan::{CancelToken, ReferenceScanner};
//!
//! let token = CancelToken::new();
//! let scanner = ReferenceScanner::with_cancel_token(token.clone());
//!
//! // From another thread:
//! token.cancel();
//! ```

mod cancel;
mod filter;
mod inventory;
mod progress;
mod references;
mod text;

pub use cancel::CancelToken;
pub use filter::{resolve_file_type, resolve_root, FileEligibility, TraversalFilter};
pub use inventory::{AssetInventory, Inventory};
pub use progress::{ScanPhase, ScanProgress};
pub use references::{ReferenceScan, ReferenceScanner};
pub use text::{count_occurrences, read_text, TextReadError};

// Re-export core types for convenience
pub use assetsweep_core::{
    Asset, MatchMode, Occurrence, ReferenceStats, ResolutionState, ScanOutcome, ScanStatus,
    SweepConfig, SweepError, SweepWarning, WarningKind,
};
