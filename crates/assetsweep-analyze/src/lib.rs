//! Usage classification and reporting for assetsweep.
//!
//! This crate turns scanned assets into a report:
//!
//! - **Classification** - an asset with no recorded occurrence is unused
//! - **Statistics** - asset counts and the bytes held by unused assets
//! - **Unusual locations** - used assets whose only evidence is a file type
//!   outside the expected source/UI-definition set
//!
//! # Example
//!
//! ```rust,no_run
//! use assetsweep_analyze::Sweep;
//! use assetsweep_core::SweepConfig;
//!
//! let report = Sweep::new(SweepConfig::new("/path/to/ios")).run().unwrap();
//!
//! println!(
//!     "Total images: {}, unused: {}, occupying {} bytes on disk.",
//!     report.stats.total_assets, report.stats.unused_assets, report.stats.unused_bytes
//! );
//! for asset in &report.unused {
//!     println!("{}", asset.location.display());
//! }
//! ```

mod classifier;
mod sweep;

pub use classifier::{UnusualReference, UsageClassifier, UsageReport, UsageStats};
pub use sweep::Sweep;

// Re-export core types
pub use assetsweep_core::{Asset, Occurrence, ScanOutcome, ScanStatus};
