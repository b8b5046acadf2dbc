//! Core types and configuration for assetsweep.
//!
//! This crate provides the data structures shared by the scanning and
//! analysis crates: assets and their occurrences, sweep configuration,
//! the scan outcome, and the error taxonomy.

mod asset;
mod config;
mod error;
mod outcome;

pub use asset::{Asset, Occurrence, ResolutionState};
pub use config::{MatchMode, SweepConfig, SweepConfigBuilder};
pub use error::{SweepError, SweepWarning, WarningKind};
pub use outcome::{ReferenceStats, ScanOutcome, ScanStatus};
