//! End-to-end sweep: inventory, reference scan, classification.

use std::time::Instant;

use tracing::info;

use assetsweep_core::{ScanOutcome, SweepConfig, SweepError};
use assetsweep_scan::{resolve_root, AssetInventory, CancelToken, ReferenceScanner};

use crate::classifier::{UsageClassifier, UsageReport};

/// Runs a full sweep for one configuration.
///
/// Holds no state beyond its configuration and scanner, so running it twice
/// over an unchanged tree yields identical reports.
pub struct Sweep {
    config: SweepConfig,
    scanner: ReferenceScanner,
}

impl Sweep {
    /// Create a sweep for the given configuration.
    pub fn new(config: SweepConfig) -> Self {
        Self::with_cancel_token(config, CancelToken::new())
    }

    /// Create a sweep that aborts when `token` is cancelled.
    pub fn with_cancel_token(config: SweepConfig, token: CancelToken) -> Self {
        Self {
            config,
            scanner: ReferenceScanner::with_cancel_token(token),
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// The reference scanner, for progress subscriptions.
    pub fn scanner(&self) -> &ReferenceScanner {
        &self.scanner
    }

    /// Token that aborts this sweep when cancelled.
    pub fn cancel_token(&self) -> CancelToken {
        self.scanner.cancel_token()
    }

    /// Inventory the assets and scan for references.
    ///
    /// Both roots are checked before any work starts; a missing root fails
    /// with [`SweepError::NotFound`].
    pub fn scan(&self) -> Result<ScanOutcome, SweepError> {
        let start = Instant::now();
        let scan_root = resolve_root(&self.config.scan_root)?;
        let assets_root = resolve_root(self.config.effective_assets_root())?;

        let mut inventory = AssetInventory::new().build_at(&self.config, assets_root.clone());
        let scan = self.scanner.scan_at(
            &self.config,
            scan_root,
            assets_root,
            &mut inventory.assets,
        )?;

        let mut warnings = inventory.warnings;
        warnings.extend(scan.warnings);

        let duration = start.elapsed();
        info!(
            root = %scan.scan_root.display(),
            assets = inventory.assets.len(),
            elapsed_ms = duration.as_millis() as u64,
            "sweep finished"
        );

        Ok(ScanOutcome::new(
            inventory.assets,
            scan.scan_root,
            inventory.root,
            self.config.clone(),
            scan.status,
            scan.stats,
            duration,
            warnings,
        ))
    }

    /// Run the sweep and classify the result.
    pub fn run(&self) -> Result<UsageReport, SweepError> {
        let outcome = self.scan()?;
        Ok(UsageClassifier::new().classify(&outcome))
    }
}
