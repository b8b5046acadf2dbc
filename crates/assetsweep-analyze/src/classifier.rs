//! Usage classification of scanned assets.
//!
//! Classification is a pure read of a [`ScanOutcome`]: an asset with no
//! recorded occurrence is unused, everything else is used. Used assets whose
//! first reference lives in an unexpected file type are listed separately
//! for manual review; that listing never changes the classification.

use std::path::PathBuf;
use std::time::Duration;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use assetsweep_core::{Asset, ReferenceStats, ScanOutcome, ScanStatus, SweepWarning};

/// Aggregate counters for a classified sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    /// Number of inventoried assets.
    pub total_assets: usize,
    /// Assets with at least one occurrence.
    pub used_assets: usize,
    /// Assets with no occurrence.
    pub unused_assets: usize,
    /// Size of every inventoried asset.
    pub total_bytes: u64,
    /// Size of the unused assets only.
    pub unused_bytes: u64,
}

/// A used asset whose evidence comes from an unexpected file type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnusualReference {
    /// Asset name.
    pub name: CompactString,
    /// Asset location relative to the assets root.
    pub location: PathBuf,
    /// The referencing file, relative to the scan root.
    pub file: PathBuf,
}

/// Results of classifying a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageReport {
    /// Every asset, in inventory order, with its occurrences.
    pub assets: Vec<Asset>,

    /// Unused assets sorted by `(location, name)`.
    pub unused: Vec<Asset>,

    /// Used assets referenced only from unexpected file types.
    pub unusual: Vec<UnusualReference>,

    /// Summary counters.
    pub stats: UsageStats,

    /// Whether the reference scan completed.
    pub status: ScanStatus,

    /// Reference walk counters.
    pub reference_stats: ReferenceStats,

    /// Project root that was searched.
    pub scan_root: PathBuf,

    /// Root the asset locations are relative to.
    pub assets_root: PathBuf,

    /// Wall time of the sweep.
    pub scan_duration: Duration,

    /// Non-fatal problems encountered.
    pub warnings: Vec<SweepWarning>,
}

impl UsageReport {
    /// Check if the reference scan ran to the end.
    ///
    /// A cancelled report's unused list is an over-estimate.
    pub fn is_complete(&self) -> bool {
        self.status == ScanStatus::Complete
    }

    /// Check if any unused asset was found.
    pub fn has_unused(&self) -> bool {
        !self.unused.is_empty()
    }

    /// Share of inventoried assets that are unused (0.0 when empty).
    pub fn unused_ratio(&self) -> f64 {
        if self.stats.total_assets == 0 {
            0.0
        } else {
            self.stats.unused_assets as f64 / self.stats.total_assets as f64
        }
    }
}

/// Classifies scanned assets into used and unused.
#[derive(Debug, Default)]
pub struct UsageClassifier;

impl UsageClassifier {
    /// Create a new classifier.
    pub fn new() -> Self {
        Self
    }

    /// Build a report from a scan outcome without modifying it.
    pub fn classify(&self, outcome: &ScanOutcome) -> UsageReport {
        let mut unused: Vec<Asset> = outcome
            .assets
            .iter()
            .filter(|a| a.is_unused())
            .cloned()
            .collect();
        unused.sort_by(|a, b| {
            a.location
                .cmp(&b.location)
                .then_with(|| a.name.cmp(&b.name))
        });

        let unusual = outcome
            .assets
            .iter()
            .filter_map(|asset| {
                let first = asset.first_occurrence()?;
                (!outcome.config.is_expected_reference(&first.file)).then(|| UnusualReference {
                    name: asset.name.clone(),
                    location: asset.location.clone(),
                    file: first.file.clone(),
                })
            })
            .collect();

        let total_assets = outcome.assets.len();
        let stats = UsageStats {
            total_assets,
            used_assets: total_assets - unused.len(),
            unused_assets: unused.len(),
            total_bytes: outcome.assets.iter().map(|a| a.size_bytes).sum(),
            unused_bytes: unused.iter().map(|a| a.size_bytes).sum(),
        };

        UsageReport {
            assets: outcome.assets.clone(),
            unused,
            unusual,
            stats,
            status: outcome.status,
            reference_stats: outcome.stats.clone(),
            scan_root: outcome.scan_root.clone(),
            assets_root: outcome.assets_root.clone(),
            scan_duration: outcome.scan_duration,
            warnings: outcome.warnings.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetsweep_core::{Occurrence, SweepConfig};

    fn outcome(assets: Vec<Asset>) -> ScanOutcome {
        ScanOutcome::new(
            assets,
            PathBuf::from("/work"),
            PathBuf::from("/work"),
            SweepConfig::new("/work"),
            ScanStatus::Complete,
            ReferenceStats::default(),
            Duration::ZERO,
            Vec::new(),
        )
    }

    fn used(name: &str, location: &str, size: u64, file: &str) -> Asset {
        let mut asset = Asset::new(name, location, size);
        asset.record_occurrence(Occurrence::new(file, 1));
        asset
    }

    #[test]
    fn test_unused_sorted_by_location_then_name() {
        let report = UsageClassifier::new().classify(&outcome(vec![
            Asset::new("b", "z/b.imageset", 1),
            Asset::new("a", "a/a.imageset", 2),
            used("c", "m/c.imageset", 4, "View.swift"),
            Asset::new("a", "z/b.imageset", 8),
        ]));

        let order: Vec<(&str, u64)> = report
            .unused
            .iter()
            .map(|a| (a.name.as_str(), a.size_bytes))
            .collect();
        assert_eq!(order, vec![("a", 2), ("a", 8), ("b", 1)]);
    }

    #[test]
    fn test_stats_count_only_unused_bytes() {
        let report = UsageClassifier::new().classify(&outcome(vec![
            Asset::new("a", "a.imageset", 100),
            used("b", "b.imageset", 50, "main.swift"),
        ]));

        assert_eq!(report.stats.total_assets, 2);
        assert_eq!(report.stats.used_assets, 1);
        assert_eq!(report.stats.unused_assets, 1);
        assert_eq!(report.stats.total_bytes, 150);
        assert_eq!(report.stats.unused_bytes, 100);
        assert_eq!(report.unused_ratio(), 0.5);
    }

    #[test]
    fn test_unusual_locations() {
        let report = UsageClassifier::new().classify(&outcome(vec![
            used("a", "a.imageset", 1, "Sources/View.swift"),
            used("b", "b.imageset", 1, "Resources/theme.json"),
            used("c", "c.imageset", 1, "Base.lproj/Main.storyboard"),
            Asset::new("d", "d.imageset", 1),
            used("e", "e.imageset", 1, "Makefile"),
        ]));

        let names: Vec<&str> = report.unusual.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["b", "e"]);
        assert_eq!(report.unusual[0].file, PathBuf::from("Resources/theme.json"));
        // Unusual references are still used.
        assert_eq!(report.stats.unused_assets, 1);
    }

    #[test]
    fn test_empty_outcome() {
        let report = UsageClassifier::new().classify(&outcome(Vec::new()));

        assert!(!report.has_unused());
        assert_eq!(report.unused_ratio(), 0.0);
        assert!(report.is_complete());
    }
}
