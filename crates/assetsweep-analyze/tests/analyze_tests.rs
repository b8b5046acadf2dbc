use assetsweep_analyze::{Occurrence, ScanStatus, Sweep, UsageClassifier};
use assetsweep_core::{MatchMode, SweepConfig, SweepError};
use assetsweep_scan::CancelToken;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, contents: impl AsRef<[u8]>) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// `A` (two files, 100 bytes, never referenced) and `B` (one file, 50 bytes,
/// referenced once from `main.src`).
fn create_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "Images.xcassets/A.imageset/a.png", [0u8; 70]);
    write(root, "Images.xcassets/A.imageset/a@2x.png", [0u8; 30]);
    write(root, "Images.xcassets/B.imageset/b.png", [0u8; 50]);
    write(root, "main.src", r#"load("B")"#);
    temp
}

#[test]
fn test_basic_scenario() {
    let temp = create_project();
    let report = Sweep::new(SweepConfig::new(temp.path())).run().unwrap();

    assert!(report.is_complete());
    assert_eq!(report.stats.total_assets, 2);
    assert_eq!(report.stats.unused_assets, 1);
    assert_eq!(report.stats.unused_bytes, 100);
    assert_eq!(report.stats.total_bytes, 150);

    let unused: Vec<&str> = report.unused.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(unused, vec!["A"]);

    let b = report.assets.iter().find(|a| a.name == "B").unwrap();
    assert_eq!(b.occurrences(), &[Occurrence::new("main.src", 1)]);

    // `.src` is not an expected reference type.
    assert_eq!(report.unusual.len(), 1);
    assert_eq!(report.unusual[0].file, PathBuf::from("main.src"));
}

#[test]
fn test_classification_is_total_and_exclusive() {
    let temp = create_project();
    write(temp.path(), "Sources/Extra.swift", r#"UIImage(named: "Ghost")"#);
    write(temp.path(), "Images.xcassets/Ghost.imageset/g.png", [0u8; 5]);
    write(temp.path(), "Images.xcassets/Zed.imageset/z.png", [0u8; 9]);

    let report = Sweep::new(SweepConfig::new(temp.path())).run().unwrap();

    let ghost = report.assets.iter().find(|a| a.name == "Ghost").unwrap();
    assert_eq!(
        ghost.occurrences(),
        &[Occurrence::new("Sources/Extra.swift", 1)]
    );
    let unused: Vec<&str> = report.unused.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(unused, vec!["A", "Zed"]);
    assert_eq!(report.stats.used_assets, 2);

    for asset in &report.assets {
        let listed = report
            .unused
            .iter()
            .any(|u| u.location == asset.location && u.name == asset.name);
        assert_eq!(listed, asset.occurrences().is_empty(), "asset {}", asset.name);
    }

    let unused_sum: u64 = report.unused.iter().map(|a| a.size_bytes).sum();
    assert_eq!(report.stats.unused_bytes, unused_sum);
    assert_eq!(
        report.stats.used_assets + report.stats.unused_assets,
        report.stats.total_assets
    );
}

#[test]
fn test_hidden_file_does_not_resolve() {
    let temp = create_project();
    write(temp.path(), ".hidden", r#""A""#);

    let report = Sweep::new(SweepConfig::new(temp.path())).run().unwrap();

    assert!(report.unused.iter().any(|a| a.name == "A"));
}

#[test]
fn test_binary_file_is_not_a_reference() {
    let temp = create_project();
    write(temp.path(), "Resources/data.bin", [0xff, 0xfe, b'"', b'A', b'"']);

    let report = Sweep::new(SweepConfig::new(temp.path())).run().unwrap();

    assert!(report.unused.iter().any(|a| a.name == "A"));
    assert_eq!(report.reference_stats.files_skipped_binary, 1);
    assert!(report.warnings.is_empty());
}

#[test]
fn test_vendored_tree_is_ignored_by_both_passes() {
    let temp = create_project();
    write(temp.path(), "Pods/Kit/Kit.xcassets/Vendor.imageset/v.png", [0u8; 40]);
    write(temp.path(), "Pods/Kit/Source.swift", r#""A" "Vendor""#);

    let report = Sweep::new(SweepConfig::new(temp.path())).run().unwrap();

    assert_eq!(report.stats.total_assets, 2);
    assert!(report.assets.iter().all(|a| a.name != "Vendor"));
    assert!(report.unused.iter().any(|a| a.name == "A"));
}

#[test]
fn test_sweep_is_idempotent() {
    let temp = create_project();
    write(temp.path(), "Sources/One.swift", r#""A""#);
    write(temp.path(), "Sources/Two.swift", r#""A" "B""#);

    let sweep = Sweep::new(SweepConfig::new(temp.path()));
    let first = sweep.run().unwrap();
    let second = sweep.run().unwrap();

    assert_eq!(first.stats, second.stats);
    assert_eq!(first.unusual, second.unusual);
    for (a, b) in first.assets.iter().zip(&second.assets) {
        assert_eq!(a.location, b.location);
        assert_eq!(a.occurrences(), b.occurrences());
    }
}

#[test]
fn test_separate_assets_root() {
    let temp = create_project();
    let config = SweepConfig::builder()
        .scan_root(temp.path())
        .assets_root(temp.path().join("Images.xcassets"))
        .build()
        .unwrap();

    let report = Sweep::new(config).run().unwrap();

    let locations: Vec<&Path> = report.unused.iter().map(|a| a.location.as_path()).collect();
    assert_eq!(locations, vec![Path::new("A.imageset")]);
}

#[test]
fn test_exhaustive_mode_does_not_change_classification() {
    let temp = create_project();
    write(temp.path(), "z.swift", r#""B""#);

    let first = Sweep::new(SweepConfig::new(temp.path())).run().unwrap();
    let exhaustive = Sweep::new(
        SweepConfig::builder()
            .scan_root(temp.path())
            .match_mode(MatchMode::Exhaustive)
            .build()
            .unwrap(),
    )
    .run()
    .unwrap();

    assert_eq!(first.stats, exhaustive.stats);
    let b = exhaustive.assets.iter().find(|a| a.name == "B").unwrap();
    assert_eq!(b.occurrences().len(), 2);
}

#[test]
fn test_cancelled_sweep_is_tagged() {
    let temp = create_project();
    let token = CancelToken::new();
    token.cancel();

    let report = Sweep::with_cancel_token(SweepConfig::new(temp.path()), token)
        .run()
        .unwrap();

    assert_eq!(report.status, ScanStatus::Cancelled);
    assert!(!report.is_complete());
    // Inventory still completes; nothing was resolved.
    assert_eq!(report.stats.total_assets, 2);
}

#[test]
fn test_missing_root_is_fatal() {
    let temp = TempDir::new().unwrap();
    let result = Sweep::new(SweepConfig::new(temp.path().join("gone"))).run();
    assert!(matches!(result, Err(SweepError::NotFound { .. })));
}

#[test]
fn test_classifier_does_not_mutate_outcome() {
    let temp = create_project();
    let outcome = Sweep::new(SweepConfig::new(temp.path())).scan().unwrap();
    let before: Vec<usize> = outcome.assets.iter().map(|a| a.occurrences().len()).collect();

    let report = UsageClassifier::new().classify(&outcome);
    let after: Vec<usize> = outcome.assets.iter().map(|a| a.occurrences().len()).collect();

    assert_eq!(before, after);
    assert_eq!(report.assets.len(), outcome.assets.len());
}

#[test]
fn test_report_serializes_to_json() {
    let temp = create_project();
    let report = Sweep::new(SweepConfig::new(temp.path())).run().unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["stats"]["unused_bytes"], 100);
    assert_eq!(json["status"], "complete");
}
