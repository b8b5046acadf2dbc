//! Asset inventory: discovers asset-unit directories and measures them.

use std::path::{Path, PathBuf};

use jwalk::{Parallelism, WalkDir};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use assetsweep_core::{Asset, SweepConfig, SweepError, SweepWarning, WarningKind};

use crate::filter::{resolve_root, TraversalFilter};

/// Assets discovered under one assets root.
#[derive(Debug, Clone)]
pub struct Inventory {
    /// Discovered assets, in traversal order.
    pub assets: Vec<Asset>,
    /// Canonical assets root the locations are relative to.
    pub root: PathBuf,
    /// Entries that could not be read.
    pub warnings: Vec<SweepWarning>,
}

impl Inventory {
    /// Total on-disk size of every asset.
    pub fn total_size(&self) -> u64 {
        self.assets.iter().map(|a| a.size_bytes).sum()
    }
}

/// Builds the asset inventory from the configured assets root.
#[derive(Debug, Default)]
pub struct AssetInventory;

impl AssetInventory {
    /// Create a new inventory builder.
    pub fn new() -> Self {
        Self
    }

    /// Discover every asset unit under the assets root.
    ///
    /// Fails only if the root is missing or not a directory; unreadable
    /// entries become warnings.
    pub fn build(&self, config: &SweepConfig) -> Result<Inventory, SweepError> {
        let root = resolve_root(config.effective_assets_root())?;
        Ok(self.build_at(config, root))
    }

    /// Discover asset units under an already resolved assets root.
    ///
    /// `root` must be canonical, as returned by [`resolve_root`].
    pub fn build_at(&self, config: &SweepConfig, root: PathBuf) -> Inventory {
        let filter = TraversalFilter::new(config);
        let mut warnings = Vec::new();

        let units = self.discover_units(config, &root, &filter, &mut warnings);
        debug!(count = units.len(), root = %root.display(), "discovered asset units");

        let follow = config.follow_symlinks;
        let measured: Vec<(u64, Vec<SweepWarning>)> = units
            .par_iter()
            .map(|(_, path)| measure_unit(path, follow))
            .collect();

        let mut assets = Vec::with_capacity(units.len());
        for ((name, path), (size, unit_warnings)) in units.into_iter().zip(measured) {
            warnings.extend(unit_warnings);
            let location = path.strip_prefix(&root).unwrap_or(&path).to_path_buf();
            assets.push(Asset::new(name, location, size));
        }

        let inventory = Inventory {
            assets,
            root,
            warnings,
        };
        info!(
            assets = inventory.assets.len(),
            bytes = inventory.total_size(),
            "asset inventory built"
        );
        inventory
    }

    /// Walk the root and collect `(name, path)` for each asset unit.
    fn discover_units(
        &self,
        config: &SweepConfig,
        root: &Path,
        filter: &TraversalFilter,
        warnings: &mut Vec<SweepWarning>,
    ) -> Vec<(String, PathBuf)> {
        let prune = filter.clone();
        let walker = WalkDir::new(root)
            .sort(true)
            .skip_hidden(false)
            .follow_links(config.follow_symlinks)
            .parallelism(walk_parallelism(config.threads))
            .process_read_dir(move |depth, _path, _state, children| {
                if depth.is_none() {
                    return;
                }
                children.retain(|child| match child {
                    Ok(entry) => {
                        !(entry.file_type.is_dir()
                            && prune.prunes_inventory_dir(&entry.file_name.to_string_lossy()))
                    }
                    Err(_) => true,
                });
                // Units are leaves for discovery; their contents are measured separately.
                for entry in children.iter_mut().flatten() {
                    let name = entry.file_name.to_string_lossy();
                    if entry.file_type.is_dir() && prune.config().asset_name(&name).is_some() {
                        entry.read_children_path = None;
                    }
                }
            });

        let mut units = Vec::new();
        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    warn!(path = %path.display(), error = %err, "skipping unreadable entry");
                    warnings.push(walk_warning(path, &err));
                    continue;
                }
            };

            if let Some(err) = &entry.read_children_error {
                warn!(path = %entry.path().display(), error = %err, "skipping unreadable directory");
                warnings.push(walk_warning(entry.path(), err));
            }
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if let Some(name) = config.asset_name(&file_name) {
                units.push((name.to_string(), entry.path()));
            }
        }
        units
    }
}

/// Sum the sizes of every regular file inside an asset unit.
fn measure_unit(path: &Path, follow_symlinks: bool) -> (u64, Vec<SweepWarning>) {
    let mut size = 0;
    let mut warnings = Vec::new();

    let walker = WalkDir::new(path)
        .skip_hidden(false)
        .follow_links(follow_symlinks)
        .parallelism(Parallelism::Serial);

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
                warnings.push(walk_warning(path, &err));
                continue;
            }
        };
        if let Some(err) = &entry.read_children_error {
            warnings.push(walk_warning(entry.path(), err));
        }
        let file_type = entry.file_type();
        if !file_type.is_file() && !file_type.is_symlink() {
            continue;
        }
        // Symlinked representations count at their target's size.
        match std::fs::metadata(entry.path()) {
            Ok(metadata) if metadata.is_file() => size += metadata.len(),
            Ok(_) => {}
            Err(_) if file_type.is_symlink() => {}
            Err(err) => warnings.push(SweepWarning::new(
                entry.path(),
                err.to_string(),
                WarningKind::MetadataError,
            )),
        }
    }

    (size, warnings)
}

/// Convert a jwalk error into a warning, keeping permission failures distinct.
pub(crate) fn walk_warning(path: PathBuf, err: &jwalk::Error) -> SweepWarning {
    match err.io_error() {
        Some(io) => SweepWarning::from_io(path, io),
        None => SweepWarning::new(path, err.to_string(), WarningKind::ReadError),
    }
}

/// jwalk parallelism for a thread setting (0 = auto, 1 = serial).
pub(crate) fn walk_parallelism(threads: usize) -> Parallelism {
    match threads {
        0 => Parallelism::RayonDefaultPool {
            busy_timeout: std::time::Duration::from_millis(100),
        },
        1 => Parallelism::Serial,
        n => Parallelism::RayonNewPool(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_catalog() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        let logo = root.join("App/Images.xcassets/Logo.imageset");
        fs::create_dir_all(&logo).unwrap();
        fs::write(logo.join("logo.png"), vec![0u8; 60]).unwrap();
        fs::write(logo.join("logo@2x.png"), vec![0u8; 40]).unwrap();

        let nested = root.join("App/Images.xcassets/Icons/Star.imageset/dark");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("star.png"), vec![0u8; 25]).unwrap();
        fs::write(nested.parent().unwrap().join("Contents.json"), vec![b'{'; 5]).unwrap();

        let vendored = root.join("Pods/Lib/Assets.xcassets/Vendor.imageset");
        fs::create_dir_all(&vendored).unwrap();
        fs::write(vendored.join("vendor.png"), vec![0u8; 10]).unwrap();

        temp
    }

    #[test]
    fn test_discovers_units_with_sizes() {
        let temp = create_catalog();
        let inventory = AssetInventory::new()
            .build(&SweepConfig::new(temp.path()))
            .unwrap();

        let names: Vec<&str> = inventory.assets.iter().map(|a| a.name.as_str()).collect();
        // Sorted traversal: "Icons" comes before "Logo.imageset".
        assert_eq!(names, vec!["Star", "Logo"]);

        let logo = inventory.assets.iter().find(|a| a.name == "Logo").unwrap();
        assert_eq!(logo.size_bytes, 100);
        assert_eq!(
            logo.location,
            PathBuf::from("App/Images.xcassets/Logo.imageset")
        );

        // Nested representation files and the manifest both count.
        let star = inventory.assets.iter().find(|a| a.name == "Star").unwrap();
        assert_eq!(star.size_bytes, 30);
        assert_eq!(inventory.total_size(), 130);
    }

    #[test]
    fn test_excluded_component_is_pruned() {
        let temp = create_catalog();
        let inventory = AssetInventory::new()
            .build(&SweepConfig::new(temp.path()))
            .unwrap();

        assert!(inventory.assets.iter().all(|a| a.name != "Vendor"));
    }

    #[test]
    fn test_location_relative_to_assets_root() {
        let temp = create_catalog();
        let config = SweepConfig::builder()
            .scan_root(temp.path())
            .assets_root(temp.path().join("App/Images.xcassets"))
            .build()
            .unwrap();

        let inventory = AssetInventory::new().build(&config).unwrap();
        let logo = inventory.assets.iter().find(|a| a.name == "Logo").unwrap();
        assert_eq!(logo.location, PathBuf::from("Logo.imageset"));
    }

    #[test]
    fn test_root_named_like_excluded_dir_is_walked() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("Pods");
        let unit = root.join("Lib/Kit.imageset");
        fs::create_dir_all(&unit).unwrap();
        fs::write(unit.join("kit.png"), vec![0u8; 8]).unwrap();

        let inventory = AssetInventory::new()
            .build(&SweepConfig::new(&root))
            .unwrap();

        assert_eq!(inventory.assets.len(), 1);
        assert_eq!(inventory.assets[0].name, "Kit");
        assert_eq!(inventory.assets[0].size_bytes, 8);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_representation_counts_target_size() {
        let temp = TempDir::new().unwrap();
        let shared = temp.path().join("Shared");
        fs::create_dir_all(&shared).unwrap();
        fs::write(shared.join("real.png"), vec![0u8; 64]).unwrap();

        let unit = temp.path().join("Foo.imageset");
        fs::create_dir_all(&unit).unwrap();
        std::os::unix::fs::symlink(shared.join("real.png"), unit.join("foo.png")).unwrap();
        std::os::unix::fs::symlink(shared.join("gone.png"), unit.join("gone.png")).unwrap();

        let inventory = AssetInventory::new()
            .build(&SweepConfig::new(temp.path()))
            .unwrap();

        let foo = inventory.assets.iter().find(|a| a.name == "Foo").unwrap();
        assert_eq!(foo.size_bytes, 64);
        assert!(inventory.warnings.is_empty());
    }

    #[test]
    fn test_missing_root_is_not_found() {
        let temp = TempDir::new().unwrap();
        let result = AssetInventory::new().build(&SweepConfig::new(temp.path().join("nope")));
        assert!(matches!(result, Err(SweepError::NotFound { .. })));
    }
}
