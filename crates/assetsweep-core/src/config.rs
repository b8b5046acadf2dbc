//! Sweep configuration types.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// How many referencing files are recorded per asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Stop checking an asset once its first referencing file is found.
    ///
    /// Evidence is "first file in traversal order", not a full cross-reference.
    #[default]
    FirstOccurrence,
    /// Check every asset against every eligible file and record all hits.
    Exhaustive,
}

/// Configuration for a sweep over a project tree.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct SweepConfig {
    /// Project tree searched for references.
    pub scan_root: PathBuf,

    /// Subtree inventoried for asset units (None = same as `scan_root`).
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub assets_root: Option<PathBuf>,

    /// Directory-name suffix marking an asset unit.
    #[builder(default = "default_asset_dir_suffix()")]
    #[serde(default = "default_asset_dir_suffix")]
    pub asset_dir_suffix: String,

    /// Path components pruned while building the inventory.
    #[builder(default = "default_inventory_excluded_dirs()")]
    #[serde(default = "default_inventory_excluded_dirs")]
    pub inventory_excluded_dirs: Vec<String>,

    /// Directory names pruned during the reference walk.
    #[builder(default = "default_excluded_dir_names()")]
    #[serde(default = "default_excluded_dir_names")]
    pub excluded_dir_names: Vec<String>,

    /// Directory-name suffixes pruned during the reference walk.
    #[builder(default = "default_excluded_dir_suffixes()")]
    #[serde(default = "default_excluded_dir_suffixes")]
    pub excluded_dir_suffixes: Vec<String>,

    /// Leading character that marks hidden files and directories.
    #[builder(default = "'.'")]
    #[serde(default = "default_hidden_prefix")]
    pub hidden_prefix: char,

    /// File extensions (without dot) never searched for references.
    #[builder(default = "default_excluded_file_extensions()")]
    #[serde(default = "default_excluded_file_extensions")]
    pub excluded_file_extensions: Vec<String>,

    /// Exact file names never searched for references.
    #[builder(default = "default_excluded_file_names()")]
    #[serde(default = "default_excluded_file_names")]
    pub excluded_file_names: Vec<String>,

    /// Extensions where an asset reference is expected to appear.
    #[builder(default = "default_expected_reference_extensions()")]
    #[serde(default = "default_expected_reference_extensions")]
    pub expected_reference_extensions: Vec<String>,

    /// How many referencing files to record per asset.
    #[builder(default)]
    #[serde(default)]
    pub match_mode: MatchMode,

    /// Number of matching threads (0 = auto-detect, 1 = sequential).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Follow symbolic links while walking.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_asset_dir_suffix() -> String {
    ".imageset".to_string()
}

fn default_inventory_excluded_dirs() -> Vec<String> {
    vec!["Pods".to_string()]
}

fn default_excluded_dir_names() -> Vec<String> {
    vec!["Pods".to_string(), "Images.xcassets".to_string()]
}

fn default_excluded_dir_suffixes() -> Vec<String> {
    vec![".framework".to_string(), ".bundle".to_string()]
}

fn default_hidden_prefix() -> char {
    '.'
}

fn default_excluded_file_extensions() -> Vec<String> {
    ["plist", "md", "lock", "pbxproj", "js"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_excluded_file_names() -> Vec<String> {
    vec!["Podfile".to_string()]
}

fn default_expected_reference_extensions() -> Vec<String> {
    ["swift", "m", "xib", "storyboard"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl SweepConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.scan_root {
            Some(ref root) if root.as_os_str().is_empty() => {
                return Err("Scan root cannot be empty".to_string());
            }
            None => return Err("Scan root is required".to_string()),
            _ => {}
        }
        if let Some(Some(ref root)) = self.assets_root {
            if root.as_os_str().is_empty() {
                return Err("Assets root cannot be empty".to_string());
            }
        }
        if let Some(ref suffix) = self.asset_dir_suffix {
            if suffix.is_empty() {
                return Err("Asset directory suffix cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl SweepConfig {
    /// Create a new sweep config builder.
    pub fn builder() -> SweepConfigBuilder {
        SweepConfigBuilder::default()
    }

    /// Create a config with default filters for the given project root.
    pub fn new(scan_root: impl Into<PathBuf>) -> Self {
        Self {
            scan_root: scan_root.into(),
            assets_root: None,
            asset_dir_suffix: default_asset_dir_suffix(),
            inventory_excluded_dirs: default_inventory_excluded_dirs(),
            excluded_dir_names: default_excluded_dir_names(),
            excluded_dir_suffixes: default_excluded_dir_suffixes(),
            hidden_prefix: default_hidden_prefix(),
            excluded_file_extensions: default_excluded_file_extensions(),
            excluded_file_names: default_excluded_file_names(),
            expected_reference_extensions: default_expected_reference_extensions(),
            match_mode: MatchMode::default(),
            threads: 0,
            follow_symlinks: false,
        }
    }

    /// Root of the asset inventory, falling back to the scan root.
    pub fn effective_assets_root(&self) -> &Path {
        self.assets_root.as_deref().unwrap_or(&self.scan_root)
    }

    /// Check if a name carries the hidden-file marker.
    pub fn is_hidden(&self, name: &str) -> bool {
        name.starts_with(self.hidden_prefix)
    }

    /// Check if a directory should be pruned from the reference walk.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.is_hidden(name)
            || self.excluded_dir_names.iter().any(|d| d == name)
            || self
                .excluded_dir_suffixes
                .iter()
                .any(|s| !s.is_empty() && name.ends_with(s.as_str()))
    }

    /// Check if a directory should be pruned from the inventory walk.
    pub fn is_inventory_excluded(&self, name: &str) -> bool {
        self.inventory_excluded_dirs.iter().any(|d| d == name)
    }

    /// Asset name for a directory, if the directory is an asset unit.
    ///
    /// The name is the directory stem: everything before the unit suffix.
    pub fn asset_name<'a>(&self, dir_name: &'a str) -> Option<&'a str> {
        dir_name
            .strip_suffix(self.asset_dir_suffix.as_str())
            .filter(|stem| !stem.is_empty())
    }

    /// Check if a file should be skipped by the reference scan.
    pub fn is_excluded_file(&self, name: &str) -> bool {
        if self.is_hidden(name) || self.excluded_file_names.iter().any(|n| n == name) {
            return true;
        }
        match Path::new(name).extension().and_then(|e| e.to_str()) {
            Some(ext) => contains_extension(&self.excluded_file_extensions, ext),
            None => false,
        }
    }

    /// Check if a referencing file has one of the expected extensions.
    pub fn is_expected_reference(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| contains_extension(&self.expected_reference_extensions, ext))
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

fn contains_extension(set: &[String], ext: &str) -> bool {
    set.iter().any(|e| e.trim_start_matches('.') == ext)
}
