//! Asset and occurrence types.

use std::path::PathBuf;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Evidence that an asset name appears as a quoted literal in a text file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Referencing file, relative to the scan root.
    pub file: PathBuf,
    /// Non-overlapping occurrences of the quoted name in that file.
    pub count: usize,
}

impl Occurrence {
    /// Create a new occurrence record.
    pub fn new(file: impl Into<PathBuf>, count: usize) -> Self {
        Self {
            file: file.into(),
            count,
        }
    }
}

/// Reference-scan state of an asset.
///
/// The only transition is `Unresolved -> Resolved`. An asset still
/// unresolved after a full scan is *unused*; that is decided at report time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionState {
    /// No occurrence found yet; still checked against new files.
    #[default]
    Unresolved,
    /// At least one occurrence recorded.
    Resolved,
}

/// One asset unit (an image-set directory) and its reference evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    /// Directory stem of the unit.
    pub name: CompactString,

    /// Unit path relative to the assets root.
    pub location: PathBuf,

    /// Total size of all regular files inside the unit.
    pub size_bytes: u64,

    /// Reference evidence, in discovery order.
    occurrences: Vec<Occurrence>,

    /// Scan state.
    state: ResolutionState,
}

impl Asset {
    /// Create an unresolved asset.
    pub fn new(name: impl Into<CompactString>, location: impl Into<PathBuf>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            size_bytes,
            occurrences: Vec::new(),
            state: ResolutionState::Unresolved,
        }
    }

    /// The literal searched for in text files: the name in double quotes.
    pub fn needle(&self) -> String {
        format!("\"{}\"", self.name)
    }

    /// Append an occurrence and mark the asset resolved.
    ///
    /// Occurrences are append-only; a resolved asset never becomes unresolved.
    pub fn record_occurrence(&mut self, occurrence: Occurrence) {
        self.occurrences.push(occurrence);
        self.state = ResolutionState::Resolved;
    }

    /// Recorded occurrences, in discovery order.
    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    /// The first recorded occurrence.
    pub fn first_occurrence(&self) -> Option<&Occurrence> {
        self.occurrences.first()
    }

    /// Current scan state.
    pub fn state(&self) -> ResolutionState {
        self.state
    }

    /// Check if the asset is still eligible for matching.
    pub fn is_unresolved(&self) -> bool {
        self.state == ResolutionState::Unresolved
    }

    /// Check if no reference was found.
    pub fn is_unused(&self) -> bool {
        self.occurrences.is_empty()
    }

    /// Total quoted-name hits across all recorded files.
    pub fn total_references(&self) -> usize {
        self.occurrences.iter().map(|o| o.count).sum()
    }
}
