//! Text file reading with typed failures.

use std::path::Path;

use thiserror::Error;

/// Why a candidate file's content could not be used.
#[derive(Debug, Error)]
pub enum TextReadError {
    /// Content is not valid UTF-8; expected for binary files.
    #[error("content is not valid text")]
    Decode,

    /// The file could not be opened.
    #[error("permission denied")]
    PermissionDenied,

    /// Any other read failure.
    #[error(transparent)]
    Io(std::io::Error),
}

impl From<std::io::Error> for TextReadError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            std::io::ErrorKind::InvalidData => Self::Decode,
            _ => Self::Io(err),
        }
    }
}

/// Read a whole file as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String, TextReadError> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|_| TextReadError::Decode)
}

/// Count non-overlapping occurrences of `needle` in `text`.
pub fn count_occurrences(text: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    text.matches(needle).count()
}
