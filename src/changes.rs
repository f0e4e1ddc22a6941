//! Read-only view of what a branch changed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Modified,
    Added,
    Removed,
    /// Any status the backend reports beyond the three above (renamed, copied, ...).
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffFile {
    pub filename: String,
    #[serde(default)]
    pub status: Option<FileStatus>,
    #[serde(default)]
    pub patch: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Addition,
    Deletion,
    HunkHeader,
    Context,
}

/// Classify a patch line by its leading characters alone.
pub fn classify_line(line: &str) -> LineKind {
    if line.starts_with('+') {
        LineKind::Addition
    } else if line.starts_with('-') {
        LineKind::Deletion
    } else if line.starts_with("@@") {
        LineKind::HunkHeader
    } else {
        LineKind::Context
    }
}

impl DiffFile {
    /// Patch lines with their classification. Empty when there is no patch.
    pub fn lines(&self) -> impl Iterator<Item = (LineKind, &str)> + '_ {
        self.patch
            .as_deref()
            .into_iter()
            .flat_map(|patch| patch.split('\n'))
            .map(|line| (classify_line(line), line))
    }

    /// (additions, deletions) in the patch.
    pub fn line_counts(&self) -> (usize, usize) {
        self.lines().fold((0, 0), |(add, del), (kind, _)| match kind {
            LineKind::Addition => (add + 1, del),
            LineKind::Deletion => (add, del + 1),
            _ => (add, del),
        })
    }
}
