//! Project snapshots and their shape contract.
//!
//! A snapshot is the complete set of named files for one project at one
//! point in time. The generation service is treated as a black box, so its
//! output is schema-checked here before anything is published.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One file in a project snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContext {
    /// Relative path of the file within the project.
    pub file_name: String,
    /// Complete literal contents of the file.
    pub file_content: String,
}

/// Why a snapshot failed validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// The snapshot contains no files at all.
    #[error("snapshot contains no files")]
    Empty,
    /// A file has an empty name.
    #[error("snapshot contains a file with an empty name")]
    UnnamedFile,
    /// Two files share the same name.
    #[error("duplicate file name in snapshot: {0}")]
    DuplicateName(String),
    /// A file has empty content.
    #[error("file {0} has empty content")]
    EmptyContent(String),
}

/// Checks the snapshot shape contract: at least one file, non-empty unique
/// names, non-empty content.
///
/// # Errors
///
/// Returns the first violation found.
pub fn validate(files: &[FileContext]) -> Result<(), SnapshotError> {
    if files.is_empty() {
        return Err(SnapshotError::Empty);
    }
    let mut seen = HashSet::new();
    for file in files {
        if file.file_name.trim().is_empty() {
            return Err(SnapshotError::UnnamedFile);
        }
        if !seen.insert(file.file_name.as_str()) {
            return Err(SnapshotError::DuplicateName(file.file_name.clone()));
        }
        if file.file_content.is_empty() {
            return Err(SnapshotError::EmptyContent(file.file_name.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate, FileContext, SnapshotError};

    fn file(name: &str, content: &str) -> FileContext {
        FileContext { file_name: name.into(), file_content: content.into() }
    }

    #[test]
    fn accepts_a_well_formed_snapshot() {
        let files = vec![file("index.html", "<html></html>"), file("README.md", "# demo")];
        assert_eq!(validate(&files), Ok(()));
    }

    #[test]
    fn rejects_an_empty_snapshot() {
        assert_eq!(validate(&[]), Err(SnapshotError::Empty));
    }

    #[test]
    fn rejects_duplicate_names() {
        let files = vec![file("index.html", "a"), file("index.html", "b")];
        assert_eq!(
            validate(&files),
            Err(SnapshotError::DuplicateName("index.html".into()))
        );
    }

    #[test]
    fn rejects_empty_names_and_content() {
        assert_eq!(validate(&[file("  ", "x")]), Err(SnapshotError::UnnamedFile));
        assert_eq!(
            validate(&[file("style.css", "")]),
            Err(SnapshotError::EmptyContent("style.css".into()))
        );
    }
}
