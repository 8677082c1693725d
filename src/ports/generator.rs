//! Generation-service port producing project snapshots.

use std::error::Error;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::snapshot::FileContext;
use crate::task::Attachment;

/// Boxed future type alias used by [`SiteGenerator`] to keep the trait
/// dyn-compatible.
pub type SnapshotFuture<'a> = Pin<
    Box<dyn Future<Output = Result<Vec<FileContext>, Box<dyn Error + Send + Sync>>> + Send + 'a>,
>;

/// The caller-facing half of a task: what to build and how it is judged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteBrief {
    /// Free-text description of the desired site.
    pub brief: String,
    /// Attachments to embed in the generated site, in submission order.
    pub attachments: Vec<Attachment>,
    /// Acceptance criteria the generated site must satisfy.
    pub checks: Vec<String>,
}

/// Produces or modifies static-site snapshots from a natural-language brief.
///
/// Both operations return a complete snapshot, never a diff: publishing
/// performs a full-tree replace, so any file missing from the returned set
/// is effectively deleted from the published project.
pub trait SiteGenerator: Send + Sync {
    /// Generates a fresh project for the brief.
    ///
    /// # Errors
    ///
    /// Returns an error if the generation call fails or returns output that
    /// is not a list of files.
    fn generate(&self, brief: &SiteBrief) -> SnapshotFuture<'_>;

    /// Applies the brief's changes to an existing snapshot.
    ///
    /// Implementations must return every original file, modified or not,
    /// and must not add or remove files unless the brief requires it.
    ///
    /// # Errors
    ///
    /// Returns an error if the modification call fails or returns output
    /// that is not a list of files.
    fn modify(&self, existing: &[FileContext], brief: &SiteBrief) -> SnapshotFuture<'_>;
}
