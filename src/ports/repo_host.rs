//! Repository-host port: durable storage and static hosting for snapshots.

use std::error::Error;
use std::future::Future;
use std::pin::Pin;

use crate::snapshot::FileContext;

/// Boxed future type alias used by [`RepoHost`] to keep the trait
/// dyn-compatible.
pub type HostFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, Box<dyn Error + Send + Sync>>> + Send + 'a>>;

/// A freshly created repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRepo {
    /// Browsable URL of the repository.
    pub repo_url: String,
}

/// A repository with static hosting enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedSite {
    /// Public URL the hosted site is served from.
    pub pages_url: String,
    /// Browsable URL of the repository.
    pub repo_url: String,
}

/// The four operations the pipeline needs from the repository host.
///
/// None of them retries internally; transient-failure handling is the
/// orchestrator's concern.
pub trait RepoHost: Send + Sync {
    /// Creates a repository with the given name.
    ///
    /// # Errors
    ///
    /// Returns an error on name collision or any host failure.
    fn create(&self, name: &str) -> HostFuture<'_, CreatedRepo>;

    /// Fetches the current snapshot of an existing repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository does not exist or holds no files.
    fn fetch(&self, name: &str) -> HostFuture<'_, Vec<FileContext>>;

    /// Publishes a snapshot, replacing all prior content, and returns the
    /// resulting commit identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if any part of the publish fails.
    fn push(&self, name: &str, files: &[FileContext]) -> HostFuture<'_, String>;

    /// Enables static hosting and returns the public and browsable URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if hosting cannot be enabled or resolved.
    fn enable_hosting(&self, name: &str) -> HostFuture<'_, HostedSite>;
}
