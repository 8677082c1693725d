//! Callback-notifier port delivering round outcomes.

use std::error::Error;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::task::Round;

/// Boxed future type alias used by [`Notifier`] to keep the trait
/// dyn-compatible.
pub type NotifyFuture<'a> =
    Pin<Box<dyn Future<Output = Result<(), Box<dyn Error + Send + Sync>>> + Send + 'a>>;

/// The payload delivered to the evaluation callback after a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    /// Caller identity, echoed from the request.
    pub email: String,
    /// Project identifier, echoed from the request.
    pub task: String,
    /// Which round produced this outcome; serialized as a number.
    pub round: Round,
    /// Caller correlation value, echoed from the request.
    pub nonce: String,
    /// Browsable URL of the published repository.
    pub repo_url: String,
    /// Commit created by the publish step.
    pub commit_sha: String,
    /// Public URL the hosted site is served from.
    pub pages_url: String,
}

/// Delivers a round outcome to a caller-supplied URL, exactly once.
pub trait Notifier: Send + Sync {
    /// Posts the outcome to `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails; the caller logs and swallows it.
    fn notify(&self, url: &str, outcome: &RoundOutcome) -> NotifyFuture<'_>;
}
