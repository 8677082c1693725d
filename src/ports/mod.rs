//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the orchestration core and an
//! external system (generation service, repository host, evaluation
//! callback). Implementations live in `src/adapters/`.

pub mod generator;
pub mod notifier;
pub mod repo_host;

pub use generator::{SiteBrief, SiteGenerator, SnapshotFuture};
pub use notifier::{Notifier, NotifyFuture, RoundOutcome};
pub use repo_host::{CreatedRepo, HostFuture, HostedSite, RepoHost};
