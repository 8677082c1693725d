//! Service context bundling all port trait objects.

use std::sync::Arc;

use crate::adapters::live::{GitHubHost, HttpNotifier, OpenAiGenerator};
use crate::config::Config;
use crate::ports::generator::SiteGenerator;
use crate::ports::notifier::Notifier;
use crate::ports::repo_host::RepoHost;

/// Bundles the three port trait objects into a single context.
///
/// Each field provides access to one external boundary. Ports are held by
/// `Arc` because every pipeline run is a spawned task sharing the same
/// context.
pub struct ServiceContext {
    /// Generation service that produces and modifies snapshots.
    pub generator: Arc<dyn SiteGenerator>,
    /// Repository host providing storage and static hosting.
    pub repo: Arc<dyn RepoHost>,
    /// Callback notifier delivering round outcomes.
    pub notifier: Arc<dyn Notifier>,
}

impl ServiceContext {
    /// Creates a context from explicit port implementations.
    ///
    /// Tests use this to wire in stubs.
    #[must_use]
    pub fn new(
        generator: Arc<dyn SiteGenerator>,
        repo: Arc<dyn RepoHost>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { generator, repo, notifier }
    }

    /// Creates a live context with real adapters for all three ports.
    #[must_use]
    pub fn live(config: &Config) -> Self {
        Self {
            generator: Arc::new(OpenAiGenerator::new(
                config.openai_api_key.clone(),
                config.generation_model.clone(),
            )),
            repo: Arc::new(GitHubHost::new(
                config.github_token.clone(),
                config.github_owner.clone(),
            )),
            notifier: Arc::new(HttpNotifier::new()),
        }
    }
}
