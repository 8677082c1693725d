//! Live adapters talking to real external services.

pub mod generator;
pub mod github;
pub mod notifier;

pub use generator::OpenAiGenerator;
pub use github::GitHubHost;
pub use notifier::HttpNotifier;
