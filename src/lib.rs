//! Core library for the `pagewright` service.
//!
//! pagewright accepts a task request (a natural-language brief, optional
//! attachments, and acceptance checks), drives a generation service to
//! produce a static-website snapshot, publishes it to a GitHub repository,
//! enables GitHub Pages hosting, and notifies a caller-supplied evaluation
//! callback. Round 1 generates a fresh project; round 2 modifies a
//! previously published one.

pub mod adapters;
pub mod config;
pub mod context;
pub mod locks;
pub mod pipeline;
pub mod ports;
pub mod prompt;
pub mod retry;
pub mod server;
pub mod snapshot;
pub mod status;
pub mod task;

use std::sync::Arc;

use config::Config;
use context::ServiceContext;
use locks::TaskLocks;
use server::AppState;
use status::RunRegistry;

/// Loads configuration, wires the live adapters, and serves until exit.
///
/// # Errors
///
/// Returns an error when configuration is incomplete or the server cannot
/// start.
pub async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Arc::new(Config::from_env()?);
    let state = AppState {
        ctx: Arc::new(ServiceContext::live(&config)),
        registry: Arc::new(RunRegistry::new()),
        locks: Arc::new(TaskLocks::new()),
        config: Arc::clone(&config),
    };
    server::serve(&config.bind_addr, state).await
}
