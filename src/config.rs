//! Process configuration loaded once at startup.
//!
//! All settings come from environment variables (a `.env` file is honored
//! via `dotenvy` in `main`). The resulting [`Config`] is immutable and is
//! shared by `Arc` — nothing reads ambient environment state after startup.

use thiserror::Error;

/// Immutable service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret checked against the `secret` field of inbound requests.
    pub secret: String,
    /// Socket address the HTTP server binds to.
    pub bind_addr: String,
    /// Token used for all repository-host API calls.
    pub github_token: String,
    /// Account under which repositories are created.
    pub github_owner: String,
    /// API key for the generation service.
    pub openai_api_key: String,
    /// Model identifier passed to the generation service.
    pub generation_model: String,
}

/// Error loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

/// Picks the bind address from an explicit address, a bare port, or the default.
fn resolve_addr(addr: Option<String>, port: Option<String>) -> String {
    if let Some(addr) = addr {
        return addr;
    }
    if let Some(port) = port {
        return format!("0.0.0.0:{port}");
    }
    "0.0.0.0:8080".to_string()
}

impl Config {
    /// Loads the configuration from environment variables.
    ///
    /// `PAGEWRIGHT_ADDR` takes precedence over `PORT`; if neither is set the
    /// server binds `0.0.0.0:8080`. `PAGEWRIGHT_MODEL` defaults to
    /// `gpt-5-nano`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `PAGEWRIGHT_SECRET`,
    /// `GITHUB_TOKEN`, `GITHUB_OWNER`, or `OPENAI_API_KEY` is absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret: required("PAGEWRIGHT_SECRET")?,
            bind_addr: resolve_addr(
                std::env::var("PAGEWRIGHT_ADDR").ok(),
                std::env::var("PORT").ok(),
            ),
            github_token: required("GITHUB_TOKEN")?,
            github_owner: required("GITHUB_OWNER")?,
            openai_api_key: required("OPENAI_API_KEY")?,
            generation_model: std::env::var("PAGEWRIGHT_MODEL")
                .unwrap_or_else(|_| "gpt-5-nano".to_string()),
        })
    }
}
