//! Live adapter for the `Notifier` port: one JSON POST to the callback URL.

use reqwest::Client;

use crate::ports::notifier::{Notifier, NotifyFuture, RoundOutcome};

/// Live notifier that posts outcomes over HTTP.
pub struct HttpNotifier {
    client: Client,
}

impl HttpNotifier {
    /// Creates a new live notifier.
    #[must_use]
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

impl Default for HttpNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for HttpNotifier {
    fn notify(&self, url: &str, outcome: &RoundOutcome) -> NotifyFuture<'_> {
        let url = url.to_string();
        let outcome = outcome.clone();
        Box::pin(async move {
            let response = self
                .client
                .post(&url)
                .json(&outcome)
                .send()
                .await
                .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> {
                    format!("callback delivery failed: {e}").into()
                })?;
            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(
                    format!("callback rejected ({}): {text}", status.as_u16()).into()
                );
            }
            Ok(())
        })
    }
}
