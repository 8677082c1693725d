//! Live adapter for the `SiteGenerator` port using the OpenAI chat API.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::ports::generator::{SiteBrief, SiteGenerator, SnapshotFuture};
use crate::prompt;
use crate::snapshot::FileContext;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Live generation client that calls the OpenAI chat completions API.
pub struct OpenAiGenerator {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiGenerator {
    /// Creates a new live generation client.
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self { client: Client::new(), api_key, model }
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: String,
    ) -> Result<Vec<FileContext>, Box<dyn std::error::Error + Send + Sync>> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system_prompt },
                ChatMessage { role: "user", content: &user_prompt },
            ],
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> {
                format!("generation request failed: {e}").into()
            })?;

        let status = response.status();
        let response_text =
            response.text().await.map_err(|e| -> Box<dyn std::error::Error + Send + Sync> {
                format!("failed to read generation response: {e}").into()
            })?;

        if !status.is_success() {
            let msg = serde_json::from_str::<ApiError>(&response_text)
                .map(|e| e.error.message)
                .unwrap_or(response_text);
            return Err(format!("generation API error ({}): {msg}", status.as_u16()).into());
        }

        let parsed: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| format!("unexpected generation response shape: {e}"))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or("generation response contained no choices")?;

        parse_snapshot(&content)
    }
}

/// Request body sent to the chat completions API.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

/// A single message in the chat request.
#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Top-level response from the chat completions API.
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

/// One completion choice.
#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

/// The assistant message inside a choice.
#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}

/// Error response from the API.
#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

/// Detail inside an API error response.
#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Parses the model output into a snapshot, tolerating a markdown code
/// fence around the JSON array.
fn parse_snapshot(
    text: &str,
) -> Result<Vec<FileContext>, Box<dyn std::error::Error + Send + Sync>> {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        body = rest.strip_suffix("```").unwrap_or(rest).trim();
    }
    serde_json::from_str(body)
        .map_err(|e| format!("generation output is not a file list: {e}").into())
}

impl SiteGenerator for OpenAiGenerator {
    fn generate(&self, brief: &SiteBrief) -> SnapshotFuture<'_> {
        let user_prompt = prompt::generation_prompt(brief);
        Box::pin(async move { self.complete(prompt::GENERATION_SYSTEM_PROMPT, user_prompt).await })
    }

    fn modify(&self, existing: &[FileContext], brief: &SiteBrief) -> SnapshotFuture<'_> {
        let user_prompt = prompt::modification_prompt(existing, brief);
        Box::pin(
            async move { self.complete(prompt::MODIFICATION_SYSTEM_PROMPT, user_prompt).await },
        )
    }
}
