/// Chat-completions text generator
///
/// Talks to any OpenAI-compatible `/v1/chat/completions` endpoint and returns
/// the first choice's content. Output is best-effort prose, never parsed.
use crate::{
    error::{AppError, AppResult},
    models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage},
    services::providers::TextGenerator,
};
use reqwest::Client as HttpClient;
use std::time::Duration;

const MAX_TOKENS: u32 = 150;
const TEMPERATURE: f32 = 0.7;
const SYSTEM_PROMPT: &str =
    "You write short, friendly descriptions of local places for vacation rental guests.";

#[derive(Clone)]
pub struct OpenAiGenerator {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: String, api_url: String, model: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        let url = format!("{}/v1/chat/completions", self.api_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.build_request(prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Text generation request failed");
            return Err(AppError::ExternalApi(format!(
                "Text generation API returned status {}: {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response.json().await?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AppError::ExternalApi(
                "Text generation returned no content".to_string(),
            ));
        }

        tracing::debug!(chars = text.len(), model = %self.model, "Text generated");

        Ok(text)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
