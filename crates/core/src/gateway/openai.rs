//! OpenAI chat completions binding.

use super::base::{CompletionBackend, CompletionRequest, ImageRequest};
use super::error::GatewayError;
use super::vendor_error_message;
use ap_protocol::agent_models::ResolvedProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

const PROVIDER: ResolvedProvider = ResolvedProvider::Openai;

/// Output cap for page transcription requests.
pub const TRANSCRIPTION_MAX_TOKENS: u32 = 4096;

pub struct OpenAiBackend {
    client: Client,
    base_url: String,
}

impl OpenAiBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    async fn chat(&self, api_key: &str, body: &Value) -> Result<String, GatewayError> {
        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::vendor(PROVIDER, e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| GatewayError::vendor(PROVIDER, e.to_string()))?;

        if !status.is_success() {
            return Err(GatewayError::vendor(PROVIDER, vendor_error_message(status, &text)));
        }

        let data: Value = serde_json::from_str(&text)
            .map_err(|e| GatewayError::vendor(PROVIDER, format!("Parse error: {e}")))?;

        data["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| GatewayError::vendor(PROVIDER, "Response contained no message content."))
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Result<String, GatewayError> {
        let body = json!({
            "model": request.model,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.user_input },
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        self.chat(api_key, &body).await
    }

    async fn transcribe_image(&self, api_key: &str, request: &ImageRequest) -> Result<String, GatewayError> {
        let body = json!({
            "model": request.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": request.instruction },
                    { "type": "image_url", "image_url": { "url": request.image.to_data_url() } },
                ]
            }],
            "max_tokens": TRANSCRIPTION_MAX_TOKENS,
        });

        self.chat(api_key, &body).await
    }
}
