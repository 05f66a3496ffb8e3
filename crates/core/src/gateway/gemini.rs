//! Gemini `generateContent` binding.

use super::base::{CompletionBackend, CompletionRequest, ImageRequest};
use super::error::GatewayError;
use super::vendor_error_message;
use ap_protocol::agent_models::ResolvedProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

const PROVIDER: ResolvedProvider = ResolvedProvider::Gemini;

pub struct GeminiBackend {
    client: Client,
    base_url: String,
}

impl GeminiBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    async fn generate(&self, api_key: &str, model: &str, body: &Value) -> Result<String, GatewayError> {
        let resp = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
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

        candidate_text(&data).ok_or_else(|| GatewayError::vendor(PROVIDER, "Response contained no candidate text."))
    }
}

/// Concatenate the text parts of the first candidate.
fn candidate_text(data: &Value) -> Option<String> {
    let parts = data["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts.iter().filter_map(|part| part["text"].as_str()).collect();
    Some(text)
}

/// Gemini receives system prompt and input as a single user turn.
pub(crate) fn combined_prompt(system_prompt: &str, user_input: &str) -> String {
    format!("{system_prompt}\n\n---\n\n{user_input}")
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Result<String, GatewayError> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": combined_prompt(&request.system_prompt, &request.user_input) }]
            }],
            "generationConfig": {
                "temperature": request.temperature,
                "maxOutputTokens": request.max_tokens,
            }
        });

        self.generate(api_key, &request.model, &body).await
    }

    async fn transcribe_image(&self, api_key: &str, request: &ImageRequest) -> Result<String, GatewayError> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": request.instruction },
                    {
                        "inline_data": {
                            "mime_type": request.image.mime_type,
                            "data": request.image.to_base64(),
                        }
                    }
                ]
            }]
        });

        self.generate(api_key, &request.model, &body).await
    }
}
