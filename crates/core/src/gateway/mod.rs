//! Completion gateway.
//!
//! The gateway resolves an agent's provider, checks that a credential exists,
//! and dispatches to the matching vendor backend. It measures wall-clock time
//! around the backend call and never retries.

pub mod base;
pub mod error;
pub mod gemini;
pub mod mock;
pub mod openai;

pub use base::{CompletionBackend, CompletionRequest, ImageRequest, PageImage, PAGE_TRANSCRIPTION_INSTRUCTION};
pub use error::GatewayError;
pub use gemini::GeminiBackend;
pub use mock::MockBackend;
pub use openai::OpenAiBackend;

use ap_protocol::agent_models::{ModelConfig, Provider, ResolvedProvider};
use ap_protocol::config_models::{ApiKeys, GatewaySettings};
use std::sync::Arc;
use std::time::Instant;

/// A successful text completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub output: String,
    /// Wall-clock seconds spent in the backend call.
    pub elapsed_seconds: f64,
    pub provider: ResolvedProvider,
}

/// Map a configured provider to a concrete vendor.
///
/// `auto` picks Gemini when a Gemini key is present and OpenAI otherwise.
pub fn resolve_provider(provider: &Provider, keys: &ApiKeys) -> Result<ResolvedProvider, GatewayError> {
    match provider {
        Provider::Gemini => Ok(ResolvedProvider::Gemini),
        Provider::Openai => Ok(ResolvedProvider::Openai),
        Provider::Auto if keys.has(ResolvedProvider::Gemini) => Ok(ResolvedProvider::Gemini),
        Provider::Auto => Ok(ResolvedProvider::Openai),
        Provider::Unknown(other) => Err(GatewayError::UnsupportedProvider(other.clone())),
    }
}

/// Extract a readable message from a non-success vendor response.
///
/// Both vendors wrap failures as `{"error": {"message": ...}}`; anything else
/// falls back to the raw body, or the status line when the body is empty.
pub(crate) fn vendor_error_message(status: reqwest::StatusCode, body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    if let Some(message) = parsed
        .as_ref()
        .and_then(|value| value["error"]["message"].as_str())
    {
        return message.to_string();
    }

    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        body.to_string()
    }
}

/// Dispatches completions to one backend per vendor.
#[derive(Clone)]
pub struct CompletionGateway {
    gemini: Arc<dyn CompletionBackend>,
    openai: Arc<dyn CompletionBackend>,
}

impl CompletionGateway {
    /// Build a gateway with the HTTP backends pointed at `settings`.
    pub fn new(settings: &GatewaySettings) -> Self {
        Self {
            gemini: Arc::new(GeminiBackend::new(&settings.gemini_base_url)),
            openai: Arc::new(OpenAiBackend::new(&settings.openai_base_url)),
        }
    }

    pub fn with_backends(gemini: Arc<dyn CompletionBackend>, openai: Arc<dyn CompletionBackend>) -> Self {
        Self { gemini, openai }
    }

    fn backend(&self, provider: ResolvedProvider) -> &dyn CompletionBackend {
        match provider {
            ResolvedProvider::Gemini => self.gemini.as_ref(),
            ResolvedProvider::Openai => self.openai.as_ref(),
        }
    }

    /// Run one text completion.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::UnsupportedProvider`] for an unknown provider string
    /// - [`GatewayError::AuthMissing`] when the resolved vendor has no key;
    ///   no request is sent in that case
    /// - [`GatewayError::Vendor`] for transport or vendor failures
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_input: &str,
        model: &ModelConfig,
        keys: &ApiKeys,
    ) -> Result<Completion, GatewayError> {
        let provider = resolve_provider(&model.provider, keys)?;
        let api_key = keys.key_for(provider).ok_or(GatewayError::AuthMissing(provider))?;

        let request = CompletionRequest {
            model: model.name.clone(),
            system_prompt: system_prompt.to_string(),
            user_input: user_input.to_string(),
            temperature: model.temperature,
            max_tokens: model.max_tokens,
        };

        tracing::debug!(
            provider = %provider,
            model = %request.model,
            input_chars = request.user_input.len(),
            "dispatching completion"
        );

        let started = Instant::now();
        let output = self.backend(provider).complete(api_key, &request).await?;
        let elapsed_seconds = started.elapsed().as_secs_f64();

        tracing::debug!(provider = %provider, elapsed_seconds, "completion finished");

        Ok(Completion {
            output,
            elapsed_seconds,
            provider,
        })
    }

    /// Transcribe one rendered page with a vision model.
    pub async fn transcribe_page(
        &self,
        provider: ResolvedProvider,
        model: &str,
        keys: &ApiKeys,
        page: &PageImage,
    ) -> Result<String, GatewayError> {
        let api_key = keys.key_for(provider).ok_or(GatewayError::AuthMissing(provider))?;

        let request = ImageRequest {
            model: model.to_string(),
            instruction: PAGE_TRANSCRIPTION_INSTRUCTION.to_string(),
            image: page.clone(),
        };

        tracing::debug!(provider = %provider, model, bytes = page.bytes.len(), "dispatching page transcription");

        self.backend(provider).transcribe_image(api_key, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(provider: Provider) -> ModelConfig {
        ModelConfig {
            provider,
            name: "test-model".to_string(),
            temperature: 0.3,
            max_tokens: 64,
        }
    }

    fn mock_gateway() -> (CompletionGateway, Arc<MockBackend>, Arc<MockBackend>) {
        let gemini = Arc::new(MockBackend::new());
        let openai = Arc::new(MockBackend::new());
        let gateway = CompletionGateway::with_backends(gemini.clone(), openai.clone());
        (gateway, gemini, openai)
    }

    #[test]
    fn test_resolve_auto_prefers_gemini_key() {
        let both = ApiKeys::new("g", "o");
        let openai_only = ApiKeys::new("", "o");
        let none = ApiKeys::default();

        assert_eq!(resolve_provider(&Provider::Auto, &both), Ok(ResolvedProvider::Gemini));
        assert_eq!(resolve_provider(&Provider::Auto, &openai_only), Ok(ResolvedProvider::Openai));
        assert_eq!(resolve_provider(&Provider::Auto, &none), Ok(ResolvedProvider::Openai));
    }

    #[test]
    fn test_resolve_explicit_and_unknown() {
        let keys = ApiKeys::default();
        assert_eq!(resolve_provider(&Provider::Openai, &keys), Ok(ResolvedProvider::Openai));
        assert_eq!(resolve_provider(&Provider::Gemini, &keys), Ok(ResolvedProvider::Gemini));
        assert_eq!(
            resolve_provider(&Provider::Unknown("mistral".to_string()), &keys),
            Err(GatewayError::UnsupportedProvider("mistral".to_string()))
        );
    }

    #[test]
    fn test_vendor_error_message_fallbacks() {
        let status = reqwest::StatusCode::BAD_REQUEST;
        assert_eq!(
            vendor_error_message(status, r#"{"error": {"message": "bad model"}}"#),
            "bad model"
        );
        assert_eq!(vendor_error_message(status, "gateway exploded"), "gateway exploded");
        assert_eq!(vendor_error_message(status, ""), "400 Bad Request");
    }

    #[tokio::test]
    async fn test_complete_dispatches_by_resolved_provider() {
        let (gateway, gemini, openai) = mock_gateway();
        let keys = ApiKeys::new("g", "o");

        let completion = gateway
            .complete("prompt", "input", &model(Provider::Openai), &keys)
            .await
            .unwrap();

        assert_eq!(completion.provider, ResolvedProvider::Openai);
        assert_eq!(completion.output, "output of test-model: input");
        assert!(completion.elapsed_seconds >= 0.0);
        assert_eq!(openai.calls(), 1);
        assert_eq!(gemini.calls(), 0);

        let sent = &openai.requests()[0];
        assert_eq!(sent.system_prompt, "prompt");
        assert_eq!(sent.temperature, 0.3);
        assert_eq!(sent.max_tokens, 64);
    }

    #[tokio::test]
    async fn test_auth_missing_before_dispatch() {
        let (gateway, gemini, _openai) = mock_gateway();
        let keys = ApiKeys::new("   ", "o");

        let result = gateway
            .complete("prompt", "input", &model(Provider::Gemini), &keys)
            .await;

        assert_eq!(result, Err(GatewayError::AuthMissing(ResolvedProvider::Gemini)));
        assert_eq!(gemini.calls(), 0);
    }

    #[tokio::test]
    async fn test_transcribe_page_requires_key() {
        let (gateway, _gemini, openai) = mock_gateway();
        let page = PageImage::jpeg(vec![1, 2, 3]);

        let missing = gateway
            .transcribe_page(ResolvedProvider::Openai, "gpt-4o", &ApiKeys::default(), &page)
            .await;
        assert_eq!(missing, Err(GatewayError::AuthMissing(ResolvedProvider::Openai)));

        let text = gateway
            .transcribe_page(ResolvedProvider::Openai, "gpt-4o", &ApiKeys::new("", "o"), &page)
            .await
            .unwrap();
        assert_eq!(text, "page text");
        assert_eq!(openai.calls(), 1);
    }
}
