//! Backend trait and request types shared by the vendor bindings.

use super::error::GatewayError;
use async_trait::async_trait;

/// Instruction sent alongside every page image during vision transcription.
pub const PAGE_TRANSCRIPTION_INSTRUCTION: &str = "Extract all text from this document page, maintaining the original structure and reading order as best as possible.";

/// A text completion request in vendor-neutral form.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_input: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// A rendered document page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl PageImage {
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: "image/jpeg".to_string(),
        }
    }

    /// Base64 payload for inline image transport.
    pub fn to_base64(&self) -> String {
        data_encoding::BASE64.encode(&self.bytes)
    }

    /// `data:` URL form of the image.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// A page transcription request.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub model: String,
    pub instruction: String,
    pub image: PageImage,
}

/// One vendor binding.
///
/// Implementations perform a single HTTP exchange per call. They never retry
/// and never check credentials; the gateway does that before dispatching.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Result<String, GatewayError>;

    async fn transcribe_image(&self, api_key: &str, request: &ImageRequest) -> Result<String, GatewayError>;
}
