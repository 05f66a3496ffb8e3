//! Global configuration models for `.agentpipe/config.toml`.
//!
//! # Example
//!
//! ```toml
//! [api_keys]
//! gemini = ""
//! openai = ""
//!
//! [ocr]
//! provider = "gemini"
//! gemini_model = "gemini-2.5-flash"
//! openai_model = "gpt-4o"
//! ```

use crate::agent_models::ResolvedProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Vendor credentials. An empty string counts as "not configured".
#[derive(Serialize, Deserialize, Clone, Default, PartialEq, Eq, TS)]
pub struct ApiKeys {
    #[serde(default)]
    pub gemini: String,
    #[serde(default)]
    pub openai: String,
}

impl ApiKeys {
    pub fn new(gemini: impl Into<String>, openai: impl Into<String>) -> Self {
        Self {
            gemini: gemini.into(),
            openai: openai.into(),
        }
    }

    /// Return the key for `provider`, or `None` when it is empty.
    pub fn key_for(&self, provider: ResolvedProvider) -> Option<&str> {
        let key = match provider {
            ResolvedProvider::Gemini => self.gemini.as_str(),
            ResolvedProvider::Openai => self.openai.as_str(),
        };
        (!key.is_empty()).then_some(key)
    }

    pub fn has(&self, provider: ResolvedProvider) -> bool {
        self.key_for(provider).is_some()
    }
}

impl fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mask(key: &str) -> &'static str {
            if key.is_empty() {
                "<unset>"
            } else {
                "<redacted>"
            }
        }
        f.debug_struct("ApiKeys")
            .field("gemini", &mask(&self.gemini))
            .field("openai", &mask(&self.openai))
            .finish()
    }
}

/// Defaults for vision-model PDF transcription.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct OcrSettings {
    #[serde(default = "default_ocr_provider")]
    pub provider: ResolvedProvider,
    #[serde(default = "default_gemini_ocr_model")]
    pub gemini_model: String,
    #[serde(default = "default_openai_ocr_model")]
    pub openai_model: String,
}

impl OcrSettings {
    pub fn model_for(&self, provider: ResolvedProvider) -> &str {
        match provider {
            ResolvedProvider::Gemini => &self.gemini_model,
            ResolvedProvider::Openai => &self.openai_model,
        }
    }
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            provider: default_ocr_provider(),
            gemini_model: default_gemini_ocr_model(),
            openai_model: default_openai_ocr_model(),
        }
    }
}

fn default_ocr_provider() -> ResolvedProvider {
    ResolvedProvider::Gemini
}

fn default_gemini_ocr_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_openai_ocr_model() -> String {
    "gpt-4o".to_string()
}

/// Vendor endpoints. Overridable so tests can point at a local mock server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct GatewaySettings {
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            gemini_base_url: default_gemini_base_url(),
            openai_base_url: default_openai_base_url(),
        }
    }
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com".to_string()
}

/// Represents global settings from `.agentpipe/config.toml`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, TS)]
pub struct GlobalConfig {
    #[serde(default)]
    pub api_keys: ApiKeys,
    #[serde(default)]
    pub ocr: OcrSettings,
    #[serde(default)]
    pub gateway: GatewaySettings,
}
