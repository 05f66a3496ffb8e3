//! Agent configuration models for `agents.yaml`.
//!
//! An agents document carries a format version and a list of agents. Each
//! agent bundles a system prompt with the model parameters used to run it.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Provider requested by an agent's model configuration.
///
/// Unknown provider strings are preserved instead of rejected at parse time;
/// the completion gateway reports them as unsupported when the agent runs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum Provider {
    Gemini,
    Openai,
    /// Pick Gemini when a Gemini key is configured, OpenAI otherwise.
    #[default]
    Auto,
    Unknown(String),
}

impl Provider {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gemini => "gemini",
            Self::Openai => "openai",
            Self::Auto => "auto",
            Self::Unknown(other) => other,
        }
    }
}

impl From<String> for Provider {
    fn from(value: String) -> Self {
        match value.as_str() {
            "gemini" => Self::Gemini,
            "openai" => Self::Openai,
            "auto" => Self::Auto,
            _ => Self::Unknown(value),
        }
    }
}

impl From<Provider> for String {
    fn from(value: Provider) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete vendor after `auto` has been resolved.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedProvider {
    Gemini,
    Openai,
}

impl ResolvedProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Openai => "openai",
        }
    }

    /// Vendor name used in user-facing messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
            Self::Openai => "OpenAI",
        }
    }
}

impl fmt::Display for ResolvedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model parameters for a single agent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct ModelConfig {
    #[ts(type = "string")]
    #[serde(default)]
    pub provider: Provider,

    /// Vendor model name (e.g., "gemini-2.5-flash", "gpt-4o-mini").
    pub name: String,

    /// Sampling temperature in `[0, 1]`.
    pub temperature: f64,

    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// A configured agent: a prompt plus the model that runs it.
///
/// # Example
///
/// ```yaml
/// - id: summarizer
///   name: Summary Generator
///   description: Generate a structured summary
///   enabled: true
///   model:
///     provider: gemini
///     name: gemini-2.5-flash
///     temperature: 0.25
///     max_tokens: 4096
///   prompt: |
///     You are a senior summarization expert.
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct Agent {
    /// Stable key used by pipeline selections and step results.
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Selection-time hint only; the engine runs disabled agents if selected.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    pub model: ModelConfig,

    /// System instruction sent verbatim to the model.
    pub prompt: String,
}

fn default_enabled() -> bool {
    true
}

/// Top-level structure of an `agents.yaml` document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct AgentsDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    pub agents: Vec<Agent>,
}

fn default_version() -> u32 {
    1
}

impl Default for AgentsDocument {
    fn default() -> Self {
        Self {
            version: default_version(),
            agents: Vec::new(),
        }
    }
}

/// Partial update for [`ModelConfig`]. `None` leaves the field untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, TS)]
pub struct ModelPatch {
    #[ts(type = "string | null")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Partial update for [`Agent`]. The id is never patched.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, TS)]
pub struct AgentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl Agent {
    /// Apply a partial update in place.
    pub fn apply(&mut self, patch: AgentPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(prompt) = patch.prompt {
            self.prompt = prompt;
        }
        if let Some(model) = patch.model {
            if let Some(provider) = model.provider {
                self.model.provider = provider;
            }
            if let Some(name) = model.name {
                self.model.name = name;
            }
            if let Some(temperature) = model.temperature {
                self.model.temperature = temperature;
            }
            if let Some(max_tokens) = model.max_tokens {
                self.model.max_tokens = max_tokens;
            }
        }
    }
}
