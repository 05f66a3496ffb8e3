//! Configuration file loader for the `.agentpipe/` directory.
//!
//! This module provides functionality to load and parse:
//! - `config.toml`: credentials, OCR defaults and vendor endpoints
//! - `agents.yaml`: the agent set
//!
//! It also owns the validation rule for agents documents, shared by file
//! loading and by [`crate::registry::AgentRegistry::load`].

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::AppConfig;
use crate::config::{AGENTS_FILE, CONFIG_DIR, SETTINGS_FILE};
use crate::init::templates::default_agents_document;
use ap_protocol::agent_models::AgentsDocument;
use ap_protocol::config_models::{ApiKeys, GlobalConfig};
use std::path::Path;

/// Environment variable consulted when no Gemini key is configured.
pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable consulted when no OpenAI key is configured.
pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

/// Loads all configuration from the `.agentpipe/` directory.
///
/// Missing pieces fall back to defaults instead of failing:
/// - no `.agentpipe/` directory: default settings and the embedded sample agents
/// - no `config.toml`: default settings
/// - no `agents.yaml`: the embedded sample agents
///
/// Empty API keys are filled from `GEMINI_API_KEY` / `OPENAI_API_KEY`.
///
/// # Errors
///
/// Returns `ConfigError` if a file exists but cannot be read, has invalid
/// TOML syntax, or holds a malformed agents document.
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let ap_dir = root.join(CONFIG_DIR);

    let mut config = if ap_dir.exists() {
        AppConfig {
            global: load_global_config(&ap_dir).await?,
            agents: load_agents(&ap_dir).await?,
        }
    } else {
        AppConfig::default()
    };

    apply_env_keys(&mut config.global.api_keys, |name| std::env::var(name).ok());

    Ok(config)
}

/// Loads global settings from `config.toml`.
async fn load_global_config(ap_dir: &Path) -> ConfigResult<GlobalConfig> {
    let config_path = ap_dir.join(SETTINGS_FILE);

    if !config_path.exists() {
        return Ok(GlobalConfig::default());
    }

    let content = tokio::fs::read_to_string(&config_path)
        .await
        .map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path,
        source,
    })
}

/// Loads the agents document from `agents.yaml`.
async fn load_agents(ap_dir: &Path) -> ConfigResult<AgentsDocument> {
    let agents_path = ap_dir.join(AGENTS_FILE);

    if !agents_path.exists() {
        return Ok(default_agents_document());
    }

    let content = tokio::fs::read_to_string(&agents_path)
        .await
        .map_err(|source| ConfigError::FileRead {
            path: agents_path.clone(),
            source,
        })?;

    parse_agents_document(&content).map_err(|e| ConfigError::InvalidAgentsFile {
        path: agents_path,
        reason: e.to_string(),
    })
}

/// Parse and validate an agents document.
///
/// The document must be valid YAML whose top-level `agents` field is a
/// sequence. Anything else is reported as [`ConfigError::InvalidFormat`].
pub fn parse_agents_document(content: &str) -> ConfigResult<AgentsDocument> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidFormat {
            reason: format!("not valid YAML: {e}"),
        })?;

    match value.get("agents") {
        Some(agents) if agents.is_sequence() => {}
        Some(_) => {
            return Err(ConfigError::InvalidFormat {
                reason: "`agents` must be a sequence".to_string(),
            })
        }
        None => {
            return Err(ConfigError::InvalidFormat {
                reason: "missing top-level `agents` field".to_string(),
            })
        }
    }

    serde_yaml::from_value(value).map_err(|e| ConfigError::InvalidFormat {
        reason: format!("invalid agent entry: {e}"),
    })
}

/// Fill empty keys from the environment. `lookup` abstracts `std::env::var`.
pub fn apply_env_keys(keys: &mut ApiKeys, lookup: impl Fn(&str) -> Option<String>) {
    if keys.gemini.is_empty() {
        if let Some(key) = lookup(GEMINI_KEY_ENV) {
            keys.gemini = key;
        }
    }
    if keys.openai.is_empty() {
        if let Some(key) = lookup(OPENAI_KEY_ENV) {
            keys.openai = key;
        }
    }
}
