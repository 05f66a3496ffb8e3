//! Configuration models that aggregate all settings.

use crate::init::templates::default_agents_document;
use ap_protocol::agent_models::AgentsDocument;
use ap_protocol::config_models::GlobalConfig;

/// Unified application configuration loaded from the `.agentpipe/` directory.
///
/// # Example
///
/// ```rust,no_run
/// use ap_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Loaded {} agents", config.agents.agents.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Global settings from `config.toml`.
    pub global: GlobalConfig,

    /// The agent set from `agents.yaml`, or the embedded sample agents.
    pub agents: AgentsDocument,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            global: GlobalConfig::default(),
            agents: default_agents_document(),
        }
    }
}
