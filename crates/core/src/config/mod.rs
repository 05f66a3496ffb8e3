//! Configuration loading and management.
//!
//! This module loads the `.agentpipe/` project directory: global settings from
//! `config.toml` and the agent set from `agents.yaml`.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, parse_agents_document};
pub use models::AppConfig;

/// Name of the per-project configuration directory.
pub const CONFIG_DIR: &str = ".agentpipe";

/// File name of the agents document inside [`CONFIG_DIR`].
pub const AGENTS_FILE: &str = "agents.yaml";

/// File name of the global settings inside [`CONFIG_DIR`].
pub const SETTINGS_FILE: &str = "config.toml";
