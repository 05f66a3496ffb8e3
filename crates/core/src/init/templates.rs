//! Embedded template files for `.agentpipe/` initialization.
//!
//! This module uses `rust-embed` to embed the workspace `templates/` directory
//! into the binary at compile time. The same assets provide the sample agent
//! set used when a project has no `agents.yaml` of its own.

use crate::config::loader::parse_agents_document;
use ap_protocol::agent_models::AgentsDocument;
use rust_embed::RustEmbed;

/// Embedded template files from the `templates/` directory.
///
/// The path is calculated relative to the crate root:
/// - `CARGO_MANIFEST_DIR` = `crates/core`
/// - `../../templates` = workspace `templates/`
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../templates"]
pub struct TemplateAssets;

/// Get template file content by path, e.g. `"config.toml"` or `"agents.yaml"`.
///
/// # Example
/// ```
/// use ap_core::init::templates::get_template;
///
/// let config = get_template("config.toml").expect("config.toml should exist");
/// assert!(config.contains("[api_keys]"));
/// ```
pub fn get_template(path: &str) -> Option<String> {
    TemplateAssets::get(path).map(|file| String::from_utf8_lossy(file.data.as_ref()).to_string())
}

/// List all template files whose path starts with `prefix`.
pub fn list_templates(prefix: &str) -> Vec<String> {
    TemplateAssets::iter()
        .filter(|path| path.starts_with(prefix))
        .map(|path| path.to_string())
        .collect()
}

/// The sample agent set shipped in `templates/agents.yaml`.
///
/// Falls back to an empty document if the embedded file does not parse.
pub fn default_agents_document() -> AgentsDocument {
    let Some(content) = get_template("agents.yaml") else {
        tracing::warn!("embedded agents.yaml template is missing");
        return AgentsDocument::default();
    };

    parse_agents_document(&content).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "embedded agents.yaml template is invalid");
        AgentsDocument::default()
    })
}
