//! Agent registry.
//!
//! The `AgentRegistry` holds the agent set loaded from the last successful
//! agents document and applies field-level edits by agent id. Ordering follows
//! the document; lookups go through an id index.

use crate::config::error::ConfigResult;
use crate::config::loader::parse_agents_document;
use ap_protocol::agent_models::{Agent, AgentPatch, AgentsDocument};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Agent '{0}' not found in registry")]
    NotFound(String),
}

/// Holds the configured agents in document order.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    version: u32,
    agents: Vec<Agent>,
    /// id -> position in `agents`. With duplicate ids the last one wins.
    index: HashMap<String, usize>,
}

impl AgentRegistry {
    /// Create a registry from an already parsed document.
    pub fn new(document: AgentsDocument) -> Self {
        let mut registry = Self::default();
        registry.replace(document);
        registry
    }

    /// Parse `document` and replace the entire agent set with it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::config::ConfigError::InvalidFormat`] when the document is
    /// not valid YAML or lacks a sequence-typed `agents` field. The current
    /// agent set is left untouched in that case.
    pub fn load(&mut self, document: &str) -> ConfigResult<usize> {
        let parsed = parse_agents_document(document)?;
        let count = parsed.agents.len();
        self.replace(parsed);
        tracing::info!(agents = count, version = self.version, "agent set loaded");
        Ok(count)
    }

    /// Replace the entire agent set. No merge with the previous set.
    pub fn replace(&mut self, document: AgentsDocument) {
        self.version = document.version;
        self.agents = document.agents;
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .agents
            .iter()
            .enumerate()
            .map(|(position, agent)| (agent.id.clone(), position))
            .collect();
    }

    pub fn get(&self, agent_id: &str) -> Option<&Agent> {
        self.index.get(agent_id).map(|&position| &self.agents[position])
    }

    pub fn contains(&self, agent_id: &str) -> bool {
        self.index.contains_key(agent_id)
    }

    /// Apply a partial update to the agent with `agent_id`.
    pub fn update(&mut self, agent_id: &str, patch: AgentPatch) -> Result<(), RegistryError> {
        let position = *self
            .index
            .get(agent_id)
            .ok_or_else(|| RegistryError::NotFound(agent_id.to_string()))?;
        self.agents[position].apply(patch);
        Ok(())
    }

    /// Replace the agent whose id matches `agent.id` as a whole.
    pub fn replace_agent(&mut self, agent: Agent) -> Result<(), RegistryError> {
        let position = *self
            .index
            .get(&agent.id)
            .ok_or_else(|| RegistryError::NotFound(agent.id.clone()))?;
        self.agents[position] = agent;
        Ok(())
    }

    /// Agents in document order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Agents whose `enabled` flag is set, in document order.
    pub fn enabled(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(|agent| agent.enabled)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
