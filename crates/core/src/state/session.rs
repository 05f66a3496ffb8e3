//! Session context.
//!
//! A `Session` owns everything a pipeline run reads or writes: the agent
//! registry, the current selection, the result store, the document text and
//! the credentials. It is shared behind `Arc<tokio::sync::Mutex<_>>` and the
//! engine is the only writer of its results.

use crate::engine::selection::PipelineSelection;
use crate::registry::AgentRegistry;
use crate::state::store::ResultStore;
use ap_protocol::config_models::ApiKeys;
use ap_protocol::result_models::StepResult;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct Session {
    pub registry: AgentRegistry,
    pub selection: PipelineSelection,
    pub results: ResultStore,
    pub document_text: String,
    pub api_keys: ApiKeys,
    /// Agent ids with a gateway call outstanding.
    pub(crate) in_flight: HashSet<String>,
    /// Incremented on every reseed; results computed under an older epoch are dropped.
    pub(crate) epoch: u64,
}

impl Session {
    pub fn new(registry: AgentRegistry, api_keys: ApiKeys) -> Self {
        Self {
            registry,
            api_keys,
            ..Self::default()
        }
    }

    /// Clear the store and create one pending result per selected id.
    ///
    /// Agent names come from the registry; ids missing from it keep their id
    /// as the name. Returns the number of seeded steps.
    pub fn reseed(&mut self) -> usize {
        self.results.clear();
        for (position, agent_id) in self.selection.ids().iter().enumerate() {
            let name = self
                .registry
                .get(agent_id)
                .map_or_else(|| agent_id.clone(), |agent| agent.name.clone());
            self.results
                .upsert(StepResult::pending(position + 1, agent_id.clone(), name));
        }
        self.in_flight.clear();
        self.epoch += 1;
        self.results.len()
    }

    pub fn is_in_flight(&self, agent_id: &str) -> bool {
        self.in_flight.contains(agent_id)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}
