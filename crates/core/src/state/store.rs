//! Result store.
//!
//! Holds at most one [`StepResult`] per agent id, kept ordered by step
//! number.

use ap_protocol::result_models::StepResult;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultStore {
    results: Vec<StepResult>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the result for `result.agent_id`.
    ///
    /// An existing entry is replaced in place. A new entry is appended and the
    /// store is re-sorted by step; the sort is stable, so entries that share a
    /// step keep their insertion order.
    pub fn upsert(&mut self, result: StepResult) {
        match self
            .results
            .iter_mut()
            .find(|existing| existing.agent_id == result.agent_id)
        {
            Some(existing) => *existing = result,
            None => {
                self.results.push(result);
                self.results.sort_by_key(|r| r.step);
            }
        }
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }

    /// All results, ordered by step.
    pub fn all(&self) -> &[StepResult] {
        &self.results
    }

    pub fn get(&self, agent_id: &str) -> Option<&StepResult> {
        self.results.iter().find(|r| r.agent_id == agent_id)
    }

    pub fn by_step(&self, step: usize) -> Option<&StepResult> {
        self.results.iter().find(|r| r.step == step)
    }

    pub fn completed(&self) -> impl Iterator<Item = &StepResult> {
        self.results.iter().filter(|r| r.is_completed())
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
