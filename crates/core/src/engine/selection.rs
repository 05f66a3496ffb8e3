//! Ordered pipeline selection.
//!
//! A selection is the ordered list of agent ids to run. The step number of an
//! agent is its 1-based position in the list.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Agent '{0}' is already selected")]
    Duplicate(String),

    #[error("Agent '{0}' is not selected")]
    NotSelected(String),

    #[error("Position {position} is out of range for {len} selected agents")]
    OutOfRange { position: usize, len: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSelection {
    ids: Vec<String>,
}

impl PipelineSelection {
    /// Build a selection, rejecting repeated ids.
    pub fn from_ids<I, S>(ids: I) -> Result<Self, SelectionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::default();
        selection.set(ids)?;
        Ok(selection)
    }

    /// Append `agent_id` as the last step.
    pub fn add(&mut self, agent_id: impl Into<String>) -> Result<usize, SelectionError> {
        let agent_id = agent_id.into();
        if self.contains(&agent_id) {
            return Err(SelectionError::Duplicate(agent_id));
        }
        self.ids.push(agent_id);
        Ok(self.ids.len())
    }

    pub fn remove(&mut self, agent_id: &str) -> Result<(), SelectionError> {
        let position = self
            .position(agent_id)
            .ok_or_else(|| SelectionError::NotSelected(agent_id.to_string()))?;
        self.ids.remove(position);
        Ok(())
    }

    /// Move `agent_id` so that it becomes step `step` (1-based).
    pub fn move_to(&mut self, agent_id: &str, step: usize) -> Result<(), SelectionError> {
        let from = self
            .position(agent_id)
            .ok_or_else(|| SelectionError::NotSelected(agent_id.to_string()))?;
        if step == 0 || step > self.ids.len() {
            return Err(SelectionError::OutOfRange {
                position: step,
                len: self.ids.len(),
            });
        }
        let id = self.ids.remove(from);
        self.ids.insert(step - 1, id);
        Ok(())
    }

    /// Replace the whole selection. On error the selection is unchanged.
    pub fn set<I, S>(&mut self, ids: I) -> Result<(), SelectionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next: Vec<String> = Vec::new();
        for id in ids {
            let id = id.into();
            if next.contains(&id) {
                return Err(SelectionError::Duplicate(id));
            }
            next.push(id);
        }
        self.ids = next;
        Ok(())
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn contains(&self, agent_id: &str) -> bool {
        self.position(agent_id).is_some()
    }

    /// 1-based step number of `agent_id`.
    pub fn step_of(&self, agent_id: &str) -> Option<usize> {
        self.position(agent_id).map(|position| position + 1)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn position(&self, agent_id: &str) -> Option<usize> {
        self.ids.iter().position(|id| id == agent_id)
    }
}
