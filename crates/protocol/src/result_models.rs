//! Step result models.
//!
//! A `StepResult` records the outcome of running one agent at one position
//! of the pipeline selection.

use crate::agent_models::ResolvedProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Lifecycle status of a single pipeline step.
///
/// A freshly seeded step is `Pending`. Each execution moves it to exactly one
/// of `Completed` or `Error`; re-running a step overwrites its outcome.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Completed,
    Error,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Execution state of one step, keyed by `agent_id`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct StepResult {
    /// 1-based position in the pipeline selection.
    pub step: usize,

    pub agent_id: String,

    /// Denormalized agent name for display.
    pub agent_name: String,

    /// Text given to the agent. Recorded on failure as well.
    pub input: String,

    /// Text produced by the agent; empty until completed.
    pub output: String,

    /// Completion instant in milliseconds since the Unix epoch, 0 if never run.
    pub timestamp: i64,

    /// Gateway round trip in seconds. Only present when completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<f64>,

    /// Provider the gateway actually used. Only present when completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ResolvedProvider>,

    pub status: StepStatus,

    /// Failure message. Only present when `status` is `Error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepResult {
    /// Create the pending placeholder used when a selection is re-seeded.
    pub fn pending(step: usize, agent_id: impl Into<String>, agent_name: impl Into<String>) -> Self {
        Self {
            step,
            agent_id: agent_id.into(),
            agent_name: agent_name.into(),
            input: String::new(),
            output: String::new(),
            timestamp: 0,
            latency: None,
            provider: None,
            status: StepStatus::Pending,
            error: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == StepStatus::Completed
    }
}
