//! Progress events emitted by the pipeline engine.
//!
//! The engine sends `Event`s over a `tokio::sync::mpsc` channel so a front end
//! (CLI, browser bridge, dashboard) can follow a run without polling the
//! result store.
//!
//! Uses tagged enum serialization for TypeScript compatibility:
//! ```json
//! {
//!   "type": "stepCompleted",
//!   "payload": {
//!     "step": 2,
//!     "agent_id": "evidence_extractor",
//!     "latency": 3.2,
//!     "provider": "openai"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::agent_models::ResolvedProvider;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// The result store was cleared and re-seeded with pending steps.
    ResultsReset { steps: usize },

    /// A full-sequence run has begun.
    PipelineStarted {
        #[ts(type = "string")]
        run_id: Uuid,
        total_steps: usize,
    },

    /// A step dispatched its gateway call.
    StepStarted {
        step: usize,
        agent_id: String,
        input_chars: usize,
    },

    StepCompleted {
        step: usize,
        agent_id: String,
        latency: f64,
        provider: ResolvedProvider,
    },

    StepFailed {
        step: usize,
        agent_id: String,
        error: String,
    },

    /// A full-sequence run stopped at a failing step. Later steps were not attempted.
    PipelineHalted {
        #[ts(type = "string")]
        run_id: Uuid,
        step: usize,
        agent_id: String,
        error: String,
    },

    PipelineCompleted {
        #[ts(type = "string")]
        run_id: Uuid,
        completed_steps: usize,
    },

    /// Document extraction progress; `fraction` is in `[0, 1]`.
    IngestProgress { fraction: f64, message: String },
}
