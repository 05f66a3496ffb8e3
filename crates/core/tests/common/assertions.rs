//! Custom assertion helpers over engine events and results.

use ap_protocol::ipc::Event;
use ap_protocol::result_models::{StepResult, StepStatus};

/// Whether the events contain a PipelineStarted event.
#[allow(dead_code)]
pub fn has_pipeline_started(events: &[Event]) -> bool {
    events.iter().any(|e| matches!(e, Event::PipelineStarted { .. }))
}

/// Whether the events contain a PipelineHalted event for `agent_id`.
#[allow(dead_code)]
pub fn has_pipeline_halted_at(events: &[Event], agent_id: &str) -> bool {
    events
        .iter()
        .any(|e| matches!(e, Event::PipelineHalted { agent_id: id, .. } if id == agent_id))
}

/// Count StepStarted events.
#[allow(dead_code)]
pub fn count_steps_started(events: &[Event]) -> usize {
    events.iter().filter(|e| matches!(e, Event::StepStarted { .. })).count()
}

/// Assert the status of every result, in step order.
#[allow(dead_code)]
pub fn assert_statuses(results: &[StepResult], expected: &[StepStatus]) {
    let actual: Vec<StepStatus> = results.iter().map(|r| r.status).collect();
    assert_eq!(actual, expected, "unexpected step statuses");
}

/// Assert that every result is a freshly seeded placeholder.
#[allow(dead_code)]
pub fn assert_freshly_seeded(results: &[StepResult]) {
    for (position, result) in results.iter().enumerate() {
        assert_eq!(result.step, position + 1, "step should equal position");
        assert_eq!(result.status, StepStatus::Pending);
        assert!(result.input.is_empty(), "seeded input should be empty");
        assert!(result.output.is_empty(), "seeded output should be empty");
        assert_eq!(result.timestamp, 0);
        assert!(result.latency.is_none());
        assert!(result.provider.is_none());
        assert!(result.error.is_none());
    }
}
