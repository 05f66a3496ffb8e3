//! Integration tests for PipelineEngine.
//!
//! These tests verify that the PipelineEngine correctly:
//! - Seeds one pending result per selected agent
//! - Chains each step's output into the next step's input
//! - Halts a full run at the first failing step
//! - Keeps the session usable while a step is in flight

mod common;

use ap_core::engine::EngineError;
use ap_core::gateway::{GatewayError, MockBackend};
use ap_protocol::agent_models::{AgentPatch, ResolvedProvider};
use ap_protocol::ipc::Event;
use ap_protocol::result_models::StepStatus;
use common::*;
use std::time::Duration;

fn vendor_error(message: &str) -> GatewayError {
    GatewayError::Vendor {
        provider: ResolvedProvider::Gemini,
        message: message.to_string(),
    }
}

#[tokio::test]
async fn test_selection_reseeds_pending_results() {
    let harness = create_test_harness(&["a", "b", "c"], MockBackend::new());

    harness.engine.select(["c", "a"]).await.unwrap();

    let results = harness.engine.results().await;
    assert_eq!(results.len(), 2);
    assert_freshly_seeded(&results);
    assert_eq!(results[0].agent_id, "c");
    assert_eq!(results[1].agent_id, "a");
}

#[tokio::test]
async fn test_duplicate_selection_is_rejected() {
    let harness = create_test_harness(&["a", "b"], MockBackend::new());
    harness.engine.select(["a"]).await.unwrap();

    let result = harness.engine.select(["a", "b", "a"]).await;

    assert!(matches!(result, Err(EngineError::Selection(_))));
    let ids: Vec<_> = harness.engine.results().await.into_iter().map(|r| r.agent_id).collect();
    assert_eq!(ids, vec!["a"]);
}

#[tokio::test]
async fn test_empty_document_fails_without_gateway_call() {
    let harness = create_test_harness(&["a"], MockBackend::new());
    harness.engine.select(["a"]).await.unwrap();

    let result = harness.engine.execute_step("a").await;

    assert!(matches!(result, Err(EngineError::EmptyInput)));
    let step = &harness.engine.results().await[0];
    assert_eq!(step.status, StepStatus::Error);
    assert_eq!(step.error.as_deref(), Some("Input is empty."));
    assert_eq!(harness.backend.calls(), 0);
}

#[tokio::test]
async fn test_step_input_is_previous_step_output() {
    let backend = MockBackend::with_replies(vec![
        Ok("summary of doc".to_string()),
        Ok("evidence".to_string()),
    ]);
    let harness = create_test_harness(&["a", "b"], backend);
    harness.engine.select(["a", "b"]).await.unwrap();
    harness.engine.set_document("the document").await;

    harness.engine.execute_step("a").await.unwrap();
    let second = harness.engine.execute_step("b").await.unwrap();

    assert_eq!(second.input, "summary of doc");
    let inputs: Vec<_> = harness
        .backend
        .requests()
        .into_iter()
        .map(|r| r.user_input)
        .collect();
    assert_eq!(inputs, vec!["the document", "summary of doc"]);
}

#[tokio::test]
async fn test_step_before_predecessor_ran_has_empty_input() {
    let harness = create_test_harness(&["a", "b"], MockBackend::new());
    harness.engine.select(["a", "b"]).await.unwrap();
    harness.engine.set_document("doc").await;

    let result = harness.engine.execute_step("b").await;

    assert!(matches!(result, Err(EngineError::EmptyInput)));
    assert_eq!(harness.backend.calls(), 0);
}

#[tokio::test]
async fn test_execute_all_halts_at_first_failure() {
    let backend = MockBackend::with_replies(vec![
        Ok("from a".to_string()),
        Err(vendor_error("rate limited")),
    ]);
    let mut harness = create_test_harness(&["a", "b", "c"], backend);
    harness.engine.select(["a", "b", "c"]).await.unwrap();
    harness.engine.set_document("doc").await;

    let result = harness.engine.execute_all().await;

    assert!(matches!(result, Err(EngineError::Gateway(_))));
    let results = harness.engine.results().await;
    assert_statuses(
        &results,
        &[StepStatus::Completed, StepStatus::Error, StepStatus::Pending],
    );
    assert_eq!(results[1].error.as_deref(), Some("Gemini API Error: rate limited"));
    assert_eq!(results[1].input, "from a");
    assert_eq!(harness.backend.calls(), 2);

    let events = drain_events(&mut harness.events);
    assert!(has_pipeline_started(&events));
    assert!(has_pipeline_halted_at(&events, "b"));
    assert!(!events.iter().any(|e| matches!(e, Event::PipelineCompleted { .. })));
}

#[tokio::test]
async fn test_execute_all_halts_on_empty_intermediate_output() {
    let backend = MockBackend::with_replies(vec![Ok(String::new())]);
    let harness = create_test_harness(&["a", "b", "c"], backend);
    harness.engine.select(["a", "b", "c"]).await.unwrap();
    harness.engine.set_document("doc").await;

    let result = harness.engine.execute_all().await;

    assert!(matches!(result, Err(EngineError::EmptyInput)));
    assert_statuses(
        &harness.engine.results().await,
        &[StepStatus::Completed, StepStatus::Error, StepStatus::Pending],
    );
}

#[tokio::test]
async fn test_execute_all_skips_agents_missing_from_registry() {
    let mut harness = create_test_harness(&["a", "c"], MockBackend::new());
    harness.engine.select(["a", "c", "ghost"]).await.unwrap();
    harness.engine.set_document("doc").await;

    let completed = harness.engine.execute_all().await.unwrap();

    assert_eq!(completed, 2);
    assert_statuses(
        &harness.engine.results().await,
        &[StepStatus::Completed, StepStatus::Completed, StepStatus::Pending],
    );
    let events = drain_events(&mut harness.events);
    assert_eq!(count_steps_started(&events), 2);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::PipelineCompleted { completed_steps: 2, .. })));
}

#[tokio::test]
async fn test_missing_agent_leaves_gap_in_chain() {
    let harness = create_test_harness(&["a", "c"], MockBackend::new());
    harness.engine.select(["a", "ghost", "c"]).await.unwrap();
    harness.engine.set_document("doc").await;

    let result = harness.engine.execute_all().await;

    // step 3 reads the output of step 2, which never ran
    assert!(matches!(result, Err(EngineError::EmptyInput)));
    assert_statuses(
        &harness.engine.results().await,
        &[StepStatus::Completed, StepStatus::Pending, StepStatus::Error],
    );
}

#[tokio::test]
async fn test_rerun_after_halt_keeps_prior_results() {
    let backend = MockBackend::with_replies(vec![
        Ok("from a".to_string()),
        Err(vendor_error("temporary")),
        Ok("from b".to_string()),
    ]);
    let harness = create_test_harness(&["a", "b", "c"], backend);
    harness.engine.select(["a", "b", "c"]).await.unwrap();
    harness.engine.set_document("doc").await;

    assert!(harness.engine.execute_all().await.is_err());
    harness.engine.execute_step("b").await.unwrap();

    let results = harness.engine.results().await;
    assert_eq!(results[0].output, "from a");
    assert_eq!(results[1].output, "from b");
    assert_eq!(results[1].status, StepStatus::Completed);
    assert!(results[1].error.is_none());
    assert_eq!(results[2].status, StepStatus::Pending);
}

#[tokio::test]
async fn test_agent_update_reseeds_results() {
    let harness = create_test_harness(&["a"], MockBackend::new());
    harness.engine.select(["a"]).await.unwrap();
    harness.engine.set_document("doc").await;
    harness.engine.execute_step("a").await.unwrap();

    let patch = AgentPatch {
        name: Some("Renamed".to_string()),
        ..Default::default()
    };
    harness.engine.update_agent("a", patch).await.unwrap();

    let results = harness.engine.results().await;
    assert_freshly_seeded(&results);
    assert_eq!(results[0].agent_name, "Renamed");
}

#[tokio::test]
async fn test_invalid_agents_document_keeps_state() {
    let harness = create_test_harness(&["a"], MockBackend::new());
    harness.engine.select(["a"]).await.unwrap();
    harness.engine.set_document("doc").await;
    harness.engine.execute_step("a").await.unwrap();

    let result = harness.engine.load_agents("version: 1\nagents: {}\n").await;

    assert!(matches!(result, Err(EngineError::Config(_))));
    let results = harness.engine.results().await;
    assert_eq!(results[0].status, StepStatus::Completed);
    let session = harness.engine.session();
    assert!(session.lock().await.registry.contains("a"));
}

#[tokio::test]
async fn test_load_agents_replaces_set_and_reseeds() {
    let harness = create_test_harness(&["a"], MockBackend::new());
    harness.engine.select(["summarizer", "a"]).await.unwrap();

    let count = harness.engine.load_agents(SAMPLE_AGENTS_YAML).await.unwrap();

    assert_eq!(count, 3);
    let results = harness.engine.results().await;
    assert_freshly_seeded(&results);
    assert_eq!(results[0].agent_name, "Summary Generator");
    // ids no longer in the registry are kept in the selection
    assert_eq!(results[1].agent_id, "a");
}

#[tokio::test]
async fn test_second_dispatch_of_running_step_is_rejected() {
    let backend = MockBackend::new().with_delay(Duration::from_millis(200));
    let harness = create_test_harness(&["a"], backend);
    harness.engine.select(["a"]).await.unwrap();
    harness.engine.set_document("doc").await;

    let engine = harness.engine.clone();
    let running = tokio::spawn(async move { engine.execute_step("a").await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(harness.engine.is_in_flight("a").await);
    let second = harness.engine.execute_step("a").await;
    assert!(matches!(second, Err(EngineError::StepInFlight(_))));

    let first = running.await.unwrap().unwrap();
    assert_eq!(first.status, StepStatus::Completed);
    assert!(!harness.engine.is_in_flight("a").await);
    assert_eq!(harness.backend.calls(), 1);
}

#[tokio::test]
async fn test_late_result_after_reseed_is_discarded() {
    let backend = MockBackend::new().with_delay(Duration::from_millis(200));
    let harness = create_test_harness(&["a", "b"], backend);
    harness.engine.select(["a"]).await.unwrap();
    harness.engine.set_document("doc").await;

    let engine = harness.engine.clone();
    let running = tokio::spawn(async move { engine.execute_step("a").await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    // the session stays available while the call is in flight
    harness.engine.select(["b", "a"]).await.unwrap();

    let outcome = running.await.unwrap();
    assert!(matches!(outcome, Err(EngineError::SelectionChanged(_))));
    assert_freshly_seeded(&harness.engine.results().await);
}

#[tokio::test]
async fn test_failed_rerun_clears_completed_fields() {
    let harness = create_test_harness(&["a", "b"], MockBackend::new());
    harness.engine.select(["a", "b"]).await.unwrap();
    harness.engine.set_document("doc").await;
    harness.backend.push_reply(Ok("first output".to_string()));
    harness.engine.execute_step("a").await.unwrap();

    harness.backend.push_reply(Err(vendor_error("overloaded")));
    let rerun = harness.engine.execute_step("a").await;

    assert!(matches!(rerun, Err(EngineError::Gateway(_))));
    let failed = &harness.engine.results().await[0];
    assert_eq!(failed.status, StepStatus::Error);
    assert!(failed.output.is_empty());
    assert!(failed.latency.is_none());
    assert!(failed.provider.is_none());

    // the errored step no longer feeds the next one
    let next = harness.engine.execute_step("b").await;
    assert!(matches!(next, Err(EngineError::EmptyInput)));
    assert_eq!(harness.backend.calls(), 2);
}

#[tokio::test]
async fn test_empty_input_rerun_clears_completed_fields() {
    let harness = create_test_harness(&["a", "b"], MockBackend::new());
    harness.engine.select(["a", "b"]).await.unwrap();
    harness.engine.set_document("doc").await;
    harness.engine.execute_step("a").await.unwrap();
    harness.engine.execute_step("b").await.unwrap();

    harness.backend.push_reply(Ok(String::new()));
    harness.engine.execute_step("a").await.unwrap();
    let rerun = harness.engine.execute_step("b").await;

    assert!(matches!(rerun, Err(EngineError::EmptyInput)));
    let failed = &harness.engine.results().await[1];
    assert_eq!(failed.status, StepStatus::Error);
    assert!(failed.input.is_empty());
    assert!(failed.output.is_empty());
    assert!(failed.latency.is_none());
    assert!(failed.provider.is_none());
}

#[tokio::test]
async fn test_add_to_selection_reseeds_results() {
    let harness = create_test_harness(&["a", "b"], MockBackend::new());
    harness.engine.select(["a"]).await.unwrap();
    harness.engine.set_document("doc").await;
    harness.engine.execute_step("a").await.unwrap();

    let step = harness.engine.add_to_selection("b").await.unwrap();

    assert_eq!(step, 2);
    let results = harness.engine.results().await;
    assert_freshly_seeded(&results);
    let ids: Vec<_> = results.into_iter().map(|r| r.agent_id).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn test_remove_from_selection_renumbers_steps() {
    let harness = create_test_harness(&["a", "b", "c"], MockBackend::new());
    harness.engine.select(["a", "b", "c"]).await.unwrap();
    harness.engine.set_document("doc").await;
    harness.engine.execute_all().await.unwrap();

    harness.engine.remove_from_selection("a").await.unwrap();

    let results = harness.engine.results().await;
    assert_freshly_seeded(&results);
    let ids: Vec<_> = results.into_iter().map(|r| r.agent_id).collect();
    assert_eq!(ids, vec!["b", "c"]);
}

#[tokio::test]
async fn test_move_in_selection_reseeds_in_new_order() {
    let harness = create_test_harness(&["a", "b", "c"], MockBackend::new());
    harness.engine.select(["a", "b", "c"]).await.unwrap();
    harness.engine.set_document("doc").await;
    harness.engine.execute_step("a").await.unwrap();

    harness.engine.move_in_selection("c", 1).await.unwrap();

    let results = harness.engine.results().await;
    assert_freshly_seeded(&results);
    let ids: Vec<_> = results.into_iter().map(|r| r.agent_id).collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
}

#[tokio::test]
async fn test_full_event_channel_does_not_block_session() {
    let mut harness = create_test_harness_with_capacity(&["a", "b"], MockBackend::new(), 1);
    harness.engine.select(["a"]).await.unwrap();

    // the channel is full; this reset notification waits for a reader
    let engine = harness.engine.clone();
    let pending = tokio::spawn(async move { engine.select(["b"]).await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let results = tokio::time::timeout(Duration::from_millis(500), harness.engine.results())
        .await
        .expect("results should not wait on the event channel");
    assert_eq!(results[0].agent_id, "b");

    assert!(matches!(harness.events.recv().await, Some(Event::ResultsReset { steps: 1 })));
    pending.await.unwrap().unwrap();
}
