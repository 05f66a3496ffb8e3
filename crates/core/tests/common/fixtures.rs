//! Test fixtures for creating sample configurations and engines.

use ap_core::engine::PipelineEngine;
use ap_core::gateway::{CompletionGateway, MockBackend};
use ap_core::registry::AgentRegistry;
use ap_core::state::Session;
use ap_protocol::agent_models::{Agent, AgentsDocument, ModelConfig, Provider};
use ap_protocol::config_models::ApiKeys;
use ap_protocol::ipc::Event;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::{mpsc, Mutex};

/// A three-agent document in `agents.yaml` form.
#[allow(dead_code)]
pub const SAMPLE_AGENTS_YAML: &str = r#"
version: 1
agents:
  - id: summarizer
    name: Summary Generator
    model:
      provider: gemini
      name: gemini-2.5-flash
      temperature: 0.25
      max_tokens: 4096
    prompt: Summarize the document.
  - id: extractor
    name: Evidence Extractor
    model:
      provider: openai
      name: gpt-4o-mini
      temperature: 0.2
      max_tokens: 2048
    prompt: Extract the evidence.
  - id: checker
    name: Compliance Checker
    model:
      provider: auto
      name: any-model
      temperature: 0.2
      max_tokens: 1024
    prompt: Check compliance.
"#;

/// Create a temporary project directory with an `.agentpipe/` configuration.
///
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_project() -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let ap_dir = temp_dir.path().join(".agentpipe");
    std::fs::create_dir_all(&ap_dir)?;

    std::fs::write(ap_dir.join("agents.yaml"), SAMPLE_AGENTS_YAML)?;
    std::fs::write(
        ap_dir.join("config.toml"),
        "[api_keys]\ngemini = \"g-key\"\nopenai = \"o-key\"\n",
    )?;

    Ok(temp_dir)
}

/// Create a test Agent configuration.
pub fn create_test_agent(id: &str) -> Agent {
    Agent {
        id: id.to_string(),
        name: format!("Agent {}", id),
        description: format!("Test agent {}", id),
        enabled: true,
        model: ModelConfig {
            provider: Provider::Gemini,
            name: "test-model".to_string(),
            temperature: 0.2,
            max_tokens: 256,
        },
        prompt: format!("You are test agent {}.", id),
    }
}

/// Handles for an engine whose vendors are both served by one mock backend.
pub struct TestHarness {
    pub engine: PipelineEngine,
    pub backend: Arc<MockBackend>,
    pub events: mpsc::Receiver<Event>,
}

/// Create an engine over agents with the given ids and a shared mock backend.
pub fn create_test_harness(agent_ids: &[&str], backend: MockBackend) -> TestHarness {
    create_test_harness_with_capacity(agent_ids, backend, 256)
}

/// Like [`create_test_harness`], with a bounded event channel of `capacity`.
pub fn create_test_harness_with_capacity(
    agent_ids: &[&str],
    backend: MockBackend,
    capacity: usize,
) -> TestHarness {
    let registry = AgentRegistry::new(AgentsDocument {
        version: 1,
        agents: agent_ids.iter().map(|id| create_test_agent(id)).collect(),
    });
    let session = Session::new(registry, ApiKeys::new("g-key", "o-key"));

    let backend = Arc::new(backend);
    let gateway = CompletionGateway::with_backends(backend.clone(), backend.clone());
    let (tx, rx) = mpsc::channel(capacity);

    TestHarness {
        engine: PipelineEngine::new(Arc::new(Mutex::new(session)), Arc::new(gateway), tx),
        backend,
        events: rx,
    }
}

/// Drain every event currently buffered in the channel.
#[allow(dead_code)]
pub fn drain_events(rx: &mut mpsc::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
