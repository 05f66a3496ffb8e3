//! Pipeline execution engine.
//!
//! The PipelineEngine runs the selected agents one after another, feeding each
//! step the output of the previous one. It owns every write to the session's
//! result store and reports progress through the event channel.

pub mod selection;

use crate::config::ConfigError;
use crate::gateway::{CompletionGateway, GatewayError};
use crate::registry::RegistryError;
use crate::state::session::Session;
use crate::state::store::ResultStore;
use ap_protocol::agent_models::{AgentPatch, AgentsDocument};
use ap_protocol::config_models::ApiKeys;
use ap_protocol::ipc::Event;
use ap_protocol::result_models::{StepResult, StepStatus};
use selection::SelectionError;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::Sender;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Message recorded on a step whose input is empty.
pub const EMPTY_INPUT_MESSAGE: &str = "Input is empty.";

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Agent '{0}' not found in registry")]
    AgentNotFound(String),

    #[error("Agent '{0}' is not part of the current selection")]
    NotSelected(String),

    #[error("Step for agent '{0}' is already running")]
    StepInFlight(String),

    #[error("{}", EMPTY_INPUT_MESSAGE)]
    EmptyInput,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The selection was re-seeded while the step's gateway call was in flight.
    #[error("Selection changed while agent '{0}' was running; result discarded")]
    SelectionChanged(String),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Input for the step at `step`: the document text for step 1, otherwise the
/// output of the result whose step is `step - 1` (empty when there is none).
pub fn chained_input(step: usize, document_text: &str, results: &ResultStore) -> String {
    if step <= 1 {
        return document_text.to_string();
    }
    results
        .by_step(step - 1)
        .map(|previous| previous.output.clone())
        .unwrap_or_default()
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Everything a step needs once the session lock is released.
struct PreparedStep {
    seed: StepResult,
    prompt: String,
    model: ap_protocol::agent_models::ModelConfig,
    input: String,
    keys: ApiKeys,
    epoch: u64,
}

/// The main pipeline execution engine.
#[derive(Clone)]
pub struct PipelineEngine {
    session: Arc<Mutex<Session>>,
    gateway: Arc<CompletionGateway>,
    events_tx: Sender<Event>,
}

impl PipelineEngine {
    /// Create a new PipelineEngine.
    ///
    /// # Arguments
    ///
    /// * `session` - Shared session context the engine reads and writes
    /// * `gateway` - Completion gateway used for every step
    /// * `events_tx` - Channel for progress events
    pub fn new(session: Arc<Mutex<Session>>, gateway: Arc<CompletionGateway>, events_tx: Sender<Event>) -> Self {
        Self {
            session,
            gateway,
            events_tx,
        }
    }

    pub fn session(&self) -> Arc<Mutex<Session>> {
        Arc::clone(&self.session)
    }

    async fn emit(&self, event: Event) {
        let _ = self.events_tx.send(event).await;
    }

    /// Announce a re-seed. Called after the session lock is released.
    async fn notify_reset(&self, steps: usize) {
        tracing::info!(steps, "results re-seeded");
        self.emit(Event::ResultsReset { steps }).await;
    }

    /// Parse and install a new agent set, then re-seed.
    ///
    /// On a malformed document the current agents and results are kept.
    pub async fn load_agents(&self, document: &str) -> Result<usize, EngineError> {
        let (count, steps) = {
            let mut session = self.session.lock().await;
            let count = session.registry.load(document)?;
            (count, session.reseed())
        };
        self.notify_reset(steps).await;
        Ok(count)
    }

    /// Install an already parsed agent set, then re-seed.
    pub async fn replace_agents(&self, document: AgentsDocument) {
        let steps = {
            let mut session = self.session.lock().await;
            session.registry.replace(document);
            session.reseed()
        };
        self.notify_reset(steps).await;
    }

    /// Apply a partial update to one agent, then re-seed.
    pub async fn update_agent(&self, agent_id: &str, patch: AgentPatch) -> Result<(), EngineError> {
        let steps = {
            let mut session = self.session.lock().await;
            session.registry.update(agent_id, patch)?;
            session.reseed()
        };
        self.notify_reset(steps).await;
        Ok(())
    }

    /// Replace the selection, then re-seed.
    pub async fn select<I, S>(&self, ids: I) -> Result<(), EngineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let steps = {
            let mut session = self.session.lock().await;
            session.selection.set(ids)?;
            session.reseed()
        };
        self.notify_reset(steps).await;
        Ok(())
    }

    pub async fn add_to_selection(&self, agent_id: &str) -> Result<usize, EngineError> {
        let (step, steps) = {
            let mut session = self.session.lock().await;
            let step = session.selection.add(agent_id)?;
            (step, session.reseed())
        };
        self.notify_reset(steps).await;
        Ok(step)
    }

    pub async fn remove_from_selection(&self, agent_id: &str) -> Result<(), EngineError> {
        let steps = {
            let mut session = self.session.lock().await;
            session.selection.remove(agent_id)?;
            session.reseed()
        };
        self.notify_reset(steps).await;
        Ok(())
    }

    pub async fn move_in_selection(&self, agent_id: &str, step: usize) -> Result<(), EngineError> {
        let steps = {
            let mut session = self.session.lock().await;
            session.selection.move_to(agent_id, step)?;
            session.reseed()
        };
        self.notify_reset(steps).await;
        Ok(())
    }

    /// Set the document text consumed by step 1. Existing results are kept.
    pub async fn set_document(&self, text: impl Into<String>) {
        self.session.lock().await.document_text = text.into();
    }

    pub async fn set_api_keys(&self, keys: ApiKeys) {
        self.session.lock().await.api_keys = keys;
    }

    /// Snapshot of all step results, ordered by step.
    pub async fn results(&self) -> Vec<StepResult> {
        self.session.lock().await.results.all().to_vec()
    }

    pub async fn is_in_flight(&self, agent_id: &str) -> bool {
        self.session.lock().await.is_in_flight(agent_id)
    }

    /// Validate the step and capture its input under the session lock.
    ///
    /// An empty input is recorded as an error result here, so no gateway call
    /// is ever made for it.
    async fn prepare_step(&self, agent_id: &str) -> Result<PreparedStep, EngineError> {
        let mut session = self.session.lock().await;

        let agent = session
            .registry
            .get(agent_id)
            .cloned()
            .ok_or_else(|| EngineError::AgentNotFound(agent_id.to_string()))?;
        let seed = session
            .results
            .get(agent_id)
            .cloned()
            .ok_or_else(|| EngineError::NotSelected(agent_id.to_string()))?;
        if session.is_in_flight(agent_id) {
            return Err(EngineError::StepInFlight(agent_id.to_string()));
        }

        let input = chained_input(seed.step, &session.document_text, &session.results);

        if input.is_empty() {
            let step = seed.step;
            session.results.upsert(StepResult {
                input: String::new(),
                output: String::new(),
                latency: None,
                provider: None,
                status: StepStatus::Error,
                error: Some(EMPTY_INPUT_MESSAGE.to_string()),
                ..seed
            });
            drop(session);

            tracing::info!(step, agent_id, "step has no input");
            self.emit(Event::StepFailed {
                step,
                agent_id: agent_id.to_string(),
                error: EMPTY_INPUT_MESSAGE.to_string(),
            })
            .await;
            return Err(EngineError::EmptyInput);
        }

        session.in_flight.insert(agent_id.to_string());

        Ok(PreparedStep {
            seed,
            prompt: agent.prompt,
            model: agent.model,
            input,
            keys: session.api_keys.clone(),
            epoch: session.epoch(),
        })
    }

    /// Execute a single step.
    ///
    /// The gateway call runs without holding the session lock. Its outcome is
    /// written back as `completed` or `error`, unless the selection was
    /// re-seeded in the meantime, in which case it is discarded.
    ///
    /// # Errors
    ///
    /// - `AgentNotFound` / `NotSelected` / `StepInFlight`: nothing is changed
    /// - `EmptyInput`: the step is marked as an error without a gateway call
    /// - `Gateway`: the step is marked as an error with the gateway message
    /// - `SelectionChanged`: the late outcome was dropped
    pub async fn execute_step(&self, agent_id: &str) -> Result<StepResult, EngineError> {
        let prepared = self.prepare_step(agent_id).await?;
        let step = prepared.seed.step;

        tracing::info!(step, agent_id, input_chars = prepared.input.len(), "step started");
        self.emit(Event::StepStarted {
            step,
            agent_id: agent_id.to_string(),
            input_chars: prepared.input.len(),
        })
        .await;

        let outcome = self
            .gateway
            .complete(&prepared.prompt, &prepared.input, &prepared.model, &prepared.keys)
            .await;

        let mut session = self.session.lock().await;
        if session.epoch() != prepared.epoch {
            drop(session);
            tracing::warn!(step, agent_id, "selection changed during step; result discarded");
            return Err(EngineError::SelectionChanged(agent_id.to_string()));
        }
        session.in_flight.remove(agent_id);

        match outcome {
            Ok(completion) => {
                let result = StepResult {
                    input: prepared.input,
                    output: completion.output,
                    timestamp: now_millis(),
                    latency: Some(completion.elapsed_seconds),
                    provider: Some(completion.provider),
                    status: StepStatus::Completed,
                    error: None,
                    ..prepared.seed
                };
                session.results.upsert(result.clone());
                drop(session);

                tracing::info!(
                    step,
                    agent_id,
                    provider = %completion.provider,
                    latency = completion.elapsed_seconds,
                    "step completed"
                );
                self.emit(Event::StepCompleted {
                    step,
                    agent_id: agent_id.to_string(),
                    latency: completion.elapsed_seconds,
                    provider: completion.provider,
                })
                .await;
                Ok(result)
            }
            Err(error) => {
                let message = error.to_string();
                session.results.upsert(StepResult {
                    input: prepared.input,
                    output: String::new(),
                    timestamp: now_millis(),
                    latency: None,
                    provider: None,
                    status: StepStatus::Error,
                    error: Some(message.clone()),
                    ..prepared.seed
                });
                drop(session);

                tracing::info!(step, agent_id, error = %message, "step failed");
                self.emit(Event::StepFailed {
                    step,
                    agent_id: agent_id.to_string(),
                    error: message,
                })
                .await;
                Err(error.into())
            }
        }
    }

    /// Execute every selected step in order.
    ///
    /// Agents missing from the registry are skipped. The first failing step
    /// halts the run and its error is returned; later steps keep their state.
    /// Results from earlier runs are not cleared.
    ///
    /// Returns the number of steps completed by this run.
    pub async fn execute_all(&self) -> Result<usize, EngineError> {
        let run_id = Uuid::new_v4();
        let ids = self.session.lock().await.selection.ids().to_vec();

        tracing::info!(%run_id, steps = ids.len(), "pipeline started");
        self.emit(Event::PipelineStarted {
            run_id,
            total_steps: ids.len(),
        })
        .await;

        let mut completed_steps = 0;
        for (position, agent_id) in ids.iter().enumerate() {
            match self.execute_step(agent_id).await {
                Ok(_) => completed_steps += 1,
                Err(EngineError::AgentNotFound(_)) => {
                    tracing::warn!(agent_id = %agent_id, "agent missing from registry; step skipped");
                }
                Err(error) => {
                    tracing::warn!(%run_id, step = position + 1, agent_id = %agent_id, error = %error, "pipeline halted");
                    self.emit(Event::PipelineHalted {
                        run_id,
                        step: position + 1,
                        agent_id: agent_id.clone(),
                        error: error.to_string(),
                    })
                    .await;
                    return Err(error);
                }
            }
        }

        tracing::info!(%run_id, completed_steps, "pipeline completed");
        self.emit(Event::PipelineCompleted {
            run_id,
            completed_steps,
        })
        .await;

        Ok(completed_steps)
    }
}
