//! Dashboard metrics derived from the document and step results.

use ap_protocol::agent_models::ResolvedProvider;
use ap_protocol::result_models::StepResult;
use serde::Serialize;

/// Rough token count: one token per four characters, never less than one.
pub fn estimate_tokens(text: &str) -> usize {
    let chars = text.chars().count() as f64;
    ((chars / 4.0).round() as usize).max(1)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentTokens {
    pub agent_name: String,
    pub input: usize,
    pub output: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderLatency {
    pub provider: ResolvedProvider,
    pub seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    /// Estimated tokens of the document text.
    pub input_tokens: usize,
    /// Estimated tokens across completed outputs.
    pub output_tokens: usize,
    /// Completed steps over selected steps, as a percentage.
    pub completion_rate: f64,
    pub total_latency: f64,
    /// Summed latency per provider, in order of first appearance.
    pub latency_by_provider: Vec<ProviderLatency>,
    pub per_agent: Vec<AgentTokens>,
}

impl DashboardMetrics {
    pub fn compute(document_text: &str, results: &[StepResult], selected: usize) -> Self {
        let completed: Vec<&StepResult> = results.iter().filter(|r| r.is_completed()).collect();

        let completion_rate = if selected > 0 {
            completed.len() as f64 / selected as f64 * 100.0
        } else {
            0.0
        };

        let mut latency_by_provider: Vec<ProviderLatency> = Vec::new();
        for result in &completed {
            let (Some(provider), Some(latency)) = (result.provider, result.latency) else {
                continue;
            };
            if latency <= 0.0 {
                continue;
            }
            match latency_by_provider.iter_mut().find(|p| p.provider == provider) {
                Some(entry) => entry.seconds += latency,
                None => latency_by_provider.push(ProviderLatency {
                    provider,
                    seconds: latency,
                }),
            }
        }

        Self {
            input_tokens: estimate_tokens(document_text),
            output_tokens: completed.iter().map(|r| estimate_tokens(&r.output)).sum(),
            completion_rate,
            total_latency: completed.iter().filter_map(|r| r.latency).sum(),
            latency_by_provider,
            per_agent: completed
                .iter()
                .map(|r| AgentTokens {
                    agent_name: r.agent_name.clone(),
                    input: estimate_tokens(&r.input),
                    output: estimate_tokens(&r.output),
                })
                .collect(),
        }
    }
}
