//! Terminal rendering of engine events.

use ap_core::report::DashboardMetrics;
use ap_protocol::ipc::Event;
use colored::Colorize;
use tokio::sync::mpsc::Receiver;

pub async fn render_events(mut rx: Receiver<Event>) {
    while let Some(event) = rx.recv().await {
        if let Some(line) = format_event(&event) {
            eprintln!("{line}");
        }
    }
}

fn format_event(event: &Event) -> Option<String> {
    let line = match event {
        Event::ResultsReset { .. } => return None,
        Event::IngestProgress { fraction, message } => {
            format!("{} {}", format!("[{:>3.0}%]", fraction * 100.0).dimmed(), message)
        }
        Event::PipelineStarted { total_steps, .. } => {
            format!("{} {} step(s)", "Running".bold(), total_steps)
        }
        Event::StepStarted {
            step,
            agent_id,
            input_chars,
        } => format!("  [{step}] {agent_id} {}", format!("({input_chars} chars in)").dimmed()),
        Event::StepCompleted {
            step,
            agent_id,
            latency,
            provider,
        } => format!(
            "  [{step}] {agent_id} {} {}",
            "done".green(),
            format!("{latency:.2}s via {}", provider.display_name()).dimmed()
        ),
        Event::StepFailed { step, agent_id, error } => {
            format!("  [{step}] {agent_id} {} {error}", "failed".red())
        }
        Event::PipelineHalted { step, agent_id, .. } => format!(
            "{} at step {step} ({agent_id})",
            "Pipeline halted".red().bold()
        ),
        Event::PipelineCompleted { completed_steps, .. } => format!(
            "{} {completed_steps} step(s) completed",
            "Pipeline finished:".green().bold()
        ),
    };
    Some(line)
}

pub fn print_summary(metrics: &DashboardMetrics) {
    let per_provider: Vec<String> = metrics
        .latency_by_provider
        .iter()
        .map(|p| format!("{} {:.2}s", p.provider.display_name(), p.seconds))
        .collect();

    eprintln!(
        "{} {:.0}% complete, ~{} tokens in, ~{} tokens out, {:.2}s total{}",
        "Summary:".bold(),
        metrics.completion_rate,
        metrics.input_tokens,
        metrics.output_tokens,
        metrics.total_latency,
        if per_provider.is_empty() {
            String::new()
        } else {
            format!(" ({})", per_provider.join(", "))
        }
    );
}
