//! Subcommand implementations.

use crate::progress;
use ap_core::config::load_config;
use ap_core::engine::PipelineEngine;
use ap_core::gateway::CompletionGateway;
use ap_core::ingest::{ingest, DocumentSource, IngestOptions, PdfMethod};
use ap_core::init::{generate_project_structure, InitOptions};
use ap_core::registry::AgentRegistry;
use ap_core::report::{self, DashboardMetrics, ReportFormat};
use ap_core::state::Session;
use ap_protocol::ipc::Event;
use clap::Args;
use color_eyre::eyre::{bail, eyre, WrapErr};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

#[derive(Args)]
pub struct RunArgs {
    /// Comma-separated agent ids, in execution order
    #[arg(long, value_delimiter = ',', required = true)]
    select: Vec<String>,

    /// Plain-text input files, joined in order
    #[arg(long, num_args = 1.., conflicts_with = "text", required_unless_present = "text")]
    input: Vec<PathBuf>,

    /// Inline document text
    #[arg(long)]
    text: Option<String>,

    /// Run only the step of this agent instead of the whole pipeline
    #[arg(long)]
    step: Option<String>,

    /// Report format: md, json or csv
    #[arg(long, default_value = "md")]
    format: String,

    /// Write the report here instead of stdout; a directory gets `report.<format>`
    #[arg(long)]
    output: Option<PathBuf>,

    /// Project directory containing .agentpipe/
    #[arg(long, default_value = ".")]
    dir: PathBuf,
}

pub async fn init(dir: PathBuf, force: bool) -> color_eyre::Result<()> {
    let created = generate_project_structure(InitOptions {
        target_dir: dir,
        force,
    })
    .await?;

    println!("{} {}", "Initialized".green().bold(), created.display());
    Ok(())
}

pub async fn list_agents(dir: &Path) -> color_eyre::Result<()> {
    let config = load_config(dir).await?;

    if config.agents.agents.is_empty() {
        println!("No agents configured.");
        return Ok(());
    }

    for agent in &config.agents.agents {
        let state = if agent.enabled {
            "enabled".green()
        } else {
            "disabled".dimmed()
        };
        println!(
            "{:<24} {:<28} {}/{} [{}]",
            agent.id.bold(),
            agent.name,
            agent.model.provider,
            agent.model.name,
            state
        );
        if !agent.description.is_empty() {
            println!("  {}", agent.description.dimmed());
        }
    }
    Ok(())
}

/// Resolve `--output`: a directory receives `report.<ext>` for the format.
fn report_path(output: &Path, format: ReportFormat) -> PathBuf {
    if output.is_dir() {
        output.join(format!("report.{}", format.extension()))
    } else {
        output.to_path_buf()
    }
}

fn document_sources(paths: &[PathBuf]) -> color_eyre::Result<Vec<DocumentSource>> {
    paths
        .iter()
        .map(|path| {
            let is_pdf = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
            if is_pdf {
                bail!(
                    "{}: PDF input is not supported from the command line; extract the text first",
                    path.display()
                );
            }
            Ok(DocumentSource::PlainText(path.clone()))
        })
        .collect()
}

pub async fn run(args: RunArgs) -> color_eyre::Result<()> {
    let format: ReportFormat = args.format.parse()?;
    let config = load_config(&args.dir)
        .await
        .wrap_err_with(|| format!("loading configuration from {}", args.dir.display()))?;

    let gateway = Arc::new(CompletionGateway::new(&config.global.gateway));
    let api_keys = config.global.api_keys.clone();
    let session = Session::new(AgentRegistry::new(config.agents), api_keys.clone());

    let (events_tx, events_rx) = mpsc::channel::<Event>(64);
    let printer = tokio::spawn(progress::render_events(events_rx));

    let engine = PipelineEngine::new(Arc::new(Mutex::new(session)), Arc::clone(&gateway), events_tx.clone());
    engine.select(args.select.iter().map(|id| id.trim())).await?;

    let document = match args.text {
        Some(text) => text,
        None => {
            let options = IngestOptions {
                pdf_method: PdfMethod::Standard,
                gateway: gateway.as_ref(),
                api_keys: &api_keys,
            };
            let progress_tx = events_tx.clone();
            ingest(document_sources(&args.input)?, options, |fraction, message| {
                let _ = progress_tx.try_send(Event::IngestProgress {
                    fraction,
                    message: message.to_string(),
                });
            })
            .await
            .map_err(|failure| eyre!(failure))?
        }
    };
    drop(events_tx);
    engine.set_document(document.clone()).await;

    let outcome = match &args.step {
        Some(agent_id) => engine.execute_step(agent_id).await.map(|_| ()),
        None => engine.execute_all().await.map(|_| ()),
    };

    let results = engine.results().await;
    let selected = results.len();
    drop(engine);
    let _ = printer.await;

    let rendered = report::render(format, &results)?;
    match args.output.as_deref().map(|output| report_path(output, format)) {
        Some(path) => {
            tokio::fs::write(&path, &rendered)
                .await
                .wrap_err_with(|| format!("writing report to {}", path.display()))?;
            eprintln!("{} {}", "Report written to".green(), path.display());
        }
        None => print!("{rendered}"),
    }

    progress::print_summary(&DashboardMetrics::compute(&document, &results, selected));

    outcome.map_err(|e| eyre!(e))
}
