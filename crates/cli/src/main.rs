mod commands;
mod progress;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "agentpipe")]
#[command(about = "Run a chain of LLM agents over a document", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a .agentpipe/ directory with sample configuration
    Init {
        /// Project directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Overwrite an existing .agentpipe/ directory
        #[arg(long)]
        force: bool,
    },

    /// List the configured agents
    Agents {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Run the selected agents over a document
    Run(commands::RunArgs),
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init { dir, force } => commands::init(dir, force).await,
        Commands::Agents { dir } => commands::list_agents(&dir).await,
        Commands::Run(args) => commands::run(args).await,
    }
}
