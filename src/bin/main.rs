//! vllm-triton binary.
//!
//! Command-line client for vLLM models served behind a Triton inference
//! server: issue completions and probe server/model health.

use clap::Parser;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;
use vllm_triton_core::cli::{
    commands::Commands,
    handlers::{handle_health, handle_infer},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logging = cli.command.logging();
    let level = logging.get_effective_level();
    let filter = logging.get_effective_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok());

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.parse().unwrap_or(LevelFilter::INFO).into())
                .parse_lossy(&filter),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;

    info!("vllm-triton starting up");

    match cli.command {
        Commands::Infer(cmd) => handle_infer(cmd).await?,
        Commands::Health(cmd) => handle_health(cmd).await?,
    }

    Ok(())
}
