use clap::Args;

use super::config::{LoggingConfig, SamplingArgs};
use crate::config::ConfigArgs;

#[derive(Args)]
pub struct InferCommand {
    /// Prompt to complete
    #[arg(short, long)]
    pub prompt: String,

    /// Number of sequential calls to issue
    #[arg(long, default_value_t = 1)]
    pub times: u32,

    /// Pause between calls in milliseconds
    #[arg(long, default_value_t = 0)]
    pub interval_ms: u64,

    #[command(flatten)]
    pub client: ConfigArgs,

    #[command(flatten)]
    pub sampling: SamplingArgs,

    #[command(flatten)]
    pub logging: LoggingConfig,
}
