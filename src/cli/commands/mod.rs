pub mod config;
pub mod health;
pub mod infer;

pub use config::{LoggingConfig, SamplingArgs};
pub use health::HealthCommand;
pub use infer::InferCommand;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a completion against a vLLM model
    Infer(InferCommand),
    /// Check server liveness/readiness and model readiness
    Health(HealthCommand),
}

impl Commands {
    pub fn logging(&self) -> &LoggingConfig {
        match self {
            Commands::Infer(cmd) => &cmd.logging,
            Commands::Health(cmd) => &cmd.logging,
        }
    }
}
