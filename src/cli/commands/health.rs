use clap::Args;

use super::config::LoggingConfig;
use crate::config::ConfigArgs;

#[derive(Args)]
pub struct HealthCommand {
    /// Only probe the server, not the configured model
    #[arg(long)]
    pub server_only: bool,

    #[command(flatten)]
    pub client: ConfigArgs,

    #[command(flatten)]
    pub logging: LoggingConfig,
}
