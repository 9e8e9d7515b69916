//! Configuration management for the vLLM Triton client.
//!
//! Sources, lowest precedence first:
//! 1. Default configuration (embedded in binary)
//! 2. System-wide configuration file (`/etc/vllm-triton/config.toml`)
//! 3. User-specified configuration file
//! 4. Environment variables (prefixed with `VLLM_TRITON_`, `__` between
//!    section and key, e.g. `VLLM_TRITON_SERVER__HOST`)
//! 5. Command-line arguments

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::server::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_GRPC_PORT, DEFAULT_HOST, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::error::Result;
use crate::models::vllm::SamplingConfig;
use crate::transport::ServerInfo;

/// Command-line overrides shared by every subcommand
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Inference server host
    #[arg(long)]
    pub host: Option<String>,

    /// Inference server gRPC port
    #[arg(long)]
    pub grpc_port: Option<u16>,

    /// Model name as registered on the server
    #[arg(short, long)]
    pub model: Option<String>,

    /// Model version
    #[arg(long)]
    pub model_version: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub server: ServerSettings,
    pub model: ModelSettings,
    /// Sampling settings used when a call does not bring its own
    #[serde(default)]
    pub sampling: SamplingConfig,
}

/// Inference server endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_grpc_port")]
    pub grpc_port: u16,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Target model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    pub name: String,
    #[serde(default = "default_model_version")]
    pub version: String,
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Load configuration from all sources
    pub fn load(args: &ConfigArgs) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(config::File::with_name("/etc/vllm-triton/config.toml").required(false));

        if let Some(path) = &args.config {
            builder = builder.add_source(config::File::from(path.as_path()));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("VLLM_TRITON")
                .prefix_separator("_")
                .separator("__"),
        );

        let mut config: ClientConfig = builder.build()?.try_deserialize()?;
        config.apply_args(args);
        config.sampling.validate()?;
        Ok(config)
    }

    fn apply_args(&mut self, args: &ConfigArgs) {
        if let Some(host) = &args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.grpc_port {
            self.server.grpc_port = port;
        }
        if let Some(model) = &args.model {
            self.model.name = model.clone();
        }
        if let Some(version) = &args.model_version {
            self.model.version = version.clone();
        }
        if let Some(timeout) = args.timeout_secs {
            self.model.timeout_secs = timeout;
        }
    }

    pub fn server_info(&self) -> ServerInfo {
        ServerInfo {
            server_ip: self.server.host.clone(),
            grpc_port: self.server.grpc_port,
            connect_timeout: Duration::from_secs(self.server.connect_timeout_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.model.timeout_secs)
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_grpc_port() -> u16 {
    DEFAULT_GRPC_PORT
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_model_version() -> String {
    "1".to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
