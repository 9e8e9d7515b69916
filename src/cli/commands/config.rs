use clap::Args;
use serde::Deserialize;

use crate::models::vllm::SamplingConfig;

/// Logging configuration that can be set via CLI or env vars
#[derive(Debug, Clone, Default, Args, Deserialize)]
pub struct LoggingConfig {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    #[serde(skip)]
    pub verbose: u8,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level", env = "VLLM_TRITON_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log filter directives
    #[arg(long = "log-filter", env = "VLLM_TRITON_LOG_FILTER")]
    pub log_filter: Option<String>,
}

impl LoggingConfig {
    pub fn get_effective_level(&self) -> &str {
        match (self.verbose, self.log_level.as_deref()) {
            (v, _) if v >= 2 => "trace", // -vv flag
            (1, _) => "debug",           // -v flag
            (0, Some(level)) => level,   // Configured level
            _ => "info",                 // Default
        }
    }

    /// Filter directives: `--log-filter`, then `rust_log`, then the crate default.
    pub fn get_effective_filter(&self, rust_log: Option<String>) -> String {
        self.log_filter
            .clone()
            .or(rust_log.filter(|directives| !directives.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
    }
}

const DEFAULT_LOG_FILTER: &str = "vllm_triton_core=debug";

/// Per-invocation sampling overrides
#[derive(Debug, Clone, Default, Args)]
pub struct SamplingArgs {
    /// Maximum number of generated tokens
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Nucleus sampling probability
    #[arg(long)]
    pub top_p: Option<f32>,

    #[arg(long)]
    pub top_k: Option<u32>,

    /// Number of returned candidates; more than 1 enables beam search
    #[arg(long)]
    pub beam_width: Option<u32>,

    /// Stop sequence (repeatable)
    #[arg(long = "stop", value_name = "TEXT")]
    pub stop: Vec<String>,
}

impl SamplingArgs {
    /// Layers these overrides on top of `base`.
    pub fn apply(&self, base: &SamplingConfig) -> SamplingConfig {
        let mut config = base.clone();
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(top_p) = self.top_p {
            config.top_p = top_p;
        }
        if let Some(top_k) = self.top_k {
            config.top_k = top_k;
        }
        if let Some(beam_width) = self.beam_width {
            config.beam_width = beam_width;
        }
        if !self.stop.is_empty() {
            config.stop_words = self.stop.clone();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_level() {
        let mut logging = LoggingConfig::default();
        assert_eq!(logging.get_effective_level(), "info");
        logging.log_level = Some("warn".into());
        assert_eq!(logging.get_effective_level(), "warn");
        logging.verbose = 1;
        assert_eq!(logging.get_effective_level(), "debug");
        logging.verbose = 3;
        assert_eq!(logging.get_effective_level(), "trace");
    }

    #[test]
    fn test_effective_filter_precedence() {
        let mut logging = LoggingConfig::default();
        assert_eq!(logging.get_effective_filter(None), "vllm_triton_core=debug");
        assert_eq!(logging.get_effective_filter(Some("  ".into())), "vllm_triton_core=debug");
        assert_eq!(logging.get_effective_filter(Some("tonic=trace".into())), "tonic=trace");

        logging.log_filter = Some("h2=warn".into());
        assert_eq!(logging.get_effective_filter(Some("tonic=trace".into())), "h2=warn");
    }

    #[test]
    fn test_sampling_overrides_only_given_fields() {
        let args = SamplingArgs {
            max_tokens: Some(32),
            beam_width: Some(4),
            ..Default::default()
        };
        let config = args.apply(&SamplingConfig::default());
        assert_eq!(config.max_tokens, 32);
        assert_eq!(config.beam_width, 4);
        assert_eq!(config.top_p, SamplingConfig::default().top_p);
        assert!(config.stop_words.is_empty());
    }
}
