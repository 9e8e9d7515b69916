//! Shared constants for the vLLM client
//!
//! Centralizes sampling defaults and tensor names so the request assembler,
//! the parameter marshaller and the configuration layer agree on them.

/// Sampling defaults applied when a call does not carry its own config
pub mod sampling {
    /// Default generation length in tokens
    pub const REQUEST_LEN: u32 = 512;

    pub const TOP_K: u32 = 1;

    pub const TOP_P: f32 = 0.1;

    pub const TEMPERATURE: f32 = 0.0;

    /// Single candidate, beam search off
    pub const BEAM_WIDTH: u32 = 1;

    /// Fixed penalties sent with every call
    pub const PRESENCE_PENALTY: f32 = 1.0;
    pub const FREQUENCY_PENALTY: f32 = 1.0;

    /// Number of log-probabilities requested per generated token
    pub const LOGPROBS: i32 = 1;
}

/// Tensor names and datatypes understood by the vLLM python backend
pub mod tensors {
    pub const PROMPT: &str = "PROMPT";
    pub const STREAM: &str = "STREAM";
    pub const SAMPLING_PARAMETERS: &str = "SAMPLING_PARAMETERS";

    pub const BYTES: &str = "BYTES";
    pub const BOOL: &str = "BOOL";

    /// Width of the little-endian length prefix on each BYTES element
    pub const LENGTH_PREFIX_SIZE: usize = 4;
}

/// Connection defaults
pub mod server {
    pub const DEFAULT_HOST: &str = "127.0.0.1";
    pub const DEFAULT_GRPC_PORT: u16 = 8001;
    pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 100;
}
