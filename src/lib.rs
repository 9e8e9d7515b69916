pub mod cli;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod proto;
pub mod transport;

// Re-export commonly used types
pub use error::{Error, Result};
pub use models::vllm::{infer, CorrelationId, DetailedInferResult, InferenceRequest, ModelService, SamplingConfig};
pub use transport::{GrpcStreamInvoker, InvokeOutcome, InvokeRequest, ServerInfo, StreamInvoker};
