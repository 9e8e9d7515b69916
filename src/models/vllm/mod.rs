//! vLLM models served through Triton's python backend.
//!
//! A call encodes the prompt and a JSON sampling document as BYTES tensors,
//! sends them over `ModelStreamInfer` with a fresh correlation id, and decodes
//! the backend's BYTES-framed JSON completion back into choice texts and
//! token statistics.

pub mod params;
pub mod request;
pub mod response;
pub mod service;

pub use params::{marshal, request_parameters, MarshalledParams, SamplingConfig, SamplingParams};
pub use request::{assemble, prepare_input_tensors, AssembledCall, CorrelationId, InferenceRequest};
pub use response::{
    correlate, parse_infer_response, CallStats, Completion, CompletionChoice, InferResponse,
    LogProbInfo, ResponseOutcome, Usage,
};
pub use service::{infer, DetailedInferResult, ModelService};
