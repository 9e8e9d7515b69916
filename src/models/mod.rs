//! Model-specific request/response adapters
//!
//! Each submodule knows how one family of backends lays out its tensors and
//! result documents on top of the generic inference protocol.

pub mod vllm;

pub use vllm::{infer, DetailedInferResult, InferenceRequest, ModelService, SamplingConfig};
