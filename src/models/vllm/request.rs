//! Request assembly: prompt and sampling settings in, tensors and a fresh
//! correlation id out.

use std::fmt;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use super::params::{marshal, SamplingConfig};
use crate::codec::{encode_bytes_tensor, EncodedTensor};
use crate::constants::tensors::{PROMPT, SAMPLING_PARAMETERS, STREAM};
use crate::error::Result;
use crate::transport::InvokeRequest;

/// Per-call token the response must echo back before it is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `id` is the identifier this call was sent with.
    pub fn matches(&self, id: &str) -> bool {
        self.0 == id
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CorrelationId> for String {
    fn from(id: CorrelationId) -> Self {
        id.0
    }
}

/// One inference call as the caller describes it.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub prompt: String,
    pub model_name: String,
    pub model_version: String,
    pub timeout: Duration,
    /// `None` means the session falls back to the default sampling settings
    pub sampling: Option<SamplingConfig>,
}

impl InferenceRequest {
    pub fn new(prompt: impl Into<String>, model_name: impl Into<String>, timeout: Duration) -> Self {
        Self {
            prompt: prompt.into(),
            model_name: model_name.into(),
            model_version: "1".to_string(),
            timeout,
            sampling: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.model_version = version.into();
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = Some(sampling);
        self
    }
}

/// A request ready for the transport, plus the id to validate the reply against.
#[derive(Debug, Clone)]
pub struct AssembledCall {
    pub id: CorrelationId,
    pub invoke: InvokeRequest,
}

/// Builds the input tensors in the order the model declares them:
/// `PROMPT`, `STREAM`, `SAMPLING_PARAMETERS`.
pub fn prepare_input_tensors(prompt: &[u8], sampling_json: &[u8], stream: bool) -> Result<Vec<EncodedTensor>> {
    let prompt = encode_bytes_tensor(PROMPT, prompt)?;
    let params = encode_bytes_tensor(SAMPLING_PARAMETERS, sampling_json)?;
    let stream = EncodedTensor::bool_tensor(STREAM, &[stream]);
    Ok(vec![prompt, stream, params])
}

/// Assembles one call using `sampling` as the effective settings.
///
/// `stream` selects incremental delivery on the backend; the session always
/// issues buffered calls.
pub fn assemble(request: &InferenceRequest, sampling: &SamplingConfig, stream: bool) -> Result<AssembledCall> {
    let marshalled = marshal(sampling)?;
    let tensors = prepare_input_tensors(request.prompt.as_bytes(), &marshalled.sampling_json, stream)?;
    let id = CorrelationId::new();

    debug!(
        id = %id,
        prompt_bytes = request.prompt.len(),
        params_bytes = marshalled.sampling_json.len(),
        "Assembled inference request"
    );

    Ok(AssembledCall {
        invoke: InvokeRequest {
            id: id.to_string(),
            tensors,
            parameters: marshalled.parameters,
            model_name: request.model_name.clone(),
            model_version: request.model_version.clone(),
            timeout: request.timeout,
        },
        id,
    })
}
