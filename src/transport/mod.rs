//! Transport boundary between the request/response core and the network.
//!
//! The core hands a fully assembled [`InvokeRequest`] to a [`StreamInvoker`]
//! and gets back the server's raw [`ModelInferResponse`] together with the
//! wall-clock time the call took. Connection management, deadlines and the
//! streaming RPC itself live behind this trait; nothing here retries.

pub mod grpc;

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::codec::EncodedTensor;
use crate::error::Result;
use crate::proto::{infer_parameter::ParameterChoice, InferParameter, ModelInferResponse};

pub use grpc::{GrpcStreamInvoker, ServerInfo};

/// Value of a named side-channel request parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    String(String),
    Int64(i64),
    Bool(bool),
}

impl From<ParameterValue> for InferParameter {
    fn from(value: ParameterValue) -> Self {
        let choice = match value {
            ParameterValue::String(s) => ParameterChoice::StringParam(s),
            ParameterValue::Int64(i) => ParameterChoice::Int64Param(i),
            ParameterValue::Bool(b) => ParameterChoice::BoolParam(b),
        };
        InferParameter {
            parameter_choice: Some(choice),
        }
    }
}

/// Everything the transport needs to issue one call.
#[derive(Debug, Clone)]
pub struct InvokeRequest {
    /// Correlation id the response must echo back
    pub id: String,
    /// Input tensors, in the order the model declares them
    pub tensors: Vec<EncodedTensor>,
    pub parameters: HashMap<String, ParameterValue>,
    pub model_name: String,
    pub model_version: String,
    pub timeout: Duration,
}

/// A response as delivered by the transport.
#[derive(Debug, Clone)]
pub struct InvokeOutcome {
    pub response: ModelInferResponse,
    /// Time between sending the request and receiving the response
    pub elapsed: Duration,
}

/// Performs one remote inference call.
///
/// Implementations resolve exactly once per call: with the server's response,
/// or with an error (including [`crate::Error::Timeout`] once
/// `request.timeout` has passed).
#[async_trait]
pub trait StreamInvoker: Send + Sync {
    async fn invoke(&self, request: InvokeRequest) -> Result<InvokeOutcome>;
}

#[async_trait]
impl<T: StreamInvoker + ?Sized> StreamInvoker for std::sync::Arc<T> {
    async fn invoke(&self, request: InvokeRequest) -> Result<InvokeOutcome> {
        (**self).invoke(request).await
    }
}
