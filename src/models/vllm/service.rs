//! Session object bound to one inference endpoint.

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use super::params::SamplingConfig;
use super::request::{assemble, InferenceRequest};
use super::response::{correlate, CallStats, ResponseOutcome};
use crate::error::Result;
use crate::transport::{GrpcStreamInvoker, ServerInfo, StreamInvoker};

/// Statistics of the most recent call on a session.
///
/// Timing and per-call sequences are replaced by each successful call;
/// `max_input_tokens` is the maximum seen over the session's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetailedInferResult {
    /// Elapsed time in milliseconds
    pub time_spent: u64,
    pub input_len: Vec<usize>,
    pub input_tokens: Vec<u32>,
    /// One inner sequence per batch element
    pub output_len: Vec<Vec<usize>>,
    pub output_tokens: Vec<Vec<u32>>,
    pub max_input_tokens: u32,
}

impl DetailedInferResult {
    fn record(&mut self, outcome: &ResponseOutcome) {
        match outcome {
            ResponseOutcome::Empty { time_spent_ms } => self.time_spent = *time_spent_ms,
            ResponseOutcome::Completed(completion) => self.record_stats(&completion.stats),
        }
    }

    fn record_stats(&mut self, stats: &CallStats) {
        self.time_spent = stats.time_spent_ms;
        self.input_len = stats.input_len.clone();
        self.input_tokens = stats.input_tokens.clone();
        self.output_len = stats.output_len.clone();
        self.output_tokens = stats.output_tokens.clone();
        self.max_input_tokens = self.max_input_tokens.max(stats.prompt_tokens);
    }
}

/// Client session for one model endpoint.
///
/// Calls that update the session's [`DetailedInferResult`] take `&mut self`,
/// so a session serves one call at a time. [`ModelService::call`] borrows
/// immutably and returns the statistics instead; use it to run calls
/// concurrently over a shared transport.
pub struct ModelService<I = GrpcStreamInvoker> {
    invoker: I,
    infer_config: SamplingConfig,
    infer_result: DetailedInferResult,
}

impl ModelService<GrpcStreamInvoker> {
    /// Connects to a Triton gRPC endpoint.
    pub async fn connect(info: &ServerInfo) -> Result<Self> {
        let invoker = GrpcStreamInvoker::connect(info).await?;
        info!("Model service ready for {}", info.uri());
        Ok(Self::new(invoker))
    }
}

impl<I: StreamInvoker> ModelService<I> {
    pub fn new(invoker: I) -> Self {
        Self {
            invoker,
            infer_config: SamplingConfig::default(),
            infer_result: DetailedInferResult::default(),
        }
    }

    pub fn set_infer_config(&mut self, config: SamplingConfig) {
        self.infer_config = config;
    }

    pub fn infer_config(&self) -> &SamplingConfig {
        &self.infer_config
    }

    pub fn detailed_infer_result(&self) -> &DetailedInferResult {
        &self.infer_result
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    /// Runs one buffered call with `sampling` and returns its outcome without
    /// touching the session's statistics.
    pub async fn call(&self, request: &InferenceRequest, sampling: &SamplingConfig) -> Result<ResponseOutcome> {
        let assembled = assemble(request, sampling, false)?;
        let outcome = self.invoker.invoke(assembled.invoke).await?;
        correlate(&outcome.response, outcome.elapsed, &assembled.id, request.prompt.len())
    }

    /// Runs one call with the session's active config and records its
    /// statistics. Returns the choice texts in backend order.
    pub async fn model_infer(
        &mut self,
        prompt: &str,
        model_name: &str,
        model_version: &str,
        request_timeout: Duration,
    ) -> Result<Vec<String>> {
        let request = InferenceRequest {
            prompt: prompt.to_string(),
            model_name: model_name.to_string(),
            model_version: model_version.to_string(),
            timeout: request_timeout,
            sampling: None,
        };
        Ok(self.infer_recorded(&request).await?.into_texts())
    }

    async fn infer_recorded(&mut self, request: &InferenceRequest) -> Result<ResponseOutcome> {
        let outcome = self.call(request, &self.infer_config).await?;
        self.infer_result.record(&outcome);
        debug!(
            model = %request.model_name,
            time_spent_ms = outcome.time_spent_ms(),
            choices = outcome.texts().len(),
            "Inference call completed"
        );
        Ok(outcome)
    }
}

/// Runs `params` on `model`, one inner sequence of choice texts per batch
/// element. An acknowledgement without output content yields no batch
/// elements.
///
/// A request without sampling settings resets the session to the defaults;
/// otherwise the request's settings become the session's active config.
pub async fn infer<I: StreamInvoker>(params: &InferenceRequest, model: &mut ModelService<I>) -> Result<Vec<Vec<String>>> {
    let config = params.sampling.clone().unwrap_or_default();
    model.set_infer_config(config);

    match model.infer_recorded(params).await? {
        ResponseOutcome::Empty { .. } => Ok(Vec::new()),
        ResponseOutcome::Completed(completion) => Ok(vec![completion.texts]),
    }
}
