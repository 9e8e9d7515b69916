//! Response correlation and result assembly.
//!
//! A raw response moves through `validated -> parsed -> aggregated`, or is
//! rejected on the way: the id must match the request's [`CorrelationId`], the
//! first raw output must be a well-formed BYTES tensor, and its content must
//! parse as the completion document below. Nothing is aggregated for a
//! rejected response.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use super::request::CorrelationId;
use crate::codec::decode_bytes_tensor;
use crate::error::{Error, Result};
use crate::proto::ModelInferResponse;

/// Reads an absent or `null` field as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Per-token log-probability detail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogProbInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tokens: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub token_logprobs: Vec<Option<f32>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub top_logprobs: Vec<Option<HashMap<String, f32>>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text_offset: Vec<i32>,
}

/// One generated candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionChoice {
    pub text: String,
    pub index: u32,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub token_ids: Vec<u32>,
    #[serde(default)]
    pub cumulative_logprob: Option<f64>,
    #[serde(default)]
    pub logprobs: Option<LogProbInfo>,
}

/// Token accounting reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The JSON document the backend returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferResponse {
    pub choices: Vec<CompletionChoice>,
    pub usage: Usage,
}

/// Statistics of a single completed call.
///
/// Every choice is credited with the call's total completion-token count;
/// the backend does not report per-choice counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallStats {
    pub time_spent_ms: u64,
    /// Prompt length in bytes, once per choice
    pub input_len: Vec<usize>,
    /// Prompt tokens, once per choice
    pub input_tokens: Vec<u32>,
    /// Output text lengths in bytes, one inner sequence per batch element
    pub output_len: Vec<Vec<usize>>,
    /// Output tokens, one inner sequence per batch element
    pub output_tokens: Vec<Vec<u32>>,
    pub prompt_tokens: u32,
}

/// A parsed, aggregated response.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Choice texts in the order the backend returned them
    pub texts: Vec<String>,
    pub stats: CallStats,
    pub response: InferResponse,
}

/// Result of correlating one response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome {
    /// The server acknowledged the call without output content
    Empty { time_spent_ms: u64 },
    Completed(Completion),
}

impl ResponseOutcome {
    pub fn texts(&self) -> &[String] {
        match self {
            ResponseOutcome::Empty { .. } => &[],
            ResponseOutcome::Completed(completion) => &completion.texts,
        }
    }

    pub fn time_spent_ms(&self) -> u64 {
        match self {
            ResponseOutcome::Empty { time_spent_ms } => *time_spent_ms,
            ResponseOutcome::Completed(completion) => completion.stats.time_spent_ms,
        }
    }

    pub fn into_texts(self) -> Vec<String> {
        match self {
            ResponseOutcome::Empty { .. } => Vec::new(),
            ResponseOutcome::Completed(completion) => completion.texts,
        }
    }
}

/// Parses the decoded output tensor.
pub fn parse_infer_response(decoded: &[u8]) -> Result<InferResponse> {
    serde_json::from_slice(decoded).map_err(|e| Error::Parse(e.to_string()))
}

/// Validates `response` against `expected` and assembles the call's result.
///
/// `prompt_len` is the prompt's UTF-8 byte length.
pub fn correlate(
    response: &ModelInferResponse,
    elapsed: Duration,
    expected: &CorrelationId,
    prompt_len: usize,
) -> Result<ResponseOutcome> {
    if !expected.matches(&response.id) {
        warn!(expected = %expected, actual = %response.id, "Response does not match request");
        return Err(Error::CorrelationMismatch {
            expected: expected.to_string(),
            actual: response.id.clone(),
        });
    }

    let time_spent_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    let raw = match response.raw_output_contents.first() {
        Some(raw) => raw,
        None => {
            debug!(id = %expected, "Response carried no output content");
            return Ok(ResponseOutcome::Empty { time_spent_ms });
        }
    };

    let decoded = decode_bytes_tensor(raw)?;
    let parsed = parse_infer_response(&decoded)?;
    debug!(
        id = %expected,
        choices = parsed.choices.len(),
        completion_tokens = parsed.usage.completion_tokens,
        "Decoded inference response"
    );

    let usage = parsed.usage;
    let mut texts = Vec::with_capacity(parsed.choices.len());
    let mut output_tokens = Vec::with_capacity(parsed.choices.len());
    let mut output_len = Vec::with_capacity(parsed.choices.len());
    let mut input_tokens = Vec::with_capacity(parsed.choices.len());
    let mut input_len = Vec::with_capacity(parsed.choices.len());
    for choice in &parsed.choices {
        output_tokens.push(usage.completion_tokens);
        output_len.push(choice.text.len());
        input_tokens.push(usage.prompt_tokens);
        input_len.push(prompt_len);
        texts.push(choice.text.clone());
    }

    Ok(ResponseOutcome::Completed(Completion {
        texts,
        stats: CallStats {
            time_spent_ms,
            input_len,
            input_tokens,
            output_len: vec![output_len],
            output_tokens: vec![output_tokens],
            prompt_tokens: usage.prompt_tokens,
        },
        response: parsed,
    }))
}
