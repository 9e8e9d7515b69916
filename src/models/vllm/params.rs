//! Sampling configuration and its two wire representations.
//!
//! A call carries the same sampling settings twice: as named side-channel
//! request parameters, and as a JSON document inside the
//! `SAMPLING_PARAMETERS` input tensor, which is what the vLLM python backend
//! actually reads. Both are derived from one [`SamplingConfig`] here so they
//! cannot drift apart.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::sampling::{
    BEAM_WIDTH, FREQUENCY_PENALTY, LOGPROBS, PRESENCE_PENALTY, REQUEST_LEN, TEMPERATURE, TOP_K,
    TOP_P,
};
use crate::error::{Error, Result};
use crate::transport::ParameterValue;

/// Typed sampling settings for one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Stop sequences, in order
    pub stop_words: Vec<String>,
    pub max_tokens: u32,
    /// Kept for callers that share configs with other backends; vLLM ignores it
    pub top_k: u32,
    pub top_p: f32,
    /// Number of returned candidates; values above 1 switch on beam search
    pub beam_width: u32,
    pub temperature: f32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            stop_words: Vec::new(),
            max_tokens: REQUEST_LEN,
            top_k: TOP_K,
            top_p: TOP_P,
            beam_width: BEAM_WIDTH,
            temperature: TEMPERATURE,
        }
    }
}

impl SamplingConfig {
    /// Beam search is never set directly; it follows from the beam width.
    pub fn use_beam_search(&self) -> bool {
        self.beam_width > 1
    }

    pub fn validate(&self) -> Result<()> {
        if self.beam_width == 0 {
            return Err(Error::Config("beam width must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// JSON document carried in the `SAMPLING_PARAMETERS` tensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub stop: Vec<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Number of results
    pub n: u32,
    pub use_beam_search: bool,
    pub top_p: f32,
    pub logprobs: i32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    pub best_of: u32,
}

impl From<&SamplingConfig> for SamplingParams {
    fn from(config: &SamplingConfig) -> Self {
        Self {
            stop: config.stop_words.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            n: config.beam_width,
            use_beam_search: config.use_beam_search(),
            top_p: config.top_p,
            logprobs: LOGPROBS,
            presence_penalty: PRESENCE_PENALTY,
            frequency_penalty: FREQUENCY_PENALTY,
            best_of: config.beam_width,
        }
    }
}

/// Both representations of one config, ready to attach to a request.
#[derive(Debug, Clone)]
pub struct MarshalledParams {
    pub parameters: HashMap<String, ParameterValue>,
    pub sampling_json: Vec<u8>,
}

/// Shortest decimal that round-trips through `f32`, never in exponent form.
fn format_float(value: f32) -> String {
    format!("{}", value)
}

/// Named request parameters for `config`.
///
/// Floats travel as strings, counts as `int64`, the beam-search switch as a bool.
pub fn request_parameters(config: &SamplingConfig) -> Result<HashMap<String, ParameterValue>> {
    let stop = serde_json::to_string(&config.stop_words)?;
    let beam_width = i64::from(config.beam_width);

    let mut params = HashMap::with_capacity(10);
    params.insert("temperature".to_string(), ParameterValue::String(format_float(config.temperature)));
    params.insert("top_p".to_string(), ParameterValue::String(format_float(config.top_p)));
    params.insert(
        "presence_penalty".to_string(),
        ParameterValue::String(format_float(PRESENCE_PENALTY)),
    );
    params.insert(
        "frequency_penalty".to_string(),
        ParameterValue::String(format_float(FREQUENCY_PENALTY)),
    );
    params.insert("stop".to_string(), ParameterValue::String(stop));
    params.insert("n".to_string(), ParameterValue::Int64(beam_width));
    params.insert("best_of".to_string(), ParameterValue::Int64(beam_width));
    params.insert("max_tokens".to_string(), ParameterValue::Int64(i64::from(config.max_tokens)));
    params.insert("logprobs".to_string(), ParameterValue::Int64(i64::from(LOGPROBS)));
    params.insert("use_beam_search".to_string(), ParameterValue::Bool(config.use_beam_search()));
    Ok(params)
}

/// Marshals `config` into the parameter map and the JSON tensor payload.
pub fn marshal(config: &SamplingConfig) -> Result<MarshalledParams> {
    config.validate()?;
    let parameters = request_parameters(config)?;
    let sampling_json = serde_json::to_vec(&SamplingParams::from(config))?;
    Ok(MarshalledParams {
        parameters,
        sampling_json,
    })
}
