//! Common test utilities: a scripted in-memory transport.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use vllm_triton_core::{
    codec::encode_bytes_tensor,
    proto::ModelInferResponse,
    Error, InvokeOutcome, InvokeRequest, Result, StreamInvoker,
};

/// What the mock server does with the next call.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Echo the request id back with `json` as the output tensor
    Json(String),
    /// Answer with `json` under a different id
    WrongId(String),
    /// Echo the id without any output content
    Empty,
    /// Echo the id with a payload that is not length-prefixed JSON
    Raw(Vec<u8>),
    /// Fail the way the gRPC transport does once the deadline passes
    Timeout,
    /// Fail with a server-reported stream error
    ServerError(String),
}

/// [`StreamInvoker`] that answers from a script and records every request.
pub struct ScriptedInvoker {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<InvokeRequest>>,
    elapsed: Duration,
}

impl ScriptedInvoker {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
            elapsed: Duration::from_millis(1200),
        }
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn requests(&self) -> Vec<InvokeRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> InvokeRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request was sent")
    }
}

fn response(id: &str, raw: Option<Vec<u8>>) -> ModelInferResponse {
    ModelInferResponse {
        id: id.to_string(),
        raw_output_contents: raw.into_iter().collect(),
        ..Default::default()
    }
}

fn encoded(json: &str) -> Vec<u8> {
    encode_bytes_tensor("TEXT", json.as_bytes()).unwrap().payload.to_vec()
}

#[async_trait]
impl StreamInvoker for ScriptedInvoker {
    async fn invoke(&self, request: InvokeRequest) -> Result<InvokeOutcome> {
        let id = request.id.clone();
        let timeout = request.timeout;
        self.requests.lock().unwrap().push(request);

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("script ran out of replies");

        let response = match reply {
            Reply::Json(json) => response(&id, Some(encoded(&json))),
            Reply::WrongId(json) => response("not-the-request-id", Some(encoded(&json))),
            Reply::Empty => response(&id, None),
            Reply::Raw(raw) => response(&id, Some(raw)),
            Reply::Timeout => return Err(Error::Timeout(timeout)),
            Reply::ServerError(msg) => return Err(Error::Transport(msg)),
        };

        Ok(InvokeOutcome {
            response,
            elapsed: self.elapsed,
        })
    }
}

/// Backend reply with `texts` as choices and the given usage counts.
pub fn completion_json(texts: &[&str], prompt_tokens: u32, completion_tokens: u32) -> String {
    let choices: Vec<serde_json::Value> = texts
        .iter()
        .enumerate()
        .map(|(index, text)| {
            serde_json::json!({
                "text": text,
                "index": index,
                "finish_reason": "length",
                "token_ids": [],
                "cumulative_logprob": -1.25,
                "logprobs": null
            })
        })
        .collect();

    serde_json::json!({
        "choices": choices,
        "usage": {
            "prompt_tokens": prompt_tokens,
            "completion_tokens": completion_tokens,
            "total_tokens": prompt_tokens + completion_tokens
        }
    })
    .to_string()
}
