//! gRPC transport over tonic.

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, info, warn};

use super::{InvokeOutcome, InvokeRequest, StreamInvoker};
use crate::constants::server::DEFAULT_CONNECT_TIMEOUT_SECS;
use crate::error::{Error, Result};
use crate::proto::{
    model_infer_request::InferInputTensor, GrpcInferenceServiceClient, ModelInferRequest,
    ModelInferResponse, ModelReadyRequest, ServerLiveRequest, ServerReadyRequest,
};

/// Address of a Triton gRPC endpoint.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub server_ip: String,
    pub grpc_port: u16,
    pub connect_timeout: Duration,
}

impl ServerInfo {
    pub fn new(server_ip: impl Into<String>, grpc_port: u16) -> Self {
        Self {
            server_ip: server_ip.into(),
            grpc_port,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    pub fn uri(&self) -> String {
        format!("http://{}:{}", self.server_ip, self.grpc_port)
    }
}

/// [`StreamInvoker`] backed by `ModelStreamInfer` on a tonic channel.
///
/// Cloning is cheap; clones share the underlying HTTP/2 connection.
#[derive(Debug, Clone)]
pub struct GrpcStreamInvoker {
    client: GrpcInferenceServiceClient<Channel>,
}

impl GrpcStreamInvoker {
    /// Dials the server. Failures are reported as [`Error::TransportInit`]
    /// and are not retried.
    pub async fn connect(info: &ServerInfo) -> Result<Self> {
        let uri = info.uri();
        let endpoint = Endpoint::from_shared(uri.clone())
            .map_err(|e| Error::TransportInit(format!("invalid server address {}: {}", uri, e)))?
            .connect_timeout(info.connect_timeout);

        let channel = endpoint
            .connect()
            .await
            .map_err(|e| Error::TransportInit(format!("init grpc client error for {}: {}", uri, e)))?;

        info!("Connected to inference server at {}", uri);
        Ok(Self::from_channel(channel))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            client: GrpcInferenceServiceClient::new(channel),
        }
    }

    pub async fn server_live(&self) -> Result<bool> {
        let mut client = self.client.clone();
        Ok(client.server_live(ServerLiveRequest {}).await?.into_inner().live)
    }

    pub async fn server_ready(&self) -> Result<bool> {
        let mut client = self.client.clone();
        Ok(client.server_ready(ServerReadyRequest {}).await?.into_inner().ready)
    }

    pub async fn model_ready(&self, name: &str, version: &str) -> Result<bool> {
        let mut client = self.client.clone();
        let request = ModelReadyRequest {
            name: name.to_string(),
            version: version.to_string(),
        };
        Ok(client.model_ready(request).await?.into_inner().ready)
    }

    async fn stream_once(
        mut client: GrpcInferenceServiceClient<Channel>,
        message: ModelInferRequest,
        timeout: Duration,
    ) -> Result<ModelInferResponse> {
        // Deadline is enforced by `invoke` through `tokio::time::timeout`.
        let request = tonic::Request::new(futures::stream::iter(vec![message]));

        let mut stream = client
            .model_stream_infer(request)
            .await
            .map_err(|status| status_to_error(status, timeout))?
            .into_inner();

        match stream.message().await.map_err(|status| status_to_error(status, timeout))? {
            Some(reply) if !reply.error_message.is_empty() => {
                warn!("Inference server reported an error: {}", reply.error_message);
                Err(Error::Transport(reply.error_message))
            }
            Some(reply) => reply.infer_response.ok_or_else(|| {
                Error::Transport("stream message carried neither a response nor an error".to_string())
            }),
            None => Err(Error::Transport(
                "stream closed before a response arrived".to_string(),
            )),
        }
    }
}

fn status_to_error(status: tonic::Status, timeout: Duration) -> Error {
    match status.code() {
        tonic::Code::DeadlineExceeded => Error::Timeout(timeout),
        _ => status.into(),
    }
}

/// Builds the wire request: tensor descriptors in `inputs`, payloads in the
/// parallel `raw_input_contents` list.
pub fn build_infer_request(request: InvokeRequest) -> ModelInferRequest {
    let mut inputs = Vec::with_capacity(request.tensors.len());
    let mut raw_input_contents = Vec::with_capacity(request.tensors.len());
    for tensor in request.tensors {
        inputs.push(InferInputTensor {
            name: tensor.name,
            datatype: tensor.datatype.to_string(),
            shape: tensor.shape,
            ..Default::default()
        });
        raw_input_contents.push(tensor.payload.to_vec());
    }

    ModelInferRequest {
        model_name: request.model_name,
        model_version: request.model_version,
        id: request.id,
        parameters: request
            .parameters
            .into_iter()
            .map(|(name, value)| (name, value.into()))
            .collect(),
        inputs,
        outputs: Vec::new(),
        raw_input_contents,
    }
}

#[async_trait]
impl StreamInvoker for GrpcStreamInvoker {
    async fn invoke(&self, request: InvokeRequest) -> Result<InvokeOutcome> {
        let timeout = request.timeout;
        let message = build_infer_request(request);
        debug!(
            id = %message.id,
            model = %message.model_name,
            inputs = message.inputs.len(),
            "Sending ModelStreamInfer request"
        );

        let start = Instant::now();
        let response = tokio::time::timeout(
            timeout,
            Self::stream_once(self.client.clone(), message, timeout),
        )
        .await
        .map_err(|_| Error::Timeout(timeout))??;

        Ok(InvokeOutcome {
            response,
            elapsed: start.elapsed(),
        })
    }
}
