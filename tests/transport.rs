use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::net::TcpListener;

use vllm_triton_core::{
    codec::{decode_bytes_tensor, encode_bytes_tensor, EncodedTensor},
    proto::{infer_parameter::ParameterChoice, InferParameter},
    transport::{grpc::build_infer_request, ParameterValue},
    Error, GrpcStreamInvoker, InvokeRequest, ModelService, ServerInfo, StreamInvoker,
};

fn unreachable_server(host: &str) -> ServerInfo {
    ServerInfo {
        server_ip: host.to_string(),
        grpc_port: 1,
        connect_timeout: Duration::from_millis(500),
    }
}

#[tokio::test]
async fn test_connect_to_closed_port_is_transport_init() {
    let err = GrpcStreamInvoker::connect(&unreachable_server("127.0.0.1"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TransportInit(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_malformed_address_is_transport_init() {
    let err = GrpcStreamInvoker::connect(&unreachable_server("not a host"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TransportInit(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_model_service_connect_propagates_init_failure() {
    let result = ModelService::connect(&unreachable_server("127.0.0.1")).await;
    assert!(matches!(result, Err(Error::TransportInit(_))));
}

/// Accepts connections and never answers on them.
async fn silent_server() -> ServerInfo {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    ServerInfo::new("127.0.0.1", port)
}

#[tokio::test]
async fn test_unanswered_call_times_out() {
    let invoker = GrpcStreamInvoker::connect(&silent_server().await).await.unwrap();
    let timeout = Duration::from_millis(300);

    let start = Instant::now();
    let err = invoker
        .invoke(InvokeRequest {
            id: "late-1".into(),
            tensors: vec![encode_bytes_tensor("PROMPT", b"def quick_sort():").unwrap()],
            parameters: HashMap::new(),
            model_name: "vllm".into(),
            model_version: "1".into(),
            timeout,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout(t) if t == timeout), "got {:?}", err);
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_parameter_values_map_onto_wire_choices() {
    let cases = [
        (ParameterValue::String("0.1".into()), ParameterChoice::StringParam("0.1".into())),
        (ParameterValue::Int64(32), ParameterChoice::Int64Param(32)),
        (ParameterValue::Bool(true), ParameterChoice::BoolParam(true)),
    ];
    for (value, expected) in cases {
        let param: InferParameter = value.into();
        assert_eq!(param.parameter_choice, Some(expected));
    }
}

#[test]
fn test_wire_request_carries_model_and_parameters() {
    let mut parameters = HashMap::new();
    parameters.insert("use_beam_search".to_string(), ParameterValue::Bool(false));
    parameters.insert("top_p".to_string(), ParameterValue::String("0.1".into()));

    let request = build_infer_request(InvokeRequest {
        id: "f3b1".into(),
        tensors: vec![
            encode_bytes_tensor("PROMPT", "def quick_sort():".as_bytes()).unwrap(),
            EncodedTensor::bool_tensor("STREAM", &[true]),
            encode_bytes_tensor("SAMPLING_PARAMETERS", b"{}").unwrap(),
        ],
        parameters,
        model_name: "triton-vllm-code-llama-model".into(),
        model_version: "1".into(),
        timeout: Duration::from_secs(100),
    });

    assert_eq!(request.model_name, "triton-vllm-code-llama-model");
    assert_eq!(request.model_version, "1");
    assert_eq!(request.parameters.len(), 2);
    assert_eq!(
        request.parameters["top_p"].parameter_choice,
        Some(ParameterChoice::StringParam("0.1".into()))
    );

    let names: Vec<&str> = request.inputs.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["PROMPT", "STREAM", "SAMPLING_PARAMETERS"]);
    assert_eq!(request.raw_input_contents.len(), 3);
    assert_eq!(request.raw_input_contents[1], vec![1u8]);
    assert_eq!(
        decode_bytes_tensor(&request.raw_input_contents[2]).unwrap(),
        b"{}".to_vec()
    );
    assert!(request.outputs.is_empty());
}
