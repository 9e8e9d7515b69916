use anyhow::{Context, Result};
use std::time::Duration;

use crate::{
    cli::commands::{HealthCommand, InferCommand},
    config::ClientConfig,
    models::vllm::{infer, InferenceRequest, ModelService},
    transport::GrpcStreamInvoker,
};

pub async fn handle_infer(cmd: InferCommand) -> Result<()> {
    let config = ClientConfig::load(&cmd.client).context("Failed to load configuration")?;
    let sampling = cmd.sampling.apply(&config.sampling);
    sampling.validate().context("Invalid sampling settings")?;

    let info = config.server_info();
    let mut model = ModelService::connect(&info)
        .await
        .with_context(|| format!("Failed to connect to {}", info.uri()))?;

    let request = InferenceRequest {
        prompt: cmd.prompt,
        model_name: config.model.name.clone(),
        model_version: config.model.version.clone(),
        timeout: config.request_timeout(),
        sampling: Some(sampling),
    };

    let times = cmd.times.max(1);
    let mut total_time_spent: u64 = 0;
    let mut total_tokens: u64 = 0;
    for i in 0..times {
        let output = infer(&request, &mut model)
            .await
            .with_context(|| format!("Infer failed on call {}", i + 1))?;

        let result = model.detailed_infer_result();
        total_time_spent += result.time_spent;
        total_tokens += result
            .output_tokens
            .first()
            .and_then(|row| row.first())
            .copied()
            .map(u64::from)
            .unwrap_or(0);
        println!("output: {:?}", output);

        if cmd.interval_ms > 0 && i + 1 < times {
            tokio::time::sleep(Duration::from_millis(cmd.interval_ms)).await;
        }
    }

    println!(
        "output tokens: {:.1}, time spent: {:.3} s",
        total_tokens as f64 / f64::from(times),
        total_time_spent as f64 / f64::from(times) / 1000.0
    );
    Ok(())
}

pub async fn handle_health(cmd: HealthCommand) -> Result<()> {
    let config = ClientConfig::load(&cmd.client).context("Failed to load configuration")?;
    let info = config.server_info();
    let invoker = GrpcStreamInvoker::connect(&info)
        .await
        .with_context(|| format!("Failed to connect to {}", info.uri()))?;

    let live = invoker.server_live().await.context("ServerLive failed")?;
    let ready = invoker.server_ready().await.context("ServerReady failed")?;
    println!("server {}: live={} ready={}", info.uri(), live, ready);

    if !cmd.server_only {
        let model_ready = invoker
            .model_ready(&config.model.name, &config.model.version)
            .await
            .context("ModelReady failed")?;
        println!(
            "model {} (version {}): ready={}",
            config.model.name, config.model.version, model_ready
        );
        if !model_ready {
            anyhow::bail!("model {} is not ready", config.model.name);
        }
    }

    if !(live && ready) {
        anyhow::bail!("server {} is not ready", info.uri());
    }
    Ok(())
}
