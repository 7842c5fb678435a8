//! Shot tracking worker binary.
//!
//! Usage: `hoopshot-worker <detections.jsonl>...`

use std::path::PathBuf;

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hoopshot_worker::{BatchExecutor, WorkerConfig};

fn init_tracing() -> anyhow::Result<()> {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("hoopshot=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let inputs: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if inputs.is_empty() {
        anyhow::bail!("usage: hoopshot-worker <detections.jsonl>...");
    }

    info!("Starting hoopshot-worker");

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    if let Some(addr) = config.metrics_addr {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("failed to install Prometheus exporter")?;
        info!(%addr, "Prometheus exporter listening");
    }

    let tracker_config = config
        .load_tracker_config()
        .context("failed to load tracker config")?;

    let executor = BatchExecutor::new(config, tracker_config);
    let report = executor.run(inputs).await?;

    for job in &report.succeeded {
        info!(
            input = %job.input.display(),
            output = %job.output.display(),
            attempts = job.replay.result.total_attempts,
            makes = job.replay.result.total_makes,
            "Wrote shot summary"
        );
    }

    if !report.is_success() {
        for failure in &report.failed {
            error!(input = %failure.input.display(), "{}", failure.error);
        }
        let total = report.failed.len() + report.succeeded.len();
        anyhow::bail!("{} of {} jobs failed", report.failed.len(), total);
    }

    info!("Worker shutdown complete");
    Ok(())
}
