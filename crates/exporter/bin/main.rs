use clap::Parser;
use exporter::{
    cancel_on_shutdown_signal, Config, Exporter, FanoutSink, MemorySink, MetricsServer, RecorderSink,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "eth-exporter")]
#[command(about = "Prometheus exporter for Ethereum execution and consensus nodes", long_about = None)]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, env = "ETH_EXPORTER_CONFIG")]
    config: Option<PathBuf>,

    /// Execution node RPC URL (overrides the config file)
    #[arg(long)]
    execution_url: Option<String>,

    /// Consensus node Beacon API URL (overrides the config file)
    #[arg(long)]
    consensus_url: Option<String>,

    /// Metrics server bind address
    #[arg(long, default_value = "0.0.0.0:9090")]
    metrics_addr: String,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(url) = cli.execution_url {
        config.execution.url = url;
    }
    if let Some(url) = cli.consensus_url {
        config.consensus.url = url;
    }
    config.validate()?;

    tracing::info!(
        execution = %config.execution.url,
        consensus = %config.consensus.url,
        polling_frequency_seconds = config.polling_frequency_seconds,
        "Starting ethereum metrics exporter"
    );

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    let latest = Arc::new(MemorySink::new());
    let sink = FanoutSink::new()
        .with_sink(Arc::new(RecorderSink))
        .with_sink(latest.clone());

    let token = CancellationToken::new();
    let listener = MetricsServer::bind(&cli.metrics_addr).await?;

    // the exporter stops with the metrics server
    let server = MetricsServer::new(prometheus_handle, latest);
    let server_task = tokio::spawn({
        let token = token.clone();
        async move {
            let result = server.serve(listener, token.clone()).await;
            if let Err(err) = &result {
                tracing::error!("Metrics server failed: {:#}", err);
            }
            token.cancel();
            result
        }
    });

    let exporter_task = tokio::spawn(Exporter::new(config, Arc::new(sink)).start(token.clone()));

    cancel_on_shutdown_signal(token).await;

    exporter_task.await??;
    server_task.await??;

    Ok(())
}
