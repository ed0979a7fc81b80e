//! Binary entrypoint for the QC API server.
use qc_api::{run, QcConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // QC_CONFIG names an optional YAML file; secrets come from the environment
    let config = QcConfig::load()?;
    run(config).await
}
