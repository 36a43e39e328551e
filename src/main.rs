//! StudyBuddy proxy entry point.

use studybuddy_proxy::ConfigLoader;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads key env vars
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting studybuddy-proxy"
    );

    let config = ConfigLoader::new()?.into_config();
    studybuddy_proxy::serve(config).await?;

    Ok(())
}
