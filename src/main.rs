use anyhow::Result;
use credit_risk_dashboard::{config, model::ArtifactLoader, server};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Builds the log filter, accepting a bare level or full directives such as
/// `info,tower_http=debug`
fn log_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives).map_err(|e| {
        anyhow::anyhow!(
            "Invalid log filter '{}': {}. Use a level (error, warn, info, debug, trace) or filter directives",
            directives,
            e
        )
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (before logging setup)
    let config = match config::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Environment variable overrides config
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.server.logs.level.clone());

    let filter = match log_filter(&log_level) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    info!("Starting credit risk dashboard with log level: {}", log_level);
    info!("Configuration loaded successfully");

    // Artifacts are required; a dashboard without a model never starts.
    let context = match ArtifactLoader::load(&config.models) {
        Ok(context) => context,
        Err(e) => {
            error!("Failed to load model artifacts: {}", e);
            std::process::exit(1);
        }
    };

    server::run(config, context).await?;

    Ok(())
}
