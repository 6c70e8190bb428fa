use solace_server::ServerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration; is GOOGLE_API_KEY set?");
            std::process::exit(1);
        }
    };
    tracing::info!("Loaded configuration");

    if let Err(report) = solace_server::serve(config).await {
        tracing::error!(error = %report, "Server failed");
        std::process::exit(1);
    }
}
