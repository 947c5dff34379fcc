use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medwise_core::{config::config_from_env_values, RecordStore};

/// Main entry point for the MedWise application
///
/// Resolves configuration once, opens the file-backed record store and serves the REST API
/// (with Swagger UI at `/swagger-ui`).
///
/// # Environment Variables
/// - `MEDWISE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `MEDWISE_DATA_DIR`: Directory holding the stored collections (default: "medwise_data")
/// - `MEDWISE_NAMESPACE`: Storage key namespace (default: "medwise")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid or the data directory cannot be prepared,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medwise=info".parse()?)
                .add_directive("medwise_run=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config_from_env_values(
        std::env::var("MEDWISE_DATA_DIR").ok(),
        std::env::var("MEDWISE_NAMESPACE").ok(),
    )?;
    let store = RecordStore::open(&cfg).await?;

    let rest_addr = std::env::var("MEDWISE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!(
        "++ Starting MedWise REST on {} (data dir {}, namespace {})",
        rest_addr,
        cfg.data_dir().display(),
        cfg.namespace()
    );

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, api_rest::router(store))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("-- Shutting down MedWise REST");
}
