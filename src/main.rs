use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use claimdocs::common::config::AppConfig;
use claimdocs::common::di::AppServiceFactory;
use claimdocs::interfaces::create_app;

/// claimdocs - Insurance claim document service
///
/// Stores uploaded insurance documents in Azure Blob Storage (or a local
/// uploads directory) under folders derived from the claim, the user and an
/// optional document category, and keeps a JSON record of every document.
///
/// - Domain Layer: document records, categories, folder derivation (domain/*)
/// - Application Layer: upload, retrieval and management use cases (application/*)
/// - Infrastructure Layer: blob storage adapters and the record store (infrastructure/*)
/// - Interface Layer: HTTP API (interfaces/*)
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment variables
    let config = AppConfig::from_env();
    let addr = config.server.socket_addr();

    tokio::fs::create_dir_all(&config.storage.data_dir)
        .await
        .with_context(|| format!("Failed to create data directory {}", config.storage.data_dir.display()))?;

    let state = AppServiceFactory::new(config)
        .build_app_state()
        .await
        .context("Failed to initialize application services")?;

    let app = create_app(Arc::new(state));

    tracing::info!("Starting claimdocs server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
