//! GridGuard Cloud Server
//!
//! Serves theft predictions and collects labeled readings for retraining.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    GRIDGUARD CLOUD                        │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐            ┌──────────────────────┐    │
//! │  │  Predictor   │            │  Ingestion           │    │
//! │  │  (forest,    │            │  (append-only CSV)   │    │
//! │  │   latest)    │            │                      │    │
//! │  └──────┬───────┘            └──────────┬───────────┘    │
//! │         ▼                               ▼                │
//! │   model.json  ◄──── gridguard-train ──── data.csv        │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gridguard_cloud::{create_router, Config, Services};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging; JSON lines in production
    let production = config.is_production();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "gridguard_cloud=debug,gridguard_core=info,tower_http=debug".into()))
        .with(production.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!production).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("GridGuard Cloud Server starting...");
    tracing::info!("Role: {} ({})", config.role, config.environment);

    let services = Services::from_config(&config)?;
    let app = create_router(services);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
