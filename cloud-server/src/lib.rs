//! GridGuard Cloud
//!
//! HTTP front of the theft detector. Two route groups share one binary:
//!
//! ```text
//!   predictor  POST /api/analyse      GET /api/latest     POST /detect-theft/
//!   ingestion  POST /collect-data/    POST /api/store-data
//!   always     GET  /health
//! ```
//!
//! `SERVICE_ROLE` picks which groups are mounted.

pub mod config;
pub mod error;
pub mod handlers;
pub mod latest;
pub mod models;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use parking_lot::Mutex;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use gridguard_core::logic::model::ModelMetadata;
use gridguard_core::{CsvStore, Predictor};

pub use config::{Config, ServiceRole};
pub use error::{AppError, AppResult};
pub use latest::LatestStore;

/// State of the predictor routes: the model loaded at startup and the
/// latest analysis result
#[derive(Clone)]
pub struct PredictorState {
    pub predictor: Arc<Predictor>,
    pub latest: Arc<LatestStore>,
}

impl PredictorState {
    pub fn new(predictor: Predictor) -> Self {
        Self {
            predictor: Arc::new(predictor),
            latest: Arc::new(LatestStore::new()),
        }
    }
}

/// State of the ingestion routes
#[derive(Clone)]
pub struct IngestionState {
    pub store: Arc<CsvStore>,
    /// Serializes appends from concurrent requests
    pub write_lock: Arc<Mutex<()>>,
}

impl IngestionState {
    pub fn new(store: CsvStore) -> Self {
        Self {
            store: Arc::new(store),
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}

#[derive(Clone)]
pub struct HealthState {
    pub role: ServiceRole,
    pub model: Option<ModelMetadata>,
    pub store: Option<Arc<CsvStore>>,
}

/// Everything a process serves, decided by its role
pub struct Services {
    pub role: ServiceRole,
    pub predictor: Option<PredictorState>,
    pub ingestion: Option<IngestionState>,
}

impl Services {
    /// Open the data store and load the model as the role requires.
    ///
    /// A missing or invalid model is fatal for predictor roles.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let ingestion = if config.role.includes_ingestion() {
            let store = CsvStore::open(&config.data_file)
                .with_context(|| format!("cannot open data store {}", config.data_file))?;
            tracing::info!("Data store: {}", store.path().display());
            Some(IngestionState::new(store))
        } else {
            None
        };

        let predictor = if config.role.includes_predictor() {
            let predictor = Predictor::load(&config.model_path)
                .with_context(|| format!("cannot load model {}", config.model_path))?;
            let meta = predictor.metadata();
            tracing::info!(
                "Model: {} ({} trees, {} training rows)",
                config.model_path,
                meta.trees,
                meta.training_rows
            );
            Some(PredictorState::new(predictor))
        } else {
            None
        };

        Ok(Self {
            role: config.role,
            predictor,
            ingestion,
        })
    }
}

pub fn predictor_routes(state: PredictorState) -> Router {
    Router::new()
        .route("/api/analyse", post(handlers::analyse::analyse))
        .route("/api/latest", get(handlers::analyse::latest))
        .route("/detect-theft/", post(handlers::detect::detect_theft))
        .with_state(state)
}

pub fn ingestion_routes(state: IngestionState) -> Router {
    Router::new()
        .route("/collect-data/", post(handlers::ingest::collect_data))
        .route("/api/store-data", post(handlers::ingest::store_data))
        .with_state(state)
}

/// Create the main router with all routes
pub fn create_router(services: Services) -> Router {
    let health = HealthState {
        role: services.role,
        model: services.predictor.as_ref().map(|p| p.predictor.metadata()),
        store: services.ingestion.as_ref().map(|i| i.store.clone()),
    };

    let mut router = Router::new()
        .route("/health", get(handlers::health::check))
        .with_state(health);

    if let Some(state) = services.predictor {
        router = router.merge(predictor_routes(state));
    }
    if let Some(state) = services.ingestion {
        router = router.merge(ingestion_routes(state));
    }

    router
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
