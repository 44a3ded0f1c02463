//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use gridguard_core::logic::model::ModelMetadata;

use crate::config::ServiceRole;
use crate::HealthState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    role: ServiceRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<ModelMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stored_rows: Option<usize>,
}

pub async fn check(State(state): State<HealthState>) -> Json<HealthResponse> {
    // An unreadable store is reported as absent rather than failing the probe
    let stored_rows = state.store.as_ref().and_then(|store| match store.row_count() {
        Ok(n) => Some(n),
        Err(e) => {
            tracing::warn!("Health probe could not count rows: {}", e);
            None
        }
    });

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        role: state.role,
        model: state.model.clone(),
        stored_rows,
    })
}
