//! Ingestion handlers: append readings to the training store

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use validator::Validate;

use gridguard_core::SensorRecord;

use crate::models::{CollectResponse, SensorData, StoreDataRequest, StoreDataResponse};
use crate::{AppError, AppResult, IngestionState};

/// Store a pole reading with its metadata and a server timestamp
pub async fn collect_data(
    State(state): State<IngestionState>,
    payload: Result<Json<SensorData>, JsonRejection>,
) -> AppResult<Json<CollectResponse>> {
    let Json(data) = payload?;
    data.validate()?;

    append(&state, data.to_record()).await?;
    tracing::info!(pole_id = %data.pole_id, "reading stored");

    Ok(Json(CollectResponse {
        status: "success".to_string(),
        message: "Data stored for training.".to_string(),
    }))
}

/// Store a labeled reading
pub async fn store_data(
    State(state): State<IngestionState>,
    payload: Result<Json<StoreDataRequest>, JsonRejection>,
) -> AppResult<Json<StoreDataResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    append(&state, req.to_record()).await?;
    tracing::info!(detection = req.detection, "labeled reading stored");

    Ok(Json(StoreDataResponse {
        status: "Data stored".to_string(),
    }))
}

/// File I/O runs on the blocking pool; appends are serialized by the lock
async fn append(state: &IngestionState, record: SensorRecord) -> AppResult<()> {
    let state = state.clone();
    tokio::task::spawn_blocking(move || {
        let _guard = state.write_lock.lock();
        state.store.append(&record)
    })
    .await
    .map_err(|e| AppError::InternalError(format!("append task failed: {}", e)))??;
    Ok(())
}
