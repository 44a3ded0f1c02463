//! Predictor handlers: analyse and latest

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::models::{AnalyseRequest, AnalysisResult};
use crate::{AppError, AppResult, PredictorState};

/// Score a reading and remember it as the latest result
pub async fn analyse(
    State(state): State<PredictorState>,
    payload: Result<Json<AnalyseRequest>, JsonRejection>,
) -> AppResult<Json<AnalysisResult>> {
    let Json(req) = payload?;

    let prediction = state.predictor.predict(&req.features())?;
    tracing::debug!(
        label = prediction.label,
        theft_probability = prediction.theft_probability,
        inference_us = prediction.inference_time_us,
        "analysed reading"
    );

    let result = req.into_result(prediction.label);
    state.latest.record(result.clone());

    Ok(Json(result))
}

/// Most recent analysis result
pub async fn latest(State(state): State<PredictorState>) -> AppResult<Json<AnalysisResult>> {
    state
        .latest
        .latest()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No data available".to_string()))
}
