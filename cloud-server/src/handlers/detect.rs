//! Theft detection handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use validator::Validate;

use crate::models::{DetectionResponse, SensorData};
use crate::{AppResult, PredictorState};

pub async fn detect_theft(
    State(state): State<PredictorState>,
    payload: Result<Json<SensorData>, JsonRejection>,
) -> AppResult<Json<DetectionResponse>> {
    let Json(data) = payload?;
    data.validate()?;

    let prediction = state.predictor.predict(&data.features())?;

    if prediction.is_theft() {
        tracing::warn!(
            pole_id = %data.pole_id,
            location = %data.location,
            theft_probability = prediction.theft_probability,
            "theft detected"
        );
        Ok(Json(DetectionResponse::alert(&data)))
    } else {
        Ok(Json(DetectionResponse::ok(&data)))
    }
}
