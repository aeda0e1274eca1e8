use super::types::{ErrorResponse, HealthResponse, PredictRequest, ServiceInfo};
use crate::Error;
use crate::pipeline::{EmotionPipeline, EmotionPrediction};
use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<EmotionPipeline>,
}

impl AppState {
    pub fn new(pipeline: EmotionPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(err: &Error) -> ApiError {
    (
        err.status_code(),
        Json(ErrorResponse {
            error: err.public_message(),
        }),
    )
}

fn rejection_response(rejection: JsonRejection) -> ApiError {
    let status = match &rejection {
        JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ErrorResponse {
            error: rejection.body_text(),
        }),
    )
}

pub async fn home() -> Json<ServiceInfo> {
    let endpoints = [
        ("/predict", "POST - Predict emotion from text"),
        ("/health", "GET - Health check"),
    ]
    .into_iter()
    .map(|(path, desc)| (path.to_string(), desc.to_string()))
    .collect();

    Json(ServiceInfo {
        message: "Emotion Analysis API".to_string(),
        status: "running".to_string(),
        endpoints,
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = state.pipeline.status();
    if let Some(reason) = state.pipeline.unavailable_reason() {
        debug!("Health check without a loaded model: {}", reason);
    }
    Json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: status.model_loaded,
        model_version: status.model_version,
        labels: status.labels,
        loaded_at: status.loaded_at,
    })
}

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<EmotionPrediction>, ApiError> {
    let request_id = Uuid::new_v4();

    let Json(request) = payload.map_err(|rejection| {
        debug!(%request_id, "Rejected prediction body: {}", rejection.body_text());
        rejection_response(rejection)
    })?;

    let text = request
        .text
        .ok_or_else(|| error_response(&Error::invalid_input("No text provided")))?;

    info!(
        %request_id,
        chars = text.chars().count(),
        words = text.split_whitespace().count(),
        "Received prediction request"
    );
    debug!(%request_id, "Input text: {}", text);

    let pipeline = Arc::clone(&state.pipeline);
    let outcome = tokio::task::spawn_blocking(move || pipeline.predict(&text))
        .await
        .map_err(|e| Error::internal(format!("prediction task failed: {e}")))
        .and_then(|result| result);

    match outcome {
        Ok(prediction) => {
            info!(
                %request_id,
                emotion = %prediction.predicted_emotion,
                confidence = prediction.confidence,
                "Prediction complete"
            );
            Ok(Json(prediction))
        }
        Err(e) => {
            if e.is_client_error() {
                info!(%request_id, "Rejected prediction request: {}", e);
            } else if matches!(e, Error::ModelUnavailable(_)) {
                warn!(%request_id, "Prediction requested without a model: {}", e);
            } else {
                error!(%request_id, "Error in prediction: {}", e);
            }
            Err(error_response(&e))
        }
    }
}
