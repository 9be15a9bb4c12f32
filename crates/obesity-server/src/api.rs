//! JSON inference endpoints

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use obesity_classifier::features::ModelInput;
use obesity_classifier::Model;

/// Shared application state: the model, loaded once at start.
pub struct ApiState {
    pub model: Model,
}

impl ApiState {
    pub fn new(model: Model) -> Self {
        Self { model }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let model = Model::load(&path)
            .with_context(|| format!("Failed to load model: {}", path.as_ref().display()))?;
        Ok(Self::new(model))
    }
}

/// Response body of `POST /predict`
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: String,
}

pub async fn read_root() -> Json<&'static str> {
    Json("Use /predict")
}

/// Classify one record
pub async fn predict(
    State(state): State<Arc<ApiState>>,
    Json(input): Json<ModelInput>,
) -> Result<Json<PredictionResponse>, (StatusCode, String)> {
    let prediction = state.model.predict_one(&input).map_err(|e| {
        log::error!("Prediction failed: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    log::debug!("Predicted {} for {:?}", prediction, input);
    Ok(Json(PredictionResponse { prediction }))
}

/// Create the API router
pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(read_root))
        .route("/predict", post(predict))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the API server
pub async fn serve(addr: &str, state: Arc<ApiState>) -> anyhow::Result<()> {
    crate::serve_router(addr, create_router(state), "Inference API").await
}
