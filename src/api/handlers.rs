// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Root and health handlers

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::server::AppState;
use crate::version;

/// Response from GET /health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "ok" while the model is loaded, "error" otherwise
    pub status: String,
    /// Detector family
    pub model: String,
    /// Configured weights path
    pub model_path: String,
    pub model_loaded: bool,
}

/// GET / - Service metadata
pub async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({
        "service": version::SERVICE_NAME,
        "version": version::VERSION,
        "status": "running",
        "model": version::MODEL_FAMILY,
        "docs": "/health",
    }))
}

/// GET /health - Current availability of the loaded model
///
/// Never fails; a missing model is reported, not an error response.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.detector.is_some();
    Json(HealthResponse {
        status: if model_loaded { "ok" } else { "error" }.to_string(),
        model: version::MODEL_FAMILY.to_string(),
        model_path: state.config.model_path.display().to_string(),
        model_loaded,
    })
}
