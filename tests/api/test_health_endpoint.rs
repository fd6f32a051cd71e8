// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Tests for GET / and GET /health
//!
//! The health reporter has no side effects and never fails: a missing
//! model is reported through `model_loaded`, not through an error status.

use axum::extract::State;
use std::sync::Arc;
use tempfile::TempDir;
use xray_defect_node::{
    api::{health_handler, root_handler, AppState},
    config::ServiceConfig,
    storage::UploadStore,
    vision::Annotator,
};

/// AppState with no detector loaded (degraded mode)
async fn state_without_model() -> (TempDir, AppState) {
    let dir = TempDir::new().unwrap();
    let store = UploadStore::new(dir.path()).await.unwrap();
    let state = AppState {
        config: Arc::new(ServiceConfig::default()),
        detector: None,
        store: Arc::new(store),
        annotator: Arc::new(Annotator::without_font()),
    };
    (dir, state)
}

#[tokio::test]
async fn test_health_reports_missing_model() {
    let (_dir, state) = state_without_model().await;

    let health = health_handler(State(state)).await.0;

    assert_eq!(health.status, "error");
    assert!(!health.model_loaded);
    assert_eq!(health.model, "YOLOv11");
}

#[tokio::test]
async fn test_health_reports_configured_model_path() {
    let (_dir, state) = state_without_model().await;
    let expected = state.config.model_path.display().to_string();

    let health = health_handler(State(state)).await.0;

    assert_eq!(health.model_path, expected);
}

#[tokio::test]
async fn test_root_returns_service_metadata() {
    let body = root_handler().await.0;

    assert_eq!(body["service"], "X-Ray Defect Detection API");
    assert_eq!(body["version"], "1.0.0");
    assert_eq!(body["status"], "running");
    assert_eq!(body["model"], "YOLOv11");
}
