// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Routing tests over the assembled axum router

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use xray_defect_node::{
    api::{create_router, AppState},
    config::ServiceConfig,
    storage::UploadStore,
    vision::Annotator,
};

async fn router_without_model() -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    let store = UploadStore::new(dir.path()).await.unwrap();
    let state = AppState {
        config: Arc::new(ServiceConfig::default()),
        detector: None,
        store: Arc::new(store),
        annotator: Arc::new(Annotator::without_font()),
    };
    (dir, create_router(state))
}

#[tokio::test]
async fn test_health_route() {
    let (_dir, router) = router_without_model().await;

    let response = router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["model_loaded"], false);
    assert_eq!(json["status"], "error");
}

#[tokio::test]
async fn test_root_route() {
    let (_dir, router) = router_without_model().await;

    let response = router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_uploads_route_missing_file() {
    let (_dir, router) = router_without_model().await;

    let response = router
        .oneshot(
            Request::builder()
                .uri("/uploads/never_written.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error_type"], "not_found");
}

#[tokio::test]
async fn test_predict_route_rejects_non_multipart() {
    let (_dir, router) = router_without_model().await;

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (_dir, router) = router_without_model().await;

    let response = router
        .oneshot(
            Request::builder()
                .uri("/no/such/route")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
