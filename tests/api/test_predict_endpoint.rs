// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Tests for POST /predict
//!
//! The full pipeline needs real model weights, so the in-repo tests cover
//! the degraded path (model absent) and the error taxonomy; the end-to-end
//! case is `#[ignore]`d and runs against weights at the default path.

use axum::http::StatusCode;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;
use xray_defect_node::{
    api::{run_predict, ApiError, AppState},
    config::ServiceConfig,
    storage::UploadStore,
    vision::{Annotator, DefectDetector, DetectorConfig},
};

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

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([90, 90, 90]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

#[tokio::test]
async fn test_predict_without_model_is_server_error() {
    let (_dir, state) = state_without_model().await;

    let result = run_predict(&state, "board1.png", &png_bytes(32, 32)).await;

    let err = result.unwrap_err();
    assert!(matches!(err, ApiError::ModelNotLoaded));
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_predict_without_model_fails_before_any_write() {
    let (dir, state) = state_without_model().await;

    let _ = run_predict(&state, "board1.png", &png_bytes(32, 32)).await;

    // Nothing persisted on the fail-fast path
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_predict_error_body_shape() {
    let (_dir, state) = state_without_model().await;

    let err = run_predict(&state, "board1.png", &png_bytes(8, 8))
        .await
        .unwrap_err();
    let body = err.to_response();

    assert_eq!(body.error_type, "model_not_loaded");
    assert_eq!(body.message, "Model not loaded");
}

/// Corrupt uploads must surface as a client error, never a success and
/// never a 404. Needs a loaded model since the model check runs first.
#[tokio::test]
#[ignore] // Only run with downloaded weights
async fn test_predict_corrupt_upload_is_client_error() {
    let dir = TempDir::new().unwrap();
    let store = UploadStore::new(dir.path()).await.unwrap();
    let config = ServiceConfig::default();

    let detector = DefectDetector::load(&DetectorConfig {
        model_path: config.model_path.clone(),
        input_size: config.image_size,
        confidence_threshold: config.confidence_threshold,
        iou_threshold: config.iou_threshold,
        gpu_device: config.gpu_device,
    })
    .expect("weights available at the default path");

    let state = AppState {
        config: Arc::new(config),
        detector: Some(Arc::new(detector)),
        store: Arc::new(store),
        annotator: Arc::new(Annotator::without_font()),
    };

    // PNG magic bytes followed by garbage
    let corrupt = [0x89, 0x50, 0x4E, 0x47, 0x00, 0x01, 0x02, 0x03];
    let err = run_predict(&state, "broken.png", &corrupt).await.unwrap_err();

    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert!(matches!(err, ApiError::InvalidRequest(_)));
}

/// Full pipeline against real weights at the default path.
#[tokio::test]
#[ignore] // Only run with downloaded weights
async fn test_predict_end_to_end() {
    let dir = TempDir::new().unwrap();
    let store = UploadStore::new(dir.path()).await.unwrap();
    let config = ServiceConfig::default();

    let detector = DefectDetector::load(&DetectorConfig {
        model_path: config.model_path.clone(),
        input_size: config.image_size,
        confidence_threshold: config.confidence_threshold,
        iou_threshold: config.iou_threshold,
        gpu_device: config.gpu_device,
    })
    .expect("weights available at the default path");

    let state = AppState {
        config: Arc::new(config),
        detector: Some(Arc::new(detector)),
        store: Arc::new(store),
        annotator: Arc::new(Annotator::without_font()),
    };

    let response = run_predict(&state, "board1.png", &png_bytes(640, 640))
        .await
        .unwrap();

    assert_eq!(response.total_defects, response.detections.len());
    assert!(response.processing_time_ms > 0.0);
    assert!(response.image_url.contains("/uploads/"));
    assert!(response.annotated_image_url.contains("/uploads/annotated_"));

    // Both images were persisted
    let filename = response.image_url.rsplit('/').next().unwrap();
    assert!(state.store.path_for(filename).exists());
    let annotated = response.annotated_image_url.rsplit('/').next().unwrap();
    assert!(state.store.path_for(annotated).exists());
}
