// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Tests for GET /uploads/{filename}
//!
//! The handler must return the exact bytes a prior predict call wrote, and
//! 404 for names that were never written.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;
use xray_defect_node::{
    api::{serve_upload_handler, ApiError, AppState},
    config::ServiceConfig,
    storage::UploadStore,
    vision::Annotator,
};

async fn setup_state() -> (TempDir, AppState) {
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

fn png_bytes() -> Vec<u8> {
    let img = RgbImage::from_pixel(5, 5, Rgb([1, 2, 3]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

#[tokio::test]
async fn test_unwritten_name_is_not_found() {
    let (_dir, state) = setup_state().await;

    let result = serve_upload_handler(State(state), Path("never_written.png".to_string())).await;

    let err = result.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_written_file_round_trips_exact_bytes() {
    let (_dir, state) = setup_state().await;
    let bytes = png_bytes();
    let filename = state.store.save_upload("scan.png", &bytes).await.unwrap();

    let response = serve_upload_handler(State(state), Path(filename))
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("image/png")
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(body.as_ref(), bytes.as_slice());
}

#[tokio::test]
async fn test_unknown_content_falls_back_to_octet_stream() {
    let (_dir, state) = setup_state().await;
    let filename = state
        .store
        .save_upload("notes.txt", b"plain text, not an image")
        .await
        .unwrap();

    let response = serve_upload_handler(State(state), Path(filename))
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("application/octet-stream")
    );
}
