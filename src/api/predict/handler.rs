// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Predict endpoint handler

use axum::extract::{Multipart, State};
use axum::Json;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::response::{Detection, PredictResponse};
use crate::api::errors::ApiError;
use crate::api::server::AppState;
use crate::vision::decode_image_bytes;

/// POST /predict - Detect defects in an uploaded X-ray image
///
/// Accepts a multipart upload (`file` field) and returns the verdict,
/// detections and retrieval URLs for the stored original and annotated copy.
///
/// # Errors
/// - 500 Internal Server Error: model not loaded at startup, or inference/
///   I/O failure (message included)
/// - 400 Bad Request: missing file field, or bytes that do not decode as an
///   image
pub async fn predict_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let original_name = field.file_name().unwrap_or("upload.bin").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::InvalidRequest(format!("failed to read upload: {}", e)))?;
            upload = Some((original_name, data.to_vec()));
            break;
        }
    }

    let (original_name, data) =
        upload.ok_or_else(|| ApiError::InvalidRequest("file field is required".to_string()))?;

    debug!(
        "Predict request: {} ({} bytes)",
        original_name,
        data.len()
    );

    run_predict(&state, &original_name, &data).await.map(Json)
}

/// The predict pipeline behind the multipart extraction.
///
/// Linear per request: persist the upload, decode it, run the detector,
/// aggregate the verdict, render and persist the annotated copy. No caching,
/// no dedup across requests, no timeout on the inference call.
pub async fn run_predict(
    state: &AppState,
    original_name: &str,
    data: &[u8],
) -> Result<PredictResponse, ApiError> {
    let detector = state.detector.as_ref().ok_or(ApiError::ModelNotLoaded)?;

    let start = Instant::now();

    let filename = state
        .store
        .save_upload(original_name, data)
        .await
        .map_err(|e| ApiError::Internal(format!("{:#}", e)))?;

    let (image, image_info) = decode_image_bytes(data).map_err(|e| {
        warn!("Failed to decode upload {}: {}", filename, e);
        ApiError::InvalidRequest(format!("failed to read image: {}", e))
    })?;

    debug!(
        "Decoded image: {}x{}, {} bytes",
        image_info.width, image_info.height, image_info.size_bytes
    );

    let raw_detections = detector.detect(&image).map_err(|e| {
        warn!("Inference failed for {}: {:#}", filename, e);
        ApiError::Internal(format!("{:#}", e))
    })?;

    let detections: Vec<Detection> = raw_detections.iter().map(Detection::from_raw).collect();

    let annotated = state.annotator.render(&image.to_rgb8(), &raw_detections);
    let annotated_filename = state
        .store
        .save_annotated(&filename, &annotated)
        .await
        .map_err(|e| ApiError::Internal(format!("{:#}", e)))?;

    let processing_time_ms = start.elapsed().as_secs_f64() * 1000.0;

    let base = &state.config.public_base_url;
    let response = PredictResponse::new(
        detections,
        format!("{}/uploads/{}", base, filename),
        format!("{}/uploads/{}", base, annotated_filename),
        processing_time_ms,
    );

    info!(
        "Predict complete: {:?}, {} defects, {:.1}ms",
        response.verdict, response.total_defects, processing_time_ms
    );

    Ok(response)
}
