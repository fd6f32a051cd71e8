// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Static file handler for previously saved images

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::api::errors::ApiError;
use crate::api::server::AppState;
use crate::vision::{detect_format, format_content_type};

/// GET /uploads/{filename} - Serve a previously saved image
///
/// Returns the exact bytes written by a prior predict call, or 404 if the
/// name was never written.
pub async fn serve_upload_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let path = state.store.path_for(&filename);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound("Image not found".to_string()));
        }
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            return Err(ApiError::Internal(format!("failed to read file: {}", e)));
        }
    };

    let content_type = detect_format(&bytes)
        .map(format_content_type)
        .unwrap_or("application/octet-stream");

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}
