// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP server wiring: shared state, router, listener

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::api::handlers::{health_handler, root_handler};
use crate::api::predict::predict_handler;
use crate::api::uploads::serve_upload_handler;
use crate::config::ServiceConfig;
use crate::storage::UploadStore;
use crate::vision::image_utils::MAX_IMAGE_SIZE;
use crate::vision::{Annotator, DefectDetector};

/// Shared per-request state.
///
/// The detector is loaded once before the listener starts and treated as
/// strictly read-only afterwards; `None` means the service runs degraded
/// and every predict call fails fast.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub detector: Option<Arc<DefectDetector>>,
    pub store: Arc<UploadStore>,
    pub annotator: Arc<Annotator>,
}

/// Build the application router with CORS, tracing and body-size limits.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/predict", post(predict_handler))
        .route("/uploads/:filename", get(serve_upload_handler))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the listener and serve until the process exits.
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.api_port));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(config: &ServiceConfig) -> CorsLayer {
    if config.cors_allowed_origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring unparseable CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
