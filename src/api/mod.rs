// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP API surface
//!
//! Routes:
//! - `GET /` - service metadata
//! - `GET /health` - model availability
//! - `POST /predict` - defect detection on an uploaded image
//! - `GET /uploads/{filename}` - previously saved images

pub mod errors;
pub mod handlers;
pub mod predict;
pub mod server;
pub mod uploads;

pub use errors::{ApiError, ErrorResponse};
pub use handlers::{health_handler, root_handler, HealthResponse};
pub use predict::{predict_handler, run_predict, PredictResponse};
pub use server::{create_router, start_server, AppState};
pub use uploads::serve_upload_handler;
