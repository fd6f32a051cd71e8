// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Predict endpoint: multipart upload in, verdict and detections out

pub mod handler;
pub mod response;

pub use handler::{predict_handler, run_predict};
pub use response::{aggregate, BoundingBox, Detection, PredictResponse, Verdict};
