// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Defect detection pipeline for X-ray images
//!
//! Components:
//! - `model` - ONNX Runtime session wrapper around the pretrained detector
//! - `preprocessing` - Letterbox resize and tensor conversion
//! - `postprocessing` - Output head parsing, thresholding and NMS
//! - `annotate` - Box and label rendering for the reviewed copy

pub mod annotate;
pub mod model;
pub mod postprocessing;
pub mod preprocessing;

pub use annotate::Annotator;
pub use model::{DefectDetector, DetectorConfig};
pub use postprocessing::RawDetection;
pub use preprocessing::Letterbox;

/// Class label for every detection; the model is trained on a single class.
pub const DEFECT_LABEL: &str = "defect";
