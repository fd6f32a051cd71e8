// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for the detection node
//!
//! This module provides:
//! - Image decoding for multipart uploads
//! - The defect detection pipeline (ONNX session, pre/postprocessing,
//!   annotation rendering)

pub mod defect;
pub mod image_utils;

pub use defect::{Annotator, DefectDetector, DetectorConfig, RawDetection, DEFECT_LABEL};
pub use image_utils::{decode_image_bytes, detect_format, format_content_type, ImageError, ImageInfo};
