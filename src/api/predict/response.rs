// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Predict response types

use serde::{Deserialize, Serialize};

use crate::vision::{RawDetection, DEFECT_LABEL};

/// Binary pass/fail classification, derived solely from the detection count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// No defects detected
    #[serde(rename = "OK")]
    Ok,
    /// At least one defect detected
    #[serde(rename = "NG")]
    Ng,
}

/// Axis-aligned pixel rectangle of a detected region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One located defect instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub class_name: String,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl Detection {
    /// Convert an engine detection (ordered corner form) into the wire
    /// shape: top-left corner plus non-negative width/height.
    pub fn from_raw(raw: &RawDetection) -> Self {
        let x1 = raw.x1.round().max(0.0);
        let y1 = raw.y1.round().max(0.0);
        let width = (raw.x2.round() - x1).max(0.0);
        let height = (raw.y2.round() - y1).max(0.0);

        Self {
            class_name: DEFECT_LABEL.to_string(),
            confidence: raw.confidence,
            bbox: BoundingBox {
                x: x1 as u32,
                y: y1 as u32,
                width: width as u32,
                height: height as u32,
            },
        }
    }
}

/// Response from a predict call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub verdict: Verdict,
    /// Maximum confidence across detections, 0.0 when none
    pub confidence: f32,
    pub detections: Vec<Detection>,
    pub total_defects: usize,
    /// Retrieval URL of the stored original
    pub image_url: String,
    /// Retrieval URL of the annotated copy
    pub annotated_image_url: String,
    /// Wall-clock handling time in milliseconds
    pub processing_time_ms: f64,
}

impl PredictResponse {
    pub fn new(
        detections: Vec<Detection>,
        image_url: String,
        annotated_image_url: String,
        processing_time_ms: f64,
    ) -> Self {
        let (verdict, confidence) = aggregate(&detections);
        let total_defects = detections.len();

        Self {
            verdict,
            confidence,
            detections,
            total_defects,
            image_url,
            annotated_image_url,
            processing_time_ms,
        }
    }
}

/// Derive the verdict and maximum confidence from a detection list.
///
/// Any detection means fail ("NG"); an empty list passes ("OK") with
/// confidence 0.0.
pub fn aggregate(detections: &[Detection]) -> (Verdict, f32) {
    if detections.is_empty() {
        return (Verdict::Ok, 0.0);
    }
    let confidence = detections
        .iter()
        .map(|d| d.confidence)
        .fold(0.0f32, f32::max);
    (Verdict::Ng, confidence)
}
