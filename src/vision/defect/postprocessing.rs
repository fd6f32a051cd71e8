// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detector output parsing
//!
//! The exported model produces a single `[1, 4 + classes, anchors]` head:
//! per anchor a center/size box plus one score per class. Parsing thresholds
//! the scores, converts boxes to corner form in original-image pixels and
//! suppresses overlapping duplicates.

use anyhow::Result;
use ndarray::{ArrayViewD, IxDyn};

use super::preprocessing::Letterbox;

/// One detected region in original-image pixel coordinates.
///
/// Corners are ordered by construction (`x1 <= x2`, `y1 <= y2`): they are
/// derived from a center/size box and clamped to the image bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    /// Detection confidence score (0.0-1.0)
    pub confidence: f32,
}

impl RawDetection {
    pub fn area(&self) -> f32 {
        (self.x2 - self.x1) * (self.y2 - self.y1)
    }

    /// Intersection-over-union with another box
    pub fn iou(&self, other: &RawDetection) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }
}

/// Parse the raw output tensor into detections.
///
/// `output` is the `[1, 4 + classes, anchors]` head in model-input space;
/// boxes below `confidence_threshold` are dropped, survivors are mapped
/// through `letterbox` into original-image pixels, clamped, and deduplicated
/// with NMS at `iou_threshold`.
pub fn parse_output(
    output: &ArrayViewD<'_, f32>,
    letterbox: &Letterbox,
    original_width: u32,
    original_height: u32,
    confidence_threshold: f32,
    iou_threshold: f32,
) -> Result<Vec<RawDetection>> {
    let shape = output.shape();
    if shape.len() != 3 || shape[0] != 1 || shape[1] < 5 {
        anyhow::bail!(
            "Unexpected detector output shape: {:?}, expected [1, 4 + classes, anchors]",
            shape
        );
    }

    let num_attrs = shape[1];
    let num_anchors = shape[2];
    let max_w = original_width as f32;
    let max_h = original_height as f32;

    let mut detections = Vec::new();

    for anchor in 0..num_anchors {
        let mut confidence = 0.0f32;
        for class in 4..num_attrs {
            confidence = confidence.max(output[IxDyn(&[0, class, anchor])]);
        }
        if confidence < confidence_threshold {
            continue;
        }

        let cx = output[IxDyn(&[0, 0, anchor])];
        let cy = output[IxDyn(&[0, 1, anchor])];
        let w = output[IxDyn(&[0, 2, anchor])];
        let h = output[IxDyn(&[0, 3, anchor])];
        if w <= 0.0 || h <= 0.0 {
            continue;
        }

        let (x1, y1) = letterbox.to_original(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.to_original(cx + w / 2.0, cy + h / 2.0);

        let x1 = x1.clamp(0.0, max_w);
        let y1 = y1.clamp(0.0, max_h);
        let x2 = x2.clamp(0.0, max_w);
        let y2 = y2.clamp(0.0, max_h);
        if x1 >= x2 || y1 >= y2 {
            continue;
        }

        detections.push(RawDetection {
            x1,
            y1,
            x2,
            y2,
            confidence,
        });
    }

    Ok(non_max_suppression(detections, iou_threshold))
}

/// Greedy NMS: keep the highest-confidence box of every overlapping cluster.
fn non_max_suppression(mut detections: Vec<RawDetection>, iou_threshold: f32) -> Vec<RawDetection> {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<RawDetection> = Vec::new();
    for candidate in detections {
        if kept.iter().all(|k| k.iou(&candidate) <= iou_threshold) {
            kept.push(candidate);
        }
    }
    kept
}
