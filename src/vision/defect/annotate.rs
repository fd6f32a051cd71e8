// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection rendering for human review
//!
//! Produces the "annotated" copy of an uploaded image: a red rectangle per
//! detection with a `defect: 0.82` style label above it.

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::Path;
use tracing::warn;

use super::postprocessing::RawDetection;
use super::DEFECT_LABEL;

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const LABEL_FONT_SIZE: f32 = 16.0;
const LABEL_HEIGHT: i32 = 20;
const LABEL_CHAR_WIDTH: f32 = 8.0; // rough per-character estimate

/// Draws detection boxes and labels onto image copies.
///
/// The label font is loaded once at startup. A missing font file degrades
/// rendering (boxes and label bars without text) but never fails a request.
pub struct Annotator {
    font: Option<FontVec>,
}

impl Annotator {
    /// Load the annotator, reading the label font from `font_path`.
    pub fn new(font_path: &Path) -> Self {
        let font = match std::fs::read(font_path) {
            Ok(bytes) => match FontVec::try_from_vec(bytes) {
                Ok(font) => Some(font),
                Err(e) => {
                    warn!(
                        "⚠️ Invalid label font {}: {} - labels will be drawn without text",
                        font_path.display(),
                        e
                    );
                    None
                }
            },
            Err(e) => {
                warn!(
                    "⚠️ Label font {} unavailable: {} - labels will be drawn without text",
                    font_path.display(),
                    e
                );
                None
            }
        };

        Self { font }
    }

    /// Annotator with no label font, for rendering boxes only.
    pub fn without_font() -> Self {
        Self { font: None }
    }

    /// Render a copy of `image` with every detection drawn on it.
    pub fn render(&self, image: &RgbImage, detections: &[RawDetection]) -> RgbImage {
        let mut annotated = image.clone();
        for detection in detections {
            self.draw_detection(&mut annotated, detection);
        }
        annotated
    }

    fn draw_detection(&self, image: &mut RgbImage, detection: &RawDetection) {
        let (img_w, img_h) = (image.width() as i32, image.height() as i32);

        let x1 = (detection.x1.floor() as i32).clamp(0, img_w - 1);
        let y1 = (detection.y1.floor() as i32).clamp(0, img_h - 1);
        let x2 = (detection.x2.ceil() as i32).clamp(0, img_w - 1);
        let y2 = (detection.y2.ceil() as i32).clamp(0, img_h - 1);
        if x1 >= x2 || y1 >= y2 {
            return;
        }

        // 2px border: outer rectangle plus a one-pixel inset. Corners are
        // inclusive, so the drawn rect spans x1..=x2 and y1..=y2.
        let width = (x2 - x1 + 1) as u32;
        let height = (y2 - y1 + 1) as u32;
        draw_hollow_rect_mut(image, Rect::at(x1, y1).of_size(width, height), BOX_COLOR);
        if width > 2 && height > 2 {
            draw_hollow_rect_mut(
                image,
                Rect::at(x1 + 1, y1 + 1).of_size(width - 2, height - 2),
                BOX_COLOR,
            );
        }

        let label = format!("{}: {:.2}", DEFECT_LABEL, detection.confidence);

        // Filled label bar above the box, clipped to the image
        let label_y = (y1 - LABEL_HEIGHT).max(0);
        let label_w = ((label.len() as f32 * LABEL_CHAR_WIDTH) as i32).min(img_w - x1);
        if label_w <= 0 {
            return;
        }
        draw_filled_rect_mut(
            image,
            Rect::at(x1, label_y).of_size(label_w as u32, LABEL_HEIGHT as u32),
            BOX_COLOR,
        );

        if let Some(font) = &self.font {
            draw_text_mut(
                image,
                TEXT_COLOR,
                x1 + 2,
                label_y + 2,
                PxScale::from(LABEL_FONT_SIZE),
                font,
                &label,
            );
        }
    }
}
