// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the defect detection model

use image::{imageops, DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Letterbox padding color (YOLO convention)
const PAD_COLOR: Rgb<u8> = Rgb([114, 114, 114]);

/// Mapping from letterboxed model-input coordinates back to original pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Uniform scale applied to the original image
    pub scale: f32,
    /// Horizontal padding on the left edge (input-space pixels)
    pub pad_x: f32,
    /// Vertical padding on the top edge (input-space pixels)
    pub pad_y: f32,
}

impl Letterbox {
    /// Map a point in model-input space back to original image pixels.
    pub fn to_original(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

/// Preprocess an image for detection.
///
/// Steps:
/// 1. Resize with aspect ratio preservation to `input_size`
/// 2. Pad to square with gray (114) background, centered
/// 3. Normalize to [0,1]
/// 4. Convert to NCHW tensor format [1, 3, S, S]
///
/// Returns the tensor together with the letterbox transform needed to map
/// detections back into original-image coordinates.
pub fn image_to_tensor(image: &DynamicImage, input_size: u32) -> (Array4<f32>, Letterbox) {
    let (orig_w, orig_h) = image.dimensions();
    let size = input_size as f32;

    let scale = if orig_w == 0 || orig_h == 0 {
        1.0
    } else {
        (size / orig_w as f32).min(size / orig_h as f32)
    };

    let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, input_size);
    let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, input_size);
    let pad_x = (size - new_w as f32) / 2.0;
    let pad_y = (size - new_h as f32) / 2.0;

    let resized = image.resize_exact(new_w, new_h, imageops::FilterType::Triangle);
    let rgb = resized.to_rgb8();

    let mut canvas = RgbImage::from_pixel(input_size, input_size, PAD_COLOR);
    imageops::overlay(&mut canvas, &rgb, pad_x as i64, pad_y as i64);

    let s = input_size as usize;
    let mut tensor = Array4::zeros((1, 3, s, s));
    for y in 0..s {
        for x in 0..s {
            let pixel = canvas.get_pixel(x as u32, y as u32);
            for c in 0..3 {
                tensor[[0, c, y, x]] = pixel[c] as f32 / 255.0;
            }
        }
    }

    let letterbox = Letterbox { scale, pad_x, pad_y };
    (tensor, letterbox)
}
