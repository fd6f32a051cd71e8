// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration, read once from the environment at startup.

use std::env;
use std::path::PathBuf;

/// Configuration for the detection node.
///
/// Every field is fixed at process start; nothing is renegotiated at
/// runtime. Values come from environment variables with the defaults below.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Path to the exported ONNX weights file
    pub model_path: PathBuf,
    /// Square inference resolution (pixels)
    pub image_size: u32,
    /// CUDA device index, used when built with the `cuda` feature
    pub gpu_device: u32,
    /// Flat directory holding uploaded and annotated images
    pub upload_dir: PathBuf,
    /// HTTP listening port (bound on 0.0.0.0)
    pub api_port: u16,
    /// Prefix for image retrieval URLs returned to clients
    pub public_base_url: String,
    /// Allowed cross-origin caller URLs
    pub cors_allowed_origins: Vec<String>,
    /// Detector score cutoff
    pub confidence_threshold: f32,
    /// NMS overlap cutoff
    pub iou_threshold: f32,
    /// TTF font used for annotation labels (optional at runtime)
    pub label_font_path: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./models/defect/best.onnx"),
            image_size: 640,
            gpu_device: 0,
            upload_dir: PathBuf::from("./uploads"),
            api_port: 5001,
            public_base_url: "http://localhost:5001".to_string(),
            cors_allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:5174".to_string(),
            ],
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            label_font_path: PathBuf::from("./assets/DejaVuSans.ttf"),
        }
    }
}

impl ServiceConfig {
    /// Build the configuration from environment variables, falling back to
    /// the defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_allowed_origins);

        Self {
            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            image_size: parse_env("IMAGE_SIZE", defaults.image_size),
            gpu_device: parse_env("GPU_DEVICE", defaults.gpu_device),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            api_port: parse_env("API_PORT", defaults.api_port),
            public_base_url: env::var("PUBLIC_BASE_URL").unwrap_or(defaults.public_base_url),
            cors_allowed_origins,
            confidence_threshold: parse_env("CONFIDENCE_THRESHOLD", defaults.confidence_threshold),
            iou_threshold: parse_env("IOU_THRESHOLD", defaults.iou_threshold),
            label_font_path: env::var("LABEL_FONT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.label_font_path),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
