// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use std::env;
use std::sync::Arc;
use xray_defect_node::{
    api::{start_server, AppState},
    config::ServiceConfig,
    storage::UploadStore,
    version,
    vision::{Annotator, DefectDetector, DetectorConfig},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting {}...", version::get_version_string());

    let config = ServiceConfig::from_env();
    tracing::debug!("Configuration: {:?}", config);

    let store = UploadStore::new(&config.upload_dir).await?;

    // Model load happens exactly once, before the listener starts; the
    // service keeps running degraded when it fails.
    tracing::info!("🔄 Loading {} model...", version::MODEL_FAMILY);
    let detector_config = DetectorConfig {
        model_path: config.model_path.clone(),
        input_size: config.image_size,
        confidence_threshold: config.confidence_threshold,
        iou_threshold: config.iou_threshold,
        gpu_device: config.gpu_device,
    };
    let detector = match DefectDetector::load(&detector_config) {
        Ok(detector) => {
            tracing::info!("✅ Model loaded from {}", config.model_path.display());
            Some(Arc::new(detector))
        }
        Err(e) => {
            tracing::warn!(
                "⚠️ Failed to load model from {}: {:#} - predict calls will fail",
                config.model_path.display(),
                e
            );
            None
        }
    };

    let annotator = Annotator::new(&config.label_font_path);

    let state = AppState {
        config: Arc::new(config),
        detector,
        store: Arc::new(store),
        annotator: Arc::new(annotator),
    };

    start_server(state).await
}
