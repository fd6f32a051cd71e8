// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Pretrained defect detection model
//!
//! Wraps the exported ONNX weights in an ONNX Runtime session. The session
//! is created exactly once at process start and treated as read-only for the
//! rest of the process lifetime; there is no reload path.

use anyhow::{Context, Result};
use image::DynamicImage;
#[cfg(not(feature = "cuda"))]
use ort::execution_providers::CPUExecutionProvider;
#[cfg(feature = "cuda")]
use ort::execution_providers::CUDAExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

use super::postprocessing::{parse_output, RawDetection};
use super::preprocessing::image_to_tensor;

/// Configuration for loading the detector
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Path to the ONNX weights file
    pub model_path: PathBuf,
    /// Square inference resolution
    pub input_size: u32,
    /// Score cutoff applied to raw detections
    pub confidence_threshold: f32,
    /// NMS overlap cutoff
    pub iou_threshold: f32,
    /// CUDA device index (with the `cuda` feature)
    pub gpu_device: u32,
}

/// The process-wide defect detector.
///
/// Concurrent requests share one session; inference calls are serialized
/// through the internal mutex since reentrancy is an external library
/// contract, not a guarantee made here.
pub struct DefectDetector {
    session: Mutex<Session>,
    input_name: String,
    input_size: u32,
    confidence_threshold: f32,
    iou_threshold: f32,
    model_path: PathBuf,
}

impl std::fmt::Debug for DefectDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefectDetector")
            .field("input_name", &self.input_name)
            .field("input_size", &self.input_size)
            .field("confidence_threshold", &self.confidence_threshold)
            .field("model_path", &self.model_path)
            .finish_non_exhaustive()
    }
}

impl DefectDetector {
    /// Load the detector from the configured weights file.
    ///
    /// # Errors
    /// Returns error if:
    /// - Weights file not found
    /// - ONNX Runtime initialization fails
    pub fn load(config: &DetectorConfig) -> Result<Self> {
        let model_path = &config.model_path;
        if !model_path.exists() {
            anyhow::bail!("Model weights not found: {}", model_path.display());
        }

        info!("Loading defect detector from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([Self::execution_provider(config)])
            .context("Failed to set execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        debug!("Detector loaded - input: {}", input_name);

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            input_size: config.input_size,
            confidence_threshold: config.confidence_threshold.clamp(0.0, 1.0),
            iou_threshold: config.iou_threshold.clamp(0.0, 1.0),
            model_path: model_path.clone(),
        })
    }

    #[cfg(not(feature = "cuda"))]
    fn execution_provider(_config: &DetectorConfig) -> ort::execution_providers::ExecutionProviderDispatch {
        CPUExecutionProvider::default().build()
    }

    #[cfg(feature = "cuda")]
    fn execution_provider(config: &DetectorConfig) -> ort::execution_providers::ExecutionProviderDispatch {
        CUDAExecutionProvider::default()
            .with_device_id(config.gpu_device as i32)
            .build()
    }

    /// Path the weights were loaded from
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Score cutoff applied during postprocessing
    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    /// Run detection on a decoded image.
    ///
    /// Returns boxes in original-image pixel coordinates, thresholded and
    /// deduplicated. No results are cached; every call reruns inference.
    pub fn detect(&self, image: &DynamicImage) -> Result<Vec<RawDetection>> {
        let (tensor, letterbox) = image_to_tensor(image, self.input_size);

        let input_value =
            Value::from_array(tensor).context("Failed to create input tensor")?;

        let mut session = self.session.lock().unwrap();
        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Detection inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let detections = parse_output(
            &output_tensor.view(),
            &letterbox,
            image.width(),
            image.height(),
            self.confidence_threshold,
            self.iou_threshold,
        )?;

        debug!("Detected {} defect regions", detections.len());

        Ok(detections)
    }
}
