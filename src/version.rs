// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the X-Ray Defect Detection Node

/// Service name reported by the root endpoint
pub const SERVICE_NAME: &str = "X-Ray Defect Detection API";

/// Semantic version number
pub const VERSION: &str = "1.0.0";

/// Detector family served by this node
pub const MODEL_FAMILY: &str = "YOLOv11";

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("{} v{}", SERVICE_NAME, VERSION)
}
