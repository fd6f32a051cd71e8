// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Flat-file upload storage
//!
//! Originals and annotated copies live side by side in one directory.
//! Names are timestamp-prefixed so concurrent requests never collide on
//! output paths. Nothing here is ever mutated or deleted after write.

use anyhow::{Context, Result};
use chrono::Local;
use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix applied to the rendered copy of an upload
pub const ANNOTATED_PREFIX: &str = "annotated_";

/// Store for uploaded and annotated images.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Open the store, creating the upload directory if needed.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .context(format!("Failed to create upload dir {}", root.display()))?;
        Ok(Self { root })
    }

    /// Upload directory root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a stored file by name
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Persist raw upload bytes under a unique timestamp-prefixed name.
    ///
    /// Returns the stored filename (`{timestamp}_{original}`).
    pub async fn save_upload(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        let filename = timestamped_name(original_name);
        let path = self.path_for(&filename);
        tokio::fs::write(&path, bytes)
            .await
            .context(format!("Failed to write upload {}", path.display()))?;
        debug!("Stored upload {} ({} bytes)", filename, bytes.len());
        Ok(filename)
    }

    /// Persist the annotated copy next to its source upload.
    ///
    /// Encoding format follows the source filename's extension, falling
    /// back to PNG for anything unrecognized.
    pub async fn save_annotated(&self, source_filename: &str, image: &RgbImage) -> Result<String> {
        let filename = format!("{}{}", ANNOTATED_PREFIX, source_filename);
        let format = Path::new(source_filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageFormat::from_extension)
            .unwrap_or(ImageFormat::Png);

        let mut encoded = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut encoded), format)
            .context("Failed to encode annotated image")?;

        let path = self.path_for(&filename);
        tokio::fs::write(&path, &encoded)
            .await
            .context(format!("Failed to write annotated copy {}", path.display()))?;
        debug!("Stored annotated copy {}", filename);
        Ok(filename)
    }
}

/// Build a `{timestamp}_{original}` name with microsecond precision.
///
/// Any path components the client sent are stripped down to the bare
/// file name first.
fn timestamped_name(original_name: &str) -> String {
    let base = Path::new(original_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.bin");
    let timestamp = Local::now().format("%Y%m%d_%H%M%S_%6f");
    format!("{}_{}", timestamp, base)
}
