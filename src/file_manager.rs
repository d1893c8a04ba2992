//! # File Management Module
//!
//! Filesystem helpers for TIFF discovery and size accounting.
//!
//! ## Responsibilities:
//! - Recognizes TIFF inputs by extension (`.tif` / `.tiff`, any case)
//! - Lists the TIFF files directly inside a directory in a stable order
//! - Reads file sizes for the statistics
//! - Formats byte counts for humans
//!
//! TIFF contents are never inspected: the extension is the only criterion,
//! the encoder exit code decides whether the file was actually usable.
//!
//! ## Example:
//! ```rust,ignore
//! for tiff in FileManager::list_tiffs(Path::new("/scans/2019"))? {
//!     let size = FileManager::file_size(&tiff).await?;
//! }
//! ```

use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Size of a file in bytes
    pub async fn file_size(path: &Path) -> std::io::Result<u64> {
        Ok(fs::metadata(path).await?.len())
    }

    /// Size of a regular file, or None when it is missing or not a file
    pub fn existing_file_size(path: &Path) -> Option<u64> {
        std::fs::metadata(path)
            .ok()
            .filter(|metadata| metadata.is_file())
            .map(|metadata| metadata.len())
    }

    /// TIFF files directly inside `dir`, sorted by file name.
    /// Symlinks count when they point at a regular file.
    pub fn list_tiffs(dir: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            if Self::is_tiff(entry.path()) && entry.path().is_file() {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Whether `dir` directly contains at least one TIFF file
    pub fn has_tiffs(dir: &Path) -> bool {
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .any(|e| Self::is_tiff(e.path()) && e.path().is_file())
    }

    /// Check if a file is a TIFF image, by extension only
    pub fn is_tiff(path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            matches!(ext_lower.as_str(), "tif" | "tiff")
        } else {
            false
        }
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}
