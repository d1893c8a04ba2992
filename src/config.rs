//! # Configuration Management Module
//!
//! Holds every setting that shapes a conversion run.
//!
//! ## Responsibilities:
//! - Defines the `Config` struct with all run parameters
//! - Validates encoder settings before anything touches the disk
//! - Loads/saves configuration from/to JSON files
//! - Provides defaults matching the maximum lossless compression of `cwebp`
//!
//! ## Parameters:
//! - `output_root`: root for outputs (default: None = sibling `<dir>_webp`)
//! - `force`: reconvert files whose output already exists (default: false)
//! - `encoder_path`: explicit `cwebp` executable (default: None = resolve from PATH)
//! - `compression`: `cwebp` method (0-6), effort (0-9) and passes (1-10)
//! - `log_file`: log file appended on every run (default: `tif2webp.log`)
//! - `json_output`: emit JSON lines on stdout instead of a progress bar
//!
//! ## Example:
//! ```rust,ignore
//! let config = Config {
//!     output_root: Some(PathBuf::from("/archive/webp")),
//!     force: true,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default log file name, created in the working directory
pub const DEFAULT_LOG_FILE: &str = "tif2webp.log";

/// Encoder effort settings passed to `cwebp`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionSettings {
    /// Compression method (0-6, higher = slower and smaller)
    pub method: u8,
    /// Lossless effort preset (0-9)
    pub effort: u8,
    /// Number of entropy-analysis passes (1-10)
    pub passes: u8,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            method: 6,
            effort: 9,
            passes: 10,
        }
    }
}

/// Configuration for a conversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory for outputs (None = sibling `<dir>_webp`)
    pub output_root: Option<PathBuf>,
    /// Reconvert even when the destination already exists
    pub force: bool,
    /// Explicit path to the `cwebp` executable
    pub encoder_path: Option<PathBuf>,
    /// Encoder settings
    pub compression: CompressionSettings,
    /// Log file appended on every run
    pub log_file: PathBuf,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_root: None,
            force: false,
            encoder_path: None,
            compression: CompressionSettings::default(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.compression.method > 6 {
            return Err(anyhow::anyhow!("Compression method must be between 0 and 6"));
        }

        if self.compression.effort > 9 {
            return Err(anyhow::anyhow!("Compression effort must be between 0 and 9"));
        }

        if self.compression.passes == 0 || self.compression.passes > 10 {
            return Err(anyhow::anyhow!("Number of passes must be between 1 and 10"));
        }

        if let Some(ref output_root) = self.output_root {
            if output_root.exists() && !output_root.is_dir() {
                return Err(anyhow::anyhow!(
                    "Output path is not a directory: {}",
                    output_root.display()
                ));
            }
        }

        if let Some(ref encoder) = self.encoder_path {
            if !encoder.is_file() {
                return Err(anyhow::anyhow!(
                    "Encoder executable does not exist: {}",
                    encoder.display()
                ));
            }
        }

        if self.log_file.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("Log file path must not be empty"));
        }

        Ok(())
    }

    /// Default location of the configuration file, if the platform has one
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tif2webp").join("config.json"))
    }

    /// Load configuration from file, falling back to defaults when it is absent
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
