//! # Encoder Invocation Module
//!
//! Wraps a single call to the external lossless encoder (`cwebp`).
//!
//! ## Contract:
//! - One process per file, awaited until it exits (no timeout)
//! - `success` only when the exit status is zero AND the destination exists with a non-zero size
//! - Encoder failures are reported inside `EncoderResult`, never raised
//! - Only a missing or unstartable executable escalates as `ConvertError::EncoderUnavailable`
//! - The encoder writes `<destination>.partial`, which replaces the destination
//!   only after a successful exit; a failed call never touches the destination
//!
//! ## Command line:
//! ```text
//! cwebp -lossless -quiet -m 6 -z 9 -pass 10 <source> -o <destination>.partial
//! ```

use crate::{
    args,
    config::CompressionSettings,
    error::ConvertError,
    file_manager::FileManager,
    tool_resolver::{ToolPathResolver, ENCODER_TOOL},
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

/// Appended to the destination file name while the encoder is writing
pub const PARTIAL_SUFFIX: &str = ".partial";

/// Result of one encoder invocation
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderResult {
    pub success: bool,
    /// Wall-clock time spent in the encoder process
    pub elapsed: Duration,
    /// Size of the produced file (0 on failure)
    pub output_size: u64,
    pub error_message: Option<String>,
}

impl EncoderResult {
    pub fn succeeded(elapsed: Duration, output_size: u64) -> Self {
        Self {
            success: true,
            elapsed,
            output_size,
            error_message: None,
        }
    }

    pub fn failed(elapsed: Duration, message: impl Into<String>) -> Self {
        Self {
            success: false,
            elapsed,
            output_size: 0,
            error_message: Some(message.into()),
        }
    }
}

/// Converts one source image into one destination file
#[allow(async_fn_in_trait)]
pub trait Encoder {
    async fn convert(&self, source: &Path, destination: &Path) -> Result<EncoderResult, ConvertError>;
}

/// Lossless WebP encoder backed by the `cwebp` command line tool
pub struct CwebpEncoder {
    tool: Option<PathBuf>,
    settings: CompressionSettings,
}

impl CwebpEncoder {
    /// A missing `tool` only becomes an error when a conversion is attempted
    pub fn new(tool: Option<PathBuf>, settings: CompressionSettings) -> Self {
        Self { tool, settings }
    }

    /// Flags preceding the input and output paths
    pub fn flag_args(&self) -> Vec<String> {
        args![
            "-lossless",
            "-quiet",
            "-m",
            self.settings.method,
            "-z",
            self.settings.effort,
            "-pass",
            self.settings.passes,
        ]
    }

    /// Sibling the encoder writes to; renamed over the destination only on success
    pub fn partial_path_for(destination: &Path) -> PathBuf {
        let mut name = destination.file_name().unwrap_or_default().to_os_string();
        name.push(PARTIAL_SUFFIX);
        destination.with_file_name(name)
    }

    async fn discard_partial_output(partial: &Path) {
        if let Err(e) = tokio::fs::remove_file(partial).await {
            if e.kind() != ErrorKind::NotFound {
                warn!("Could not remove partial output {}: {}", partial.display(), e);
            }
        }
    }
}

impl Encoder for CwebpEncoder {
    async fn convert(&self, source: &Path, destination: &Path) -> Result<EncoderResult, ConvertError> {
        let tool = self.tool.as_ref().ok_or_else(|| {
            ConvertError::EncoderUnavailable(format!(
                "{} not found (install with: {})",
                ENCODER_TOOL,
                ToolPathResolver::install_instructions(ENCODER_TOOL)
            ))
        })?;

        let flags = self.flag_args();
        let partial = Self::partial_path_for(destination);
        debug!("Command arguments: {:?} {:?} -o {:?}", flags, source, partial);

        let start_time = Instant::now();
        let output = Command::new(tool)
            .args(&flags)
            .arg(source)
            .arg("-o")
            .arg(&partial)
            .stdin(Stdio::null())
            .output()
            .await;
        let elapsed = start_time.elapsed();

        let output = match output {
            Ok(output) => output,
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) => {
                return Err(ConvertError::EncoderUnavailable(format!(
                    "cannot start {}: {}",
                    tool.display(),
                    e
                )));
            }
            Err(e) => {
                Self::discard_partial_output(&partial).await;
                return Ok(EncoderResult::failed(elapsed, format!("failed to run encoder: {}", e)));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("encoder exited with {}", output.status)
            } else {
                stderr
            };
            Self::discard_partial_output(&partial).await;
            return Ok(EncoderResult::failed(elapsed, message));
        }

        let size = match FileManager::file_size(&partial).await {
            Ok(size) if size > 0 => size,
            _ => {
                Self::discard_partial_output(&partial).await;
                return Ok(EncoderResult::failed(elapsed, "missing output file"));
            }
        };

        if let Err(e) = tokio::fs::rename(&partial, destination).await {
            Self::discard_partial_output(&partial).await;
            return Ok(EncoderResult::failed(
                elapsed,
                format!("cannot move output into place: {}", e),
            ));
        }

        debug!("Encoded {} in {:?}", source.display(), elapsed);
        Ok(EncoderResult::succeeded(elapsed, size))
    }
}
