//! # Error Types Module
//!
//! Defines the error taxonomy of the conversion pipeline.
//!
//! ## Categories:
//! - `InvalidInput`: the input argument is neither a directory nor a `.txt` list (fatal, pre-run)
//! - `EncoderUnavailable`: the encoder executable cannot be located or started (fatal, aborts the run)
//! - `OutputDir`: the destination directory cannot be created (skips that directory only)
//! - `Encode`: the encoder ran but produced no usable output (per file, never escalated)
//! - `Io`: I/O errors while reading source directories or list files
//!
//! ## Example:
//! ```rust,ignore
//! if tool.is_none() {
//!     return Err(ConvertError::EncoderUnavailable("cwebp not found in PATH".to_string()));
//! }
//! ```

use std::path::PathBuf;

/// Errors raised by the conversion pipeline
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Encoder unavailable: {0}")]
    EncoderUnavailable(String),

    #[error("Cannot create output directory {path}: {reason}")]
    OutputDir { path: PathBuf, reason: String },

    #[error("Encoding failed for {path}: {reason}")]
    Encode { path: PathBuf, reason: String },
}

impl ConvertError {
    /// Whether this error must stop the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::EncoderUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(ConvertError::InvalidInput("x".into()).is_fatal());
        assert!(ConvertError::EncoderUnavailable("cwebp".into()).is_fatal());
        assert!(!ConvertError::OutputDir {
            path: PathBuf::from("/tmp/a_webp"),
            reason: "denied".into(),
        }
        .is_fatal());
        assert!(!ConvertError::Encode {
            path: PathBuf::from("a.tif"),
            reason: "exit 1".into(),
        }
        .is_fatal());
    }

    #[test]
    fn test_error_messages() {
        let err = ConvertError::OutputDir {
            path: PathBuf::from("/data/scans_webp"),
            reason: "Permission denied".into(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot create output directory /data/scans_webp: Permission denied"
        );
    }
}
