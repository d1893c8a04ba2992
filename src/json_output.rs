//! # JSON Output Module
//!
//! Structured JSON-lines output for scripts and wrappers (`--json`).
//!
//! ## Message types:
//! - `start`: run begins, with the resolved directories
//! - `directory`: one source directory is about to be processed
//! - `file_complete`: one file converted, skipped or failed
//! - `complete`: run finished, with the final report
//! - `error`: fatal error, no report follows

use crate::{
    progress::{ConversionOutcome, OutcomeStatus},
    report::RunReport,
};
use serde::Serialize;
use std::path::PathBuf;

/// JSON message type
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    /// Run start
    Start {
        directories: Vec<PathBuf>,
        output_root: Option<PathBuf>,
        force: bool,
    },

    /// One source directory is about to be processed
    Directory {
        source: PathBuf,
        output_dir: PathBuf,
        total_files: usize,
        to_convert: usize,
        to_skip: usize,
        conflicting: usize,
    },

    /// One file finished
    FileComplete {
        source: PathBuf,
        destination: PathBuf,
        status: OutcomeStatus,
        original_size: u64,
        compressed_size: u64,
        ratio: Option<f64>,
        elapsed_seconds: f64,
        error: Option<String>,
    },

    /// Run finished
    Complete {
        #[serde(flatten)]
        report: RunReport,
    },

    /// Fatal error
    Error {
        message: String,
    },
}

impl JsonMessage {
    /// Emit the JSON message on stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn file_complete(outcome: &ConversionOutcome) -> Self {
        Self::FileComplete {
            source: outcome.source.clone(),
            destination: outcome.destination.clone(),
            status: outcome.status,
            original_size: outcome.original_size,
            compressed_size: outcome.compressed_size,
            ratio: outcome.compression_ratio(),
            elapsed_seconds: outcome.elapsed.as_secs_f64(),
            error: outcome.error.clone(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
