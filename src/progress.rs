//! # Progress Tracking and Statistics Module
//!
//! ## Responsibilities:
//! - Visual progress bar with `indicatif`, one tick per file
//! - `ConversionOutcome`: what happened to one file
//! - `RunStatistics`: running totals for the whole program run
//!
//! ## Statistics tracked:
//! - **files_processed**: files converted successfully
//! - **files_skipped**: files whose output already existed
//! - **files_failed**: files the encoder could not convert
//! - **total_elapsed**: encoder time summed over converted files
//! - **total_original_bytes** / **total_compressed_bytes**: sizes of converted files only
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:02:15] [========================================>-] 41/42 (97%) scan_0041.tif: 38.2% in 12.4s
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Manages progress reporting for one source directory
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager; hidden bars still count but draw nothing
    pub fn new(total_files: u64, visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new(total_files)
        } else {
            ProgressBar::hidden()
        };

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Set the label shown before any file completes
    pub fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    /// Advance by one file with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Final status of one conversion attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Converted,
    Skipped,
    Failed,
}

/// Result of one conversion attempt, folded into `RunStatistics`
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutcome {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub status: OutcomeStatus,
    pub elapsed: Duration,
    pub original_size: u64,
    /// Only meaningful when `status == Converted`
    pub compressed_size: u64,
    pub error: Option<String>,
}

impl ConversionOutcome {
    pub fn converted(
        source: PathBuf,
        destination: PathBuf,
        elapsed: Duration,
        original_size: u64,
        compressed_size: u64,
    ) -> Self {
        Self {
            source,
            destination,
            status: OutcomeStatus::Converted,
            elapsed,
            original_size,
            compressed_size,
            error: None,
        }
    }

    pub fn skipped(source: PathBuf, destination: PathBuf) -> Self {
        Self {
            source,
            destination,
            status: OutcomeStatus::Skipped,
            elapsed: Duration::ZERO,
            original_size: 0,
            compressed_size: 0,
            error: None,
        }
    }

    pub fn failed(source: PathBuf, destination: PathBuf, elapsed: Duration, error: String) -> Self {
        Self {
            source,
            destination,
            status: OutcomeStatus::Failed,
            elapsed,
            original_size: 0,
            compressed_size: 0,
            error: Some(error),
        }
    }

    /// compressed / original, for converted files with a non-empty source
    pub fn compression_ratio(&self) -> Option<f64> {
        (self.status == OutcomeStatus::Converted && self.original_size > 0)
            .then(|| self.compressed_size as f64 / self.original_size as f64)
    }
}

/// Running totals for one program run (or one directory)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStatistics {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub total_elapsed: Duration,
    pub total_original_bytes: u64,
    pub total_compressed_bytes: u64,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one outcome into the totals
    pub fn accumulate(&mut self, outcome: &ConversionOutcome) {
        match outcome.status {
            OutcomeStatus::Converted => {
                self.files_processed += 1;
                self.total_elapsed += outcome.elapsed;
                self.total_original_bytes += outcome.original_size;
                self.total_compressed_bytes += outcome.compressed_size;
            }
            OutcomeStatus::Skipped => self.files_skipped += 1,
            OutcomeStatus::Failed => self.files_failed += 1,
        }
    }

    /// Add another set of totals, e.g. a finished directory
    pub fn merge(&mut self, other: &RunStatistics) {
        self.files_processed += other.files_processed;
        self.files_skipped += other.files_skipped;
        self.files_failed += other.files_failed;
        self.total_elapsed += other.total_elapsed;
        self.total_original_bytes += other.total_original_bytes;
        self.total_compressed_bytes += other.total_compressed_bytes;
    }

    pub fn total_files(&self) -> usize {
        self.files_processed + self.files_skipped + self.files_failed
    }

    /// Aggregate ratio over converted files, None when nothing was converted
    pub fn compression_ratio(&self) -> Option<f64> {
        (self.total_original_bytes > 0)
            .then(|| self.total_compressed_bytes as f64 / self.total_original_bytes as f64)
    }

    pub fn format_summary(&self) -> String {
        let ratio = self
            .compression_ratio()
            .map(|r| format!("{:.1}%", r * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        format!(
            "Converted: {} | Skipped: {} | Failed: {} | Ratio: {}",
            self.files_processed, self.files_skipped, self.files_failed, ratio
        )
    }
}
