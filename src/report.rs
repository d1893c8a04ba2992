//! # Final Report Module
//!
//! Turns the run totals into the end-of-run summary. Reading only: the
//! statistics are never modified here.

use crate::{
    file_manager::FileManager,
    progress::RunStatistics,
    utils::{format_average, format_duration},
};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

const RULE_WIDTH: usize = 60;

/// Figures derived from `RunStatistics` at the end of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub files_attempted: usize,
    pub files_converted: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub total_original_bytes: u64,
    pub total_compressed_bytes: u64,
    /// compressed / original over converted files, None when nothing was converted
    pub average_ratio: Option<f64>,
    /// Negative when the WebP output ended up larger than the TIFF input
    pub space_saved_bytes: i64,
    pub space_saved_percent: Option<f64>,
    pub conversion_time: Duration,
    pub average_time_per_file: Option<Duration>,
    pub wall_clock: Duration,
}

impl RunReport {
    /// Compute the summary for `stats`
    pub fn finalize(stats: &RunStatistics, wall_clock: Duration) -> Self {
        let space_saved_bytes = stats.total_original_bytes as i64 - stats.total_compressed_bytes as i64;
        let space_saved_percent = (stats.total_original_bytes > 0)
            .then(|| space_saved_bytes as f64 * 100.0 / stats.total_original_bytes as f64);
        let average_time_per_file = (stats.files_processed > 0)
            .then(|| stats.total_elapsed / stats.files_processed as u32);

        Self {
            files_attempted: stats.total_files(),
            files_converted: stats.files_processed,
            files_skipped: stats.files_skipped,
            files_failed: stats.files_failed,
            total_original_bytes: stats.total_original_bytes,
            total_compressed_bytes: stats.total_compressed_bytes,
            average_ratio: stats.compression_ratio(),
            space_saved_bytes,
            space_saved_percent,
            conversion_time: stats.total_elapsed,
            average_time_per_file,
            wall_clock,
        }
    }

    /// Report as individual lines, for line-oriented loggers
    pub fn lines(&self) -> Vec<String> {
        let ratio = self
            .average_ratio
            .map(|r| format!("{:.2}%", r * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        let saved_percent = self
            .space_saved_percent
            .map(|p| format!("{:.1}%", p))
            .unwrap_or_else(|| "n/a".to_string());
        let average_time = self
            .average_time_per_file
            .map(format_average)
            .unwrap_or_else(|| "n/a".to_string());
        let saved_human = if self.space_saved_bytes < 0 {
            format!("-{}", FileManager::format_size(self.space_saved_bytes.unsigned_abs()))
        } else {
            FileManager::format_size(self.space_saved_bytes as u64)
        };

        vec![
            "=".repeat(RULE_WIDTH),
            "CONVERSION SUMMARY".to_string(),
            format!("Files attempted: {}", self.files_attempted),
            format!("  Converted: {}", self.files_converted),
            format!("  Skipped (already converted): {}", self.files_skipped),
            format!("  Failed: {}", self.files_failed),
            format!("Total run time: {}", format_duration(self.wall_clock)),
            format!("Conversion time: {}", format_duration(self.conversion_time)),
            format!("Average time per file: {}", average_time),
            format!("Total TIFF size: {}", FileManager::format_size(self.total_original_bytes)),
            format!("Total WebP size: {}", FileManager::format_size(self.total_compressed_bytes)),
            format!("Average compression ratio: {}", ratio),
            format!(
                "Space saved: {} bytes ({}, {})",
                self.space_saved_bytes, saved_human, saved_percent
            ),
            "=".repeat(RULE_WIDTH),
        ]
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}
