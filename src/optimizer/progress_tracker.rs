//! # Progress Tracking Module
//!
//! Single place that reports live progress, either as an `indicatif` bar
//! (one per directory) or as JSON lines when `--json` is set.

use super::work_selector::Selection;
use crate::{
    json_output::JsonMessage,
    progress::{ConversionOutcome, OutcomeStatus, ProgressManager, RunStatistics},
};
use std::path::Path;

/// Live progress reporting for the conversion runner
pub struct ProgressTracker {
    json_output: bool,
    current: Option<ProgressManager>,
}

impl ProgressTracker {
    pub fn new(json_output: bool) -> Self {
        Self {
            json_output,
            current: None,
        }
    }

    /// A new source directory begins; the bar counts every file that is not skipped
    pub fn start_directory(&mut self, source: &Path, output_dir: &Path, selection: &Selection) {
        let to_convert = selection.to_convert().count();
        let to_skip = selection.to_skip().count();
        let conflicting = selection.conflicting().count();

        if self.json_output {
            JsonMessage::Directory {
                source: source.to_path_buf(),
                output_dir: output_dir.to_path_buf(),
                total_files: selection.files.len(),
                to_convert,
                to_skip,
                conflicting,
            }
            .emit();
        }

        let bar = ProgressManager::new((to_convert + conflicting) as u64, !self.json_output);
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        bar.set_message(&format!("Converting {}", name));
        self.current = Some(bar);
    }

    /// Report one finished file
    pub fn file_completed(&self, outcome: &ConversionOutcome) {
        if self.json_output {
            JsonMessage::file_complete(outcome).emit();
        }

        if outcome.status == OutcomeStatus::Skipped {
            return;
        }

        if let Some(ref bar) = self.current {
            let name = outcome
                .source
                .file_name()
                .unwrap_or_default()
                .to_string_lossy();
            let message = match (outcome.status, outcome.compression_ratio()) {
                (OutcomeStatus::Converted, Some(ratio)) => format!(
                    "{}: {:.1}% in {:.1}s",
                    name,
                    ratio * 100.0,
                    outcome.elapsed.as_secs_f64()
                ),
                (OutcomeStatus::Converted, None) => format!("{}: done", name),
                _ => format!("{}: failed", name),
            };
            bar.update(&message);
        }
    }

    /// Close the current directory's bar
    pub fn finish_directory(&mut self, stats: &RunStatistics) {
        if let Some(bar) = self.current.take() {
            bar.finish(&stats.format_summary());
        }
    }
}
