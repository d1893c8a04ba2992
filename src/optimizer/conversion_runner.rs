//! # Conversion Runner
//!
//! Drives the whole conversion, one directory at a time and one file at a
//! time. Per directory:
//!
//! ```text
//! Discover (list TIFFs) -> Select (skip existing outputs) -> Convert each -> next directory
//! ```
//!
//! Files are reported in file name order whatever their outcome.
//!
//! Files are never converted concurrently: every encoder process is awaited
//! before the next one starts, which keeps a spinning disk from seeking
//! between several large reads and writes.
//!
//! ## Failure scopes:
//! - encoder failure on one file: counted as failed, run continues
//! - two sources sharing one output name: the later one is counted as failed
//! - output directory cannot be created: that directory is skipped
//! - encoder executable missing: the run aborts and the statistics are dropped

use crate::{
    config::Config,
    discovery::SourceDirectory,
    encoder::Encoder,
    error::ConvertError,
    file_manager::FileManager,
    optimizer::{
        path_resolver::{ConversionTarget, PathResolver},
        progress_tracker::ProgressTracker,
        work_selector::{Action, SelectedTarget, WorkSelector},
    },
    progress::{ConversionOutcome, RunStatistics},
    utils::format_duration,
};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Sequential conversion orchestrator
pub struct ConversionRunner<E: Encoder> {
    config: Config,
    encoder: E,
    progress: ProgressTracker,
}

impl<E: Encoder> ConversionRunner<E> {
    pub fn new(config: Config, encoder: E) -> Self {
        let progress = ProgressTracker::new(config.json_output);
        Self {
            config,
            encoder,
            progress,
        }
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Convert every directory in order and return the run totals
    pub async fn run(&mut self, directories: &[SourceDirectory]) -> Result<RunStatistics, ConvertError> {
        let mut stats = RunStatistics::new();

        if let Some(ref root) = self.config.output_root {
            info!("Output root: {}", root.display());
        }
        if self.config.force {
            info!("Force mode: existing outputs will be converted again");
        }

        for directory in directories {
            match self.process_directory(directory).await {
                Ok(dir_stats) => stats.merge(&dir_stats),
                Err(e) if e.is_fatal() => {
                    error!("Aborting run: {}", e);
                    return Err(e);
                }
                Err(e) => error!("Skipping directory {}: {}", directory, e),
            }
        }

        Ok(stats)
    }

    async fn process_directory(&mut self, directory: &SourceDirectory) -> Result<RunStatistics, ConvertError> {
        info!("Processing directory: {}", directory);

        let tiffs = FileManager::list_tiffs(directory.path()).map_err(|e| ConvertError::Io(e.into()))?;
        if tiffs.is_empty() {
            info!("No TIFF files found in {}", directory);
            return Ok(RunStatistics::new());
        }

        let output_dir = PathResolver::output_dir_for(directory.path(), self.config.output_root.as_deref())?;
        PathResolver::ensure_output_dir(&output_dir).await?;

        let targets = PathResolver::plan_targets(&output_dir, tiffs);
        let selection = WorkSelector::select(targets, self.config.force);
        info!(
            "{} TIFF files in {}: {} to convert, {} already converted -> {}",
            selection.files.len(),
            directory,
            selection.to_convert().count(),
            selection.to_skip().count(),
            output_dir.display()
        );

        self.progress.start_directory(directory.path(), &output_dir, &selection);

        let mut dir_stats = RunStatistics::new();

        for SelectedTarget { target, action } in selection.files {
            let outcome = match action {
                Action::Skip => {
                    debug!("Skipping {}: output exists", target.source.display());
                    ConversionOutcome::skipped(target.source, target.destination)
                }
                Action::Conflict { first } => {
                    warn!(
                        "{} and {} both map to {}, keeping the first",
                        first.display(),
                        target.source.display(),
                        target.destination.display()
                    );
                    ConversionOutcome::failed(
                        target.source,
                        target.destination,
                        Duration::ZERO,
                        format!("output name already used by {}", first.display()),
                    )
                }
                Action::Convert => match self.convert_one(target).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        self.progress.finish_directory(&dir_stats);
                        return Err(e);
                    }
                },
            };
            self.progress.file_completed(&outcome);
            dir_stats.accumulate(&outcome);
        }

        self.progress.finish_directory(&dir_stats);
        info!(
            "Finished {}: {} | Conversion time: {}",
            directory,
            dir_stats.format_summary(),
            format_duration(dir_stats.total_elapsed)
        );

        Ok(dir_stats)
    }

    /// Convert one file; only an unusable encoder is returned as an error
    async fn convert_one(&self, target: ConversionTarget) -> Result<ConversionOutcome, ConvertError> {
        let original_size = match FileManager::file_size(&target.source).await {
            Ok(size) => size,
            Err(e) => {
                warn!("Cannot read {}: {}", target.source.display(), e);
                return Ok(ConversionOutcome::failed(
                    target.source,
                    target.destination,
                    Duration::ZERO,
                    format!("cannot read source file: {}", e),
                ));
            }
        };

        let result = self.encoder.convert(&target.source, &target.destination).await?;

        if result.success {
            let outcome = ConversionOutcome::converted(
                target.source,
                target.destination,
                result.elapsed,
                original_size,
                result.output_size,
            );
            let ratio = outcome
                .compression_ratio()
                .map(|r| format!("{:.1}%", r * 100.0))
                .unwrap_or_else(|| "n/a".to_string());
            info!(
                "Converted {}: {} -> {} (ratio {}) in {:.3}s",
                outcome.source.display(),
                FileManager::format_size(original_size),
                FileManager::format_size(result.output_size),
                ratio,
                result.elapsed.as_secs_f64()
            );
            Ok(outcome)
        } else {
            let reason = result
                .error_message
                .unwrap_or_else(|| "unknown encoder error".to_string());
            error!(
                "{}",
                ConvertError::Encode {
                    path: target.source.clone(),
                    reason: reason.clone(),
                }
            );
            Ok(ConversionOutcome::failed(
                target.source,
                target.destination,
                result.elapsed,
                reason,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::EncoderResult;
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Writes half the source size as output; fails for listed stems
    #[derive(Default)]
    struct FakeEncoder {
        fail_stems: Vec<&'static str>,
        unavailable_after: Option<usize>,
        calls: RefCell<Vec<PathBuf>>,
    }

    impl Encoder for FakeEncoder {
        async fn convert(&self, source: &Path, destination: &Path) -> Result<EncoderResult, ConvertError> {
            self.calls.borrow_mut().push(source.to_path_buf());
            let count = self.calls.borrow().len();
            if let Some(limit) = self.unavailable_after {
                if count > limit {
                    return Err(ConvertError::EncoderUnavailable("cwebp vanished".into()));
                }
            }

            let stem = source.file_stem().unwrap().to_string_lossy().into_owned();
            if self.fail_stems.contains(&stem.as_str()) {
                return Ok(EncoderResult::failed(Duration::from_millis(3), "Decoding of input failed"));
            }

            let size = (std::fs::metadata(source)?.len() / 2).max(1);
            std::fs::write(destination, vec![7u8; size as usize])?;
            Ok(EncoderResult::succeeded(Duration::from_millis(10), size))
        }
    }

    fn make_source(root: &Path, name: &str, files: &[(&str, usize)]) -> SourceDirectory {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        for (file, size) in files {
            std::fs::write(dir.join(file), vec![0u8; *size]).unwrap();
        }
        SourceDirectory::new(dir)
    }

    fn runner(encoder: FakeEncoder) -> ConversionRunner<FakeEncoder> {
        ConversionRunner::new(Config::default(), encoder)
    }

    #[tokio::test]
    async fn test_converts_all_tiffs_into_sibling_dir() {
        let temp_dir = TempDir::new().unwrap();
        let source = make_source(
            temp_dir.path(),
            "scans",
            &[("a.tif", 1000), ("b.TIFF", 2000), ("notes.txt", 10)],
        );

        let mut runner = runner(FakeEncoder::default());
        let stats = runner.run(&[source]).await.unwrap();

        assert_eq!(stats.files_processed, 2);
        assert_eq!(stats.files_skipped, 0);
        assert_eq!(stats.files_failed, 0);
        assert_eq!(stats.total_original_bytes, 3000);
        assert_eq!(stats.total_compressed_bytes, 1500);
        assert_eq!(stats.total_elapsed, Duration::from_millis(20));

        let out = temp_dir.path().join("scans_webp");
        assert!(out.join("a.webp").is_file());
        assert!(out.join("b.webp").is_file());
        assert!(!out.join("notes.webp").exists());
    }

    #[tokio::test]
    async fn test_second_run_skips_everything() {
        let temp_dir = TempDir::new().unwrap();
        let source = make_source(temp_dir.path(), "scans", &[("a.tif", 100), ("b.tif", 100), ("c.tif", 100)]);

        runner(FakeEncoder::default()).run(&[source.clone()]).await.unwrap();

        let mut second = runner(FakeEncoder::default());
        let stats = second.run(&[source]).await.unwrap();
        assert_eq!(stats.files_processed, 0);
        assert_eq!(stats.files_skipped, 3);
        assert_eq!(stats.total_original_bytes, 0);
        assert!(second.encoder().calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_force_reconverts_existing_outputs() {
        let temp_dir = TempDir::new().unwrap();
        let source = make_source(temp_dir.path(), "scans", &[("a.tif", 100), ("b.tif", 100)]);
        runner(FakeEncoder::default()).run(&[source.clone()]).await.unwrap();

        let config = Config {
            force: true,
            ..Default::default()
        };
        let mut forced = ConversionRunner::new(config, FakeEncoder::default());
        let stats = forced.run(&[source]).await.unwrap();
        assert_eq!(stats.files_processed, 2);
        assert_eq!(stats.files_skipped, 0);
        assert_eq!(forced.encoder().calls.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_partial_previous_run_only_converts_missing() {
        let temp_dir = TempDir::new().unwrap();
        let source = make_source(temp_dir.path(), "scans", &[("a.tif", 100), ("b.tif", 100), ("c.tif", 100)]);
        let out = temp_dir.path().join("scans_webp");
        std::fs::create_dir(&out).unwrap();
        std::fs::write(out.join("a.webp"), b"done").unwrap();
        std::fs::write(out.join("c.webp"), b"").unwrap();

        let mut runner = runner(FakeEncoder::default());
        let stats = runner.run(&[source]).await.unwrap();
        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.files_processed, 2);
        assert_eq!(stats.total_files(), 3);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_the_run() {
        let temp_dir = TempDir::new().unwrap();
        let first = make_source(temp_dir.path(), "first", &[("a.tif", 100), ("bad.tif", 100), ("c.tif", 100)]);
        let second = make_source(temp_dir.path(), "second", &[("d.tif", 100)]);

        let encoder = FakeEncoder {
            fail_stems: vec!["bad"],
            ..Default::default()
        };
        let mut runner = runner(encoder);
        let stats = runner.run(&[first, second]).await.unwrap();

        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.files_processed, 3);
        assert_eq!(stats.total_files(), 4);
        assert_eq!(runner.encoder().calls.borrow().len(), 4);
        assert!(temp_dir.path().join("second_webp").join("d.webp").is_file());
        // Failed files add neither time nor size
        assert_eq!(stats.total_original_bytes, 300);
    }

    #[tokio::test]
    async fn test_tif_and_tiff_with_same_stem_convert_once() {
        let temp_dir = TempDir::new().unwrap();
        let source = make_source(temp_dir.path(), "scans", &[("a.tif", 100), ("a.tiff", 50)]);

        let mut runner = runner(FakeEncoder::default());
        let stats = runner.run(&[source.clone()]).await.unwrap();

        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.total_original_bytes, 100);
        assert_eq!(stats.total_compressed_bytes, 50);
        assert_eq!(*runner.encoder().calls.borrow(), vec![source.path().join("a.tif")]);

        let written = std::fs::read(temp_dir.path().join("scans_webp").join("a.webp")).unwrap();
        assert_eq!(written.len() as u64, stats.total_compressed_bytes);

        // The kept output is skipped next time, the conflict stays reported
        let mut rerun = ConversionRunner::new(Config::default(), FakeEncoder::default());
        let stats = rerun.run(&[source]).await.unwrap();
        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.files_failed, 1);
        assert!(rerun.encoder().calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_empty_directory_contributes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let empty = make_source(temp_dir.path(), "empty", &[("readme.txt", 5)]);

        let mut runner = runner(FakeEncoder::default());
        let stats = runner.run(&[empty]).await.unwrap();

        assert_eq!(stats, RunStatistics::default());
        assert!(!temp_dir.path().join("empty_webp").exists());
    }

    #[tokio::test]
    async fn test_blocked_output_dir_skips_only_that_directory() {
        let temp_dir = TempDir::new().unwrap();
        let blocked = make_source(temp_dir.path(), "blocked", &[("a.tif", 100)]);
        let fine = make_source(temp_dir.path(), "fine", &[("b.tif", 100)]);
        std::fs::write(temp_dir.path().join("blocked_webp"), b"in the way").unwrap();

        let mut runner = runner(FakeEncoder::default());
        let stats = runner.run(&[blocked, fine]).await.unwrap();

        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.total_files(), 1);
        assert!(temp_dir.path().join("fine_webp").join("b.webp").is_file());
    }

    #[tokio::test]
    async fn test_output_root_override() {
        let temp_dir = TempDir::new().unwrap();
        let source = make_source(temp_dir.path(), "scans", &[("a.tif", 100)]);
        let root = temp_dir.path().join("archive").join("webp");

        let config = Config {
            output_root: Some(root.clone()),
            ..Default::default()
        };
        let mut runner = ConversionRunner::new(config, FakeEncoder::default());
        runner.run(&[source]).await.unwrap();

        assert!(root.join("scans").join("a.webp").is_file());
        assert!(!temp_dir.path().join("scans_webp").exists());
    }

    #[tokio::test]
    async fn test_unavailable_encoder_aborts_run() {
        let temp_dir = TempDir::new().unwrap();
        let first = make_source(temp_dir.path(), "first", &[("a.tif", 100), ("b.tif", 100)]);
        let second = make_source(temp_dir.path(), "second", &[("c.tif", 100)]);

        let encoder = FakeEncoder {
            unavailable_after: Some(1),
            ..Default::default()
        };
        let mut runner = runner(encoder);
        let result = runner.run(&[first, second]).await;

        assert!(matches!(result, Err(ConvertError::EncoderUnavailable(_))));
        assert_eq!(runner.encoder().calls.borrow().len(), 2);
        assert!(!temp_dir.path().join("second_webp").exists());
    }
}
