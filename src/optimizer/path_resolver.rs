//! # Path Resolution Module
//!
//! Centralizes every output path computation:
//! - destination directory of a source directory (`<dir>_webp` sibling or `<root>/<dir>`)
//! - destination file of a TIFF (`<stem>.webp`)
//! - idempotent creation of the destination directory
//!
//! The path functions are pure: same inputs, same paths, no filesystem access.

use crate::error::ConvertError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix appended to a source directory name when no output root is given
pub const OUTPUT_DIR_SUFFIX: &str = "_webp";

/// One file to convert and where its output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTarget {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Utility for computing output paths in one place
pub struct PathResolver;

impl PathResolver {
    /// Destination directory for `source_dir`
    pub fn output_dir_for(source_dir: &Path, output_root: Option<&Path>) -> Result<PathBuf, ConvertError> {
        let name = source_dir.file_name().ok_or_else(|| ConvertError::OutputDir {
            path: source_dir.to_path_buf(),
            reason: "source directory has no name".to_string(),
        })?;

        let output_dir = match output_root {
            Some(root) => root.join(name),
            None => {
                let mut sibling = name.to_os_string();
                sibling.push(OUTPUT_DIR_SUFFIX);
                source_dir.with_file_name(sibling)
            }
        };

        debug!("Output directory: {} -> {}", source_dir.display(), output_dir.display());
        Ok(output_dir)
    }

    /// Destination file for `source` inside `output_dir`
    pub fn destination_for(output_dir: &Path, source: &Path) -> PathBuf {
        let stem = source.file_stem().unwrap_or_default();
        let mut filename = stem.to_os_string();
        filename.push(".webp");
        output_dir.join(filename)
    }

    /// Pair every TIFF with its destination
    pub fn plan_targets(output_dir: &Path, tiffs: Vec<PathBuf>) -> Vec<ConversionTarget> {
        tiffs
            .into_iter()
            .map(|source| ConversionTarget {
                destination: Self::destination_for(output_dir, &source),
                source,
            })
            .collect()
    }

    /// Create the destination directory; succeeds if it already exists
    pub async fn ensure_output_dir(output_dir: &Path) -> Result<(), ConvertError> {
        if let Ok(metadata) = tokio::fs::metadata(output_dir).await {
            if metadata.is_dir() {
                return Ok(());
            }
            return Err(ConvertError::OutputDir {
                path: output_dir.to_path_buf(),
                reason: "a file with that name already exists".to_string(),
            });
        }

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| ConvertError::OutputDir {
                path: output_dir.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sibling_output_dir() {
        let out = PathResolver::output_dir_for(Path::new("/data/scans/2019"), None).unwrap();
        assert_eq!(out, PathBuf::from("/data/scans/2019_webp"));
    }

    #[test]
    fn test_output_root_override() {
        let out = PathResolver::output_dir_for(
            Path::new("/data/scans/2019"),
            Some(Path::new("/mnt/archive")),
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/mnt/archive/2019"));
    }

    #[test]
    fn test_root_has_no_name() {
        assert!(matches!(
            PathResolver::output_dir_for(Path::new("/"), None),
            Err(ConvertError::OutputDir { .. })
        ));
    }

    #[test]
    fn test_paths_are_deterministic() {
        let a = PathResolver::output_dir_for(Path::new("/x/y"), Some(Path::new("/o"))).unwrap();
        let b = PathResolver::output_dir_for(Path::new("/x/y"), Some(Path::new("/o"))).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_destination_extension_is_lowercase_webp() {
        let out = Path::new("/out");
        assert_eq!(
            PathResolver::destination_for(out, Path::new("/in/Scan_001.TIFF")),
            PathBuf::from("/out/Scan_001.webp")
        );
        assert_eq!(
            PathResolver::destination_for(out, Path::new("/in/page.v2.tif")),
            PathBuf::from("/out/page.v2.webp")
        );
    }

    #[test]
    fn test_plan_targets_keeps_order() {
        let targets = PathResolver::plan_targets(
            Path::new("/o"),
            vec![PathBuf::from("/i/a.tif"), PathBuf::from("/i/b.tif")],
        );
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].destination, PathBuf::from("/o/a.webp"));
        assert_eq!(targets[1].source, PathBuf::from("/i/b.tif"));
        assert!(targets.iter().all(|t| t.destination.parent() == Some(Path::new("/o"))));
    }

    #[tokio::test]
    async fn test_ensure_output_dir_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested").join("scans_webp");

        PathResolver::ensure_output_dir(&dir).await.unwrap();
        PathResolver::ensure_output_dir(&dir).await.unwrap();
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn test_ensure_output_dir_collision_with_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocked = temp_dir.path().join("scans_webp");
        std::fs::write(&blocked, b"not a directory").unwrap();

        let result = PathResolver::ensure_output_dir(&blocked).await;
        assert!(matches!(result, Err(ConvertError::OutputDir { .. })));
    }
}
