//! # Directory Discovery Module
//!
//! Resolves the command line input into the ordered list of source
//! directories to convert.
//!
//! ## Input modes (checked in this order):
//! 1. **No argument**: subdirectories of the working directory that contain TIFF files, sorted by name
//! 2. **Directory**: that single directory
//! 3. **`.txt` file**: one directory per line, in file order; blank lines ignored,
//!    lines that are not existing directories skipped with a warning
//! 4. Anything else is `ConvertError::InvalidInput` and nothing is processed
//!
//! Every returned directory is absolute, so the encoder always receives
//! absolute paths.

use crate::{error::ConvertError, file_manager::FileManager};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A directory whose TIFF files are converted as one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDirectory {
    path: PathBuf,
}

impl SourceDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for SourceDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// How the command line argument was interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    ScanSubdirectories(PathBuf),
    Directory(PathBuf),
    ListFile(PathBuf),
}

/// Turns the command line argument into source directories
pub struct DirectoryWalker {
    cwd: PathBuf,
}

impl DirectoryWalker {
    /// Walker resolving relative paths against `cwd`
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    /// Decide which input mode `arg` selects
    pub fn classify(&self, arg: Option<&Path>) -> Result<InputSpec, ConvertError> {
        let Some(arg) = arg else {
            return Ok(InputSpec::ScanSubdirectories(self.cwd.clone()));
        };

        let path = self.cwd.join(arg);
        if path.is_dir() {
            return Ok(InputSpec::Directory(path));
        }

        let is_txt = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("txt"))
            .unwrap_or(false);
        if path.is_file() && is_txt {
            return Ok(InputSpec::ListFile(path));
        }

        Err(ConvertError::InvalidInput(format!(
            "{} is neither a directory nor a .txt list of directories",
            arg.display()
        )))
    }

    /// Resolve `arg` into the ordered directories to process
    pub fn resolve(&self, arg: Option<&Path>) -> Result<Vec<SourceDirectory>, ConvertError> {
        match self.classify(arg)? {
            InputSpec::ScanSubdirectories(root) => {
                info!("Scanning {} for directories with TIFF files...", root.display());
                self.scan_subdirectories(&root)
            }
            InputSpec::Directory(dir) => Ok(vec![Self::source(&dir)]),
            InputSpec::ListFile(list) => {
                info!("Reading directory list from {}", list.display());
                self.read_list_file(&list)
            }
        }
    }

    fn scan_subdirectories(&self, root: &Path) -> Result<Vec<SourceDirectory>, ConvertError> {
        let mut dirs = Vec::new();

        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| ConvertError::Io(e.into()))?;
            // Follows symlinked directories
            if !entry.path().is_dir() {
                continue;
            }
            if FileManager::has_tiffs(entry.path()) {
                dirs.push(Self::source(entry.path()));
            } else {
                debug!("No TIFF files in {}, ignoring", entry.path().display());
            }
        }

        info!("Found {} directories with TIFF files", dirs.len());
        Ok(dirs)
    }

    fn read_list_file(&self, list: &Path) -> Result<Vec<SourceDirectory>, ConvertError> {
        let content = std::fs::read_to_string(list)?;
        let mut dirs = Vec::new();

        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let dir = self.cwd.join(line);
            if dir.is_dir() {
                dirs.push(Self::source(&dir));
            } else {
                warn!("Directory not found, skipping: {}", line);
            }
        }

        Ok(dirs)
    }

    fn source(dir: &Path) -> SourceDirectory {
        SourceDirectory::new(dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf()))
    }
}
