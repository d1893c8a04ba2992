//! # Work Selection Module
//!
//! Decides, per planned target, whether it goes to the encoder.
//! A target is skipped only when `force` is off and its destination already
//! exists as a non-empty file. A zero-byte destination is what an interrupted
//! run leaves behind, so it is converted again.
//!
//! Two sources can map to the same destination (`a.tif` and `a.tiff` both
//! become `a.webp`). The first one in file name order keeps the destination,
//! later ones are marked as conflicts and never reach the encoder.

use super::path_resolver::ConversionTarget;
use crate::file_manager::FileManager;
use std::collections::HashMap;
use std::path::PathBuf;

/// What happens to one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Convert,
    Skip,
    /// Destination already claimed by `first` earlier in the same directory
    Conflict { first: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedTarget {
    pub target: ConversionTarget,
    pub action: Action,
}

/// Targets with their action, in planner order
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub files: Vec<SelectedTarget>,
}

impl Selection {
    /// Targets that need the encoder
    pub fn to_convert(&self) -> impl Iterator<Item = &ConversionTarget> {
        self.with_action(|action| *action == Action::Convert)
    }

    /// Targets whose output already exists
    pub fn to_skip(&self) -> impl Iterator<Item = &ConversionTarget> {
        self.with_action(|action| *action == Action::Skip)
    }

    pub fn conflicting(&self) -> impl Iterator<Item = &ConversionTarget> {
        self.with_action(|action| matches!(action, Action::Conflict { .. }))
    }

    fn with_action<F>(&self, pred: F) -> impl Iterator<Item = &ConversionTarget>
    where
        F: Fn(&Action) -> bool,
    {
        self.files
            .iter()
            .filter(move |file| pred(&file.action))
            .map(|file| &file.target)
    }
}

pub struct WorkSelector;

impl WorkSelector {
    /// Assign an action to every target, keeping their order
    pub fn select(targets: Vec<ConversionTarget>, force: bool) -> Selection {
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();

        let files = targets
            .into_iter()
            .map(|target| {
                let action = if let Some(first) = claimed.get(&target.destination) {
                    Action::Conflict { first: first.clone() }
                } else {
                    claimed.insert(target.destination.clone(), target.source.clone());
                    if !force && Self::already_converted(&target) {
                        Action::Skip
                    } else {
                        Action::Convert
                    }
                };
                SelectedTarget { target, action }
            })
            .collect();

        Selection { files }
    }

    fn already_converted(target: &ConversionTarget) -> bool {
        FileManager::existing_file_size(&target.destination)
            .map(|size| size > 0)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn targets(dir: &Path, names: &[&str]) -> Vec<ConversionTarget> {
        names
            .iter()
            .map(|name| ConversionTarget {
                source: dir.join(format!("{}.tif", name)),
                destination: dir.join("out").join(format!("{}.webp", name)),
            })
            .collect()
    }

    #[test]
    fn test_existing_outputs_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        std::fs::write(out.join("b.webp"), b"webp").unwrap();
        std::fs::write(out.join("d.webp"), b"webp").unwrap();

        let all = targets(temp_dir.path(), &["a", "b", "c", "d"]);
        let selection = WorkSelector::select(all.clone(), false);

        let to_convert: Vec<_> = selection.to_convert().cloned().collect();
        let to_skip: Vec<_> = selection.to_skip().cloned().collect();
        assert_eq!(to_convert, vec![all[0].clone(), all[2].clone()]);
        assert_eq!(to_skip, vec![all[1].clone(), all[3].clone()]);

        // Planner order is kept across actions
        let order: Vec<_> = selection.files.iter().map(|f| f.target.clone()).collect();
        assert_eq!(order, all);
    }

    #[test]
    fn test_force_converts_everything() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        std::fs::write(out.join("a.webp"), b"webp").unwrap();

        let selection = WorkSelector::select(targets(temp_dir.path(), &["a", "b"]), true);
        assert_eq!(selection.to_convert().count(), 2);
        assert_eq!(selection.to_skip().count(), 0);
    }

    #[test]
    fn test_zero_byte_output_is_converted_again() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        std::fs::write(out.join("a.webp"), b"").unwrap();

        let selection = WorkSelector::select(targets(temp_dir.path(), &["a"]), false);
        assert_eq!(selection.to_convert().count(), 1);
    }

    #[test]
    fn test_directory_at_destination_is_not_an_output() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("out").join("a.webp")).unwrap();

        let selection = WorkSelector::select(targets(temp_dir.path(), &["a"]), false);
        assert_eq!(selection.to_convert().count(), 1);
    }

    #[test]
    fn test_same_destination_keeps_first_source() {
        let dir = Path::new("/in");
        let first = ConversionTarget {
            source: dir.join("a.tif"),
            destination: PathBuf::from("/out/a.webp"),
        };
        let second = ConversionTarget {
            source: dir.join("a.tiff"),
            destination: PathBuf::from("/out/a.webp"),
        };

        for force in [false, true] {
            let selection = WorkSelector::select(vec![first.clone(), second.clone()], force);
            assert_eq!(selection.files[0].action, Action::Convert);
            assert_eq!(
                selection.files[1].action,
                Action::Conflict {
                    first: dir.join("a.tif")
                }
            );
            assert_eq!(selection.to_convert().count(), 1);
        }
    }

    #[test]
    fn test_conflict_with_skipped_output() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        std::fs::write(out.join("a.webp"), b"webp").unwrap();

        let mut all = targets(temp_dir.path(), &["a"]);
        all.push(ConversionTarget {
            source: temp_dir.path().join("a.tiff"),
            destination: out.join("a.webp"),
        });

        let selection = WorkSelector::select(all, false);
        assert_eq!(selection.to_skip().count(), 1);
        assert_eq!(selection.conflicting().count(), 1);
        assert_eq!(selection.to_convert().count(), 0);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(WorkSelector::select(Vec::new(), false), Selection::default());
    }
}
