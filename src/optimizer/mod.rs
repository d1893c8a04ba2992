//! # Optimizer Module
//!
//! The conversion pipeline, split by responsibility:
//! - `conversion_runner`: sequential orchestrator over directories and files
//! - `work_selector`: skip logic for already converted files and output name conflicts
//! - `path_resolver`: output directory and output file computation
//! - `progress_tracker`: live progress (bar or JSON lines)

pub mod conversion_runner;
pub mod path_resolver;
pub mod progress_tracker;
pub mod work_selector;

pub use conversion_runner::ConversionRunner;
pub use path_resolver::{ConversionTarget, PathResolver};
pub use progress_tracker::ProgressTracker;
pub use work_selector::{Action, SelectedTarget, Selection, WorkSelector};
