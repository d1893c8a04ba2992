//! # tif2webp Library
//!
//! Batch conversion of TIFF archives into lossless WebP through `cwebp`,
//! one file at a time.
//!
//! ## Module layout:
//! - `config`: run parameters and validation
//! - `error`: error taxonomy of the pipeline
//! - `discovery`: turns the CLI argument into source directories
//! - `optimizer`: path planning, skip logic and the sequential runner
//! - `encoder`: one `cwebp` invocation per file
//! - `progress`: per-file outcomes, run totals and the progress bar
//! - `report`: end-of-run summary
//! - `logging`: console + log file subscriber
//!
//! ## Usage:
//! ```rust,ignore
//! let dirs = DirectoryWalker::new(std::env::current_dir()?).resolve(None)?;
//! let tool = ToolPathResolver::default().resolve_tool(ENCODER_TOOL);
//! let encoder = CwebpEncoder::new(tool, config.compression);
//! let stats = ConversionRunner::new(config, encoder).run(&dirs).await?;
//! println!("{}", RunReport::finalize(&stats, started.elapsed()));
//! ```

pub mod config;
pub mod discovery;
pub mod encoder;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod logging;
pub mod optimizer;
pub mod progress;
pub mod report;
pub mod tool_resolver;
pub mod utils;

pub use config::Config;
pub use discovery::{DirectoryWalker, SourceDirectory};
pub use encoder::{CwebpEncoder, Encoder, EncoderResult};
pub use error::ConvertError;
pub use optimizer::ConversionRunner;
pub use progress::{ConversionOutcome, RunStatistics};
pub use report::RunReport;
pub use tool_resolver::ToolPathResolver;
