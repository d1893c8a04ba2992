//! # tif2webp - Main Entry Point
//!
//! ## Responsibilities:
//! - Parsing command line arguments with `clap`
//! - Initializing console + log file logging with `tracing`
//! - Merging the optional JSON config file with the CLI flags
//! - Resolving the input into source directories and running the conversion
//! - Printing the final report and mapping fatal errors to a non-zero exit code
//!
//! ## Usage:
//! ```bash
//! tif2webp                       # every subdirectory of . that holds TIFF files
//! tif2webp /scans/1998           # a single directory
//! tif2webp dirs.txt -o /archive  # directories listed in a file, outputs under /archive
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, warn};

use tif2webp::{
    json_output::JsonMessage,
    logging,
    tool_resolver::{ToolPathResolver, ENCODER_TOOL},
    Config, ConversionRunner, CwebpEncoder, DirectoryWalker, RunReport,
};

#[derive(Parser)]
#[command(name = "tif2webp")]
#[command(about = "Convert TIFF archives to lossless WebP, one file at a time")]
struct Args {
    /// Directory to convert, or a .txt file listing one directory per line.
    /// Without it, every subdirectory of the current directory holding TIFF files is converted
    target: Option<PathBuf>,

    /// Root directory for converted files (default: a `<dir>_webp` sibling of each directory)
    #[arg(short, long = "output_dir", visible_alias = "output-dir")]
    output_dir: Option<PathBuf>,

    /// Convert again even when the WebP file already exists
    #[arg(short, long)]
    force: bool,

    /// Path to the cwebp executable (default: search TOOLS_DIR and PATH)
    #[arg(long)]
    encoder: Option<PathBuf>,

    /// Log file, appended on every run
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output progress and results as JSON lines on stdout
    #[arg(long)]
    json: bool,

    /// Write the effective settings to the config file and exit
    #[arg(long)]
    save_config: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Built before logging so the config can name the log file; its errors
    // are reported once logging is up
    let config = build_config(&args).await;
    let (log_file, json_output) = match config {
        Ok(ref config) => (config.log_file.clone(), config.json_output),
        Err(_) => (
            args.log_file.clone().unwrap_or_else(|| Config::default().log_file),
            args.json,
        ),
    };

    // Flushes the log file on drop
    let _log_guard = match logging::init(&log_file, args.verbose, json_output) {
        Ok(guard) => Some(guard),
        Err(e) => {
            if let Err(e) = logging::init_console_only(args.verbose, json_output) {
                eprintln!("Logging unavailable: {}", e);
            }
            warn!("Logging to console only: {}", e);
            None
        }
    };

    let result = match config {
        Ok(config) if args.save_config => save_config(&args, &config).await,
        Ok(config) => run(&args, config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            if json_output {
                JsonMessage::error(format!("{:#}", e)).emit();
            }
            ExitCode::FAILURE
        }
    }
}

/// Config file first, CLI flags on top
async fn build_config(args: &Args) -> Result<Config> {
    let mut config = match (&args.config, Config::default_path()) {
        (Some(path), _) => {
            if !path.is_file() {
                anyhow::bail!("Config file does not exist: {}", path.display());
            }
            Config::from_file(path).await?
        }
        (None, Some(default_path)) => Config::from_file(&default_path).await?,
        (None, None) => Config::default(),
    };

    let cwd = std::env::current_dir().context("Cannot determine the working directory")?;
    if let Some(ref output_dir) = args.output_dir {
        config.output_root = Some(output_dir.clone());
    }
    config.output_root = config.output_root.map(|root| cwd.join(root));
    config.force |= args.force;
    config.json_output |= args.json;
    if let Some(ref encoder) = args.encoder {
        config.encoder_path = Some(encoder.clone());
    }
    if let Some(ref log_file) = args.log_file {
        config.log_file = log_file.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Persist the merged settings to `--config` or the default config path
async fn save_config(args: &Args, config: &Config) -> Result<()> {
    let path = args
        .config
        .clone()
        .or_else(Config::default_path)
        .context("No config directory on this platform, pass --config")?;
    config.save_to_file(&path).await?;
    info!("Configuration saved to {}", path.display());
    Ok(())
}

async fn run(args: &Args, config: Config) -> Result<()> {
    let started = Instant::now();
    let cwd = std::env::current_dir().context("Cannot determine the working directory")?;

    let directories = DirectoryWalker::new(&cwd).resolve(args.target.as_deref())?;
    info!("{} source directories to process", directories.len());

    if config.json_output {
        JsonMessage::Start {
            directories: directories.iter().map(|d| d.path().to_path_buf()).collect(),
            output_root: config.output_root.clone(),
            force: config.force,
        }
        .emit();
    }

    let resolver = ToolPathResolver::new(config.encoder_path.clone());
    let tool = match resolver.check_tool_with_instructions(ENCODER_TOOL) {
        Ok(path) => {
            info!("Using encoder: {}", path.display());
            Some(path)
        }
        Err(hint) => {
            warn!("{}; conversions will fail", hint);
            None
        }
    };
    let encoder = CwebpEncoder::new(tool, config.compression);

    let json_output = config.json_output;
    let mut runner = ConversionRunner::new(config, encoder);
    let stats = runner.run(&directories).await?;

    let report = RunReport::finalize(&stats, started.elapsed());
    for line in report.lines() {
        info!("{}", line);
    }
    if json_output {
        JsonMessage::Complete { report }.emit();
    }

    Ok(())
}
