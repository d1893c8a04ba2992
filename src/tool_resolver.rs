//! # Tool Path Resolver
//!
//! Finds the external encoder executable:
//! - Explicit path from the configuration or `--encoder`
//! - A `TOOLS_DIR` directory override
//! - The system `PATH`

use std::env;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Name of the lossless WebP encoder
pub const ENCODER_TOOL: &str = "cwebp";

/// Tool path resolver for the encoder executable
pub struct ToolPathResolver {
    /// Explicitly configured executable, wins over every search
    explicit: Option<PathBuf>,
    /// Directory holding bundled tools
    tools_dir: Option<PathBuf>,
}

impl ToolPathResolver {
    /// Create a new path resolver
    pub fn new(explicit: Option<PathBuf>) -> Self {
        let tools_dir = env::var_os("TOOLS_DIR")
            .map(PathBuf::from)
            .filter(|dir| dir.is_dir());

        if let Some(ref dir) = tools_dir {
            debug!("Using TOOLS_DIR: {:?}", dir);
        }

        Self { explicit, tools_dir }
    }

    /// Resolver that only looks at `explicit` and the given search path
    pub fn with_search_dir(explicit: Option<PathBuf>, tools_dir: Option<PathBuf>) -> Self {
        Self { explicit, tools_dir }
    }

    /// Resolve the path to a specific tool
    pub fn resolve_tool(&self, tool_name: &str) -> Option<PathBuf> {
        debug!("Resolving tool: {}", tool_name);

        if let Some(ref explicit) = self.explicit {
            if explicit.is_file() {
                debug!("Using configured tool: {} -> {:?}", tool_name, explicit);
                return Some(explicit.clone());
            }
            warn!("Configured encoder does not exist: {}", explicit.display());
            return None;
        }

        if let Some(ref tools_dir) = self.tools_dir {
            let bundled = tools_dir.join(Self::executable_name(tool_name));
            if bundled.is_file() {
                debug!("Using bundled tool: {} -> {:?}", tool_name, bundled);
                return Some(bundled);
            }
        }

        if let Some(system_path) = Self::find_in_system_path(tool_name) {
            debug!("Using system tool: {} -> {:?}", tool_name, system_path);
            return Some(system_path);
        }

        warn!("Tool not found: {}", tool_name);
        None
    }

    fn executable_name(tool_name: &str) -> String {
        let extension = if cfg!(windows) { ".exe" } else { "" };
        format!("{}{}", tool_name, extension)
    }

    /// Find tool in system PATH
    fn find_in_system_path(tool_name: &str) -> Option<PathBuf> {
        let tool_with_ext = Self::executable_name(tool_name);
        env::split_paths(&env::var_os("PATH")?)
            .map(|dir| dir.join(&tool_with_ext))
            .find(|path| path.is_file())
    }

    /// Installation hint for a missing tool
    pub fn install_instructions(tool_name: &str) -> String {
        match tool_name {
            "cwebp" if cfg!(target_os = "linux") => "sudo apt-get install webp".to_string(),
            "cwebp" if cfg!(target_os = "macos") => "brew install webp".to_string(),
            "cwebp" => "download libwebp from https://developers.google.com/speed/webp/download".to_string(),
            _ => format!("install {} and make sure it is in PATH", tool_name),
        }
    }

    /// Check if a tool is available and provide installation instructions if not
    pub fn check_tool_with_instructions(&self, tool_name: &str) -> Result<PathBuf, String> {
        self.resolve_tool(tool_name).ok_or_else(|| {
            format!(
                "Tool '{}' not found. To install it: {}",
                tool_name,
                Self::install_instructions(tool_name)
            )
        })
    }
}

impl Default for ToolPathResolver {
    fn default() -> Self {
        Self::new(None)
    }
}
