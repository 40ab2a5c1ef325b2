// src/paths.rs
// Single source of truth for where DualScope finds its config and media.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use dualscope_core::config::ViewerConfig;

/// Looked up in the working directory when no path is given on the command line.
pub const CONFIG_FILE: &str = "dualscope.json";

pub struct LoadedConfig {
    pub config:   ViewerConfig,
    /// Relative media paths in `config` are resolved against this.
    pub base_dir: PathBuf,
}

impl LoadedConfig {
    pub fn primary_video(&self) -> PathBuf {
        resolve(&self.base_dir, &self.config.primary_video)
    }

    pub fn secondary_video(&self) -> PathBuf {
        resolve(&self.base_dir, &self.config.secondary_video)
    }

    pub fn trace_workbook(&self) -> PathBuf {
        resolve(&self.base_dir, &self.config.trace_workbook)
    }
}

/// Load the config named by `arg`, else `dualscope.json` if present, else
/// defaults. A path given explicitly must exist.
pub fn load_config(arg: Option<OsString>) -> Result<LoadedConfig> {
    let (path, explicit) = match arg {
        Some(a) => (PathBuf::from(a), true),
        None    => (PathBuf::from(CONFIG_FILE), false),
    };

    if !explicit && !path.exists() {
        info!("[config] no {CONFIG_FILE}, using defaults");
        return Ok(LoadedConfig { config: ViewerConfig::default(), base_dir: PathBuf::from(".") });
    }

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = ViewerConfig::from_json(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    let base_dir = path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    info!("[config] loaded {}", path.display());
    Ok(LoadedConfig { config, base_dir })
}

pub fn resolve(base: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() { p.to_path_buf() } else { base.join(p) }
}
