//! Runtime configuration and its on-disk JSON form

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Configuration for a [`Runtime`](super::Runtime)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Build element-by-index and element-by-id references locally instead
    /// of asking the application for them
    pub reduce_script_executions: bool,

    /// Interpreter used to run scripts
    pub osascript_program: PathBuf,

    /// Compiler used for compiled-script sessions
    pub osacompile_program: PathBuf,

    /// Directory holding compiled scripts
    pub compiled_script_cache: PathBuf,

    /// Locale of date strings printed by the interpreter, e.g. `de_DE`
    pub date_locale: String,

    /// Longest result text written to the debug log
    pub max_logged_result_len: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            reduce_script_executions: true,
            osascript_program: PathBuf::from("osascript"),
            osacompile_program: PathBuf::from("osacompile"),
            compiled_script_cache: default_cache_dir(),
            date_locale: "en_US".to_string(),
            max_logged_result_len: 1024,
        }
    }
}

fn default_cache_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join("Library/Caches/tellscript"),
        None => std::env::temp_dir().join("tellscript"),
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file; absent fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path).with_context(|| format!("Failed to read file: {:?}", path))?;
        let config: RuntimeConfig =
            serde_json::from_slice(&data).context("Failed to deserialize config")?;
        Ok(config)
    }

    /// Write configuration as pretty JSON, replacing `path` atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self).context("Failed to serialize config")?;
        write_atomic(path, &json)
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path)
        .with_context(|| format!("Failed to create temp file: {:?}", temp_path))?;
    file.write_all(data).context("Failed to write data")?;
    file.sync_all().context("Failed to sync file")?;
    drop(file);

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename {:?} to {:?}", temp_path, path))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        let dir = OpenOptions::new()
            .read(true)
            .open(parent)
            .with_context(|| format!("Failed to open directory: {:?}", parent))?;
        dir.sync_all().context("Failed to sync directory")?;
    }

    Ok(())
}
