//! Compiled-script cache backed by `osacompile`
//!
//! Compiled scripts are stored as `<blake3 of source>.scpt` in the cache
//! directory, so identical script text is compiled once per cache.

use parking_lot::Mutex;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::ExecutionResult;
use super::osascript::run;

/// Directory of compiled scripts keyed by source hash
#[derive(Debug)]
pub struct CompiledScriptCache {
    directory: PathBuf,
    compiler: PathBuf,
    // serialises compilation so two threads never race on one file
    lock: Mutex<()>,
}

impl CompiledScriptCache {
    /// Cache in `directory`, compiling with `compiler` (normally `osacompile`)
    pub fn new(directory: impl Into<PathBuf>, compiler: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            compiler: compiler.into(),
            lock: Mutex::new(()),
        }
    }

    /// Cache directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Hex key under which `script` is cached
    pub fn key(script: &str) -> String {
        blake3::hash(script.as_bytes()).to_hex().to_string()
    }

    /// Path the compiled form of `script` lives at
    pub fn path_for(&self, script: &str) -> PathBuf {
        self.directory.join(format!("{}.scpt", Self::key(script)))
    }

    /// Path of the compiled `script`, compiling it on first use
    pub fn compiled(&self, script: &str) -> ExecutionResult<PathBuf> {
        let target = self.path_for(script);
        let _guard = self.lock.lock();
        if target.exists() {
            return Ok(target);
        }

        fs::create_dir_all(&self.directory)?;
        let source = target.with_extension("applescript");
        let mut file = File::create(&source)?;
        file.write_all(script.as_bytes())?;
        file.sync_all()?;
        drop(file);

        let mut command = Command::new(&self.compiler);
        command.arg("-o").arg(&target).arg(&source);
        let compiled = run(command, None, script);
        let _ = fs::remove_file(&source);
        compiled?;

        tracing::debug!("Compiled script to {:?}", target);
        Ok(target)
    }

    /// Remove every cached script
    pub fn clear(&self) -> ExecutionResult<()> {
        let _guard = self.lock.lock();
        if !self.directory.exists() {
            return Ok(());
        }
        for entry in fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "scpt") {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}
