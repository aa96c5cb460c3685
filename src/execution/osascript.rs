//! `osascript` subprocess executor

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};

use super::compile::CompiledScriptCache;
use super::{ExecutionError, ExecutionResult, ScriptExecutor};

/// Executes scripts by piping them into `osascript -s s -`.
///
/// `-s s` asks for results in recompilable source form, which is the wire
/// format the codecs understand. Standard output and standard error are
/// drained on two short-lived threads while the caller waits for the process,
/// so a chatty script cannot fill a pipe and stall.
#[derive(Debug)]
pub struct OsascriptExecutor {
    program: PathBuf,
    cache: Option<CompiledScriptCache>,
}

impl OsascriptExecutor {
    /// Executor running `program` (normally `osascript`)
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            cache: None,
        }
    }

    /// Enable [`ScriptExecutor::execute_compiled`] through `cache`
    pub fn with_compiled_cache(mut self, cache: CompiledScriptCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Interpreter program
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn run_file(&self, file: &Path, script: &str) -> ExecutionResult<String> {
        let mut command = Command::new(&self.program);
        command.arg("-s").arg("s").arg(file);
        run(command, None, script)
    }
}

impl Default for OsascriptExecutor {
    fn default() -> Self {
        Self::new("osascript")
    }
}

impl ScriptExecutor for OsascriptExecutor {
    fn execute(&self, script: &str) -> ExecutionResult<String> {
        let mut command = Command::new(&self.program);
        command.arg("-s").arg("s").arg("-");
        run(command, Some(script), script)
    }

    fn execute_compiled(&self, script: &str) -> ExecutionResult<String> {
        match &self.cache {
            Some(cache) => {
                let compiled = cache.compiled(script)?;
                self.run_file(&compiled, script)
            }
            None => self.execute(script),
        }
    }
}

fn pump<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<io::Result<String>> {
    thread::spawn(move || {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    })
}

fn join(handle: Option<JoinHandle<io::Result<String>>>) -> io::Result<String> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| io::Error::other("output pump thread panicked"))?,
        None => Ok(String::new()),
    }
}

/// Run `command`, feeding `stdin` as UTF-8, and collect its result text.
///
/// Fails if anything was written to standard error or the exit status is
/// unsuccessful; `script` is attached to the error for diagnosis.
pub(crate) fn run(mut command: Command, stdin: Option<&str>, script: &str) -> ExecutionResult<String> {
    command
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|source| ExecutionError::Spawn {
        program: PathBuf::from(command.get_program()),
        source,
    })?;

    let stdout = child.stdout.take().map(pump);
    let stderr = child.stderr.take().map(pump);

    // the pipe is dropped after writing, which lets the interpreter start.
    // A child that exits early breaks the pipe; its diagnostic still wins.
    let written = match (stdin, child.stdin.take()) {
        (Some(text), Some(mut pipe)) => pipe.write_all(text.as_bytes()),
        _ => Ok(()),
    };

    let status = child.wait();
    let output = join(stdout);
    let errors = join(stderr);

    if let Ok(errors) = &errors {
        if !errors.trim().is_empty() {
            return Err(ExecutionError::from_diagnostic(errors, script));
        }
    }
    written?;
    let status = status?;
    let output = output?;
    errors?;
    tracing::trace!("{:?} exited with {}", command.get_program(), status);

    if !status.success() {
        return Err(ExecutionError::Script {
            diagnostic: format!("{:?} exited with {}", command.get_program(), status),
            script: script.to_string(),
        });
    }
    Ok(output.trim_end_matches(['\r', '\n']).to_string())
}
