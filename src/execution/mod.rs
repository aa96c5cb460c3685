//! Script execution backends
//!
//! The runtime only needs "run this script text, give me its result text".
//! [`OsascriptExecutor`] does that through the `osascript` binary;
//! [`StubExecutor`] records scripts and replays canned results so the engine
//! can be driven without an interpreter.

pub mod compile;
pub mod osascript;
pub mod stub;

use std::fmt;
use std::sync::Arc;

pub use crate::runtime::error::{ExecutionError, ExecutionResult};
pub use compile::CompiledScriptCache;
pub use osascript::OsascriptExecutor;
pub use stub::StubExecutor;

/// Runs script text and returns the interpreter's result text.
///
/// Any output on the interpreter's error stream is a failure and must come
/// back as [`ExecutionError::Script`] (or one of its refinements), carrying
/// the script that caused it.
pub trait ScriptExecutor: Send + Sync {
    /// Run `script` as source text
    fn execute(&self, script: &str) -> ExecutionResult<String>;

    /// Run `script`, compiling it first if the backend supports that
    fn execute_compiled(&self, script: &str) -> ExecutionResult<String> {
        self.execute(script)
    }
}

/// Notification sent to listeners before and after each execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionEvent {
    /// Script text that is being executed
    pub script: String,
    /// `true` for the start notification, `false` once finished
    pub started: bool,
    /// Result text, only present on successful finish
    pub result: Option<String>,
}

impl ExecutionEvent {
    /// Start notification
    pub fn started(script: &str) -> Self {
        Self {
            script: script.to_string(),
            started: true,
            result: None,
        }
    }

    /// Finish notification
    pub fn finished(script: &str, result: Option<&str>) -> Self {
        Self {
            script: script.to_string(),
            started: false,
            result: result.map(str::to_string),
        }
    }

    /// Whether this is the finish notification
    pub fn is_finished(&self) -> bool {
        !self.started
    }
}

impl fmt::Display for ExecutionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = if self.started { "started" } else { "finished" };
        write!(f, "execution {phase}: {} bytes of script", self.script.len())
    }
}

/// Callback invoked with every [`ExecutionEvent`]
pub type ExecutionListener = Arc<dyn Fn(&ExecutionEvent) + Send + Sync>;
