//! In-process executor that records scripts instead of running them

use parking_lot::Mutex;
use std::collections::VecDeque;

use super::{ExecutionError, ExecutionResult, ScriptExecutor};

/// Records every script it is given and answers from a queue.
///
/// When the queue is empty the answer is the empty string: fine for void
/// calls and objects, a format error for numbers, booleans and dates.
#[derive(Debug, Default)]
pub struct StubExecutor {
    scripts: Mutex<Vec<String>>,
    compiled: Mutex<Vec<String>>,
    replies: Mutex<VecDeque<ExecutionResult<String>>>,
}

impl StubExecutor {
    /// Executor with no queued replies
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful result
    pub fn reply(&self, result: impl Into<String>) -> &Self {
        self.replies.lock().push_back(Ok(result.into()));
        self
    }

    /// Queue an interpreter error with `diagnostic` as its error output
    pub fn fail(&self, diagnostic: impl Into<String>) -> &Self {
        self.replies.lock().push_back(Err(ExecutionError::Script {
            diagnostic: diagnostic.into(),
            script: String::new(),
        }));
        self
    }

    /// Every script executed so far, in order
    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().clone()
    }

    /// Scripts that went through [`ScriptExecutor::execute_compiled`]
    pub fn compiled_scripts(&self) -> Vec<String> {
        self.compiled.lock().clone()
    }

    /// Most recent script
    pub fn last_script(&self) -> Option<String> {
        self.scripts.lock().last().cloned()
    }

    /// Number of executions
    pub fn executions(&self) -> usize {
        self.scripts.lock().len()
    }

    /// Forget recorded scripts (queued replies stay)
    pub fn clear(&self) {
        self.scripts.lock().clear();
        self.compiled.lock().clear();
    }

    fn answer(&self, script: &str) -> ExecutionResult<String> {
        match self.replies.lock().pop_front() {
            Some(Err(ExecutionError::Script { diagnostic, .. })) => {
                Err(ExecutionError::from_diagnostic(&diagnostic, script))
            }
            Some(reply) => reply,
            None => Ok(String::new()),
        }
    }
}

impl ScriptExecutor for StubExecutor {
    fn execute(&self, script: &str) -> ExecutionResult<String> {
        self.scripts.lock().push(script.to_string());
        self.answer(script)
    }

    fn execute_compiled(&self, script: &str) -> ExecutionResult<String> {
        self.compiled.lock().push(script.to_string());
        self.execute(script)
    }
}
