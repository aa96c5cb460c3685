//! Explicit batching sessions
//!
//! A [`Session`] collects already-wrapped script fragments and sends them to
//! the interpreter as one script. It is a plain value owned by the caller and
//! passed to each call that should batch; nothing is bound to the current
//! thread.

use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use super::Runtime;
use super::aspect::{Aspect, Timeout};
use super::error::Result;

/// Timeout value meaning "interpreter default"
pub const DEFAULT_TIMEOUT: i32 = -1;

/// Buffer of pending script fragments plus per-session aspects
pub struct Session {
    id: Uuid,
    runtime: Runtime,
    script: String,
    aspects: Vec<Arc<dyn Aspect>>,
    timeout: i32,
    ignore_return_values: bool,
    compile: bool,
}

impl Session {
    pub(crate) fn new(runtime: Runtime) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            runtime,
            script: String::new(),
            aspects: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            ignore_return_values: false,
            compile: false,
        };
        tracing::debug!(session = %session.id, "Session started");
        session
    }

    /// Identifier carried in log records
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Append a fragment; fragments are separated by newlines
    pub fn add(&mut self, fragment: &str) {
        self.script.push_str(fragment);
        self.script.push('\n');
    }

    /// Discard all pending fragments; aspects and flags stay
    pub fn reset(&mut self) {
        if !self.script.is_empty() {
            tracing::debug!(session = %self.id, "Discarding {} bytes of pending script", self.script.len());
        }
        self.script.clear();
    }

    /// Pending script text
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }

    /// Execute the pending script as one unit and close the session.
    ///
    /// Nothing is executed when no fragments are pending.
    pub fn commit(mut self) -> Result<()> {
        if self.script.is_empty() {
            return Ok(());
        }
        self.flush()?;
        Ok(())
    }

    /// Execute everything pending and clear the buffer, even on failure
    pub(crate) fn flush(&mut self) -> Result<String> {
        let script = std::mem::take(&mut self.script);
        tracing::debug!(session = %self.id, "Executing {} bytes of batched script", script.len());
        Ok(self.runtime.run(&script, self.compile)?)
    }

    /// Append a session aspect; it wraps fragments inside the global aspects
    pub fn add_aspect(&mut self, aspect: Arc<dyn Aspect>) {
        self.aspects.push(aspect);
    }

    /// Remove a previously added aspect instance
    pub fn remove_aspect(&mut self, aspect: &Arc<dyn Aspect>) -> bool {
        let before = self.aspects.len();
        self.aspects.retain(|a| !Arc::ptr_eq(a, aspect));
        self.aspects.len() != before
    }

    /// Session aspects in wrapping order
    pub fn aspects(&self) -> &[Arc<dyn Aspect>] {
        &self.aspects
    }

    /// Timeout in seconds, or [`DEFAULT_TIMEOUT`]
    pub fn timeout(&self) -> i32 {
        self.timeout
    }

    /// Wrap subsequent fragments in `with timeout of N seconds`.
    ///
    /// Any earlier timeout wrapper is replaced; `seconds <= 0` removes it.
    pub fn set_timeout(&mut self, seconds: i32) {
        self.aspects.retain(|a| a.timeout_seconds().is_none());
        match u32::try_from(seconds) {
            Ok(secs) if secs > 0 => {
                self.aspects.insert(0, Arc::new(Timeout::new(secs)));
                self.timeout = seconds;
            }
            _ => self.timeout = DEFAULT_TIMEOUT,
        }
    }

    /// Whether no explicit timeout is set
    pub fn is_default_timeout(&self) -> bool {
        self.timeout <= 0
    }

    /// Whether calls with return values are batched too (returning null)
    pub fn ignores_return_values(&self) -> bool {
        self.ignore_return_values
    }

    /// Batch calls even when they declare a return value
    pub fn set_ignore_return_values(&mut self, ignore: bool) {
        self.ignore_return_values = ignore;
    }

    /// Whether batched scripts are compiled before running
    pub fn compiles(&self) -> bool {
        self.compile
    }

    /// Compile batched scripts and reuse the compiled form
    pub fn set_compile(&mut self, compile: bool) {
        self.compile = compile;
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("pending", &self.script.len())
            .field("aspects", &self.aspects.len())
            .field("timeout", &self.timeout)
            .field("ignore_return_values", &self.ignore_return_values)
            .field("compile", &self.compile)
            .finish()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.script.is_empty() {
            tracing::warn!(
                session = %self.id,
                "Session dropped with uncommitted fragments, discarding:\n{}",
                self.script
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::StubExecutor;
    use crate::runtime::config::RuntimeConfig;

    fn runtime() -> (Runtime, Arc<StubExecutor>) {
        let stub = Arc::new(StubExecutor::new());
        (Runtime::with_executor(RuntimeConfig::default(), stub.clone()), stub)
    }

    #[test]
    fn test_add_appends_newline() {
        let (runtime, _) = runtime();
        let mut session = runtime.start_session();
        session.add("a");
        session.add("b");
        assert_eq!(session.script(), "a\nb\n");
        session.reset();
    }

    #[test]
    fn test_reset_then_commit_is_noop() {
        let (runtime, stub) = runtime();
        let mut session = runtime.start_session();
        session.add("quit");
        session.reset();
        assert!(session.script().is_empty());
        session.commit().unwrap();
        assert_eq!(stub.executions(), 0);
    }

    #[test]
    fn test_commit_sends_buffer_once() {
        let (runtime, stub) = runtime();
        let mut session = runtime.start_session();
        session.add("a");
        session.add("b");
        session.commit().unwrap();
        assert_eq!(stub.scripts(), vec!["a\nb\n"]);
    }

    #[test]
    fn test_compile_routes_through_compiled_execution() {
        let (runtime, stub) = runtime();
        let mut session = runtime.start_session();
        session.set_compile(true);
        session.add("quit");
        session.commit().unwrap();
        assert_eq!(stub.compiled_scripts(), vec!["quit\n"]);
    }

    #[test]
    fn test_timeout_is_first_and_unique() {
        let (runtime, _) = runtime();
        let mut session = runtime.start_session();
        assert_eq!(session.timeout(), DEFAULT_TIMEOUT);
        assert!(session.is_default_timeout());

        session.add_aspect(Arc::new(crate::runtime::aspect::Tell));
        session.set_timeout(5);
        session.set_timeout(7);
        assert_eq!(session.aspects().len(), 2);
        assert_eq!(session.aspects()[0].timeout_seconds(), Some(7));
        assert_eq!(session.timeout(), 7);

        session.set_timeout(0);
        assert_eq!(session.aspects().len(), 1);
        assert!(session.is_default_timeout());
    }

    #[test]
    fn test_remove_aspect_by_instance() {
        let (runtime, _) = runtime();
        let mut session = runtime.start_session();
        let aspect: Arc<dyn Aspect> = Arc::new(Timeout::new(3));
        session.add_aspect(aspect.clone());
        assert!(session.remove_aspect(&aspect));
        assert!(!session.remove_aspect(&aspect));
    }
}
