//! Runtime context and public API
//!
//! A [`Runtime`] owns everything that used to be process-wide state: the
//! codec chain, the global aspects, the type class intern table, the
//! registered applications, the script executor and its listeners. It is
//! cheap to clone and every clone shares the same context, so isolated
//! runtimes (for tests, or for different executors) can coexist.

use parking_lot::RwLock;
use std::sync::Arc;

pub mod application;
pub mod aspect;
pub mod chevron;
pub mod codec;
pub mod codecs;
pub mod config;
pub mod date;
pub mod error;
pub mod invocation;
pub mod metadata;
pub mod quote;
pub mod reference;
pub mod session;
pub mod type_class;
pub mod value;

pub use config::RuntimeConfig;

use crate::execution::{
    CompiledScriptCache, ExecutionEvent, ExecutionListener, ExecutionResult, OsascriptExecutor,
    ScriptExecutor,
};
use application::ApplicationRegistry;
use aspect::Aspect;
use codec::{Codec, CodecRegistry};
use error::Result;
use invocation::ObjectInvocationHandler;
use metadata::ApplicationDescriptor;
use reference::{ObjectRef, Reference};
use session::Session;
use type_class::{TypeClass, TypeClassTable};
use value::{Value, ValueType};

struct Inner {
    config: RuntimeConfig,
    executor: Arc<dyn ScriptExecutor>,
    codecs: CodecRegistry,
    aspects: RwLock<Vec<Arc<dyn Aspect>>>,
    type_classes: TypeClassTable,
    applications: ApplicationRegistry,
    listeners: RwLock<Vec<ExecutionListener>>,
}

/// Shared runtime context
#[derive(Clone)]
pub struct Runtime {
    inner: Arc<Inner>,
}

impl Runtime {
    /// Runtime executing through `osascript`, with compiled scripts cached
    /// in [`RuntimeConfig::compiled_script_cache`]
    pub fn new(config: RuntimeConfig) -> Self {
        let cache = CompiledScriptCache::new(
            config.compiled_script_cache.clone(),
            config.osacompile_program.clone(),
        );
        let executor = OsascriptExecutor::new(config.osascript_program.clone())
            .with_compiled_cache(cache);
        Self::with_executor(config, Arc::new(executor))
    }

    /// Runtime executing through a caller-supplied executor
    pub fn with_executor(config: RuntimeConfig, executor: Arc<dyn ScriptExecutor>) -> Self {
        let codecs = CodecRegistry::with_codecs(codecs::builtin_codecs(&config.date_locale));
        Self {
            inner: Arc::new(Inner {
                config,
                executor,
                codecs,
                aspects: RwLock::new(aspect::default_global_aspects()),
                type_classes: TypeClassTable::new(),
                applications: ApplicationRegistry::new(),
                listeners: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Configuration this runtime was built with
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// Codec chain
    pub fn codecs(&self) -> &CodecRegistry {
        &self.inner.codecs
    }

    /// Registered applications
    pub fn applications(&self) -> &ApplicationRegistry {
        &self.inner.applications
    }

    /// Intern table for application-independent type classes
    pub fn type_classes(&self) -> &TypeClassTable {
        &self.inner.type_classes
    }

    /// Register an application's generated metadata and return a handler for
    /// its root object, `application "<name>"`
    pub fn register_application(
        &self,
        descriptor: ApplicationDescriptor,
        name: &str,
    ) -> Result<ObjectInvocationHandler> {
        let application_reference = format!("application \"{name}\"");
        let model = self
            .inner
            .applications
            .register(descriptor, &application_reference)?;
        let root = ObjectRef::new(
            model.descriptor().interface.clone(),
            Reference::application(application_reference),
        );
        Ok(self.handler(root))
    }

    /// Handler driving `object` through this runtime
    pub fn handler(&self, object: ObjectRef) -> ObjectInvocationHandler {
        ObjectInvocationHandler::new(self.clone(), object)
    }

    /// Open a batching session
    pub fn start_session(&self) -> Session {
        Session::new(self.clone())
    }

    /// Append a global aspect (wraps outside any session aspects)
    pub fn add_global_aspect(&self, aspect: Arc<dyn Aspect>) {
        self.inner.aspects.write().push(aspect);
    }

    /// Remove a global aspect instance
    pub fn remove_global_aspect(&self, aspect: &Arc<dyn Aspect>) -> bool {
        let mut aspects = self.inner.aspects.write();
        let before = aspects.len();
        aspects.retain(|a| !Arc::ptr_eq(a, aspect));
        aspects.len() != before
    }

    /// Snapshot of the global aspects
    pub fn global_aspects(&self) -> Vec<Arc<dyn Aspect>> {
        self.inner.aspects.read().clone()
    }

    /// Append a codec after the built-in ones
    pub fn add_codec(&self, codec: Arc<dyn Codec>) {
        self.inner.codecs.add(codec);
    }

    /// Insert a codec ahead of the built-in ones
    pub fn add_codec_first(&self, codec: Arc<dyn Codec>) {
        self.inner.codecs.add_first(codec);
    }

    /// Remove a codec instance
    pub fn remove_codec(&self, codec: &Arc<dyn Codec>) -> bool {
        self.inner.codecs.remove(codec)
    }

    /// Register a listener notified around every execution
    pub fn add_execution_listener(&self, listener: ExecutionListener) {
        self.inner.listeners.write().push(listener);
    }

    /// Decode `reference` as `target`
    pub fn decode(&self, target: &ValueType, reference: &Reference) -> Result<Value> {
        self.inner
            .codecs
            .decode(&self.inner.applications, target, reference)
    }

    /// Encode `value` for embedding in script text
    pub fn encode(&self, value: &Value) -> Result<String> {
        self.inner.codecs.encode(&self.inner.applications, value)
    }

    /// Interned type class for `(name, code)` when no application is given,
    /// a fresh one otherwise
    pub fn type_class(
        &self,
        name: Option<&str>,
        code: Option<&str>,
        application: Option<&str>,
        superclass: Option<Arc<TypeClass>>,
    ) -> Arc<TypeClass> {
        self.inner
            .type_classes
            .get_instance(name, code, application, superclass)
    }

    /// Resolve a reported type class to its declared counterpart.
    ///
    /// Classes scoped to an application resolve through that application's
    /// metadata; others through the intern table. Unknown classes come back
    /// unchanged.
    pub fn intern_type_class(&self, type_class: TypeClass) -> TypeClass {
        if type_class.application_reference().is_some() {
            return self.inner.applications.intern(type_class);
        }
        let cached = type_class
            .code_text()
            .and_then(|code| self.inner.type_classes.lookup(code))
            .or_else(|| {
                type_class
                    .name()
                    .and_then(|name| self.inner.type_classes.lookup(name))
            });
        match cached {
            Some(cached) => (*cached).clone(),
            None => type_class,
        }
    }

    /// Execute raw script text, bypassing aspects and sessions
    pub fn execute(&self, script: &str) -> Result<String> {
        Ok(self.run(script, false)?)
    }

    /// Wrap `fragment` with the global aspects and the session's aspects
    pub fn wrap(&self, application: Option<&str>, session: Option<&Session>, fragment: &str) -> String {
        let global = self.inner.aspects.read();
        aspect::wrap(&global, session.map(Session::aspects), application, fragment)
    }

    pub(crate) fn run(&self, script: &str, compile: bool) -> ExecutionResult<String> {
        self.notify(&ExecutionEvent::started(script));
        tracing::debug!("Executing script:\n{}", script);
        let result = if compile {
            self.inner.executor.execute_compiled(script)
        } else {
            self.inner.executor.execute(script)
        };
        match &result {
            Ok(text) => {
                tracing::debug!("Result: {}", truncate(text, self.inner.config.max_logged_result_len));
                self.notify(&ExecutionEvent::finished(script, Some(text)));
            }
            Err(err) => {
                tracing::debug!("Execution failed: {}", err);
                self.notify(&ExecutionEvent::finished(script, None));
            }
        }
        result
    }

    fn notify(&self, event: &ExecutionEvent) {
        let listeners = self.inner.listeners.read().clone();
        for listener in listeners {
            listener(event);
        }
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.inner.config)
            .field("codecs", &self.inner.codecs.codecs().len())
            .field("aspects", &self.inner.aspects.read().len())
            .field("type_classes", &self.inner.type_classes.len())
            .finish()
    }
}
