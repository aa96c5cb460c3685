//! Tellscript – typed access to scriptable macOS applications
//!
//! Applications are described by generated metadata (classes, properties,
//! elements, commands, enumerations). The runtime turns calls against that
//! metadata into AppleScript fragments, executes them through `osascript`
//! (directly or batched in a session) and decodes the textual results back
//! into typed values:
//! - Ordered, extensible codec chain for the interpreter's wire format
//! - Class hierarchy aware instance checks
//! - Aspect wrapping (`tell`, timeouts, helper handlers)
//! - Explicit batching sessions with optional compiled-script caching

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Script executors
pub mod execution;
/// Runtime context, codecs and dispatch
pub mod runtime;

// Re-export key types for convenience
pub use execution::{ExecutionEvent, ScriptExecutor, StubExecutor};
pub use runtime::error::{ExecutionError, FormatError, Result, ScriptError};
pub use runtime::invocation::ObjectInvocationHandler;
pub use runtime::metadata::ApplicationDescriptor;
pub use runtime::reference::{Id, ObjectRef, Reference};
pub use runtime::session::Session;
pub use runtime::type_class::TypeClass;
pub use runtime::value::{Value, ValueType};
pub use runtime::{Runtime, RuntimeConfig};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install a `RUST_LOG`-filtered fmt subscriber at INFO by default.
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}
