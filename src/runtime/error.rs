//! Error types for the tellscript runtime
//!
//! Domain errors use thiserror. Wire-format problems are `FormatError`s,
//! interpreter failures are `ExecutionError`s, and both fold into the
//! top-level `ScriptError` that every engine call returns.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level runtime error
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Malformed wire text
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Script execution failed
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// Missing or inconsistent interface metadata
    #[error("Configuration error: {0}")]
    Config(String),

    /// A codec rejected the text it was asked to decode
    #[error("Failed to decode '{reference}' as {target}: {source}")]
    Decode {
        /// Target value type
        target: String,
        /// Object reference text that failed to decode
        reference: String,
        /// Underlying format problem
        #[source]
        source: FormatError,
    },

    /// Element index below zero
    #[error("Index {0} is out of bounds, element indices start at 0")]
    IndexOutOfBounds(i64),

    /// Method not declared on the interface or its superclasses
    #[error("Interface '{interface}' declares no method '{method}'")]
    UnknownMethod {
        /// Interface name
        interface: String,
        /// Requested method
        method: String,
    },

    /// Arguments do not fit the declared signature
    #[error("Invalid arguments for '{method}': {detail}")]
    Arguments {
        /// Method name
        method: String,
        /// What went wrong
        detail: String,
    },
}

/// Convenience result alias for engine operations
pub type Result<T> = std::result::Result<T, ScriptError>;

/// Wire-format errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Chevron literal does not have the `«kind code»` shape
    #[error("Malformed chevron '{text}': {detail}")]
    Chevron {
        /// Offending text
        text: String,
        /// Description of the problem
        detail: String,
    },

    /// Unbalanced braces or quotes in a list
    #[error("Malformed list '{0}'")]
    List(String),

    /// Record entry without a key or unbalanced record text
    #[error("Malformed record '{text}': {detail}")]
    Record {
        /// Offending text
        text: String,
        /// Description of the problem
        detail: String,
    },

    /// Numeric text could not be parsed
    #[error("Malformed number '{text}': {detail}")]
    Number {
        /// Offending text
        text: String,
        /// Parser message
        detail: String,
    },

    /// Boolean result that is neither `true` nor `false`
    #[error("Malformed boolean '{0}'")]
    Boolean(String),

    /// No known date format matched
    #[error("Unparseable date '{0}'")]
    Date(String),

    /// `«data ...»` literal with a bad type code or hex payload
    #[error("Malformed data literal '{0}'")]
    Data(String),

    /// Brace-delimited numeric tuple with the wrong arity
    #[error("Malformed {kind} '{text}'")]
    Tuple {
        /// Tuple kind, e.g. "point"
        kind: &'static str,
        /// Offending text
        text: String,
    },
}

/// Convenience result alias for wire-format parsing
pub type FormatResult<T> = std::result::Result<T, FormatError>;

impl FormatError {
    pub(crate) fn number(text: &str, err: impl std::fmt::Display) -> Self {
        FormatError::Number {
            text: text.to_string(),
            detail: err.to_string(),
        }
    }
}

/// Script execution errors
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The interpreter reported an error
    #[error("{diagnostic}\nScript:\n{script}")]
    Script {
        /// Interpreter diagnostic with unicode escapes resolved
        diagnostic: String,
        /// Script that was executed
        script: String,
    },

    /// A scripting addition failed to load
    #[error("Bad scripting addition: {diagnostic}")]
    BadScriptingAddition {
        /// Interpreter diagnostic
        diagnostic: String,
        /// Scripting addition bundles named in the diagnostic
        offenders: Vec<PathBuf>,
    },

    /// Interpreter process could not be started
    #[error("Failed to launch {program:?}: {source}")]
    Spawn {
        /// Program that failed to start
        program: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Stream or filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience result alias for executors
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

const DYLD_LOAD_FAILURE: &str = "dyld returns 2 when trying to load";

impl ExecutionError {
    /// Classify interpreter error output
    pub fn from_diagnostic(stderr: &str, script: &str) -> Self {
        let diagnostic = unescape_unicode(stderr.trim_end());
        if diagnostic.contains(DYLD_LOAD_FAILURE) {
            let offenders = diagnostic
                .lines()
                .filter_map(|line| {
                    let start = line.find(DYLD_LOAD_FAILURE)? + DYLD_LOAD_FAILURE.len();
                    let path = line[start..].trim();
                    (!path.is_empty()).then(|| PathBuf::from(path))
                })
                .collect();
            ExecutionError::BadScriptingAddition {
                diagnostic,
                offenders,
            }
        } else {
            ExecutionError::Script {
                diagnostic,
                script: script.to_string(),
            }
        }
    }
}

/// Replace `\UXXXX` escapes emitted by the interpreter with the characters they name
pub fn unescape_unicode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("\\U") {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos + 2..];
        let decoded = candidate
            .get(..4)
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &candidate[4..];
            }
            None => {
                out.push_str("\\U");
                rest = candidate;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_unicode() {
        assert_eq!(unescape_unicode("caf\\U00e9"), "café");
        assert_eq!(unescape_unicode("no escapes"), "no escapes");
        assert_eq!(unescape_unicode("broken \\Uzz"), "broken \\Uzz");
    }

    #[test]
    fn test_bad_scripting_addition_detection() {
        let stderr = "osascript: /Library/ScriptingAdditions/Foo.osax: \
                      dyld returns 2 when trying to load /Library/ScriptingAdditions/Foo.osax\n";
        match ExecutionError::from_diagnostic(stderr, "quit") {
            ExecutionError::BadScriptingAddition { offenders, .. } => {
                assert_eq!(
                    offenders,
                    vec![PathBuf::from("/Library/ScriptingAdditions/Foo.osax")]
                );
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_script_error_keeps_script() {
        let err = ExecutionError::from_diagnostic("execution error: boom (-1728)", "quit");
        match err {
            ExecutionError::Script { diagnostic, script } => {
                assert_eq!(diagnostic, "execution error: boom (-1728)");
                assert_eq!(script, "quit");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
