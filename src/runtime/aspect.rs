//! Before/after wrappers applied around every executed script fragment

use std::sync::Arc;

/// A pair of hooks contributing lines before and after a script body.
///
/// Returning `None` contributes nothing, not even an empty line.
pub trait Aspect: Send + Sync {
    /// Line emitted ahead of `body`
    fn before(&self, application: Option<&str>, body: &str) -> Option<String>;

    /// Line emitted after `body`
    fn after(&self, application: Option<&str>, body: &str) -> Option<String>;

    /// `Some(seconds)` for timeout wrappers; sessions keep at most one
    fn timeout_seconds(&self) -> Option<u32> {
        None
    }
}

/// `tell <application>` ... `end tell`
#[derive(Debug, Clone, Copy, Default)]
pub struct Tell;

impl Aspect for Tell {
    fn before(&self, application: Option<&str>, _body: &str) -> Option<String> {
        application.map(|app| format!("tell {app}"))
    }

    fn after(&self, application: Option<&str>, _body: &str) -> Option<String> {
        application.map(|_| "end tell".to_string())
    }
}

const CREATE_DATE_CALL: &str = "my createDate";

const CREATE_DATE_HANDLER: &str = "on createDate(y, m, d, h, min, s)
\tset dateVar to (current date)
\tset year of dateVar to y
\tset month of dateVar to m
\tset day of dateVar to d
\tset hours of dateVar to h
\tset minutes of dateVar to min
\tset seconds of dateVar to s
\treturn dateVar
end createDate";

/// Appends the `createDate` handler that encoded dates call
#[derive(Debug, Clone, Copy, Default)]
pub struct DateHelper;

impl Aspect for DateHelper {
    fn before(&self, _application: Option<&str>, _body: &str) -> Option<String> {
        None
    }

    fn after(&self, _application: Option<&str>, body: &str) -> Option<String> {
        body.contains(CREATE_DATE_CALL)
            .then(|| CREATE_DATE_HANDLER.to_string())
    }
}

/// `with timeout of N seconds` ... `end timeout`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout {
    seconds: u32,
}

impl Timeout {
    /// Timeout wrapper for `seconds`
    pub fn new(seconds: u32) -> Self {
        Self { seconds }
    }

    /// Configured seconds
    pub fn seconds(&self) -> u32 {
        self.seconds
    }
}

impl Aspect for Timeout {
    fn before(&self, _application: Option<&str>, _body: &str) -> Option<String> {
        Some(format!("with timeout of {} seconds", self.seconds))
    }

    fn after(&self, _application: Option<&str>, _body: &str) -> Option<String> {
        Some("end timeout".to_string())
    }

    fn timeout_seconds(&self) -> Option<u32> {
        Some(self.seconds)
    }
}

/// Aspects every new runtime starts with: the date helper, then `tell`
pub fn default_global_aspects() -> Vec<Arc<dyn Aspect>> {
    vec![Arc::new(DateHelper), Arc::new(Tell)]
}

/// Wrap `fragment` with the global aspects and, inside them, the session aspects.
///
/// Every emitted line ends in `\r\n`. Session lines, including the fragment,
/// are indented by two spaces when a session is active. After-hooks run in
/// reverse registration order.
pub fn wrap(
    global: &[Arc<dyn Aspect>],
    session: Option<&[Arc<dyn Aspect>]>,
    application: Option<&str>,
    fragment: &str,
) -> String {
    let mut script = String::new();
    let mut line = |indent: &str, text: &str| {
        script.push_str(indent);
        script.push_str(text);
        script.push_str("\r\n");
    };

    for aspect in global {
        if let Some(before) = aspect.before(application, fragment) {
            line("", &before);
        }
    }
    match session {
        Some(aspects) => {
            for aspect in aspects {
                if let Some(before) = aspect.before(application, fragment) {
                    line("  ", &before);
                }
            }
            line("  ", fragment);
            for aspect in aspects.iter().rev() {
                if let Some(after) = aspect.after(application, fragment) {
                    line("  ", &after);
                }
            }
        }
        None => line("", fragment),
    }
    for aspect in global.iter().rev() {
        if let Some(after) = aspect.after(application, fragment) {
            line("", &after);
        }
    }
    script
}
