//! Addressable handles into an application's object graph

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Object part plus application part of an AppleScript object specifier.
///
/// Equality compares both parts; hashing only looks at the object part.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Reference {
    object: Option<String>,
    application: Option<String>,
}

impl Reference {
    /// Create a reference from its two parts
    pub fn new(object: Option<String>, application: Option<String>) -> Self {
        Self {
            object,
            application,
        }
    }

    /// Reference to an object inside an application
    pub fn object(object: impl Into<String>, application: Option<&str>) -> Self {
        Self::new(Some(object.into()), application.map(str::to_string))
    }

    /// Reference to the application root, e.g. `application "Finder"`
    pub fn application(application: impl Into<String>) -> Self {
        Self::new(None, Some(application.into()))
    }

    /// Object part, `None` for the application root
    pub fn object_reference(&self) -> Option<&str> {
        self.object.as_deref()
    }

    /// Application part
    pub fn application_reference(&self) -> Option<&str> {
        self.application.as_deref()
    }

    /// Object text or the empty string
    pub fn object_text(&self) -> &str {
        self.object.as_deref().unwrap_or("")
    }

    /// Whether the object part is a record literal `{...}`
    pub fn is_record(&self) -> bool {
        self.object
            .as_deref()
            .is_some_and(|o| o.starts_with('{') && o.ends_with('}'))
    }

    /// `" of <object>"`, or nothing for the application root
    pub fn of_clause(&self) -> String {
        match &self.object {
            Some(object) => format!(" of {object}"),
            None => String::new(),
        }
    }

    /// Same application, different object text
    pub fn sibling(&self, object: impl Into<String>) -> Self {
        Self::new(Some(object.into()), self.application.clone())
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.object == other.object && self.application == other.application
    }
}

impl Hash for Reference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.object.hash(state);
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}]: {}",
            self.application.as_deref().unwrap_or("null"),
            self.object.as_deref().unwrap_or("null")
        )
    }
}

/// Element identifier used by `<type> id <n> of ...` specifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Id(pub i64);

impl Id {
    /// Numeric identifier
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id {}", self.0)
    }
}

/// A reference bound to the generated interface it should be driven through
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Interface name as declared in the application metadata
    pub interface: String,
    /// Underlying specifier
    pub reference: Reference,
}

impl ObjectRef {
    /// Bind a reference to an interface
    pub fn new(interface: impl Into<String>, reference: Reference) -> Self {
        Self {
            interface: interface.into(),
            reference,
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.reference.fmt(f)
    }
}
