//! Application class descriptors and the class hierarchy
//!
//! A [`TypeClass`] names an AppleScript class by name and/or chevron code and
//! links to its superclass. Comparisons between type classes go through
//! [`TypeClass::loosely_equals`], which cross-matches names and codes because
//! the interpreter reports classes inconsistently (sometimes `folder`,
//! sometimes `«class cfol»`). `PartialEq` stays structural.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::chevron::{self, Chevron};

/// Runtime descriptor of an application-defined class
#[derive(Debug, Clone, PartialEq)]
pub struct TypeClass {
    name: Option<String>,
    code: Option<String>,
    application: Option<String>,
    application_interface: Option<String>,
    superclass: Option<Arc<TypeClass>>,
}

impl TypeClass {
    /// Fully specified type class
    pub fn new(
        name: Option<&str>,
        code: Option<&str>,
        application: Option<&str>,
        superclass: Option<Arc<TypeClass>>,
    ) -> Self {
        Self {
            name: name.map(str::to_string),
            code: code.map(str::to_string),
            application: application.map(str::to_string),
            application_interface: None,
            superclass,
        }
    }

    /// Built-in class marker, e.g. `TypeClass::builtin("text", "ctxt")`
    pub fn builtin(name: &str, code: &str) -> Self {
        Self::new(Some(name), Some(&format!("«class {code}»")), None, None)
    }

    /// Type class from interpreter output such as `folder` or `«class cfol»`
    pub fn from_reference(object: &str, application: Option<&str>) -> Self {
        let object = object.trim();
        let code = object.starts_with(chevron::OPEN).then_some(object);
        Self::new(Some(object), code, application, None)
    }

    /// Attach the interface name of the owning application
    pub fn with_application_interface(mut self, interface: impl Into<String>) -> Self {
        self.application_interface = Some(interface.into());
        self
    }

    /// AppleScript class name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Chevron text of the class code, e.g. `«class cfol»`
    pub fn code_text(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Parsed class code
    pub fn code(&self) -> Option<Chevron> {
        self.code.as_deref().and_then(|c| Chevron::parse(c).ok())
    }

    /// Application reference this class was reported by
    pub fn application_reference(&self) -> Option<&str> {
        self.application.as_deref()
    }

    /// Interface name of the owning application, if known
    pub fn application_interface(&self) -> Option<&str> {
        self.application_interface.as_deref()
    }

    /// Direct superclass
    pub fn superclass(&self) -> Option<&Arc<TypeClass>> {
        self.superclass.as_ref()
    }

    /// Name-or-code cross matching.
    ///
    /// True if the names match, this name matches the other code, the codes
    /// match, or this code matches the other name. Absent names compare equal.
    pub fn loosely_equals(&self, other: &TypeClass) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        self.name == other.name
            || self.name == other.code
            || (self.code.is_some() && self.code == other.code)
            || (self.code.is_some() && self.code == other.name)
    }

    /// Whether `other` is this class or one of its subclasses
    pub fn is_assignable_from(&self, other: &TypeClass) -> bool {
        self.ancestor_of(Some(other))
    }

    pub(crate) fn ancestor_of(&self, mut candidate: Option<&TypeClass>) -> bool {
        while let Some(class) = candidate {
            if class.loosely_equals(self) {
                return true;
            }
            candidate = class.superclass.as_deref();
        }
        false
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, &self.code) {
            (Some(name), Some(code)) if name == code => f.write_str(name),
            (name, code) => write!(
                f,
                "{}/{}",
                name.as_deref().unwrap_or("null"),
                code.as_deref().unwrap_or("null")
            ),
        }
    }
}

/// Intern table for application-independent type classes.
///
/// Entries are keyed by name and by code, and only classes built without an
/// application reference are cached. Class names are not unique across
/// applications, so scoped classes are always built fresh.
#[derive(Debug, Default)]
pub struct TypeClassTable {
    entries: Mutex<HashMap<String, Arc<TypeClass>>>,
}

impl TypeClassTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached class for `name`, or build and cache a new one
    pub fn get_instance(
        &self,
        name: Option<&str>,
        code: Option<&str>,
        application: Option<&str>,
        superclass: Option<Arc<TypeClass>>,
    ) -> Arc<TypeClass> {
        let mut entries = self.entries.lock();
        if let Some(existing) = name.and_then(|n| entries.get(n)) {
            return Arc::clone(existing);
        }
        let class = Arc::new(TypeClass::new(name, code, application, superclass));
        if let (Some(name), Some(code), None) = (name, code, application) {
            entries.insert(name.to_string(), Arc::clone(&class));
            entries.insert(code.to_string(), Arc::clone(&class));
        }
        class
    }

    /// Look up a cached class by name or code
    pub fn lookup(&self, key: &str) -> Option<Arc<TypeClass>> {
        self.entries.lock().get(key).cloned()
    }

    /// Number of distinct cached keys
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing has been interned yet
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (Arc<TypeClass>, Arc<TypeClass>, Arc<TypeClass>) {
        let a = Arc::new(TypeClass::new(Some("item"), Some("«class cobj»"), None, None));
        let b = Arc::new(TypeClass::new(
            Some("container"),
            Some("«class ctnr»"),
            None,
            Some(a.clone()),
        ));
        let c = Arc::new(TypeClass::new(
            Some("folder"),
            Some("«class cfol»"),
            None,
            Some(b.clone()),
        ));
        (a, b, c)
    }

    #[test]
    fn test_assignability_along_chain() {
        let (a, b, c) = chain();
        assert!(a.is_assignable_from(&c));
        assert!(a.is_assignable_from(&b));
        assert!(b.is_assignable_from(&c));
        assert!(c.is_assignable_from(&c));
        assert!(!c.is_assignable_from(&a));
        assert!(!b.is_assignable_from(&a));
    }

    #[test]
    fn test_loose_equality_cross_matches() {
        let by_name = TypeClass::new(Some("folder"), Some("«class cfol»"), None, None);
        let by_code = TypeClass::from_reference("«class cfol»", None);
        assert!(by_name.loosely_equals(&by_code));
        assert!(by_code.loosely_equals(&by_name));
        assert_ne!(by_name, by_code);

        let other = TypeClass::new(Some("file"), Some("«class file»"), None, None);
        assert!(!by_name.loosely_equals(&other));
    }

    #[test]
    fn test_from_reference_sets_code_for_chevrons() {
        let plain = TypeClass::from_reference("folder", Some("application \"Finder\""));
        assert_eq!(plain.code_text(), None);
        assert_eq!(plain.application_reference(), Some("application \"Finder\""));

        let coded = TypeClass::from_reference("«class cfol»", None);
        assert_eq!(coded.code().map(|c| c.code().to_string()), Some("cfol".into()));
        assert_eq!(coded.to_string(), "«class cfol»");
    }

    #[test]
    fn test_intern_only_without_application() {
        let table = TypeClassTable::new();
        let first = table.get_instance(Some("folder"), Some("«class cfol»"), None, None);
        let second = table.get_instance(Some("folder"), None, None, None);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(table.lookup("«class cfol»").is_some());

        let scoped = table.get_instance(
            Some("track"),
            Some("«class cTrk»"),
            Some("application \"Music\""),
            None,
        );
        let again = table.get_instance(
            Some("track"),
            Some("«class cTrk»"),
            Some("application \"Music\""),
            None,
        );
        assert!(!Arc::ptr_eq(&scoped, &again));
        assert!(table.lookup("track").is_none());
    }
}
