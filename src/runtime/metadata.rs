//! Generated interface metadata
//!
//! An interface generator describes each scriptable application as plain
//! data: its classes (with superclass links and plurals), the methods on
//! each class tagged with their semantic kind, and its enumerations. The
//! invocation engine dispatches on these descriptors instead of reflecting
//! over types. Descriptors are serde types so generators can emit JSON.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::value::ValueType;

/// Semantic kind of an interface method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    /// Property getter or setter
    Property,
    /// Element list, lookup, count or setter
    Element,
    /// Application command
    Command,
    /// `make new <class>`
    Make,
}

/// One declared method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Keyword preceding the argument, e.g. `to`; `None` for the direct parameter
    #[serde(default)]
    pub keyword: Option<String>,
    /// Declared argument type
    pub value_type: ValueType,
}

impl ParameterDescriptor {
    /// Direct (unlabelled) parameter
    pub fn direct(value_type: ValueType) -> Self {
        Self {
            keyword: None,
            value_type,
        }
    }

    /// Labelled parameter
    pub fn keyword(keyword: &str, value_type: ValueType) -> Self {
        Self {
            keyword: Some(keyword.to_string()),
            value_type,
        }
    }
}

/// One declared interface method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Method name as called from Rust, e.g. `get_name` or `count_windows`
    pub name: String,
    /// Semantic kind
    pub kind: MethodKind,
    /// AppleScript name of the property, element class or command
    #[serde(default)]
    pub script_name: Option<String>,
    /// Four-character code
    #[serde(default)]
    pub code: Option<String>,
    /// Declared AppleScript type, e.g. `window` for element lookups
    #[serde(default)]
    pub script_type: Option<String>,
    /// Declared parameters, in call order
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
    /// Declared return type
    #[serde(default = "void")]
    pub returns: ValueType,
}

fn void() -> ValueType {
    ValueType::Void
}

impl MethodDescriptor {
    fn new(name: &str, kind: MethodKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            script_name: None,
            code: None,
            script_type: None,
            parameters: Vec::new(),
            returns: ValueType::Void,
        }
    }

    /// Property getter, e.g. `get_name` reading `name`
    pub fn property(name: &str, script_name: &str, code: &str, returns: ValueType) -> Self {
        Self {
            script_name: Some(script_name.to_string()),
            code: Some(code.to_string()),
            returns,
            ..Self::new(name, MethodKind::Property)
        }
    }

    /// Property setter, e.g. `set_name` writing `name`
    pub fn property_setter(name: &str, script_name: &str, code: &str, value_type: ValueType) -> Self {
        Self {
            script_name: Some(script_name.to_string()),
            code: Some(code.to_string()),
            parameters: vec![ParameterDescriptor::direct(value_type)],
            ..Self::new(name, MethodKind::Property)
        }
    }

    /// Element accessor; the shape of `parameters` and `returns` selects the form
    pub fn element(
        name: &str,
        script_type: &str,
        parameters: Vec<ParameterDescriptor>,
        returns: ValueType,
    ) -> Self {
        Self {
            script_name: Some(script_type.to_string()),
            script_type: Some(script_type.to_string()),
            parameters,
            returns,
            ..Self::new(name, MethodKind::Element)
        }
    }

    /// Command
    pub fn command(
        name: &str,
        script_name: &str,
        parameters: Vec<ParameterDescriptor>,
        returns: ValueType,
    ) -> Self {
        Self {
            script_name: Some(script_name.to_string()),
            parameters,
            returns,
            ..Self::new(name, MethodKind::Command)
        }
    }

    /// `make` taking an interface name and returning the new object
    pub fn make(name: &str) -> Self {
        Self {
            parameters: vec![ParameterDescriptor::direct(ValueType::Named("class".into()))],
            returns: ValueType::Reference,
            ..Self::new(name, MethodKind::Make)
        }
    }

    /// Whether this is a getter-style method (`get_` / `is_` prefix)
    pub fn is_getter(&self) -> bool {
        self.name.starts_with("get") || self.name.starts_with("is")
    }

    /// Name with the accessor prefix removed: `get_name` becomes `name`
    pub fn accessor_name(&self) -> &str {
        ["get_", "is_", "set_", "count_", "get", "is", "set", "count"]
            .iter()
            .find_map(|prefix| self.name.strip_prefix(prefix))
            .filter(|rest| !rest.is_empty())
            .unwrap_or(&self.name)
    }
}

/// A property, derived from a getter declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    /// AppleScript name, e.g. `name`
    pub script_name: String,
    /// Four-character code, e.g. `pnam`
    pub code: Option<String>,
    /// Rust-facing key, e.g. `name` for `get_name`
    pub rust_name: String,
    /// Declared value type
    pub value_type: ValueType,
}

impl PropertyDescriptor {
    /// Property described by a getter method
    pub fn from_getter(method: &MethodDescriptor) -> Option<Self> {
        if method.kind != MethodKind::Property || !method.is_getter() {
            return None;
        }
        Some(Self {
            script_name: method.script_name.clone()?,
            code: method.code.clone(),
            rust_name: method.accessor_name().to_string(),
            value_type: method.returns.clone(),
        })
    }

    /// `«property pnam»`
    pub fn chevron(&self) -> Option<String> {
        self.code.as_ref().map(|code| format!("«property {code}»"))
    }
}

/// One generated class interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    /// Interface name, e.g. `FinderWindow`
    pub interface: String,
    /// AppleScript class name, e.g. `Finder window`
    #[serde(default)]
    pub name: Option<String>,
    /// Four-character class code
    #[serde(default)]
    pub code: Option<String>,
    /// AppleScript plural, e.g. `Finder windows`
    #[serde(default)]
    pub plural: Option<String>,
    /// Interface name of the superclass
    #[serde(default)]
    pub superclass: Option<String>,
    /// Declared methods
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
}

impl ClassDescriptor {
    /// Class with a name and code and no methods yet
    pub fn new(interface: &str, name: &str, code: &str) -> Self {
        Self {
            interface: interface.to_string(),
            name: Some(name.to_string()),
            code: Some(code.to_string()),
            plural: None,
            superclass: None,
            methods: Vec::new(),
        }
    }

    /// Set the plural
    pub fn with_plural(mut self, plural: &str) -> Self {
        self.plural = Some(plural.to_string());
        self
    }

    /// Set the superclass interface
    pub fn with_superclass(mut self, superclass: &str) -> Self {
        self.superclass = Some(superclass.to_string());
        self
    }

    /// Add a method
    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// `«class code»` text
    pub fn code_chevron(&self) -> Option<String> {
        self.code.as_ref().map(|code| format!("«class {code}»"))
    }
}

/// One enumeration constant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumConstantDescriptor {
    /// Rust-facing identifier
    pub name: String,
    /// AppleScript name, e.g. `ask`
    pub script_name: String,
    /// Four-character code
    #[serde(default)]
    pub code: Option<String>,
    /// Description from the dictionary
    #[serde(default)]
    pub description: Option<String>,
}

/// A generated enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDescriptor {
    /// Enumeration name
    pub name: String,
    /// Constants in declaration order
    pub constants: Vec<EnumConstantDescriptor>,
}

/// Everything generated for one application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDescriptor {
    /// Interface name of the application class
    pub interface: String,
    /// All classes, including the application class
    pub classes: Vec<ClassDescriptor>,
    /// Enumerations
    #[serde(default)]
    pub enumerations: Vec<EnumDescriptor>,
}

impl ApplicationDescriptor {
    /// Parse descriptor JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load descriptor JSON from disk
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read interface metadata: {:?}", path))?;
        Self::from_json(&data)
            .with_context(|| format!("Failed to parse interface metadata: {:?}", path))
    }

    /// Class by interface name
    pub fn class(&self, interface: &str) -> Option<&ClassDescriptor> {
        self.classes.iter().find(|c| c.interface == interface)
    }
}
