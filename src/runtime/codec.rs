//! Codec chain: typed values to and from wire text
//!
//! Codecs are consulted in registration order and the first one whose
//! declared [`ValueType`] matches the decode target wins. Lists, records,
//! enumerations and generated interfaces are handled by the registry itself
//! because they need the recursion and the application metadata.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::application::ApplicationRegistry;
use super::error::{FormatError, FormatResult, Result, ScriptError};
use super::reference::{ObjectRef, Reference};
use super::type_class::TypeClass;
use super::value::{EnumConstant, Value, ValueType};

/// Bidirectional converter between one value type and its wire text
pub trait Codec: Send + Sync {
    /// Value type this codec produces and consumes
    fn value_type(&self) -> ValueType;

    /// AppleScript classes this codec claims, e.g. `text` / `«class ctxt»`
    fn script_types(&self) -> Vec<TypeClass>;

    /// Decode the object part of `reference`
    fn decode(&self, reference: &Reference) -> Result<Value>;

    /// Encode `value` for embedding in script text
    fn encode(&self, value: &Value) -> Result<String>;

    /// Whether this codec can encode `value`
    fn accepts(&self, value: &Value) -> bool {
        value.value_type() == self.value_type()
    }
}

/// Ordered, runtime-extensible list of codecs
#[derive(Default)]
pub struct CodecRegistry {
    codecs: RwLock<Vec<Arc<dyn Codec>>>,
}

impl CodecRegistry {
    /// Registry without any codecs
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the given codecs in order
    pub fn with_codecs(codecs: Vec<Arc<dyn Codec>>) -> Self {
        Self {
            codecs: RwLock::new(codecs),
        }
    }

    /// Append a codec; earlier registrations keep precedence
    pub fn add(&self, codec: Arc<dyn Codec>) {
        self.codecs.write().push(codec);
    }

    /// Insert a codec ahead of all existing ones
    pub fn add_first(&self, codec: Arc<dyn Codec>) {
        self.codecs.write().insert(0, codec);
    }

    /// Remove a previously added codec instance
    pub fn remove(&self, codec: &Arc<dyn Codec>) -> bool {
        let mut codecs = self.codecs.write();
        let before = codecs.len();
        codecs.retain(|c| !Arc::ptr_eq(c, codec));
        codecs.len() != before
    }

    /// Snapshot of the registered codecs
    pub fn codecs(&self) -> Vec<Arc<dyn Codec>> {
        self.codecs.read().clone()
    }

    /// First codec declaring `target`
    pub fn find(&self, target: &ValueType) -> Option<Arc<dyn Codec>> {
        self.codecs
            .read()
            .iter()
            .find(|c| &c.value_type() == target)
            .cloned()
    }

    /// Value type of the first codec claiming an AppleScript type, by name or code
    pub fn value_type_for(&self, script_type: &str) -> Option<ValueType> {
        let wanted = script_type.trim().to_lowercase();
        self.codecs.read().iter().find_map(|codec| {
            codec
                .script_types()
                .iter()
                .any(|tc| {
                    tc.name().is_some_and(|n| n.to_lowercase() == wanted)
                        || tc.code_text().is_some_and(|c| c.to_lowercase() == wanted)
                })
                .then(|| codec.value_type())
        })
    }

    /// Decode `reference` into a value of type `target`
    pub fn decode(
        &self,
        applications: &ApplicationRegistry,
        target: &ValueType,
        reference: &Reference,
    ) -> Result<Value> {
        if let Some(codec) = self.find(target) {
            return codec.decode(reference).map_err(|err| match err {
                ScriptError::Format(source) => ScriptError::Decode {
                    target: target.to_string(),
                    reference: reference.to_string(),
                    source,
                },
                other => other,
            });
        }
        let object = reference.object_reference();
        match target {
            ValueType::Void => Ok(Value::Null),
            ValueType::List(element) => {
                let Some(object) = object else {
                    return Ok(Value::Null);
                };
                split_list(object)?
                    .into_iter()
                    .map(|item| self.decode(applications, element, &reference.sibling(item)))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::List)
            }
            ValueType::Map => {
                let Some(object) = object else {
                    return Ok(Value::Map(BTreeMap::new()));
                };
                Ok(Value::Map(
                    split_record(object)?
                        .into_iter()
                        .map(|(key, value)| (key, Value::Reference(reference.sibling(value))))
                        .collect(),
                ))
            }
            _ if object.is_some_and(|o| o.trim().is_empty()) => Ok(Value::Null),
            ValueType::Enumeration(name) => decode_enum(applications, name, reference),
            ValueType::Object(interface) => {
                if is_missing(object) {
                    Ok(Value::Null)
                } else if applications.has_interface(reference.application_reference(), interface) {
                    Ok(Value::Object(ObjectRef::new(interface.clone(), reference.clone())))
                } else {
                    Err(ScriptError::Config(format!(
                        "cannot bind {reference} to undeclared interface '{interface}'"
                    )))
                }
            }
            other => Err(ScriptError::Config(format!(
                "no codec registered for {other}, cannot decode {reference}"
            ))),
        }
    }

    /// Encode `value` for embedding in script text
    pub fn encode(&self, applications: &ApplicationRegistry, value: &Value) -> Result<String> {
        match value {
            Value::Null => Ok("missing value".to_string()),
            Value::List(items) => {
                let parts = items
                    .iter()
                    .map(|item| self.encode(applications, item))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("{{{}}}", parts.join(", ")))
            }
            Value::Map(map) => {
                let parts = map
                    .iter()
                    .map(|(key, item)| Ok(format!("{key}: {}", self.encode(applications, item)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("{{{}}}", parts.join(", ")))
            }
            Value::Reference(reference) => Ok(reference_text(reference)),
            Value::Object(object) => Ok(reference_text(&object.reference)),
            Value::Enum(constant) => Ok(constant.name.clone()),
            Value::Id(id) => Ok(id.to_string()),
            Value::Class(interface) => applications
                .class(None, interface)
                .and_then(|class| class.name)
                .ok_or_else(|| {
                    ScriptError::Config(format!("interface '{interface}' declares no class name"))
                }),
            other => {
                let codec = self
                    .codecs
                    .read()
                    .iter()
                    .find(|c| c.accepts(other))
                    .cloned();
                match codec {
                    Some(codec) => codec.encode(other),
                    None => Err(ScriptError::Config(format!(
                        "no codec registered for {}",
                        other.value_type()
                    ))),
                }
            }
        }
    }
}

fn reference_text(reference: &Reference) -> String {
    reference
        .object_reference()
        .or(reference.application_reference())
        .unwrap_or("missing value")
        .to_string()
}

/// Only the interpreter's `missing value`; blank text is not missing for
/// types that must parse
pub(crate) fn is_missing_value(object: Option<&str>) -> bool {
    object.map(str::trim) == Some("missing value")
}

pub(crate) fn is_missing(object: Option<&str>) -> bool {
    match object.map(str::trim) {
        None | Some("") | Some("null") | Some("missing value") => true,
        Some(_) => false,
    }
}

fn decode_enum(
    applications: &ApplicationRegistry,
    name: &str,
    reference: &Reference,
) -> Result<Value> {
    let text = reference.object_text().trim();
    if is_missing(Some(text)) {
        return Ok(Value::Null);
    }
    let descriptor = applications
        .enumeration(reference.application_reference(), name)
        .ok_or_else(|| ScriptError::Config(format!("enumeration '{name}' is not declared")))?;
    // «constant ****ask »
    let code = text
        .strip_prefix("«constant ")
        .and_then(|t| t.strip_suffix('»'))
        .map(|c| c.trim_start_matches('*'));
    descriptor
        .constants
        .iter()
        .find(|constant| {
            constant.script_name == text
                || constant.code.as_deref() == Some(text)
                || (code.is_some() && constant.code.as_deref() == code)
        })
        .map(|constant| {
            Value::Enum(EnumConstant {
                enumeration: descriptor.name.clone(),
                name: constant.script_name.clone(),
                code: constant.code.clone(),
            })
        })
        .ok_or_else(|| {
            ScriptError::Config(format!("'{text}' is not a constant of enumeration '{name}'"))
        })
}

/// Split a list literal into its trimmed top-level items.
///
/// Braced text splits on commas at depth one; unbraced text splits on every
/// comma. Quotes toggle unless preceded by a backslash.
pub fn split_list(text: &str) -> FormatResult<Vec<String>> {
    let (segments, balanced) = scan_segments(text);
    if !balanced {
        return Err(FormatError::List(text.to_string()));
    }
    Ok(segments)
}

/// Split a record literal into trimmed `(key, value)` pairs.
///
/// Each entry splits on its first colon outside of quotes.
pub fn split_record(text: &str) -> FormatResult<Vec<(String, String)>> {
    let (segments, balanced) = scan_segments(text);
    if !balanced {
        return Err(FormatError::Record {
            text: text.to_string(),
            detail: "unbalanced braces or quotes".to_string(),
        });
    }
    segments
        .into_iter()
        .map(|segment| {
            let colon = unquoted_colon(&segment).ok_or_else(|| FormatError::Record {
                text: text.to_string(),
                detail: format!("entry '{segment}' has no key"),
            })?;
            Ok((
                segment[..colon].trim().to_string(),
                segment[colon + 1..].trim().to_string(),
            ))
        })
        .collect()
}

fn unquoted_colon(segment: &str) -> Option<usize> {
    let mut quotes = false;
    let mut previous = '\0';
    for (i, c) in segment.char_indices() {
        match c {
            '"' if previous != '\\' => quotes = !quotes,
            ':' if !quotes => return Some(i),
            _ => {}
        }
        previous = c;
    }
    None
}

fn scan_segments(text: &str) -> (Vec<String>, bool) {
    let mut segments = Vec::new();
    let mut depth: i32 = 0;
    let mut quotes = false;
    let curlies = text.starts_with('{');
    let mut current = String::new();
    let mut previous = '\0';
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if previous != '\\' => quotes = !quotes,
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
        let last = chars.peek().is_none();
        if quotes {
            current.push(c);
        } else if (depth == 1 && c == ',')
            || (depth == 0 && c == '}')
            || (!curlies && (c == ',' || last))
        {
            if !curlies && last {
                current.push(c);
            }
            let segment = current.trim();
            if !segment.is_empty() {
                segments.push(segment.to_string());
            }
            current.clear();
        } else if (depth == 1 && c != '{') || !curlies || depth > 1 {
            current.push(c);
        }
        previous = c;
    }
    (segments, depth == 0 && !quotes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::codecs;
    use proptest::prelude::*;

    fn registry() -> CodecRegistry {
        CodecRegistry::with_codecs(codecs::builtin_codecs("en_US"))
    }

    fn decode(target: ValueType, text: &str) -> Result<Value> {
        registry().decode(
            &ApplicationRegistry::default(),
            &target,
            &Reference::object(text, Some("application \"Finder\"")),
        )
    }

    #[test]
    fn test_split_list_braced() {
        assert_eq!(split_list("{1, 2, 3}").unwrap(), vec!["1", "2", "3"]);
        assert_eq!(split_list("{}").unwrap(), Vec::<String>::new());
        assert_eq!(
            split_list("{\"a, b\", {1, 2}, c}").unwrap(),
            vec!["\"a, b\"", "{1, 2}", "c"]
        );
    }

    #[test]
    fn test_split_list_unbraced() {
        assert_eq!(split_list("1, 2,3").unwrap(), vec!["1", "2", "3"]);
        assert_eq!(split_list("single").unwrap(), vec!["single"]);
    }

    #[test]
    fn test_split_list_rejects_unbalanced() {
        assert!(split_list("{1, 2").is_err());
        assert!(split_list("{\"open}").is_err());
    }

    #[test]
    fn test_split_record() {
        let entries = split_record("{name:\"a\", index:3, bounds:{1, 2, 3, 4}}").unwrap();
        assert_eq!(
            entries,
            vec![
                ("name".to_string(), "\"a\"".to_string()),
                ("index".to_string(), "3".to_string()),
                ("bounds".to_string(), "{1, 2, 3, 4}".to_string()),
            ]
        );
        assert!(split_record("{noColon}").is_err());
    }

    #[test]
    fn test_decode_integer_list() {
        let value = decode(ValueType::list_of(ValueType::Integer), "{1, 2, 3}").unwrap();
        assert_eq!(value, Value::from(vec![1, 2, 3]));
    }

    #[test]
    fn test_decode_record_keeps_raw_references() {
        let value = decode(ValueType::Map, "{name:\"a\", index:3}").unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map["name"].as_reference().unwrap().object_reference(),
            Some("\"a\"")
        );
        assert_eq!(map["index"].as_reference().unwrap().object_reference(), Some("3"));
    }

    #[test]
    fn test_decode_blank_is_null() {
        assert_eq!(decode(ValueType::Object("Window".into()), "  ").unwrap(), Value::Null);
    }

    #[test]
    fn test_decode_number_error_carries_context() {
        match decode(ValueType::Integer, "abc") {
            Err(ScriptError::Decode { target, reference, .. }) => {
                assert_eq!(target, "Integer");
                assert!(reference.contains("abc"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_undeclared_interface_is_config_error() {
        assert!(matches!(
            decode(ValueType::Object("Nope".into()), "window 1"),
            Err(ScriptError::Config(_))
        ));
    }

    #[test]
    fn test_encode_collections() {
        let apps = ApplicationRegistry::default();
        let registry = registry();
        let list = Value::List(vec![Value::from(1), Value::from("x"), Value::Null]);
        assert_eq!(
            registry.encode(&apps, &list).unwrap(),
            "{1, (\"x\"), missing value}"
        );
        let mut map = BTreeMap::new();
        map.insert("name".to_string(), Value::from("a"));
        assert_eq!(registry.encode(&apps, &Value::Map(map)).unwrap(), "{name: (\"a\")}");
    }

    #[test]
    fn test_value_type_for_script_names() {
        let registry = registry();
        assert_eq!(registry.value_type_for("Unicode Text"), Some(ValueType::Text));
        assert_eq!(registry.value_type_for("«class long»"), Some(ValueType::Integer));
        assert_eq!(registry.value_type_for("bounding rectangle"), Some(ValueType::Rectangle));
        assert_eq!(registry.value_type_for("no such type"), None);
    }

    proptest! {
        #[test]
        fn prop_integer_list_round_trip(items in proptest::collection::vec(any::<i32>(), 0..8)) {
            let apps = ApplicationRegistry::default();
            let registry = registry();
            let value = Value::from(items);
            let text = registry.encode(&apps, &value).unwrap();
            let back = registry
                .decode(&apps, &ValueType::list_of(ValueType::Integer), &Reference::object(text, None))
                .unwrap();
            prop_assert_eq!(back, value);
        }

        #[test]
        fn prop_text_list_round_trip(items in proptest::collection::vec("[ -!#-\\[\\]-z|~]{0,12}", 0..6)) {
            let apps = ApplicationRegistry::default();
            let registry = registry();
            let value = Value::from(items);
            let text = registry.encode(&apps, &value).unwrap();
            let back = registry
                .decode(&apps, &ValueType::list_of(ValueType::Text), &Reference::object(text, None))
                .unwrap();
            prop_assert_eq!(back, value);
        }
    }
}
