//! Decoded values and the target types they are decoded into

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use super::reference::{Id, ObjectRef, Reference};
use super::type_class::TypeClass;

/// Target type of a decode, as declared by interface metadata.
///
/// Plays the role a return type plays in a statically typed binding: the
/// codec chain dispatches on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// No return value
    Void,
    /// Text
    Text,
    /// 32-bit integer
    Integer,
    /// 16-bit integer
    Short,
    /// 64-bit integer
    Long,
    /// Single precision real
    Float,
    /// Double precision real
    Double,
    /// Boolean
    Boolean,
    /// Date
    Date,
    /// Raw data
    Data,
    /// Picture data
    Picture,
    /// Typed raw data (`tdta`)
    Tdta,
    /// Point
    Point,
    /// Bounding rectangle
    Rectangle,
    /// RGB color
    RgbColor,
    /// File specifier
    File,
    /// Alias
    Alias,
    /// Class descriptor
    TypeClass,
    /// Record literal kept as a raw reference
    Record,
    /// Raw object specifier
    Reference,
    /// Homogeneous list
    List(Box<ValueType>),
    /// Record as string-keyed map of raw references
    Map,
    /// Generated enumeration, by name
    Enumeration(String),
    /// Generated interface, by name
    Object(String),
    /// Type claimed by a custom codec
    Named(String),
}

impl ValueType {
    /// List of the given element type
    pub fn list_of(element: ValueType) -> Self {
        ValueType::List(Box::new(element))
    }

    /// Whether this is the unit type
    pub fn is_void(&self) -> bool {
        matches!(self, ValueType::Void)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::List(element) => write!(f, "list of {element}"),
            ValueType::Enumeration(name) => write!(f, "enumeration {name}"),
            ValueType::Object(name) => write!(f, "interface {name}"),
            ValueType::Named(name) => f.write_str(name),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Binary payload with its four-character type code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Data {
    /// Four-character type code, e.g. `TIFF`
    pub kind: String,
    /// Raw bytes
    pub bytes: Vec<u8>,
}

/// QuickDraw point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: i32,
    /// Vertical coordinate
    pub y: i32,
}

/// Rectangle stored as origin plus size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
}

/// 16-bit per channel color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbColor {
    /// Red
    pub red: u16,
    /// Green
    pub green: u16,
    /// Blue
    pub blue: u16,
}

/// File or alias: the POSIX path plus the specifier it was decoded from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptFile {
    /// POSIX path
    pub path: PathBuf,
    /// Specifier text, e.g. `file "HD:Users:me"`
    pub object_reference: String,
}

impl ScriptFile {
    /// File built from a local path
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let object_reference = format!(
            "(POSIX file {})",
            super::quote::quote(&path.to_string_lossy())
        );
        Self {
            path,
            object_reference,
        }
    }
}

/// Constant of a generated enumeration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumConstant {
    /// Enumeration name
    pub enumeration: String,
    /// AppleScript name of the constant, e.g. `ask`
    pub name: String,
    /// Four-character code
    pub code: Option<String>,
}

/// A decoded value, or an argument to encode
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `missing value` / nothing
    Null,
    /// Text
    Text(String),
    /// 32-bit integer
    Integer(i32),
    /// 16-bit integer
    Short(i16),
    /// 64-bit integer
    Long(i64),
    /// Single precision real
    Float(f32),
    /// Double precision real
    Double(f64),
    /// Boolean
    Boolean(bool),
    /// Point in time
    Date(DateTime<Utc>),
    /// Raw data
    Data(Data),
    /// Picture data
    Picture(Data),
    /// Typed raw data
    Tdta(Data),
    /// Point
    Point(Point),
    /// Bounding rectangle
    Rectangle(Rectangle),
    /// RGB color
    RgbColor(RgbColor),
    /// File specifier
    File(ScriptFile),
    /// Alias
    Alias(ScriptFile),
    /// Class descriptor
    TypeClass(TypeClass),
    /// List
    List(Vec<Value>),
    /// Record
    Map(BTreeMap<String, Value>),
    /// Raw object specifier
    Reference(Reference),
    /// Specifier bound to a generated interface
    Object(ObjectRef),
    /// Enumeration constant
    Enum(EnumConstant),
    /// Element identifier argument
    Id(Id),
    /// Interface name, the argument of `make`
    Class(String),
}

impl Value {
    /// Natural target type of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Void,
            Value::Text(_) => ValueType::Text,
            Value::Integer(_) => ValueType::Integer,
            Value::Short(_) => ValueType::Short,
            Value::Long(_) => ValueType::Long,
            Value::Float(_) => ValueType::Float,
            Value::Double(_) => ValueType::Double,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Date(_) => ValueType::Date,
            Value::Data(_) => ValueType::Data,
            Value::Picture(_) => ValueType::Picture,
            Value::Tdta(_) => ValueType::Tdta,
            Value::Point(_) => ValueType::Point,
            Value::Rectangle(_) => ValueType::Rectangle,
            Value::RgbColor(_) => ValueType::RgbColor,
            Value::File(_) => ValueType::File,
            Value::Alias(_) => ValueType::Alias,
            Value::TypeClass(_) => ValueType::TypeClass,
            Value::List(items) => ValueType::list_of(
                items.first().map(Value::value_type).unwrap_or(ValueType::Reference),
            ),
            Value::Map(_) => ValueType::Map,
            Value::Reference(_) => ValueType::Reference,
            Value::Object(object) => ValueType::Object(object.interface.clone()),
            Value::Enum(constant) => ValueType::Enumeration(constant.enumeration.clone()),
            Value::Id(_) => ValueType::Named("id".into()),
            Value::Class(_) => ValueType::Named("class".into()),
        }
    }

    /// Whether this is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text payload
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Any integer variant widened to i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(i64::from(*i)),
            Value::Short(i) => Some(i64::from(*i)),
            Value::Long(i) => Some(*i),
            _ => None,
        }
    }

    /// Any real variant widened to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(f64::from(*f)),
            Value::Double(f) => Some(*f),
            _ => None,
        }
    }

    /// Boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// List payload
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Record payload
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Interface-bound specifier
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Underlying reference of reference-like values
    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Value::Reference(reference) => Some(reference),
            Value::Object(object) => Some(&object.reference),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Long(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Double(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Id> for Value {
    fn from(id: Id) -> Self {
        Value::Id(id)
    }
}

impl From<ObjectRef> for Value {
    fn from(object: ObjectRef) -> Self {
        Value::Object(object)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_of_values() {
        assert_eq!(Value::from("x").value_type(), ValueType::Text);
        assert_eq!(
            Value::from(vec![1, 2]).value_type(),
            ValueType::list_of(ValueType::Integer)
        );
        assert_eq!(Value::from(None::<i32>), Value::Null);
    }

    #[test]
    fn test_value_type_serde_shape() {
        let json = serde_json::to_string(&ValueType::list_of(ValueType::Object("Window".into())))
            .unwrap();
        assert_eq!(json, r#"{"list":{"object":"Window"}}"#);
        let back: ValueType = serde_json::from_str(r#""rgb_color""#).unwrap();
        assert_eq!(back, ValueType::RgbColor);
    }

    #[test]
    fn test_file_from_path() {
        let file = ScriptFile::from_path("/tmp/a.txt");
        assert_eq!(file.object_reference, "(POSIX file (\"/tmp/a.txt\"))");
    }
}
