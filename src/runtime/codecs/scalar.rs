use super::classes;
use crate::runtime::codec::{Codec, is_missing_value};
use crate::runtime::error::{FormatError, Result, ScriptError};
use crate::runtime::reference::Reference;
use crate::runtime::type_class::TypeClass;
use crate::runtime::value::{Value, ValueType};

type Parse = fn(&str) -> std::result::Result<Value, String>;

/// Integer and real codecs, one instance per numeric type
pub struct NumberCodec {
    value_type: ValueType,
    classes: &'static [(&'static str, &'static str)],
    parse: Parse,
}

impl NumberCodec {
    /// `integer` / `unsigned integer`
    pub fn integer() -> Self {
        Self {
            value_type: ValueType::Integer,
            classes: &[("integer", "long"), ("unsigned integer", "magn")],
            parse: |s| s.parse().map(Value::Integer).map_err(|e| e.to_string()),
        }
    }

    /// `small integer`
    pub fn short() -> Self {
        Self {
            value_type: ValueType::Short,
            classes: &[("small integer", "shor")],
            parse: |s| s.parse().map(Value::Short).map_err(|e| e.to_string()),
        }
    }

    /// `double integer`
    pub fn long() -> Self {
        Self {
            value_type: ValueType::Long,
            classes: &[("double integer", "comp")],
            parse: |s| s.parse().map(Value::Long).map_err(|e| e.to_string()),
        }
    }

    /// `small real`
    pub fn float() -> Self {
        Self {
            value_type: ValueType::Float,
            classes: &[("small real", "sing")],
            parse: |s| s.parse().map(Value::Float).map_err(|e| e.to_string()),
        }
    }

    /// `real` / `number`
    pub fn double() -> Self {
        Self {
            value_type: ValueType::Double,
            classes: &[("number", "nmbr"), ("real", "doub")],
            parse: |s| s.parse().map(Value::Double).map_err(|e| e.to_string()),
        }
    }
}

impl Codec for NumberCodec {
    fn value_type(&self) -> ValueType {
        self.value_type.clone()
    }

    fn script_types(&self) -> Vec<TypeClass> {
        classes(self.classes)
    }

    fn decode(&self, reference: &Reference) -> Result<Value> {
        let object = reference.object_reference();
        if is_missing_value(object) {
            return Ok(Value::Null);
        }
        let text = reference.object_text().trim();
        (self.parse)(text).map_err(|detail| FormatError::number(text, detail).into())
    }

    fn encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Integer(i) => Ok(i.to_string()),
            Value::Short(i) => Ok(i.to_string()),
            Value::Long(i) => Ok(i.to_string()),
            // Debug keeps the decimal point: 1.0 rather than 1
            Value::Float(f) => Ok(format!("{f:?}")),
            Value::Double(f) => Ok(format!("{f:?}")),
            other => Err(ScriptError::Config(format!(
                "{} codec cannot encode {other:?}",
                self.value_type
            ))),
        }
    }
}

/// `true` / `false`
pub struct BooleanCodec;

impl Codec for BooleanCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Boolean
    }

    fn script_types(&self) -> Vec<TypeClass> {
        classes(&[("boolean", "bool")])
    }

    fn decode(&self, reference: &Reference) -> Result<Value> {
        let object = reference.object_reference();
        if is_missing_value(object) {
            return Ok(Value::Null);
        }
        let text = reference.object_text().trim();
        if text.is_empty() {
            return Err(FormatError::Boolean(text.to_string()).into());
        }
        Ok(Value::Boolean(text.eq_ignore_ascii_case("true")))
    }

    fn encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Boolean(b) => Ok(b.to_string()),
            other => Err(ScriptError::Config(format!("boolean codec cannot encode {other:?}"))),
        }
    }
}
