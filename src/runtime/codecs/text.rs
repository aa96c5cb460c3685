use super::classes;
use crate::runtime::codec::Codec;
use crate::runtime::error::{Result, ScriptError};
use crate::runtime::quote::{quote, unquote};
use crate::runtime::reference::Reference;
use crate::runtime::type_class::TypeClass;
use crate::runtime::value::{Value, ValueType};

/// Text in all of its AppleScript flavours
pub struct TextCodec;

impl Codec for TextCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Text
    }

    fn script_types(&self) -> Vec<TypeClass> {
        classes(&[
            ("text", "ctxt"),
            ("unicode text", "utxt"),
            ("styled unicode text", "sutx"),
            ("styled text", "STXT"),
            ("international text", "itxt"),
            ("number or string", "ns  "),
            ("list or string", "ls  "),
            ("alias or string", "sf  "),
            ("string", "TEXT"),
            ("version", "vers"),
        ])
    }

    fn decode(&self, reference: &Reference) -> Result<Value> {
        Ok(match reference.object_reference() {
            Some(object) => Value::Text(unquote(object)),
            None => Value::Null,
        })
    }

    fn encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Text(s) => Ok(quote(s)),
            other => Err(ScriptError::Config(format!("text codec cannot encode {other:?}"))),
        }
    }
}
