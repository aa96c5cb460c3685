use super::classes;
use crate::runtime::codec::{Codec, is_missing};
use crate::runtime::error::{Result, ScriptError};
use crate::runtime::reference::Reference;
use crate::runtime::type_class::TypeClass;
use crate::runtime::value::{Value, ValueType};

fn reference_text(value: &Value) -> Result<String> {
    value
        .as_reference()
        .and_then(|r| r.object_reference())
        .map(str::to_string)
        .ok_or_else(|| ScriptError::Config(format!("cannot encode {value:?} as a reference")))
}

/// Class descriptors such as `folder` or `«class cfol»`
pub struct TypeClassCodec;

impl Codec for TypeClassCodec {
    fn value_type(&self) -> ValueType {
        ValueType::TypeClass
    }

    fn script_types(&self) -> Vec<TypeClass> {
        classes(&[("class", "pcls"), ("type", "type"), ("type class", "type")])
    }

    fn decode(&self, reference: &Reference) -> Result<Value> {
        if is_missing(reference.object_reference()) {
            return Ok(Value::Null);
        }
        Ok(Value::TypeClass(TypeClass::from_reference(
            reference.object_text(),
            reference.application_reference(),
        )))
    }

    fn encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::TypeClass(tc) => tc
                .name()
                .or(tc.code_text())
                .map(str::to_string)
                .ok_or_else(|| ScriptError::Config("type class has neither name nor code".into())),
            other => Err(ScriptError::Config(format!("type class codec cannot encode {other:?}"))),
        }
    }
}

/// Record literals, kept as raw references
pub struct RecordCodec;

impl Codec for RecordCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Record
    }

    fn script_types(&self) -> Vec<TypeClass> {
        classes(&[("record", "reco")])
    }

    fn decode(&self, reference: &Reference) -> Result<Value> {
        if is_missing(reference.object_reference()) {
            return Ok(Value::Null);
        }
        Ok(Value::Reference(reference.clone()))
    }

    fn encode(&self, value: &Value) -> Result<String> {
        reference_text(value)
    }
}

/// Untyped object specifiers
pub struct ReferenceCodec;

impl Codec for ReferenceCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Reference
    }

    fn script_types(&self) -> Vec<TypeClass> {
        classes(&[
            ("reference", "obj "),
            ("specifier", "obj "),
            ("anything", "****"),
            ("any", "****"),
        ])
    }

    fn decode(&self, reference: &Reference) -> Result<Value> {
        if is_missing(reference.object_reference()) {
            return Ok(Value::Null);
        }
        Ok(Value::Reference(reference.clone()))
    }

    fn encode(&self, value: &Value) -> Result<String> {
        reference_text(value)
    }
}
