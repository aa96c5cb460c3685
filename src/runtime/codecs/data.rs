use super::classes;
use crate::runtime::codec::{Codec, is_missing};
use crate::runtime::error::{FormatError, Result, ScriptError};
use crate::runtime::quote::hex_to_bytes;
use crate::runtime::reference::Reference;
use crate::runtime::type_class::TypeClass;
use crate::runtime::value::{Data, Value, ValueType};

/// Which flavour of `«data ...»` payload a [`DataCodec`] handles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    /// `data` / `rdat`
    Data,
    /// `picture` / `PICT`
    Picture,
    /// `raw data` / `tdta`
    Tdta,
}

/// Binary payloads: `«data <type><HEX>»`
pub struct DataCodec {
    kind: DataKind,
}

impl DataCodec {
    /// Codec for one payload flavour
    pub fn new(kind: DataKind) -> Self {
        Self { kind }
    }

    fn wrap(&self, data: Data) -> Value {
        match self.kind {
            DataKind::Data => Value::Data(data),
            DataKind::Picture => Value::Picture(data),
            DataKind::Tdta => Value::Tdta(data),
        }
    }
}

/// Parse `«data TIFF4D4D...»`
pub fn parse_data_literal(text: &str) -> std::result::Result<Data, FormatError> {
    let malformed = || FormatError::Data(text.to_string());
    let body = text
        .trim()
        .strip_prefix("«data ")
        .and_then(|t| t.strip_suffix('»'))
        .ok_or_else(malformed)?;
    let kind = body.get(..4).ok_or_else(malformed)?;
    let bytes = hex_to_bytes(&body[4..]).ok_or_else(malformed)?;
    Ok(Data {
        kind: kind.to_string(),
        bytes,
    })
}

impl Codec for DataCodec {
    fn value_type(&self) -> ValueType {
        match self.kind {
            DataKind::Data => ValueType::Data,
            DataKind::Picture => ValueType::Picture,
            DataKind::Tdta => ValueType::Tdta,
        }
    }

    fn script_types(&self) -> Vec<TypeClass> {
        match self.kind {
            DataKind::Data => classes(&[("data", "rdat")]),
            DataKind::Picture => classes(&[("picture", "PICT")]),
            DataKind::Tdta => classes(&[("tdta", "tdta"), ("raw data", "tdta")]),
        }
    }

    fn decode(&self, reference: &Reference) -> Result<Value> {
        if is_missing(reference.object_reference()) {
            return Ok(Value::Null);
        }
        Ok(self.wrap(parse_data_literal(reference.object_text())?))
    }

    fn encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Data(data) | Value::Picture(data) | Value::Tdta(data) => {
                let hex: String = data.bytes.iter().map(|b| format!("{b:02X}")).collect();
                Ok(format!("«data {}{hex}»", data.kind))
            }
            other => Err(ScriptError::Config(format!("data codec cannot encode {other:?}"))),
        }
    }
}
