use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

use super::classes;
use crate::runtime::codec::{Codec, is_missing_value};
use crate::runtime::date::DateParser;
use crate::runtime::error::{FormatError, Result, ScriptError};
use crate::runtime::reference::Reference;
use crate::runtime::type_class::TypeClass;
use crate::runtime::value::{Value, ValueType};

const UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

// US renderings the locale parsers miss
const US_FALLBACK_FORMATS: &[&str] = &[
    "%A, %B %d, %Y at %I:%M:%S %p",
    "%A, %B %d, %Y %I:%M:%S %p",
    "%B %d, %Y at %I:%M:%S %p",
    "%B %d, %Y %I:%M:%S %p",
    "%b %d, %Y, %I:%M:%S %p",
    "%b %d, %Y %I:%M:%S %p",
    "%m/%d/%y, %I:%M %p",
    "%m/%d/%y %I:%M %p",
];

/// Dates, encoded through the `createDate` script helper
pub struct DateCodec {
    parser: DateParser,
}

impl DateCodec {
    /// Codec that tries `locale` before falling back to US formats
    pub fn new(locale: &str) -> Self {
        Self {
            parser: DateParser::new(locale),
        }
    }

    fn parse(&self, text: &str) -> Option<DateTime<Utc>> {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text.trim(), UTC_FORMAT) {
            return Some(Utc.from_utc_datetime(&naive));
        }
        let first = text.find('"')?;
        let last = text.rfind('"')?;
        if last <= first {
            return None;
        }
        let quoted = &text[first + 1..last];
        let naive = self
            .parser
            .parse(quoted)
            .or_else(|| DateParser::new("en_US").parse(quoted))
            .or_else(|| {
                US_FALLBACK_FORMATS
                    .iter()
                    .find_map(|format| NaiveDateTime::parse_from_str(quoted, format).ok())
            })?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
    }
}

impl Codec for DateCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Date
    }

    fn script_types(&self) -> Vec<TypeClass> {
        classes(&[("date", "ldt ")])
    }

    fn decode(&self, reference: &Reference) -> Result<Value> {
        let object = reference.object_reference();
        if is_missing_value(object) {
            return Ok(Value::Null);
        }
        let text = reference.object_text();
        self.parse(text)
            .map(Value::Date)
            .ok_or_else(|| FormatError::Date(text.to_string()).into())
    }

    fn encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Date(date) => Ok(date
                .with_timezone(&Local)
                .format("my createDate(%Y, %-m, %-d, %-H, %-M, %-S)")
                .to_string()),
            other => Err(ScriptError::Config(format!("date codec cannot encode {other:?}"))),
        }
    }
}
