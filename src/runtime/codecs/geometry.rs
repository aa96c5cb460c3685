use super::{classes, parse_tuple};
use crate::runtime::codec::{Codec, is_missing_value};
use crate::runtime::error::{FormatError, Result, ScriptError};
use crate::runtime::reference::Reference;
use crate::runtime::type_class::TypeClass;
use crate::runtime::value::{Point, Rectangle, RgbColor, Value, ValueType};

fn narrow<T: TryFrom<i64>>(kind: &'static str, text: &str, n: i64) -> Result<T> {
    T::try_from(n).map_err(|_| {
        FormatError::Tuple {
            kind,
            text: text.to_string(),
        }
        .into()
    })
}

/// `{x, y}`
pub struct PointCodec;

impl Codec for PointCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Point
    }

    fn script_types(&self) -> Vec<TypeClass> {
        classes(&[("point", "QDpt")])
    }

    fn decode(&self, reference: &Reference) -> Result<Value> {
        if is_missing_value(reference.object_reference()) {
            return Ok(Value::Null);
        }
        let text = reference.object_text();
        let [x, y] = parse_tuple::<2>("point", text)?;
        Ok(Value::Point(Point {
            x: narrow("point", text, x)?,
            y: narrow("point", text, y)?,
        }))
    }

    fn encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Point(p) => Ok(format!("{{{}, {}}}", p.x, p.y)),
            other => Err(ScriptError::Config(format!("point codec cannot encode {other:?}"))),
        }
    }
}

/// `{left, top, right, bottom}`, exposed as origin plus size
pub struct RectangleCodec;

impl Codec for RectangleCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Rectangle
    }

    fn script_types(&self) -> Vec<TypeClass> {
        classes(&[("bounding rectangle", "qdrt"), ("rectangle", "qdrt")])
    }

    fn decode(&self, reference: &Reference) -> Result<Value> {
        if is_missing_value(reference.object_reference()) {
            return Ok(Value::Null);
        }
        let text = reference.object_text();
        let [x0, y0, x1, y1] = parse_tuple::<4>("rectangle", text)?;
        Ok(Value::Rectangle(Rectangle {
            x: narrow("rectangle", text, x0)?,
            y: narrow("rectangle", text, y0)?,
            width: narrow("rectangle", text, x1 - x0)?,
            height: narrow("rectangle", text, y1 - y0)?,
        }))
    }

    fn encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Rectangle(r) => Ok(format!(
                "{{{}, {}, {}, {}}}",
                r.x,
                r.y,
                r.x + r.width,
                r.y + r.height
            )),
            other => Err(ScriptError::Config(format!(
                "rectangle codec cannot encode {other:?}"
            ))),
        }
    }
}

/// `{r, g, b}` with 16-bit channels
pub struct RgbColorCodec;

impl Codec for RgbColorCodec {
    fn value_type(&self) -> ValueType {
        ValueType::RgbColor
    }

    fn script_types(&self) -> Vec<TypeClass> {
        classes(&[("RGB color", "cRGB")])
    }

    fn decode(&self, reference: &Reference) -> Result<Value> {
        if is_missing_value(reference.object_reference()) {
            return Ok(Value::Null);
        }
        let text = reference.object_text();
        let [red, green, blue] = parse_tuple::<3>("RGB color", text)?;
        Ok(Value::RgbColor(RgbColor {
            red: narrow("RGB color", text, red)?,
            green: narrow("RGB color", text, green)?,
            blue: narrow("RGB color", text, blue)?,
        }))
    }

    fn encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::RgbColor(c) => Ok(format!("{{{}, {}, {}}}", c.red, c.green, c.blue)),
            other => Err(ScriptError::Config(format!(
                "RGB color codec cannot encode {other:?}"
            ))),
        }
    }
}
