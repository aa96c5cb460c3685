//! Built-in codecs for the standard AppleScript types

use std::sync::Arc;

use super::codec::Codec;
use super::error::{FormatError, FormatResult};
use super::type_class::TypeClass;

mod data;
mod date;
mod file;
mod geometry;
mod reference;
mod scalar;
mod text;

pub use data::{DataCodec, DataKind};
pub use date::DateCodec;
pub use file::{FileCodec, FileKind};
pub use geometry::{PointCodec, RectangleCodec, RgbColorCodec};
pub use reference::{RecordCodec, ReferenceCodec, TypeClassCodec};
pub use scalar::{BooleanCodec, NumberCodec};
pub use text::TextCodec;

/// Built-in codecs in their default precedence order
pub fn builtin_codecs(date_locale: &str) -> Vec<Arc<dyn Codec>> {
    vec![
        Arc::new(TextCodec),
        Arc::new(NumberCodec::integer()),
        Arc::new(NumberCodec::short()),
        Arc::new(NumberCodec::long()),
        Arc::new(NumberCodec::float()),
        Arc::new(NumberCodec::double()),
        Arc::new(BooleanCodec),
        Arc::new(DateCodec::new(date_locale)),
        Arc::new(FileCodec::new(FileKind::Alias)),
        Arc::new(DataCodec::new(DataKind::Data)),
        Arc::new(DataCodec::new(DataKind::Picture)),
        Arc::new(DataCodec::new(DataKind::Tdta)),
        Arc::new(FileCodec::new(FileKind::File)),
        Arc::new(PointCodec),
        Arc::new(RectangleCodec),
        Arc::new(RgbColorCodec),
        Arc::new(TypeClassCodec),
        Arc::new(RecordCodec),
        Arc::new(ReferenceCodec),
    ]
}

fn classes(pairs: &[(&str, &str)]) -> Vec<TypeClass> {
    pairs
        .iter()
        .map(|(name, code)| TypeClass::builtin(name, code))
        .collect()
}

/// Parse `{a, b, ...}` into exactly `N` integers
fn parse_tuple<const N: usize>(kind: &'static str, text: &str) -> FormatResult<[i64; N]> {
    let malformed = || FormatError::Tuple {
        kind,
        text: text.to_string(),
    };
    let inner = text
        .trim()
        .strip_prefix('{')
        .and_then(|t| t.strip_suffix('}'))
        .ok_or_else(malformed)?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(malformed());
    }
    let mut out = [0i64; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part.parse().map_err(|e| FormatError::number(part, e))?;
    }
    Ok(out)
}
