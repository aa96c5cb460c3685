use std::path::PathBuf;

use super::classes;
use crate::runtime::codec::{Codec, is_missing};
use crate::runtime::error::{Result, ScriptError};
use crate::runtime::reference::Reference;
use crate::runtime::type_class::TypeClass;
use crate::runtime::value::{ScriptFile, Value, ValueType};

/// Whether a [`FileCodec`] produces files or aliases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `file "HD:path"` or `(POSIX file "/path")`
    File,
    /// `alias "HD:path"`
    Alias,
}

/// File and alias specifiers
pub struct FileCodec {
    kind: FileKind,
}

impl FileCodec {
    /// Codec for one specifier kind
    pub fn new(kind: FileKind) -> Self {
        Self { kind }
    }
}

fn quoted(text: &str) -> Option<&str> {
    let start = text.find('"')?;
    let end = text.rfind('"')?;
    (start < end).then(|| &text[start + 1..end])
}

/// HFS path such as `Macintosh HD:Users:me` mounted under `/Volumes`
fn hfs_to_posix(hfs: &str) -> PathBuf {
    PathBuf::from(format!("/Volumes/{}", hfs.replace(':', "/")))
}

fn decode_file(object: &str) -> ScriptFile {
    let path = match quoted(object) {
        Some(inner) if object.contains(':') && !object.contains("POSIX file") => hfs_to_posix(inner),
        Some(inner) if object.contains("POSIX file") => PathBuf::from(inner),
        _ => PathBuf::from(object.trim()),
    };
    ScriptFile {
        path,
        object_reference: object.to_string(),
    }
}

fn decode_alias(object: &str) -> ScriptFile {
    if object.starts_with('/') {
        return ScriptFile::from_path(object);
    }
    let path = match quoted(object) {
        Some(inner) => hfs_to_posix(inner),
        None => PathBuf::from(object.trim()),
    };
    ScriptFile {
        path,
        object_reference: object.to_string(),
    }
}

impl Codec for FileCodec {
    fn value_type(&self) -> ValueType {
        match self.kind {
            FileKind::File => ValueType::File,
            FileKind::Alias => ValueType::Alias,
        }
    }

    fn script_types(&self) -> Vec<TypeClass> {
        match self.kind {
            FileKind::File => classes(&[("file", "file")]),
            FileKind::Alias => classes(&[("alias", "alis")]),
        }
    }

    fn decode(&self, reference: &Reference) -> Result<Value> {
        if is_missing(reference.object_reference()) {
            return Ok(Value::Null);
        }
        let object = reference.object_text().trim();
        Ok(match self.kind {
            FileKind::File => Value::File(decode_file(object)),
            FileKind::Alias => Value::Alias(decode_alias(object)),
        })
    }

    fn encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::File(file) | Value::Alias(file) => Ok(file.object_reference.clone()),
            other => Err(ScriptError::Config(format!("file codec cannot encode {other:?}"))),
        }
    }
}
