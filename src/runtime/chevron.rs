//! `«kind code»` literals for raw four-character codes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{FormatError, FormatResult};

/// Opening guillemet
pub const OPEN: char = '«';
/// Closing guillemet
pub const CLOSE: char = '»';

/// A kind tag plus a four-character code, e.g. `«class cUsP»`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chevron {
    kind: String,
    code: String,
}

impl Chevron {
    /// Build a chevron, validating kind and code
    pub fn new(kind: impl Into<String>, code: impl Into<String>) -> FormatResult<Self> {
        let kind = kind.into();
        let code = code.into();
        let text = format!("{OPEN}{kind} {code}{CLOSE}");
        if kind.is_empty() || kind.contains(' ') {
            return Err(malformed(&text, "kind must be a single word"));
        }
        if code.chars().count() != 4 {
            return Err(malformed(&text, "code must be exactly 4 characters"));
        }
        Ok(Self { kind, code })
    }

    /// Parse `«kind code»`
    pub fn parse(text: &str) -> FormatResult<Self> {
        let trimmed = text.trim();
        let inner = trimmed
            .strip_prefix(OPEN)
            .ok_or_else(|| malformed(text, "missing opening guillemet"))?
            .strip_suffix(CLOSE)
            .ok_or_else(|| malformed(text, "missing closing guillemet"))?;
        let (kind, code) = inner
            .split_once(' ')
            .ok_or_else(|| malformed(text, "missing space between kind and code"))?;
        if code.chars().count() != 4 {
            return Err(malformed(text, "code must be exactly 4 characters"));
        }
        if kind.is_empty() {
            return Err(malformed(text, "kind must not be empty"));
        }
        Ok(Self {
            kind: kind.to_string(),
            code: code.to_string(),
        })
    }

    /// Whether `text` looks like a chevron literal
    pub fn is_chevron(text: &str) -> bool {
        let trimmed = text.trim();
        trimmed.starts_with(OPEN) && trimmed.ends_with(CLOSE)
    }

    /// Kind tag, e.g. `class`
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Four-character code
    pub fn code(&self) -> &str {
        &self.code
    }
}

fn malformed(text: &str, detail: &str) -> FormatError {
    FormatError::Chevron {
        text: text.to_string(),
        detail: detail.to_string(),
    }
}

impl fmt::Display for Chevron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{OPEN}{} {}{CLOSE}", self.kind, self.code)
    }
}

impl FromStr for Chevron {
    type Err = FormatError;

    fn from_str(s: &str) -> FormatResult<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_class() {
        let chevron = Chevron::parse("«class pcls»").unwrap();
        assert_eq!(chevron.kind(), "class");
        assert_eq!(chevron.code(), "pcls");
        assert_eq!(chevron.to_string(), "«class pcls»");
    }

    #[test]
    fn test_code_keeps_inner_spaces() {
        let chevron = Chevron::parse("  «class ask »  ").unwrap();
        assert_eq!(chevron.kind(), "class");
        assert_eq!(chevron.code(), "ask ");
        assert_eq!(chevron.to_string(), "«class ask »");
    }

    #[test]
    fn test_constant_codes_are_not_chevrons() {
        // enumeration constants carry an 8 character code
        assert!(Chevron::parse("«constant ****ask »").is_err());
    }

    #[test]
    fn test_rejects_short_code() {
        assert!(matches!(
            Chevron::parse("«class abc»"),
            Err(FormatError::Chevron { .. })
        ));
    }

    #[test]
    fn test_rejects_missing_guillemets() {
        assert!(Chevron::parse("class pcls»").is_err());
        assert!(Chevron::parse("«class pcls").is_err());
        assert!(Chevron::parse("«classpcls»").is_err());
    }

    #[test]
    fn test_new_validates() {
        assert!(Chevron::new("class", "pcls").is_ok());
        assert!(Chevron::new("cla ss", "pcls").is_err());
        assert!(Chevron::new("class", "pc").is_err());
    }

    proptest! {
        #[test]
        fn prop_round_trip(kind in "[a-z]{1,10}", code in "[a-zA-Z0-9 *]{4}") {
            let chevron = Chevron::new(kind, code).unwrap();
            let parsed = Chevron::parse(&chevron.to_string()).unwrap();
            prop_assert_eq!(parsed, chevron);
        }
    }
}
