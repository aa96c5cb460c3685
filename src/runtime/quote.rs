//! String literals for generated script text
//!
//! AppleScript source read through `osascript` is not reliably decoded as
//! UTF-8, so anything outside ASCII travels as a `«data utf8...»` literal
//! coerced to Unicode text and spliced into the quoted ASCII runs.

const LAST_ASCII: char = '\u{7f}';

/// Quote a string for embedding in script text.
///
/// `quote("A\u{af}B")` yields `("A" & («data utf8c2af» as Unicode text) & "B")`.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    out.push_str("(\"");
    let mut unicode_start: Option<usize> = None;
    for (i, c) in s.char_indices() {
        if c > LAST_ASCII {
            unicode_start.get_or_insert(i);
            continue;
        }
        if let Some(start) = unicode_start.take() {
            out.push_str("\" & ");
            out.push_str(&as_unicode_text(&s[start..i]));
            out.push_str(" & \"");
        }
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    match unicode_start {
        Some(start) => {
            out.push_str("\" & ");
            out.push_str(&as_unicode_text(&s[start..]));
            out.push(')');
        }
        None => out.push_str("\")"),
    }
    out
}

/// `(«data utf8<hex>» as Unicode text)` for the UTF-8 bytes of `s`
pub fn as_unicode_text(s: &str) -> String {
    let mut out = String::from("(«data utf8");
    for byte in s.as_bytes() {
        out.push_str(&format!("{byte:02x}"));
    }
    out.push_str("» as Unicode text)");
    out
}

/// Undo [`quote`], or strip plain `"..."` quotes from interpreter output.
///
/// Text that is not quoted at all is returned trimmed.
pub fn unquote(text: &str) -> String {
    let trimmed = text.trim();
    if let Some(inner) = trimmed.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        if let Some(joined) = unquote_concatenation(inner.trim()) {
            return joined;
        }
    }
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        return unescape(&trimmed[1..trimmed.len() - 1]);
    }
    trimmed.to_string()
}

fn unquote_concatenation(inner: &str) -> Option<String> {
    let mut out = String::new();
    for part in split_concatenation(inner) {
        let part = part.trim();
        if part.len() >= 2 && part.starts_with('"') && part.ends_with('"') {
            out.push_str(&unescape(&part[1..part.len() - 1]));
        } else {
            out.push_str(&decode_unicode_text(part)?);
        }
    }
    Some(out)
}

/// Split on ` & ` outside of double quotes
fn split_concatenation(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quotes = false;
    let mut start = 0;
    let mut previous = '\0';
    for (i, c) in text.char_indices() {
        if c == '"' && previous != '\\' {
            quotes = !quotes;
        } else if c == '&' && !quotes {
            parts.push(&text[start..i]);
            start = i + 1;
        }
        previous = if previous == '\\' && c == '\\' { '\0' } else { c };
    }
    parts.push(&text[start..]);
    parts
}

fn decode_unicode_text(part: &str) -> Option<String> {
    let hex = part
        .strip_prefix("(«data utf8")?
        .strip_suffix("» as Unicode text)")?;
    let bytes = hex_to_bytes(hex)?;
    String::from_utf8(bytes).ok()
}

pub(crate) fn hex_to_bytes(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 || !hex.is_ascii() {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next @ ('"' | '\\')) => out.push(next),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}
