//! Opaque tokens skipped while scanning an SNMP OID prefix.
//!
//! Macros may contain `[` (inside a context or function parameters), so the
//! OID prefix scan must step over them whole instead of stopping at the
//! first bracket.

use std::fmt;

/// Recognizes an opaque token starting at a byte offset.
pub trait OpaqueTokenRecognizer: fmt::Debug {
    /// Full byte length of the token starting at `pos`, or `None` when no
    /// token of this kind starts there.
    fn recognize(&self, text: &str, pos: usize) -> Option<usize>;
}

/// User macro: `{$NAME}` or `{$NAME:context}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserMacro;

/// Nested low-level discovery macro with a function: `{{#NAME}.func(params)}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NestedMacro;

/// The recognizers used when none are configured.
pub fn default_recognizers() -> Vec<Box<dyn OpaqueTokenRecognizer>> {
    vec![Box::new(UserMacro), Box::new(NestedMacro)]
}

fn is_macro_char(c: u8) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == b'.' || c == b'_'
}

/// Skip a macro name at `i`; `None` if it is empty.
fn macro_name(b: &[u8], i: usize) -> Option<usize> {
    let len = b.get(i..)?.iter().take_while(|&&c| is_macro_char(c)).count();
    (len > 0).then_some(i + len)
}

/// Skip a `"`-quoted string whose opening quote is at `i`, honouring `\"`.
/// Returns the offset just past the closing quote.
fn quoted_string(b: &[u8], mut i: usize) -> Option<usize> {
    i += 1;
    loop {
        match *b.get(i)? {
            b'"' => return Some(i + 1),
            b'\\' if b.get(i + 1) == Some(&b'"') => i += 2,
            _ => i += 1,
        }
    }
}

fn skip_spaces(b: &[u8], mut i: usize) -> usize {
    while b.get(i) == Some(&b' ') {
        i += 1;
    }
    i
}

impl OpaqueTokenRecognizer for UserMacro {
    fn recognize(&self, text: &str, pos: usize) -> Option<usize> {
        let b = text.as_bytes();
        if !b.get(pos..)?.starts_with(b"{$") {
            return None;
        }
        let mut i = macro_name(b, pos + 2)?;
        match *b.get(i)? {
            b'}' => return Some(i + 1 - pos),
            b':' => i += 1,
            _ => return None,
        }

        i = skip_spaces(b, i);
        if b.get(i) == Some(&b'"') {
            i = skip_spaces(b, quoted_string(b, i)?);
            return (b.get(i) == Some(&b'}')).then(|| i + 1 - pos);
        }
        let close = b.get(i..)?.iter().position(|&c| c == b'}')?;
        Some(i + close + 1 - pos)
    }
}

impl OpaqueTokenRecognizer for NestedMacro {
    fn recognize(&self, text: &str, pos: usize) -> Option<usize> {
        let b = text.as_bytes();
        if !b.get(pos..)?.starts_with(b"{{#") {
            return None;
        }
        let mut i = macro_name(b, pos + 3)?;
        if b.get(i) != Some(&b'}') || b.get(i + 1) != Some(&b'.') {
            return None;
        }
        i += 2;

        let name_len = b
            .get(i..)?
            .iter()
            .take_while(|&&c| c.is_ascii_alphanumeric() || c == b'_')
            .count();
        if name_len == 0 || b.get(i + name_len) != Some(&b'(') {
            return None;
        }
        i += name_len + 1;

        loop {
            match *b.get(i)? {
                b'"' => i = quoted_string(b, i)?,
                b')' => break,
                _ => i += 1,
            }
        }
        (b.get(i + 1) == Some(&b'}')).then(|| i + 2 - pos)
    }
}
