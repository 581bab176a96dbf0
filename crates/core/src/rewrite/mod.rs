//! Callback-driven rewriting of item keys and SNMP OIDs.
//!
//! The traversal walks a key once, reporting every token to a callback:
//!
//! - the key name / OID prefix at level 0, index 0;
//! - each top-level parameter at level 1 with its 1-based index;
//! - the inner text of an array parameter at level 1, flagged
//!   [`RewriteToken::array`], followed by each array element at level 2
//!   with the index of the enclosing parameter.
//!
//! Quoted tokens are reported with their quotes. Empty parameters are
//! reported as empty tokens. Whatever non-empty text the callback returns
//! replaces the token in the buffer, and scanning resumes right after it.
//!
//! Rewriting is not transactional: on failure, replacements already made
//! stay in the buffer.

/// Splice buffer used by the traversal.
pub mod buffer;
/// Opaque token recognizers for the SNMP OID prefix.
pub mod recognizer;

use std::fmt;
use std::ops::Range;

use tracing::debug;

use crate::error::RewriteError;
use crate::grammar::key::is_key_char;
use buffer::SpliceBuffer;
use recognizer::{OpaqueTokenRecognizer, default_recognizers};

/// The kind of string being rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    /// Item key: `name` or `name[params]`.
    Item,
    /// SNMP OID: free text, possibly with macros, up to an optional `[params]`.
    Oid,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyType::Item => f.write_str("item key"),
            KeyType::Oid => f.write_str("SNMP OID"),
        }
    }
}

/// A token reported to a rewrite callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteToken<'a> {
    /// Source text of the token, quotes included for quoted tokens.
    pub text: &'a str,
    /// What is being rewritten.
    pub key_type: KeyType,
    /// 0 for the prefix, 1 inside the parameter list, 2 inside an array.
    pub level: usize,
    /// 1-based index of the top-level parameter, 0 for the prefix.
    pub index: usize,
    /// Whether the token is a quoted string.
    pub quoted: bool,
    /// Whether the token is the inner text of a whole array parameter.
    pub array: bool,
    /// Byte offset of the token in the buffer at the time it is reported.
    pub offset: usize,
}

/// Traversal settings.
///
/// # Example
///
/// ```
/// use itemkey_core::rewrite::{KeyType, Rewriter};
///
/// let mut key = String::from("net.if.in[eth0,bytes]");
/// Rewriter::new(KeyType::Item)
///     .run(&mut key, |tok| (tok.index == 1 && tok.level == 1).then(|| "lo".to_string()))
///     .unwrap();
/// assert_eq!(key, "net.if.in[lo,bytes]");
/// ```
#[derive(Debug)]
pub struct Rewriter {
    key_type: KeyType,
    is_key_char: fn(u8) -> bool,
    recognizers: Vec<Box<dyn OpaqueTokenRecognizer>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NewParam,
    AfterParam,
    Unquoted,
    Quoted,
}

struct Traversal<'b, F> {
    buf: SpliceBuffer<'b>,
    key_type: KeyType,
    callback: F,
}

impl<F> Traversal<'_, F>
where
    F: FnMut(&RewriteToken<'_>) -> Result<Option<String>, String>,
{
    /// Report `span` and splice in any replacement. Returns the offset just
    /// past the (possibly replaced) token.
    fn emit(
        &mut self,
        span: Range<usize>,
        level: usize,
        index: usize,
        quoted: bool,
        array: bool,
    ) -> Result<usize, RewriteError> {
        let replacement = {
            let token = RewriteToken {
                text: &self.buf.as_str()[span.clone()],
                key_type: self.key_type,
                level,
                index,
                quoted,
                array,
                offset: span.start,
            };
            (self.callback)(&token).map_err(|reason| RewriteError::Rejected {
                key_type: self.key_type,
                position: span.start,
                reason,
            })?
        };
        match replacement {
            Some(text) if !text.is_empty() => Ok(self.buf.splice(span.start, span.end, &text)),
            _ => Ok(span.end),
        }
    }
}

impl Rewriter {
    /// Default settings for `key_type`: standard key characters and both
    /// macro recognizers.
    pub fn new(key_type: KeyType) -> Self {
        Self {
            key_type,
            is_key_char,
            recognizers: default_recognizers(),
        }
    }

    /// Use a different classifier for item key name characters.
    ///
    /// The classifier sees single bytes. A key name always ends on a
    /// character boundary; a multi-byte character only partly accepted is
    /// reported as an invalid key at its first byte.
    pub fn with_key_chars(mut self, is_key_char: fn(u8) -> bool) -> Self {
        self.is_key_char = is_key_char;
        self
    }

    /// Replace the opaque token recognizers used for OID prefixes.
    pub fn with_recognizers(mut self, recognizers: Vec<Box<dyn OpaqueTokenRecognizer>>) -> Self {
        self.recognizers = recognizers;
        self
    }

    /// The kind of string this rewriter expects.
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Rewrite `data` in place. `callback` returns replacement text for a
    /// token, or `None` to leave it as it is.
    pub fn run<F>(&self, data: &mut String, mut callback: F) -> Result<(), RewriteError>
    where
        F: FnMut(&RewriteToken<'_>) -> Option<String>,
    {
        self.try_run(data, |tok| Ok(callback(tok)))
    }

    /// Like [`Rewriter::run`], but the callback may refuse a token, which
    /// stops the traversal with [`RewriteError::Rejected`].
    pub fn try_run<F>(&self, data: &mut String, callback: F) -> Result<(), RewriteError>
    where
        F: FnMut(&RewriteToken<'_>) -> Result<Option<String>, String>,
    {
        let mut traversal = Traversal {
            buf: SpliceBuffer::new(data),
            key_type: self.key_type,
            callback,
        };
        let result = self.traverse(&mut traversal);
        if let Err(e) = &result {
            debug!(
                target: "itemkey::rewrite",
                key_type = %self.key_type,
                position = e.position(),
                "rewrite failed"
            );
        }
        result
    }

    /// End of the key name / OID prefix, or the offset of the offending byte.
    fn prefix_end(&self, text: &str) -> Result<usize, usize> {
        let b = text.as_bytes();
        match self.key_type {
            KeyType::Item => {
                let mut end = b.iter().take_while(|&&c| (self.is_key_char)(c)).count();
                let split = !text.is_char_boundary(end);
                while !text.is_char_boundary(end) {
                    end -= 1;
                }
                match b.get(end) {
                    _ if split => Err(end),
                    _ if end == 0 => Err(0),
                    None | Some(b'[') => Ok(end),
                    Some(_) => Err(end),
                }
            }
            KeyType::Oid => {
                let mut i = 0;
                while i < b.len() {
                    if let Some(len) = self.recognizers.iter().find_map(|r| r.recognize(text, i)) {
                        i += len;
                    } else if b[i] == b'[' {
                        break;
                    } else {
                        i += 1;
                    }
                }
                Ok(i)
            }
        }
    }

    fn traverse<F>(&self, t: &mut Traversal<'_, F>) -> Result<(), RewriteError>
    where
        F: FnMut(&RewriteToken<'_>) -> Result<Option<String>, String>,
    {
        let key_type = self.key_type;
        let invalid = |position| RewriteError::Invalid { key_type, position };

        let prefix = self.prefix_end(t.buf.as_str()).map_err(invalid)?;
        let mut i = t.emit(0..prefix, 0, 0, false, false)?;

        let mut state = State::NewParam;
        let mut level = 0;
        let mut index = 0;
        let mut start = 0;

        while let Some(c) = t.buf.byte(i) {
            match state {
                State::NewParam => match c {
                    b' ' => {}
                    b',' => {
                        i = t.emit(i..i, level, index, false, false)?;
                        if level == 1 {
                            index += 1;
                        }
                    }
                    b'[' => {
                        if level == 2 {
                            return Err(invalid(i));
                        }
                        level += 1;
                        if level == 1 {
                            index += 1;
                        } else if let Some(end) = array_end(t.buf.as_str().as_bytes(), i + 1) {
                            // The cursor stays on '[' so the elements of any
                            // replacement are traversed next.
                            t.emit(i + 1..end, 1, index, false, true)?;
                        }
                    }
                    b']' => {
                        if level == 0 {
                            return Err(invalid(i));
                        }
                        i = t.emit(i..i, level, index, false, false)?;
                        level -= 1;
                        state = State::AfterParam;
                    }
                    b'"' => {
                        state = State::Quoted;
                        start = i;
                    }
                    _ => {
                        state = State::Unquoted;
                        start = i;
                    }
                },
                State::AfterParam => match c {
                    b' ' => {}
                    b',' => {
                        state = State::NewParam;
                        if level == 1 {
                            index += 1;
                        }
                    }
                    b']' => {
                        if level == 0 {
                            return Err(invalid(i));
                        }
                        level -= 1;
                    }
                    _ => return Err(invalid(i)),
                },
                State::Unquoted => {
                    if c == b',' || c == b']' {
                        i = t.emit(start..i, level, index, false, false)?;
                        // Reprocess the separator as the end of the parameter.
                        state = State::AfterParam;
                        continue;
                    }
                }
                State::Quoted => {
                    if c == b'"' && t.buf.byte(i - 1) != Some(b'\\') {
                        i = t.emit(start..i + 1, level, index, true, false)?;
                        state = State::AfterParam;
                        continue;
                    }
                }
            }
            i += 1;
        }

        if i == 0 || level != 0 {
            return Err(invalid(i));
        }
        Ok(())
    }
}

/// Offset of the `]` closing the array whose elements start at `from`,
/// following the same element rules as the traversal. `None` if the array is
/// unterminated or malformed.
fn array_end(b: &[u8], from: usize) -> Option<usize> {
    let mut state = State::NewParam;
    let mut j = from;
    while let Some(&c) = b.get(j) {
        match state {
            State::NewParam => match c {
                b' ' | b',' => {}
                b'[' => return None,
                b']' => return Some(j),
                b'"' => state = State::Quoted,
                _ => state = State::Unquoted,
            },
            State::AfterParam => match c {
                b' ' => {}
                b',' => state = State::NewParam,
                b']' => return Some(j),
                _ => return None,
            },
            State::Unquoted => {
                if c == b',' || c == b']' {
                    state = State::AfterParam;
                    continue;
                }
            }
            State::Quoted => {
                if c == b'"' && b[j - 1] != b'\\' {
                    state = State::AfterParam;
                }
            }
        }
        j += 1;
    }
    None
}

/// Rewrite `data` with default settings for `key_type`.
///
/// `callback` returns replacement text for a token, or `None` (or an empty
/// string) to leave it unchanged.
pub fn replace_key_params<F>(
    data: &mut String,
    key_type: KeyType,
    callback: F,
) -> Result<(), RewriteError>
where
    F: FnMut(&RewriteToken<'_>) -> Option<String>,
{
    Rewriter::new(key_type).run(data, callback)
}

/// Rewrite `data` with default settings and a callback that may refuse a
/// token.
pub fn try_replace_key_params<F>(
    data: &mut String,
    key_type: KeyType,
    callback: F,
) -> Result<(), RewriteError>
where
    F: FnMut(&RewriteToken<'_>) -> Result<Option<String>, String>,
{
    Rewriter::new(key_type).try_run(data, callback)
}
