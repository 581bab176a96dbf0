//! Quoting helpers for rewrite callbacks.
//!
//! A callback that substitutes text into a parameter must keep the key
//! parseable: a value containing `,` or `]` has to be quoted, and a quoted
//! value must have its inner quotes escaped.

use std::borrow::Cow;

use crate::error::QuoteError;

/// Quote `param` if it needs it, or always when `forced`.
///
/// Without `forced`, a parameter that does not start with `"`, ` ` or `[`
/// and contains neither `,` nor `]` is returned unchanged.
pub fn quote_param(param: &str, forced: bool) -> Result<Cow<'_, str>, QuoteError> {
    if !forced
        && !param.starts_with(['"', ' ', '['])
        && !param.contains([',', ']'])
    {
        return Ok(Cow::Borrowed(param));
    }
    if param.ends_with('\\') {
        return Err(QuoteError::TrailingBackslash);
    }
    let mut out = String::with_capacity(param.len() + 2);
    out.push('"');
    for c in param.chars() {
        if c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    Ok(Cow::Owned(out))
}

/// Strip the quotes from a quoted parameter and decode `\"`.
///
/// Anything not starting with `"` is returned unchanged. A missing closing
/// quote is tolerated.
pub fn unquote_param(param: &str) -> Cow<'_, str> {
    let Some(rest) = param.strip_prefix('"') else {
        return Cow::Borrowed(param);
    };
    let body = rest.strip_suffix('"').unwrap_or(rest);
    if !body.contains("\\\"") {
        return Cow::Borrowed(body);
    }
    Cow::Owned(body.replace("\\\"", "\""))
}
