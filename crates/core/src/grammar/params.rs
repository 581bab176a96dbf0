//! Read-only queries over a parameter list.
//!
//! Every query is a single pass over [`tokenize`]; they differ only in what
//! they do with the tokens. Indexes are 1-based. A malformed list has no
//! parameters at all: [`count`] reports the syntax error, while the
//! extraction queries report [`ParamError::Missing`] for every index.

use tracing::debug;

use super::lexer::{ParamType, TokKind, tokenize};
use crate::error::{ParamError, SyntaxError};

/// A decoded parameter.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Param {
    /// Decoded value. For arrays this is the inner text, itself a parameter
    /// list.
    pub value: String,
    /// Type judged by the parameter's first significant character.
    #[serde(rename = "type")]
    pub ty: ParamType,
}

/// Number of top-level parameters in `list`.
///
/// An empty or all-space list has exactly one (empty) parameter.
pub fn count(list: &str) -> Result<usize, SyntaxError> {
    let mut n = 1;
    for tok in tokenize(list) {
        if tok?.kind == TokKind::Comma {
            n += 1;
        }
    }
    Ok(n)
}

/// Walk the whole list, feeding the decoded text of parameter `index` to
/// `sink`. Returns the parameter's type.
fn scan<'a>(
    list: &'a str,
    index: usize,
    mut sink: impl FnMut(&'a str),
) -> Result<ParamType, ParamError> {
    let mut ty = ParamType::Undefined;
    let mut last = 1;
    for tok in tokenize(list) {
        let tok = tok.map_err(|e| {
            debug!(list, index, error = %e, "parameter list is malformed");
            ParamError::Missing { index }
        })?;
        match tok.kind {
            TokKind::Comma => last = tok.index + 1,
            TokKind::Begin(t) if tok.index == index => ty = t,
            TokKind::Value if tok.index == index => sink(tok.text),
            _ => {}
        }
    }
    if index == 0 || index > last {
        return Err(ParamError::Missing { index });
    }
    Ok(ty)
}

/// Decoded length in bytes of parameter `index`.
pub fn measure(list: &str, index: usize) -> Result<usize, ParamError> {
    let mut len = 0;
    scan(list, index, |text| len += text.len())?;
    Ok(len)
}

/// Extract parameter `index` into a destination of `capacity` bytes.
///
/// `capacity` includes one byte for a terminator, so the value must be at
/// most `capacity - 1` bytes long or [`ParamError::Overflow`] is returned.
/// Nothing is returned on failure.
pub fn extract(list: &str, index: usize, capacity: usize) -> Result<Param, ParamError> {
    let limit = capacity.saturating_sub(1);
    let mut value = String::new();
    let mut needed = 0;
    let ty = scan(list, index, |text| {
        needed += text.len();
        if needed <= limit {
            value.push_str(text);
        }
    })?;
    if capacity == 0 || needed > limit {
        return Err(ParamError::Overflow {
            needed: needed + 1,
            capacity,
        });
    }
    Ok(Param { value, ty })
}

/// Extract parameter `index`, allocating exactly as much as it needs.
///
/// Measures first, then extracts with a capacity of the measured length plus
/// the terminator. An extraction failure after a successful measurement
/// means the two passes disagree; it is returned unchanged.
pub fn extract_owned(list: &str, index: usize) -> Result<Param, ParamError> {
    let len = measure(list, index)?;
    extract(list, index, len + 1)
}

/// Every top-level parameter of `list`, decoded, in order.
pub fn split(list: &str) -> Result<Vec<Param>, SyntaxError> {
    let mut params = vec![Param {
        value: String::new(),
        ty: ParamType::Undefined,
    }];
    for tok in tokenize(list) {
        let tok = tok?;
        match tok.kind {
            TokKind::Comma => params.push(Param {
                value: String::new(),
                ty: ParamType::Undefined,
            }),
            TokKind::Begin(ty) => {
                if let Some(p) = params.last_mut() {
                    p.ty = ty;
                }
            }
            TokKind::Value => {
                if let Some(p) = params.last_mut() {
                    p.value.push_str(tok.text);
                }
            }
        }
    }
    Ok(params)
}
