//! Parameter access for whole keys of the form `name[param,param,...]`.
//!
//! The parameter list is taken to lie between the first `[` and the last `]`
//! of the key. Those need not be a matching pair: `a[b]c[d]` yields the list
//! `b]c[d`, which then fails to parse.

use super::params::{self, Param};
use crate::error::ParamError;

/// Whether `c` may appear in an item key name: ASCII alphanumerics, `.`, `_`
/// and `-`.
pub fn is_key_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'.' | b'_' | b'-')
}

/// The text strictly between the first `[` and the last `]` of `key`.
pub fn param_list(key: &str) -> Option<&str> {
    let open = key.find('[')?;
    let close = key.rfind(']')?;
    if open > close {
        return None;
    }
    Some(&key[open + 1..close])
}

/// Number of parameters of `key`.
///
/// A key without a parameter list reports parameter 1 as missing.
pub fn count(key: &str) -> Result<usize, ParamError> {
    let list = param_list(key).ok_or(ParamError::Missing { index: 1 })?;
    Ok(params::count(list)?)
}

/// Extract parameter `index` of `key` into a destination of `capacity`
/// bytes (terminator included).
pub fn extract(key: &str, index: usize, capacity: usize) -> Result<Param, ParamError> {
    let list = param_list(key).ok_or(ParamError::Missing { index })?;
    params::extract(list, index, capacity)
}

/// Extract parameter `index` of `key`, allocating as needed.
pub fn extract_owned(key: &str, index: usize) -> Result<Param, ParamError> {
    let list = param_list(key).ok_or(ParamError::Missing { index })?;
    params::extract_owned(list, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::lexer::ParamType;

    #[test]
    fn key_chars() {
        for c in b"azAZ09._-" {
            assert!(is_key_char(*c), "{}", *c as char);
        }
        for c in b"[], \"/{$}" {
            assert!(!is_key_char(*c), "{}", *c as char);
        }
    }

    #[test]
    fn param_list_bounds() {
        assert_eq!(param_list("vfs.fs.size[/,used]"), Some("/,used"));
        assert_eq!(param_list("key[]"), Some(""));
        assert_eq!(param_list("key"), None);
        assert_eq!(param_list("key]["), None);
        assert_eq!(param_list("a[b]c[d]"), Some("b]c[d"));
    }

    #[test]
    fn count_key_params() {
        assert_eq!(count("vfs.fs.size[/,used]"), Ok(2));
        assert_eq!(count("key[]"), Ok(1));
        assert_eq!(count("key"), Err(ParamError::Missing { index: 1 }));
        assert!(matches!(count("a[b]c[d]"), Err(ParamError::Syntax(_))));
    }

    #[test]
    fn extract_key_params() {
        let key = r#"sensor[channel,[1,2,"a,b"]]"#;
        assert_eq!(extract_owned(key, 1).unwrap().value, "channel");
        let array = extract_owned(key, 2).unwrap();
        assert_eq!(array.ty, ParamType::Array);
        assert_eq!(array.value, r#"1,2,"a,b""#);
        assert_eq!(extract_owned(key, 3), Err(ParamError::Missing { index: 3 }));
        assert_eq!(extract("key", 1, 8), Err(ParamError::Missing { index: 1 }));
    }

    #[test]
    fn extract_key_param_respects_capacity() {
        assert_eq!(extract("k[abcd]", 1, 5).unwrap().value, "abcd");
        assert!(matches!(
            extract("k[abcd]", 1, 4),
            Err(ParamError::Overflow { .. })
        ));
    }
}
