//! Diagnostic ID constants.
//!
//! Use these instead of string literals to get compile-time typo detection
//! and IDE autocomplete. Every code listed here has an entry in
//! [`explain`](crate::explain).

/// Malformed quoting, bracketing or trailing text in a parameter list.
pub const PARAM_SYNTAX: &str = "IKP1001";
/// An array opened while already inside an array.
pub const NESTED_ARRAY: &str = "IKP1002";
/// The requested parameter index does not exist.
pub const PARAM_MISSING: &str = "IKP1101";
/// The extraction destination is too small for the parameter value.
pub const PARAM_OVERFLOW: &str = "IKP1102";
/// The key or OID has no `[...]` parameter list.
pub const NO_PARAMETER_LIST: &str = "IKP1103";
/// The rewrite traversal could not tokenize the key or OID.
pub const INVALID_KEY: &str = "IKP2001";
/// A rewrite callback refused a token.
pub const REWRITE_REJECTED: &str = "IKP2002";
/// A parameter cannot be quoted.
pub const UNQUOTABLE_PARAM: &str = "IKP3001";

/// Every known diagnostic code, in ascending order.
pub const ALL: &[&str] = &[
    PARAM_SYNTAX,
    NESTED_ARRAY,
    PARAM_MISSING,
    PARAM_OVERFLOW,
    NO_PARAMETER_LIST,
    INVALID_KEY,
    REWRITE_REJECTED,
    UNQUOTABLE_PARAM,
];
