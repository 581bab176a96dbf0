//! Item key toolchain core library.
//!
//! Parses and rewrites the parameter lists of monitoring item keys and SNMP
//! OIDs, such as `vfs.fs.size[/,used]` or `sensor[channel,[1,2,"a,b"]]`.
//! The main entry points are [`count`], [`extract_owned`] and [`remove`] for
//! bare parameter lists, [`key_count`] and [`key_param`] for whole keys, and
//! [`replace_key_params`] for callback-driven rewriting.

#![warn(missing_docs)]

/// Typed errors for queries and rewriting.
pub mod error;
/// Parameter-list grammar: tokenizer, queries, editing and quoting.
pub mod grammar;
/// Callback-driven rewriting of item keys and SNMP OIDs.
pub mod rewrite;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Errors
pub use error::{ParamError, QuoteError, RewriteError, SyntaxError, SyntaxErrorKind};

// Parameter lists
pub use grammar::edit::remove;
pub use grammar::lexer::{ParamType, tokenize};
pub use grammar::params::{Param, count, extract, extract_owned, measure, split};
pub use grammar::quote::{quote_param, unquote_param};

// Whole keys
pub use grammar::key::{
    count as key_count, extract as key_extract, extract_owned as key_param, is_key_char,
};

// Rewriting
pub use rewrite::{
    KeyType, RewriteToken, Rewriter, replace_key_params, try_replace_key_params,
};

// Diagnostics (re-exported from the diagnostics crate)
pub use itemkey_diagnostics::{Diagnostic, Severity, Span, codes};
