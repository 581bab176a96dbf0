//! Typed errors for parameter-list queries and key rewriting.
//!
//! Each error converts into an [`itemkey_diagnostics::Diagnostic`] through
//! `to_diagnostic()`, so front ends can render them with source context.

use std::collections::BTreeMap;
use std::fmt;

use itemkey_diagnostics::{Diagnostic, Span, codes};
use thiserror::Error;

use crate::rewrite::KeyType;

/// The reason a parameter list failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SyntaxErrorKind {
    /// `[` while already inside an array.
    NestedArray,
    /// `]` outside of any array.
    UnbalancedBracket,
    /// A quoted parameter is missing its closing `"`.
    UnterminatedQuote,
    /// An array parameter is missing its closing `]`.
    UnterminatedArray,
    /// Text other than spaces follows a closing `"` or `]`.
    UnexpectedCharacter,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SyntaxErrorKind::NestedArray => "multi-level array",
            SyntaxErrorKind::UnbalancedBracket => "unbalanced ']'",
            SyntaxErrorKind::UnterminatedQuote => "missing terminating '\"'",
            SyntaxErrorKind::UnterminatedArray => "missing terminating ']'",
            SyntaxErrorKind::UnexpectedCharacter => "unexpected character after parameter",
        };
        f.write_str(text)
    }
}

/// A malformed parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} at offset {offset}")]
pub struct SyntaxError {
    /// Byte offset in the parameter list where the problem was detected.
    pub offset: usize,
    /// What went wrong.
    pub kind: SyntaxErrorKind,
}

impl SyntaxError {
    pub(crate) fn new(offset: usize, kind: SyntaxErrorKind) -> Self {
        Self { offset, kind }
    }

    /// Whether this is the unsupported-nesting variant.
    pub fn is_nesting(&self) -> bool {
        self.kind == SyntaxErrorKind::NestedArray
    }

    /// Convert into a diagnostic pointing at the offending byte.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let id = if self.is_nesting() {
            codes::NESTED_ARRAY
        } else {
            codes::PARAM_SYNTAX
        };
        Diagnostic::error(id, self.to_string(), Some(Span::empty(self.offset)))
    }
}

/// Errors returned by the parameter-list queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParamError {
    /// The list is malformed. Only counting reports this; extraction and
    /// length measurement report [`ParamError::Missing`] instead.
    #[error("invalid parameter list: {0}")]
    Syntax(#[from] SyntaxError),

    /// The requested parameter does not exist.
    #[error("parameter {index} is missing")]
    Missing {
        /// The requested 1-based index.
        index: usize,
    },

    /// The destination capacity cannot hold the value and its terminator.
    #[error("parameter needs {needed} bytes but the destination holds {capacity}")]
    Overflow {
        /// Bytes required, including the terminator.
        needed: usize,
        /// Destination capacity, including the terminator.
        capacity: usize,
    },
}

impl ParamError {
    /// Convert into a diagnostic. Only syntax errors carry a span.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ParamError::Syntax(e) => e.to_diagnostic(),
            ParamError::Missing { .. } => {
                Diagnostic::error(codes::PARAM_MISSING, self.to_string(), None)
            }
            ParamError::Overflow { .. } => {
                Diagnostic::error(codes::PARAM_OVERFLOW, self.to_string(), None)
            }
        }
    }
}

/// Failure of a rewrite traversal.
///
/// Splices applied before the failure stay in the buffer: the traversal is
/// not transactional.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RewriteError {
    /// The key or OID could not be tokenized.
    #[error("Invalid {key_type} at position {position}")]
    Invalid {
        /// What was being traversed.
        key_type: KeyType,
        /// Byte offset of the failure in the (possibly already rewritten) buffer.
        position: usize,
    },

    /// A fallible callback refused a token.
    #[error("Cannot process {key_type} at position {position}: {reason}")]
    Rejected {
        /// What was being traversed.
        key_type: KeyType,
        /// Byte offset of the refused token.
        position: usize,
        /// The callback's explanation.
        reason: String,
    },
}

impl RewriteError {
    /// Byte offset the error refers to.
    pub fn position(&self) -> usize {
        match self {
            RewriteError::Invalid { position, .. } | RewriteError::Rejected { position, .. } => {
                *position
            }
        }
    }

    /// Kind of input that was being traversed.
    pub fn key_type(&self) -> KeyType {
        match self {
            RewriteError::Invalid { key_type, .. } | RewriteError::Rejected { key_type, .. } => {
                *key_type
            }
        }
    }

    /// Convert into a diagnostic pointing at the failing byte.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let id = match self {
            RewriteError::Invalid { .. } => codes::INVALID_KEY,
            RewriteError::Rejected { .. } => codes::REWRITE_REJECTED,
        };
        Diagnostic::error(id, self.to_string(), Some(Span::empty(self.position()))).with_context(
            BTreeMap::from([
                ("key_type".to_string(), self.key_type().to_string()),
                ("position".to_string(), self.position().to_string()),
            ]),
        )
    }
}

/// A parameter that cannot be quoted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum QuoteError {
    /// The closing quote would be escaped by the trailing backslash.
    #[error("parameter ends with a backslash and cannot be quoted")]
    TrailingBackslash,
}

impl QuoteError {
    /// Convert into a diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(codes::UNQUOTABLE_PARAM, self.to_string(), None)
    }
}
