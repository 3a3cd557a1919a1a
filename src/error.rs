//! Error types for script parsing
//!
//! This module provides thiserror-based error types for the parse pipeline
//! and the policy knob that decides whether a bad statement aborts the
//! whole script or is skipped with a diagnostic.

use thiserror::Error;

/// Errors produced while turning script text into operations.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// The statement is not shaped like `db.<collection>.<method>(...)`.
    #[error("Statement does not match db.<collection>.<method>(...): {statement}")]
    Format { statement: String },

    /// The call's parentheses never balance out.
    #[error("No matching closing parenthesis found: {statement}")]
    Unbalanced { statement: String },

    /// The method is not one of the recognized setup methods.
    #[error("Unsupported method '{method}' on collection '{collection}'")]
    UnsupportedMethod { method: String, collection: String },

    /// An argument literal still fails strict JSON parsing after
    /// normalization, or parses to something that is not usable where a
    /// document is required.
    #[error("Malformed literal `{literal}`: {message}")]
    LooseLiteral { literal: String, message: String },

    /// The call has the wrong number of top-level arguments.
    #[error("{method}: {message}")]
    Arity { method: String, message: String },

    /// A lower-level error tagged with the statement that produced it.
    #[error("Failed to parse statement `{statement}`: {source}")]
    Statement {
        statement: String,
        #[source]
        source: Box<ScriptError>,
    },
}

impl ScriptError {
    /// Wrap this error with the statement it came from.
    pub fn in_statement(self, statement: impl Into<String>) -> ScriptError {
        ScriptError::Statement {
            statement: statement.into(),
            source: Box::new(self),
        }
    }

    /// The underlying error kind, unwrapping any statement context.
    pub fn root(&self) -> &ScriptError {
        match self {
            ScriptError::Statement { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for parse-stage functions.
pub type ParseResult<T> = Result<T, ScriptError>;

/// What to do when a statement's arguments fail to parse.
///
/// Extraction-stage failures (bad format, unbalanced parens, unsupported
/// method) are always skipped with a warning regardless of policy; the
/// policy governs literal and arity failures inside a recognized call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Abort the whole script at the first failure, reporting the
    /// offending statement.
    #[default]
    Halt,
    /// Record an error-severity diagnostic for the statement and continue
    /// with the rest of the script.
    Skip,
}
