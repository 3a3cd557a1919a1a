//! Parse diagnostics
//!
//! Skipped and failed statements are reported as structured diagnostics
//! returned alongside the parse result, so callers decide what to surface
//! where. Nothing in this crate writes to a global log stream; the
//! `tracing` calls that remain are ambient instrumentation a subscriber
//! may route or drop.

use serde::{Deserialize, Serialize};

use crate::error::ScriptError;

/// Diagnostic severity level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

/// Diagnostic codes for categorizing skipped or failed statements
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// Statement is not shaped like `db.<collection>.<method>(...)`.
    InvalidFormat,
    /// Call parentheses never balance.
    UnbalancedStatement,
    /// Method is outside the recognized set.
    UnsupportedMethod,
    /// Argument literal failed strict JSON parsing after normalization.
    MalformedLiteral,
    /// Wrong number of top-level arguments.
    WrongArity,
    /// An options argument was unusable and ignored.
    MalformedOptions,
}

/// A diagnostic for one statement, with severity and category.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    /// The statement text the diagnostic refers to, when known.
    pub statement: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            statement: None,
        }
    }

    /// Create a warning diagnostic
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            statement: None,
        }
    }

    /// Attach the offending statement text
    pub fn with_statement(mut self, statement: impl Into<String>) -> Self {
        self.statement = Some(statement.into());
        self
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    /// Check if this is a warning
    pub fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning)
    }
}

// =============================================================================
// Convenience Builders
// =============================================================================

/// Warning recorded when an unparsable statement is skipped.
pub fn skipped_statement(error: &ScriptError, statement: &str) -> Diagnostic {
    Diagnostic::warning(code_for(error), error.to_string()).with_statement(statement)
}

/// Error recorded instead of aborting when the policy is `Skip`.
pub fn failed_statement(error: &ScriptError, statement: &str) -> Diagnostic {
    Diagnostic::error(code_for(error), error.to_string()).with_statement(statement)
}

fn code_for(error: &ScriptError) -> DiagnosticCode {
    match error {
        ScriptError::Format { .. } => DiagnosticCode::InvalidFormat,
        ScriptError::Unbalanced { .. } => DiagnosticCode::UnbalancedStatement,
        ScriptError::UnsupportedMethod { .. } => DiagnosticCode::UnsupportedMethod,
        ScriptError::LooseLiteral { .. } => DiagnosticCode::MalformedLiteral,
        ScriptError::Arity { .. } => DiagnosticCode::WrongArity,
        ScriptError::Statement { source, .. } => code_for(source),
    }
}

// =============================================================================
// Tests
// =============================================================================
