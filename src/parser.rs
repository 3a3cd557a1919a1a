//! Call extraction and the parse pipeline
//!
//! [`ScriptParser::parse`] drives the full pipeline: segment the source
//! into statements, extract the `db.<collection>.<method>(...)` anatomy
//! of each, and hand recognized calls to the operation builder. Text that
//! does not look like a call at all is ignored; calls that fail
//! extraction are skipped with a warning diagnostic; argument failures
//! inside a recognized call follow the parser's [`ErrorPolicy`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::diagnostics::{failed_statement, skipped_statement, Diagnostic};
use crate::error::{ErrorPolicy, ParseResult, ScriptError};
use crate::operation::{build_operation, Operation};
use crate::scanner::find_matching_paren;
use crate::segment::split_statements;

/// The collection methods this parser recognizes.
///
/// `db.createCollection(...)` is a call on the database handle, not on a
/// collection, and is extracted separately; a `createCollection` seen in
/// method position is unsupported like any other unknown method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    CreateIndex,
    InsertOne,
    InsertMany,
    UpdateOne,
    UpdateMany,
    DeleteOne,
    DeleteMany,
}

impl Method {
    pub fn parse(name: &str) -> Option<Method> {
        match name {
            "createIndex" => Some(Method::CreateIndex),
            "insertOne" => Some(Method::InsertOne),
            "insertMany" => Some(Method::InsertMany),
            "updateOne" => Some(Method::UpdateOne),
            "updateMany" => Some(Method::UpdateMany),
            "deleteOne" => Some(Method::DeleteOne),
            "deleteMany" => Some(Method::DeleteMany),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::CreateIndex => "createIndex",
            Method::InsertOne => "insertOne",
            Method::InsertMany => "insertMany",
            Method::UpdateOne => "updateOne",
            Method::UpdateMany => "updateMany",
            Method::DeleteOne => "deleteOne",
            Method::DeleteMany => "deleteMany",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One extracted call, before its arguments are interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCall {
    /// `db.<collection>.<method>(args)`
    Collection {
        collection: String,
        method: Method,
        args_text: String,
    },
    /// `db.createCollection(args)`; the collection name is the first
    /// argument and is resolved by the builder.
    CreateCollection { args_text: String },
}

impl ParsedCall {
    /// Raw text between the call's parentheses.
    pub fn args_text(&self) -> &str {
        match self {
            ParsedCall::Collection { args_text, .. }
            | ParsedCall::CreateCollection { args_text } => args_text,
        }
    }
}

/// Extract the call anatomy of a single statement.
///
/// The statement must start with `db.`; the first dot ends the `db`
/// handle, the second separates collection from method, and the argument
/// text runs from the method's `(` to its matching `)`. Paren matching
/// counts opens and closes only, so a parenthesis inside a string
/// argument defeats it; that is a documented dialect limitation.
pub fn extract_call(statement: &str) -> ParseResult<ParsedCall> {
    let stmt = statement.trim();
    let stmt = stmt.strip_suffix(';').unwrap_or(stmt);

    if stmt.starts_with("db.createCollection(") {
        let inner = &stmt["db.createCollection".len()..];
        let close = inner.rfind(')').ok_or_else(|| ScriptError::Unbalanced {
            statement: stmt.to_string(),
        })?;
        return Ok(ParsedCall::CreateCollection {
            args_text: inner[1..close].to_string(),
        });
    }

    if !stmt.starts_with("db.") {
        return Err(ScriptError::Format {
            statement: stmt.to_string(),
        });
    }
    let after_db = &stmt[3..];
    let collection_end = after_db.find('.').ok_or_else(|| ScriptError::Format {
        statement: stmt.to_string(),
    })?;
    let collection = &after_db[..collection_end];
    let rest = &after_db[collection_end + 1..];

    let open = rest.find('(').ok_or_else(|| ScriptError::Format {
        statement: stmt.to_string(),
    })?;
    let close = find_matching_paren(rest, open).ok_or_else(|| ScriptError::Unbalanced {
        statement: stmt.to_string(),
    })?;
    let method_name = &rest[..open];

    let method = Method::parse(method_name).ok_or_else(|| ScriptError::UnsupportedMethod {
        method: method_name.to_string(),
        collection: collection.to_string(),
    })?;

    Ok(ParsedCall::Collection {
        collection: collection.to_string(),
        method,
        args_text: rest[open + 1..close].to_string(),
    })
}

// ---------------------------------------------------------------------------
// Parse pipeline
// ---------------------------------------------------------------------------

/// Everything a parse produced: operations in source order plus the
/// diagnostics for statements that were skipped or failed along the way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedScript {
    pub operations: Vec<Operation>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedScript {
    /// True when every statement parsed without a diagnostic.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// True when any diagnostic is error severity.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Script parser with a configurable failure policy.
///
/// Stateless between invocations; parsing the same source twice yields
/// the same result.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptParser {
    policy: ErrorPolicy,
}

impl ScriptParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ErrorPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Parse script source into operations, in strict source order.
    pub fn parse(&self, source: &str) -> ParseResult<ParsedScript> {
        let mut script = ParsedScript::default();

        for statement in split_statements(source) {
            if !(statement.starts_with("db.") && statement.contains('(')) {
                debug!("Ignoring non-call statement: {}", statement);
                continue;
            }

            let call = match extract_call(&statement) {
                Ok(call) => call,
                Err(error) => {
                    warn!("Failed to parse statement `{}`: {}", statement, error);
                    script.diagnostics.push(skipped_statement(&error, &statement));
                    continue;
                }
            };

            let before = script.diagnostics.len();
            let built = build_operation(&call, &mut script.diagnostics);
            for diagnostic in &mut script.diagnostics[before..] {
                if diagnostic.statement.is_none() {
                    diagnostic.statement = Some(statement.clone());
                }
            }

            match built {
                Ok(operation) => {
                    debug!("Parsed {}", operation.description());
                    script.operations.push(operation);
                }
                Err(error) => match self.policy {
                    ErrorPolicy::Halt => return Err(error.in_statement(statement)),
                    ErrorPolicy::Skip => {
                        warn!("Skipping statement `{}`: {}", statement, error);
                        script.diagnostics.push(failed_statement(&error, &statement));
                    }
                },
            }
        }

        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticCode;

    #[test]
    fn test_extract_collection_call() {
        let call = extract_call("db.users.insertOne({name: 'Ann'});").unwrap();
        assert_eq!(
            call,
            ParsedCall::Collection {
                collection: "users".to_string(),
                method: Method::InsertOne,
                args_text: "{name: 'Ann'}".to_string(),
            }
        );
    }

    #[test]
    fn test_extract_without_trailing_semicolon() {
        let call = extract_call("db.users.deleteMany({})").unwrap();
        assert_eq!(call.args_text(), "{}");
    }

    #[test]
    fn test_extract_create_collection() {
        let call = extract_call("db.createCollection('users', {capped: false});").unwrap();
        assert_eq!(
            call,
            ParsedCall::CreateCollection {
                args_text: "'users', {capped: false}".to_string(),
            }
        );
    }

    #[test]
    fn test_create_collection_in_method_position_is_unsupported() {
        let err = extract_call("db.users.createCollection('x');").unwrap_err();
        match err {
            ScriptError::UnsupportedMethod { method, collection } => {
                assert_eq!(method, "createCollection");
                assert_eq!(collection, "users");
            }
            other => panic!("expected UnsupportedMethod, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_format_errors() {
        assert!(matches!(
            extract_call("print('hi');").unwrap_err(),
            ScriptError::Format { .. }
        ));
        assert!(matches!(
            extract_call("db.version();").unwrap_err(),
            ScriptError::Format { .. }
        ));
        assert!(matches!(
            extract_call("db.users.insertOne;").unwrap_err(),
            ScriptError::Format { .. }
        ));
    }

    #[test]
    fn test_extract_unbalanced_parens() {
        assert!(matches!(
            extract_call("db.users.insertOne({name: 'Ann'}").unwrap_err(),
            ScriptError::Unbalanced { .. }
        ));
        assert!(matches!(
            extract_call("db.createCollection('users'").unwrap_err(),
            ScriptError::Unbalanced { .. }
        ));
    }

    #[test]
    fn test_extract_unsupported_method() {
        let err = extract_call("db.users.aggregate([{$match: {}}]);").unwrap_err();
        assert!(matches!(err, ScriptError::UnsupportedMethod { .. }));
    }

    #[test]
    fn test_method_round_trip() {
        for name in [
            "createIndex",
            "insertOne",
            "insertMany",
            "updateOne",
            "updateMany",
            "deleteOne",
            "deleteMany",
        ] {
            let method = Method::parse(name).expect("method should be recognized");
            assert_eq!(method.as_str(), name);
        }
        assert!(Method::parse("findOne").is_none());
    }

    #[test]
    fn test_parse_two_statements() {
        let parser = ScriptParser::new();
        let script = parser
            .parse("db.users.insertOne({a: 1});\ndb.users.deleteOne({a: 1});")
            .unwrap();
        assert_eq!(script.operations.len(), 2);
        assert!(script.is_clean());
        assert_eq!(script.operations[0].method_name(), "insertOne");
        assert_eq!(script.operations[1].method_name(), "deleteOne");
    }

    #[test]
    fn test_parse_ignores_non_call_statements() {
        let parser = ScriptParser::new();
        let script = parser
            .parse("use mydb;\nlet x = 5;\ndb.users.insertOne({a: 1});")
            .unwrap();
        assert_eq!(script.operations.len(), 1);
        assert!(script.is_clean());
    }

    #[test]
    fn test_parse_skips_unsupported_method_with_warning() {
        let parser = ScriptParser::new();
        let script = parser
            .parse("db.users.renameCollection('members');\ndb.users.insertOne({a: 1});")
            .unwrap();
        assert_eq!(script.operations.len(), 1);
        assert_eq!(script.diagnostics.len(), 1);
        assert_eq!(script.diagnostics[0].code, DiagnosticCode::UnsupportedMethod);
        assert!(script.diagnostics[0].is_warning());
        assert!(!script.has_errors());
    }

    #[test]
    fn test_halt_policy_aborts_with_statement_context() {
        let parser = ScriptParser::new();
        let err = parser
            .parse("db.users.insertOne({a: b c});\ndb.users.insertOne({a: 1});")
            .unwrap_err();
        match &err {
            ScriptError::Statement { statement, .. } => {
                assert_eq!(statement, "db.users.insertOne({a: b c});");
            }
            other => panic!("expected Statement context, got {other:?}"),
        }
        assert!(matches!(err.root(), ScriptError::LooseLiteral { .. }));
    }

    #[test]
    fn test_skip_policy_collects_error_and_continues() {
        let parser = ScriptParser::with_policy(ErrorPolicy::Skip);
        let script = parser
            .parse("db.users.insertOne({a: b c});\ndb.users.insertOne({a: 1});")
            .unwrap();
        assert_eq!(script.operations.len(), 1);
        assert_eq!(script.diagnostics.len(), 1);
        assert!(script.has_errors());
        assert_eq!(script.diagnostics[0].code, DiagnosticCode::MalformedLiteral);
        assert_eq!(
            script.diagnostics[0].statement.as_deref(),
            Some("db.users.insertOne({a: b c});")
        );
    }

    #[test]
    fn test_unbalanced_brace_absorbs_following_lines() {
        // An unclosed brace keeps the segmenter's depth above zero, so the
        // next statement is absorbed into the same buffer and the whole
        // thing fails as one statement.
        let parser = ScriptParser::with_policy(ErrorPolicy::Skip);
        let script = parser
            .parse("db.users.insertOne({broken);\ndb.users.insertOne({a: 1});")
            .unwrap();
        assert!(script.operations.is_empty());
        assert_eq!(script.diagnostics.len(), 1);
        assert_eq!(
            script.diagnostics[0].statement.as_deref(),
            Some("db.users.insertOne({broken); db.users.insertOne({a: 1});")
        );
    }

    #[test]
    fn test_option_warnings_are_tagged_with_statement() {
        let parser = ScriptParser::new();
        let script = parser
            .parse("db.users.createIndex({email: 1}, 42);")
            .unwrap();
        assert_eq!(script.operations.len(), 1);
        assert_eq!(script.diagnostics.len(), 1);
        assert_eq!(
            script.diagnostics[0].statement.as_deref(),
            Some("db.users.createIndex({email: 1}, 42);")
        );
    }

    #[test]
    fn test_parse_empty_source() {
        let parser = ScriptParser::new();
        let script = parser.parse("// comments only\n\n").unwrap();
        assert!(script.operations.is_empty());
        assert!(script.is_clean());
    }
}
