//! Typed operations and the per-method builder
//!
//! [`build_operation`] turns an extracted call into an [`Operation`]
//! descriptor: arguments are split at top level, each literal is
//! normalized and parsed, and per-method arity and shape rules apply.
//! Unusable *options* arguments are ignored with a warning diagnostic;
//! unusable *required* arguments are errors.
//!
//! Index key order is part of the descriptor contract: a compound index
//! on `{last: 1, first: 1}` is not the index on `{first: 1, last: 1}`.
//! Since the parsed map orders keys alphabetically, the builder re-reads
//! key order from the normalized literal text and stores the spec as an
//! ordered `Vec`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::error::{ParseResult, ScriptError};
use crate::normalize::{normalize_literal, parse_loose, top_level_keys};
use crate::parser::{Method, ParsedCall};
use crate::scanner::split_top_level;

/// A parsed document: a JSON object with string keys.
pub type Document = Map<String, Value>;

/// Options recognized on `createIndex`. Anything else in the options
/// argument is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexOptions {
    pub unique: Option<bool>,
    pub name: Option<String>,
}

/// One database operation a script asks for, in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    CreateCollection {
        collection: String,
        validator: Option<Document>,
    },
    CreateIndex {
        collection: String,
        /// Index keys in the order the script wrote them.
        keys: Vec<(String, Value)>,
        options: IndexOptions,
    },
    Insert {
        collection: String,
        method: String,
        documents: Vec<Document>,
    },
    Update {
        collection: String,
        method: String,
        filter: Document,
        update: Document,
    },
    Delete {
        collection: String,
        method: String,
        filter: Document,
    },
}

impl Operation {
    /// Collection the operation targets.
    pub fn collection(&self) -> &str {
        match self {
            Operation::CreateCollection { collection, .. }
            | Operation::CreateIndex { collection, .. }
            | Operation::Insert { collection, .. }
            | Operation::Update { collection, .. }
            | Operation::Delete { collection, .. } => collection,
        }
    }

    /// Shell method name the operation came from.
    pub fn method_name(&self) -> &str {
        match self {
            Operation::CreateCollection { .. } => "createCollection",
            Operation::CreateIndex { .. } => "createIndex",
            Operation::Insert { method, .. }
            | Operation::Update { method, .. }
            | Operation::Delete { method, .. } => method,
        }
    }

    /// One-line summary for logs and demos.
    pub fn description(&self) -> String {
        match self {
            Operation::CreateCollection {
                collection,
                validator,
            } => {
                if validator.is_some() {
                    format!("createCollection {collection} (with validator)")
                } else {
                    format!("createCollection {collection}")
                }
            }
            Operation::CreateIndex {
                collection, keys, ..
            } => {
                let fields: Vec<&str> = keys.iter().map(|(k, _)| k.as_str()).collect();
                format!("createIndex on {collection} ({})", fields.join(", "))
            }
            Operation::Insert {
                collection,
                method,
                documents,
            } => format!("{method} into {collection} ({} documents)", documents.len()),
            Operation::Update {
                collection, method, ..
            }
            | Operation::Delete {
                collection, method, ..
            } => format!("{method} on {collection}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build the typed operation for one extracted call.
///
/// Warnings about ignored options land in `diagnostics`; errors follow
/// the caller's policy.
pub(crate) fn build_operation(
    call: &ParsedCall,
    diagnostics: &mut Vec<Diagnostic>,
) -> ParseResult<Operation> {
    match call {
        ParsedCall::CreateCollection { args_text } => {
            build_create_collection(args_text, diagnostics)
        }
        ParsedCall::Collection {
            collection,
            method,
            args_text,
        } => match method {
            Method::CreateIndex => build_create_index(collection, args_text, diagnostics),
            Method::InsertOne | Method::InsertMany => build_insert(collection, *method, args_text),
            Method::UpdateOne | Method::UpdateMany => build_update(collection, *method, args_text),
            Method::DeleteOne | Method::DeleteMany => build_delete(collection, *method, args_text),
        },
    }
}

fn build_create_collection(
    args_text: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> ParseResult<Operation> {
    let args = split_top_level(args_text, ',');
    let name = args
        .first()
        .map(|raw| raw.trim_matches(|c| c == '"' || c == '\'').to_string())
        .unwrap_or_default();
    if name.is_empty() {
        return Err(ScriptError::Arity {
            method: "createCollection".to_string(),
            message: "requires a collection name".to_string(),
        });
    }

    let mut validator = None;
    if let Some(raw_options) = args.get(1) {
        match parse_loose(raw_options) {
            Ok(Value::Object(options)) => {
                if let Some(Value::Object(rules)) = options.get("validator") {
                    validator = Some(rules.clone());
                }
            }
            Ok(_) | Err(_) => diagnostics.push(Diagnostic::warning(
                DiagnosticCode::MalformedOptions,
                format!("Ignoring malformed createCollection options `{raw_options}`"),
            )),
        }
    }

    Ok(Operation::CreateCollection {
        collection: name,
        validator,
    })
}

fn build_create_index(
    collection: &str,
    args_text: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> ParseResult<Operation> {
    let args = split_top_level(args_text, ',');
    let spec = args.first().ok_or_else(|| ScriptError::Arity {
        method: "createIndex".to_string(),
        message: "requires an index specification".to_string(),
    })?;

    let mut fields = require_document(parse_loose(spec)?, spec)?;
    let mut keys = Vec::with_capacity(fields.len());
    for key in top_level_keys(&normalize_literal(spec.trim())) {
        if let Some(value) = fields.remove(&key) {
            keys.push((key, coerce_index_value(value)));
        }
    }
    // A key the textual walk could not resolve (an escaped quote inside
    // a key name defeats the quote scan) is still part of the index;
    // append it after the ordered ones rather than drop it.
    for (key, value) in fields {
        keys.push((key, coerce_index_value(value)));
    }

    let mut options = IndexOptions::default();
    if let Some(raw_options) = args.get(1) {
        match parse_loose(raw_options) {
            Ok(Value::Object(map)) => {
                if let Some(Value::Bool(unique)) = map.get("unique") {
                    options.unique = Some(*unique);
                }
                if let Some(Value::String(name)) = map.get("name") {
                    options.name = Some(name.clone());
                }
            }
            Ok(_) | Err(_) => diagnostics.push(Diagnostic::warning(
                DiagnosticCode::MalformedOptions,
                format!("Ignoring malformed index options `{raw_options}`"),
            )),
        }
    }

    Ok(Operation::CreateIndex {
        collection: collection.to_string(),
        keys,
        options,
    })
}

fn build_insert(collection: &str, method: Method, args_text: &str) -> ParseResult<Operation> {
    let args = split_top_level(args_text, ',');
    let literal = args.first().ok_or_else(|| ScriptError::Arity {
        method: method.as_str().to_string(),
        message: "no document to insert".to_string(),
    })?;

    let documents = match (method, parse_loose(literal)?) {
        (Method::InsertMany, Value::Array(items)) => items
            .into_iter()
            .map(|item| require_document(item, literal))
            .collect::<ParseResult<Vec<_>>>()?,
        (_, value) => vec![require_document(value, literal)?],
    };
    // An empty array leaves nothing to insert; a zero-document Insert
    // must not come out of the builder.
    if documents.is_empty() {
        return Err(ScriptError::Arity {
            method: method.as_str().to_string(),
            message: "no document to insert".to_string(),
        });
    }

    Ok(Operation::Insert {
        collection: collection.to_string(),
        method: method.as_str().to_string(),
        documents,
    })
}

fn build_update(collection: &str, method: Method, args_text: &str) -> ParseResult<Operation> {
    let args = split_top_level(args_text, ',');
    if args.len() < 2 {
        return Err(ScriptError::Arity {
            method: method.as_str().to_string(),
            message: "update operation requires at least 2 arguments".to_string(),
        });
    }

    let filter = require_document(parse_loose(&args[0])?, &args[0])?;
    let update = require_document(parse_loose(&args[1])?, &args[1])?;
    // A third argument (driver options) is accepted and ignored.

    Ok(Operation::Update {
        collection: collection.to_string(),
        method: method.as_str().to_string(),
        filter,
        update,
    })
}

fn build_delete(collection: &str, method: Method, args_text: &str) -> ParseResult<Operation> {
    let args = split_top_level(args_text, ',');
    let literal = args.first().ok_or_else(|| ScriptError::Arity {
        method: method.as_str().to_string(),
        message: "delete operation requires a filter document".to_string(),
    })?;
    let filter = require_document(parse_loose(literal)?, literal)?;

    Ok(Operation::Delete {
        collection: collection.to_string(),
        method: method.as_str().to_string(),
        filter,
    })
}

fn require_document(value: Value, literal: &str) -> ParseResult<Document> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ScriptError::LooseLiteral {
            literal: literal.to_string(),
            message: format!("expected a document object, found {}", value_kind(&other)),
        }),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Numeric coercion for index directions
// ---------------------------------------------------------------------------

/// Coerce an index direction value to a number where possible.
///
/// Numeric strings become numbers (a string with a `.` parses as a
/// float, otherwise as an integer); whole float literals collapse to
/// integers; everything else, like the `"text"` or `"2dsphere"` index
/// modes, passes through unchanged.
fn coerce_index_value(value: Value) -> Value {
    match value {
        Value::String(text) => coerce_numeric_string(text),
        Value::Number(number) => collapse_whole_float(number),
        other => other,
    }
}

fn coerce_numeric_string(text: String) -> Value {
    if text.contains('.') {
        if let Ok(parsed) = text.parse::<f64>() {
            if let Some(number) = Number::from_f64(parsed) {
                return Value::Number(number);
            }
        }
    } else if let Ok(parsed) = text.parse::<i64>() {
        return Value::Number(parsed.into());
    }
    Value::String(text)
}

fn collapse_whole_float(number: Number) -> Value {
    if number.is_i64() || number.is_u64() {
        return Value::Number(number);
    }
    if let Some(float) = number.as_f64() {
        if float.is_finite()
            && float.fract() == 0.0
            && float >= i64::MIN as f64
            && float <= i64::MAX as f64
        {
            return Value::Number((float as i64).into());
        }
    }
    Value::Number(number)
}
