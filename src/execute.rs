//! Executor seam and script driver
//!
//! Parsing never touches a database; applying operations goes through
//! the [`OperationExecutor`] trait so callers plug in a real driver, an
//! in-memory store, or a recorder. [`run_script`] is the driver loop:
//! parse, then apply each operation strictly in source order, stopping
//! at the first execution failure with the failing method and collection
//! as context.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::diagnostics::Diagnostic;
use crate::error::ScriptError;
use crate::operation::{Document, IndexOptions, Operation};
use crate::parser::ScriptParser;

/// Error from the backing store while applying one operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ExecutionError {
    pub message: String,
}

impl ExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Success payload of one executed operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutput {
    /// Collection created, by name.
    Created(String),
    /// Index created, by name.
    IndexCreated(String),
    /// Id assigned by `insertOne`.
    InsertedId(Value),
    /// Ids assigned by `insertMany`.
    InsertedIds(Vec<Value>),
    /// Documents modified by an update.
    Modified(u64),
    /// Documents removed by a delete.
    Deleted(u64),
    /// Informational outcome, e.g. a collection that already existed.
    Notice(String),
}

pub type ExecutionResult = Result<ExecutionOutput, ExecutionError>;

/// Applies operations to a backing store.
///
/// The pipeline is synchronous end to end, so the seam is too. The
/// provided [`execute`](OperationExecutor::execute) method dispatches an
/// operation to the matching required method; implementations normally
/// override nothing else.
pub trait OperationExecutor {
    fn create_collection(
        &mut self,
        collection: &str,
        validator: Option<&Document>,
    ) -> ExecutionResult;

    fn create_index(
        &mut self,
        collection: &str,
        keys: &[(String, Value)],
        options: &IndexOptions,
    ) -> ExecutionResult;

    fn insert(&mut self, collection: &str, method: &str, documents: &[Document])
        -> ExecutionResult;

    fn update(
        &mut self,
        collection: &str,
        method: &str,
        filter: &Document,
        update: &Document,
    ) -> ExecutionResult;

    fn delete(&mut self, collection: &str, method: &str, filter: &Document) -> ExecutionResult;

    /// Apply one operation by dispatching to the matching method.
    fn execute(&mut self, operation: &Operation) -> ExecutionResult {
        match operation {
            Operation::CreateCollection {
                collection,
                validator,
            } => self.create_collection(collection, validator.as_ref()),
            Operation::CreateIndex {
                collection,
                keys,
                options,
            } => self.create_index(collection, keys, options),
            Operation::Insert {
                collection,
                method,
                documents,
            } => self.insert(collection, method, documents),
            Operation::Update {
                collection,
                method,
                filter,
                update,
            } => self.update(collection, method, filter, update),
            Operation::Delete {
                collection,
                method,
                filter,
            } => self.delete(collection, method, filter),
        }
    }
}

/// Why a script run stopped early.
#[derive(Debug, Error)]
pub enum ScriptRunError {
    #[error("Failed to parse script: {0}")]
    Parse(#[from] ScriptError),

    #[error("Failed to execute {method} on {collection}: {source}")]
    Execution {
        method: String,
        collection: String,
        #[source]
        source: ExecutionError,
    },
}

/// Result of running a whole script.
#[derive(Debug)]
pub struct ScriptOutcome {
    pub success: bool,
    /// Outputs of executed operations in order, up to any failure.
    pub outputs: Vec<ExecutionOutput>,
    /// Diagnostics collected while parsing.
    pub diagnostics: Vec<Diagnostic>,
    pub error: Option<ScriptRunError>,
}

/// Parse `source` and apply every operation in order.
///
/// An empty script succeeds immediately with a notice. A parse failure
/// (under [`ErrorPolicy::Halt`](crate::ErrorPolicy::Halt)) runs nothing;
/// an execution failure keeps the outputs gathered so far and reports
/// which operation failed.
pub fn run_script<E: OperationExecutor>(
    parser: &ScriptParser,
    executor: &mut E,
    source: &str,
) -> ScriptOutcome {
    if source.trim().is_empty() {
        return ScriptOutcome {
            success: true,
            outputs: vec![ExecutionOutput::Notice("Script is empty, skipped".to_string())],
            diagnostics: Vec::new(),
            error: None,
        };
    }

    let parsed = match parser.parse(source) {
        Ok(parsed) => parsed,
        Err(error) => {
            return ScriptOutcome {
                success: false,
                outputs: Vec::new(),
                diagnostics: Vec::new(),
                error: Some(ScriptRunError::Parse(error)),
            }
        }
    };

    let mut outputs = Vec::with_capacity(parsed.operations.len());
    for operation in &parsed.operations {
        debug!("Executing {}", operation.description());
        match executor.execute(operation) {
            Ok(output) => outputs.push(output),
            Err(error) => {
                return ScriptOutcome {
                    success: false,
                    outputs,
                    diagnostics: parsed.diagnostics,
                    error: Some(ScriptRunError::Execution {
                        method: operation.method_name().to_string(),
                        collection: operation.collection().to_string(),
                        source: error,
                    }),
                }
            }
        }
    }

    ScriptOutcome {
        success: true,
        outputs,
        diagnostics: parsed.diagnostics,
        error: None,
    }
}
