//! mongoscript: parser for MongoDB shell-style setup scripts
//!
//! Turns scripts written in the `mongosh` idiom into typed [`Operation`]
//! descriptors, without any driver dependency. Statements have the shape
//! `db.<collection>.<method>({...});` over a loose JSON dialect: single
//! quotes, unquoted keys, trailing commas, multi-line literals. The
//! crate provides:
//!
//! - Statement segmentation over a shared quote/nesting scanner
//! - Call extraction for a fixed set of setup methods
//! - Loose-literal normalization into strict JSON
//! - Typed operations with index key order preserved as written
//! - Structured diagnostics returned with the result, not logged away
//! - An [`OperationExecutor`] seam plus [`run_script`] driver for
//!   applying operations in source order
//!
//! # Example
//!
//! ```
//! use mongoscript::ScriptParser;
//!
//! let script = r#"
//!     // seed the catalog
//!     db.createCollection("products");
//!     db.products.createIndex({sku: 1}, {unique: true});
//!     db.products.insertMany([{sku: 'A-1'}, {sku: 'A-2'}]);
//! "#;
//!
//! let parsed = ScriptParser::new().parse(script)?;
//! assert_eq!(parsed.operations.len(), 3);
//! assert_eq!(parsed.operations[0].method_name(), "createCollection");
//! assert!(parsed.is_clean());
//! # Ok::<(), mongoscript::ScriptError>(())
//! ```

pub mod diagnostics;
pub mod error;
pub mod execute;
pub mod metadata;
pub mod normalize;
pub mod operation;
pub mod parser;
pub mod scanner;
pub mod segment;

// Re-export the public surface
pub use diagnostics::{Diagnostic, DiagnosticCode, Severity};
pub use error::{ErrorPolicy, ParseResult, ScriptError};
pub use execute::{
    run_script, ExecutionError, ExecutionOutput, ExecutionResult, OperationExecutor,
    ScriptOutcome, ScriptRunError,
};
pub use metadata::{parse_metadata, METADATA_MARKER, ScriptMetadata};
pub use operation::{Document, IndexOptions, Operation};
pub use parser::{extract_call, Method, ParsedCall, ParsedScript, ScriptParser};
