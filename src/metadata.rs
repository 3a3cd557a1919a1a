//! Script metadata header
//!
//! A script may open with a `// METADATA:` marker followed by comment
//! lines forming a JSON object:
//!
//! ```text
//! // METADATA:
//! // {
//! //   "description": "Initial user schema",
//! //   "version": "1.0.0",
//! //   "author": "platform team",
//! //   "dependencies": []
//! // }
//! ```
//!
//! Metadata is optional and advisory: an absent marker yields `None`,
//! and so does a malformed block (with a warning trace). It never fails
//! a script.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Marker line that opens a metadata block.
pub const METADATA_MARKER: &str = "// METADATA:";

/// Descriptive metadata carried in a script's header comment.
///
/// `executed_at`, `status` and `error` are written back by callers that
/// track script runs; they are never required in the header itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptMetadata {
    pub name: String,
    pub description: String,
    pub version: String,
    pub author: String,
    pub dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<DateTime<Utc>>,
    pub status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
}

/// Extract the metadata block from script source, if any.
///
/// Comment lines after the marker are concatenated until the first
/// non-comment line; blank comment lines are skipped. The marker may
/// technically appear anywhere, but only the first block is read.
pub fn parse_metadata(source: &str) -> Option<ScriptMetadata> {
    let mut in_block = false;
    let mut payload = String::new();

    for line in source.lines() {
        let line = line.trim();
        if !in_block {
            if line.starts_with(METADATA_MARKER) {
                in_block = true;
            }
            continue;
        }
        match line.strip_prefix("//") {
            Some(rest) => {
                let rest = rest.trim();
                if !rest.is_empty() {
                    payload.push_str(rest);
                }
            }
            None => break,
        }
    }

    if payload.is_empty() {
        return None;
    }

    match serde_json::from_str(&payload) {
        Ok(metadata) => Some(metadata),
        Err(err) => {
            warn!("Ignoring malformed metadata block: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT_WITH_METADATA: &str = r#"// METADATA:
// {
//   "description": "Initial user schema",
//   "version": "1.0.0",
//   "author": "platform team",
//   "dependencies": ["auth-service"]
// }

db.createCollection("users");
"#;

    #[test]
    fn test_parse_metadata_block() {
        let metadata = parse_metadata(SCRIPT_WITH_METADATA).expect("metadata should parse");
        assert_eq!(metadata.description, "Initial user schema");
        assert_eq!(metadata.version, "1.0.0");
        assert_eq!(metadata.author, "platform team");
        assert_eq!(metadata.dependencies, vec!["auth-service"]);
        assert!(metadata.executed_at.is_none());
        assert!(metadata.name.is_empty());
    }

    #[test]
    fn test_absent_marker_is_none() {
        assert!(parse_metadata("db.users.insertOne({a: 1});").is_none());
        assert!(parse_metadata("").is_none());
    }

    #[test]
    fn test_marker_without_payload_is_none() {
        assert!(parse_metadata("// METADATA:\ndb.users.insertOne({a: 1});").is_none());
    }

    #[test]
    fn test_malformed_block_is_none() {
        let source = "// METADATA:\n// {\"version\": }\ndb.users.insertOne({a: 1});";
        assert!(parse_metadata(source).is_none());
    }

    #[test]
    fn test_block_ends_at_first_non_comment_line() {
        let source = "// METADATA:\n// {\ndb.users.insertOne({a: 1});\n// }";
        // The block is cut short at the statement, so the JSON is partial.
        assert!(parse_metadata(source).is_none());
    }

    #[test]
    fn test_executed_at_round_trip() {
        let source = concat!(
            "// METADATA:\n",
            "// {\"version\": \"2.1.0\", \"executed_at\": \"2024-01-15T10:30:00Z\"}\n",
        );
        let metadata = parse_metadata(source).expect("metadata should parse");
        let stamp = metadata.executed_at.expect("executed_at should parse");
        assert_eq!(stamp.to_rfc3339(), "2024-01-15T10:30:00+00:00");
    }
}
