//! Loose-literal normalization
//!
//! Script arguments arrive in a relaxed JavaScript-flavored dialect:
//! single-quoted strings, unquoted identifier keys, trailing commas.
//! Normalization rewrites such a literal into strict JSON in three passes,
//! then [`parse_loose`] hands the result to `serde_json`:
//!
//! 1. quote unification: every `'` becomes `"`
//! 2. trailing-comma removal: a comma whose next non-whitespace character
//!    closes an object or array is dropped
//! 3. key quoting: an identifier token followed by `:` outside quotes is
//!    wrapped in double quotes
//!
//! The dialect has no string escape syntax, so pass 1 also rewrites an
//! apostrophe *inside* a double-quoted string and the literal then fails
//! the strict parse. That is an accepted limitation of the grammar, not
//! something later passes try to repair.

use serde_json::Value;

use crate::error::{ParseResult, ScriptError};
use crate::scanner::ScanState;

/// Rewrite a loose literal into strict JSON text.
pub fn normalize_literal(input: &str) -> String {
    let unified = unify_quotes(input);
    let stripped = strip_trailing_commas(&unified);
    quote_bare_keys(&stripped)
}

/// Normalize a loose literal and parse it as strict JSON.
///
/// The error carries the literal as written in the script, not the
/// normalized form, so diagnostics point at text the author recognizes.
pub fn parse_loose(input: &str) -> ParseResult<Value> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ScriptError::LooseLiteral {
            literal: String::new(),
            message: "empty input".to_string(),
        });
    }

    let normalized = normalize_literal(trimmed);
    serde_json::from_str(&normalized).map_err(|err| ScriptError::LooseLiteral {
        literal: trimmed.to_string(),
        message: err.to_string(),
    })
}

/// Top-level key names of a normalized object literal, in textual order.
///
/// `serde_json`'s map type orders keys alphabetically, which loses the
/// order the script author wrote. Index specs need that order back, so
/// the builder re-reads it from the normalized text: a quoted string at
/// nesting depth one whose next non-whitespace character is `:` is a
/// top-level key. Escape sequences in a key decode the way the strict
/// parse decodes them, so the returned names match the parsed map's
/// keys. Returns an empty list for non-object input.
pub fn top_level_keys(normalized: &str) -> Vec<String> {
    let chars: Vec<char> = normalized.trim().chars().collect();
    let mut keys = Vec::new();
    let mut depth = 0i32;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '"' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end] != '"' {
                    end += 1;
                }
                let mut next = end + 1;
                while next < chars.len() && chars[next].is_whitespace() {
                    next += 1;
                }
                if depth == 1 && next < chars.len() && chars[next] == ':' {
                    let span: String = chars[start..end].iter().collect();
                    keys.push(decode_key(&span));
                }
                i = end + 1;
                continue;
            }
            '{' | '[' => depth += 1,
            '}' | ']' => depth -= 1,
            _ => {}
        }
        i += 1;
    }

    keys
}

// A key span is the raw text between quotes; the parsed map holds the
// decoded key (`caf\u00e9` in the text, `café` in the map).
fn decode_key(span: &str) -> String {
    if !span.contains('\\') {
        return span.to_string();
    }
    serde_json::from_str(&format!("\"{span}\"")).unwrap_or_else(|_| span.to_string())
}

// ---------------------------------------------------------------------------
// Normalization passes
// ---------------------------------------------------------------------------

fn unify_quotes(input: &str) -> String {
    input.replace('\'', "\"")
}

fn strip_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut state = ScanState::new();

    for (i, &ch) in chars.iter().enumerate() {
        if ch == ',' && !state.in_quote() {
            let mut next = i + 1;
            while next < chars.len() && matches!(chars[next], ' ' | '\t' | '\n' | '\r') {
                next += 1;
            }
            if next < chars.len() && matches!(chars[next], '}' | ']') {
                continue;
            }
        }
        state.advance(ch);
        out.push(ch);
    }

    out
}

fn quote_bare_keys(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 16);
    let mut state = ScanState::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if !state.in_quote() && is_identifier_start(ch) {
            let mut end = i + 1;
            while end < chars.len() && is_identifier_continue(chars[end]) {
                end += 1;
            }
            let mut next = end;
            while next < chars.len() && matches!(chars[next], ' ' | '\t') {
                next += 1;
            }
            let token: String = chars[i..end].iter().collect();
            if next < chars.len() && chars[next] == ':' {
                out.push('"');
                out.push_str(&token);
                out.push('"');
            } else {
                out.push_str(&token);
            }
            i = end;
            continue;
        }
        state.advance(ch);
        out.push(ch);
        i += 1;
    }

    out
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

fn is_identifier_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unify_quotes() {
        assert_eq!(unify_quotes("{'a': 'b'}"), "{\"a\": \"b\"}");
        assert_eq!(unify_quotes("no quotes"), "no quotes");
    }

    #[test]
    fn test_strip_trailing_commas() {
        assert_eq!(strip_trailing_commas("{\"a\": 1,}"), "{\"a\": 1}");
        assert_eq!(strip_trailing_commas("[1, 2, ]"), "[1, 2 ]");
        assert_eq!(strip_trailing_commas("{\"a\": 1,\n}"), "{\"a\": 1\n}");
        assert_eq!(strip_trailing_commas("{\"a\": 1, \"b\": 2}"), "{\"a\": 1, \"b\": 2}");
    }

    #[test]
    fn test_strip_keeps_commas_inside_quotes() {
        assert_eq!(strip_trailing_commas("{\"a\": \"x,}\"}"), "{\"a\": \"x,}\"}");
    }

    #[test]
    fn test_quote_bare_keys() {
        assert_eq!(quote_bare_keys("{name: 1}"), "{\"name\": 1}");
        assert_eq!(quote_bare_keys("{_id: 1, $set: 2}"), "{\"_id\": 1, \"$set\": 2}");
        assert_eq!(quote_bare_keys("{a$b: 1}"), "{\"a$b\": 1}");
        assert_eq!(quote_bare_keys("{name : 1}"), "{\"name\" : 1}");
    }

    #[test]
    fn test_quote_bare_keys_leaves_values_alone() {
        // `true` is an identifier token, but it is not followed by a colon.
        assert_eq!(quote_bare_keys("{\"a\": true}"), "{\"a\": true}");
        // Identifier-shaped text inside quotes stays untouched.
        assert_eq!(
            quote_bare_keys("{\"url\": \"http://example.com\"}"),
            "{\"url\": \"http://example.com\"}"
        );
    }

    #[test]
    fn test_quote_bare_keys_preserves_trailing_whitespace_of_plain_tokens() {
        assert_eq!(quote_bare_keys("new Date()"), "new Date()");
    }

    #[test]
    fn test_normalize_literal_full_pipeline() {
        assert_eq!(
            normalize_literal("{name: 'Ann', age: 30,}"),
            "{\"name\": \"Ann\", \"age\": 30}"
        );
    }

    #[test]
    fn test_parse_loose_object() {
        let value = parse_loose("{name: 'Ann', active: true}").unwrap();
        assert_eq!(value, json!({"name": "Ann", "active": true}));
    }

    #[test]
    fn test_parse_loose_array() {
        let value = parse_loose("[{a: 1}, {a: 2},]").unwrap();
        assert_eq!(value, json!([{"a": 1}, {"a": 2}]));
    }

    #[test]
    fn test_parse_loose_empty_input() {
        let err = parse_loose("   ").unwrap_err();
        match err {
            ScriptError::LooseLiteral { message, .. } => assert_eq!(message, "empty input"),
            other => panic!("expected LooseLiteral, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_loose_reports_original_literal() {
        let err = parse_loose("{a: }").unwrap_err();
        match err {
            ScriptError::LooseLiteral { literal, .. } => assert_eq!(literal, "{a: }"),
            other => panic!("expected LooseLiteral, got {other:?}"),
        }
    }

    #[test]
    fn test_apostrophe_inside_double_quotes_is_conflated() {
        // Quote unification rewrites the apostrophe too; the literal then
        // fails the strict parse. Accepted dialect limitation.
        assert!(parse_loose("{note: \"don't\"}").is_err());
    }

    #[test]
    fn test_top_level_keys_in_textual_order() {
        assert_eq!(
            top_level_keys("{\"zeta\": 1, \"alpha\": -1, \"mid\": 1}"),
            vec!["zeta", "alpha", "mid"]
        );
    }

    #[test]
    fn test_top_level_keys_skip_nested_and_values() {
        let text = "{\"outer\": {\"inner\": 1}, \"note\": \"a:b\", \"tags\": [\"x\", \"y\"]}";
        assert_eq!(top_level_keys(text), vec!["outer", "note", "tags"]);
    }

    #[test]
    fn test_top_level_keys_decode_escapes() {
        // The strict parse turns `caf\u00e9` into `café`; the textual
        // walk must hand back the same name.
        assert_eq!(
            top_level_keys("{\"caf\\u00e9\": 1, \"b\": 2}"),
            vec!["café", "b"]
        );
        assert_eq!(top_level_keys("{\"a\\\\b\": 1}"), vec!["a\\b"]);
    }

    #[test]
    fn test_top_level_keys_non_object() {
        assert!(top_level_keys("[1, 2, 3]").is_empty());
        assert!(top_level_keys("\"plain\"").is_empty());
        assert!(top_level_keys("{}").is_empty());
    }
}

// ---------------------------------------------------------------------------
// Property tests
// ---------------------------------------------------------------------------
