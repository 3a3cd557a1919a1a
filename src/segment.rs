//! Statement segmentation
//!
//! Splits raw script text into complete statements before any call parsing
//! happens. Lines are trimmed and accumulated (joined with a single space),
//! and a statement completes when a line ends with `;` while the cumulative
//! scan state is at top level, so semicolons inside string literals or
//! nested objects never terminate early.
//!
//! Only full-line comments are recognized: a trimmed line starting with
//! `//` is discarded, while a trailing comment after code stays part of
//! the statement text.

use crate::scanner::ScanState;

/// Split script source into complete statement strings.
///
/// Blank lines and full-line `//` comments are dropped. Any non-empty
/// accumulation left when the source ends is emitted as a final statement
/// even without its terminating semicolon.
pub fn split_statements(source: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut state = ScanState::new();

    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(line);
        for ch in line.chars() {
            state.advance(ch);
        }

        if line.ends_with(';') && state.at_top_level() {
            statements.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        statements.push(current);
    }

    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_statement() {
        let statements = split_statements("db.users.insertOne({name: 'Ann'});");
        assert_eq!(statements, vec!["db.users.insertOne({name: 'Ann'});"]);
    }

    #[test]
    fn test_multiple_statements() {
        let source = "db.users.insertOne({a: 1});\ndb.users.insertOne({b: 2});";
        let statements = split_statements(source);
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1], "db.users.insertOne({b: 2});");
    }

    #[test]
    fn test_multi_line_statement_joined_with_spaces() {
        let source = "db.users.createIndex({\n    email: 1\n}, { unique: true });";
        let statements = split_statements(source);
        assert_eq!(
            statements,
            vec!["db.users.createIndex({ email: 1 }, { unique: true });"]
        );
    }

    #[test]
    fn test_blank_and_comment_lines_dropped() {
        let source = "// setup script\n\ndb.users.insertOne({a: 1});\n\n// done\n";
        let statements = split_statements(source);
        assert_eq!(statements, vec!["db.users.insertOne({a: 1});"]);
    }

    #[test]
    fn test_comment_line_inside_statement_dropped() {
        let source = "db.users.insertOne({\n// the name\nname: 'Ann' });";
        let statements = split_statements(source);
        assert_eq!(statements, vec!["db.users.insertOne({ name: 'Ann' });"]);
    }

    #[test]
    fn test_semicolon_inside_quote_does_not_terminate() {
        let source = "db.logs.insertOne({msg: \"end;\n ok\"});";
        let statements = split_statements(source);
        assert_eq!(statements, vec!["db.logs.insertOne({msg: \"end; ok\"});"]);
    }

    #[test]
    fn test_semicolon_at_depth_does_not_terminate() {
        // The first line ends in `;` but the object is still open.
        let source = "db.jobs.insertOne({steps: [a;\n]});";
        let statements = split_statements(source);
        assert_eq!(statements, vec!["db.jobs.insertOne({steps: [a; ]});"]);
    }

    #[test]
    fn test_unterminated_trailing_statement_emitted() {
        let source = "db.users.insertOne({a: 1});\ndb.users.insertOne({b: 2})";
        let statements = split_statements(source);
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1], "db.users.insertOne({b: 2})");
    }

    #[test]
    fn test_comments_and_whitespace_only() {
        assert!(split_statements("// nothing here\n\n   \n// at all\n").is_empty());
        assert!(split_statements("").is_empty());
    }
}
