//! Quote and nesting scan state
//!
//! One character-level state machine shared by every pass that must know
//! whether it is inside a string literal or inside a nested object/array:
//! statement segmentation, top-level argument splitting, trailing-comma
//! removal, and bare-key quoting. The scripts this crate accepts have no
//! escape syntax inside strings, so the rules are deliberately small:
//!
//! - `'` or `"` opens a quote; only the *same* character closes it; the
//!   other quote character inside a quoted run is plain text.
//! - `{` and `[` outside quotes increase depth; `}` and `]` decrease it.
//!   Depth may go negative on malformed input; callers treat anything
//!   other than zero as "not at top level".

// ---------------------------------------------------------------------------
// Scan state
// ---------------------------------------------------------------------------

/// Cumulative quote/nesting state over a character stream.
///
/// Feed characters in order with [`ScanState::advance`]; query with
/// [`ScanState::in_quote`], [`ScanState::depth`] and
/// [`ScanState::at_top_level`]. State carries across lines, which is what
/// lets the segmenter accumulate multi-line statements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    quote: Option<char>,
    depth: i32,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the state with the next character of the stream.
    pub fn advance(&mut self, ch: char) {
        match ch {
            '"' | '\'' => match self.quote {
                None => self.quote = Some(ch),
                Some(open) if open == ch => self.quote = None,
                Some(_) => {}
            },
            '{' | '[' if self.quote.is_none() => self.depth += 1,
            '}' | ']' if self.quote.is_none() => self.depth -= 1,
            _ => {}
        }
    }

    /// True while inside a string literal.
    pub fn in_quote(&self) -> bool {
        self.quote.is_some()
    }

    /// Current structural nesting depth (braces and brackets).
    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// True when outside every quote and at nesting depth zero.
    pub fn at_top_level(&self) -> bool {
        self.quote.is_none() && self.depth == 0
    }
}

// ---------------------------------------------------------------------------
// Scanning helpers
// ---------------------------------------------------------------------------

/// Split `text` on `separator`, honoring quotes and nesting.
///
/// A separator counts only at depth zero outside quotes, so commas inside
/// `{...}`, `[...]` or string literals stay put. Parts are trimmed; an
/// empty trailing part is dropped. `separator` must not itself be a quote
/// or bracket character.
pub fn split_top_level(text: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut state = ScanState::new();

    for ch in text.chars() {
        if ch == separator && state.at_top_level() {
            parts.push(current.trim().to_string());
            current.clear();
        } else {
            state.advance(ch);
            current.push(ch);
        }
    }

    let last = current.trim();
    if !last.is_empty() {
        parts.push(last.to_string());
    }
    parts
}

/// Byte index of the `)` matching the `(` at byte index `open`.
///
/// Counts opens and closes only; quote characters are not consulted, so a
/// parenthesis inside a string argument will unbalance the count. Returns
/// `None` when the parentheses never balance.
pub fn find_matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut count = 0i32;
    for (idx, ch) in text[open..].char_indices() {
        match ch {
            '(' => count += 1,
            ')' => {
                count -= 1;
                if count == 0 {
                    return Some(open + idx);
                }
            }
            _ => {}
        }
    }
    None
}
