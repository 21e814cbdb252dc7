//! Value model for the parinfer engine.
//!
//! Everything here is plain data: construction, not behavior. The engine
//! (`parinfer-engine`) owns all the rules that create, mutate and consume
//! these types.

use std::collections::HashMap;
use std::fmt;

/// A 0-based line index.
pub type LineNumber = usize;
/// A 0-based display column (grapheme-width accumulated, never a byte offset).
pub type Column = usize;
/// A signed shift over columns.
pub type Delta = isize;

/// Which paren kind opened a [`Paren`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenerChar {
    Paren,
    Square,
    Curly,
}

impl OpenerChar {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '(' => Some(Self::Paren),
            '[' => Some(Self::Square),
            '{' => Some(Self::Curly),
            _ => None,
        }
    }

    pub fn closer(self) -> char {
        match self {
            Self::Paren => ')',
            Self::Square => ']',
            Self::Curly => '}',
        }
    }

    pub fn opener(self) -> char {
        match self {
            Self::Paren => '(',
            Self::Square => '[',
            Self::Curly => '{',
        }
    }

    pub fn matches_closer(self, c: char) -> bool {
        c == self.closer()
    }
}

/// A single edit: the differing span between a previous and current text.
/// At most one `Change` is ever produced for a text pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub x: Column,
    pub line_no: LineNumber,
    pub old_text: String,
    pub new_text: String,
}

impl Change {
    pub fn new(x: Column, line_no: LineNumber, old_text: impl Into<String>, new_text: impl Into<String>) -> Self {
        Self {
            x,
            line_no,
            old_text: old_text.into(),
            new_text: new_text.into(),
        }
    }

    /// Net display-column shift this change applies at its own end column.
    /// Used by the engine to build the `(line, column) -> delta` change map.
    pub fn end_delta(&self) -> Delta {
        // The engine only needs the net width delta between old and new text,
        // measured in codepoints (the same granularity computeTextChange uses).
        self.new_text.chars().count() as Delta - self.old_text.chars().count() as Delta
    }
}

/// Caller-supplied, per-call configuration. This *is* the engine's
/// configuration surface — there is no separate config file layer.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub cursor_x: Option<Column>,
    pub cursor_line: Option<LineNumber>,
    pub prev_cursor_x: Option<Column>,
    pub prev_cursor_line: Option<LineNumber>,
    pub selection_start_line: Option<LineNumber>,
    pub changes: Vec<Change>,
    pub partial_result: bool,
    pub force_balance: bool,
    pub return_parens: bool,
    pub prev_text: Option<String>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the `(input_line, input_x) -> Change` map the engine consumes,
    /// keyed in input coordinates. Later entries win on key collision.
    pub fn change_map(&self) -> HashMap<(LineNumber, Column), &Change> {
        let mut map = HashMap::new();
        for change in &self.changes {
            map.insert((change.line_no, change.x), change);
        }
        map
    }
}

/// Which transformation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Indent,
    Paren,
    Smart,
}

/// A caller's request for a single transformation.
#[derive(Debug, Clone)]
pub struct Request {
    pub mode: Mode,
    pub text: String,
    pub options: Options,
}

impl Request {
    pub fn new(mode: Mode, text: impl Into<String>, options: Options) -> Self {
        Self {
            mode,
            text: text.into(),
            options,
        }
    }
}

/// An open paren/bracket/brace being tracked by the engine.
///
/// `children` is only ever populated when `Options::return_parens` is set;
/// otherwise it stays empty, matching the spec's "tree rooted in
/// `State.parens` only when `return_parens` is true" invariant.
#[derive(Debug, Clone)]
pub struct Paren {
    pub line_no: LineNumber,
    pub x: Column,
    pub ch: char,
    pub indent_delta: Delta,
    pub max_child_indent: Option<Column>,
    pub arg_x: Option<Column>,
    pub input_line_no: LineNumber,
    pub input_x: Column,
    pub closer: Option<Closer>,
    pub children: Vec<Paren>,
}

impl Paren {
    pub fn new(line_no: LineNumber, x: Column, ch: char, input_line_no: LineNumber, input_x: Column) -> Self {
        Self {
            line_no,
            x,
            ch,
            indent_delta: 0,
            max_child_indent: None,
            arg_x: None,
            input_line_no,
            input_x,
            closer: None,
            children: Vec::new(),
        }
    }

    pub fn opener_kind(&self) -> Option<OpenerChar> {
        OpenerChar::from_char(self.ch)
    }
}

/// Where and how a [`Paren`] was closed. `trail` is a value copy
/// of the remembered [`ParenTrail`], never a reference, so there is no
/// parent/child cycle to manage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Closer {
    pub line_no: LineNumber,
    pub x: Column,
    pub ch: char,
    pub trail: Option<ParenTrail>,
}

/// The contiguous run of close parens (and, pre-clean, whitespace) ending a
/// code region on one line (see GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParenTrail {
    pub line_no: LineNumber,
    pub start_x: Column,
    pub end_x: Column,
}

impl ParenTrail {
    pub fn new(line_no: LineNumber, x: Column) -> Self {
        Self {
            line_no,
            start_x: x,
            end_x: x,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start_x == self.end_x
    }
}

/// A tab stop the host can align the cursor/selection against, rebuilt
/// whenever the engine visits the selection-start or cursor line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabStop {
    pub ch: char,
    pub x: Column,
    pub line_no: LineNumber,
    pub arg_x: Option<Column>,
}

/// The fixed vocabulary of error kinds. Names are bit-exact kebab-case
/// strings; messages are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorName {
    QuoteDanger,
    EolBackslash,
    UnclosedQuote,
    UnclosedParen,
    UnmatchedCloseParen,
    UnmatchedOpenParen,
    LeadingCloseParen,
}

impl ErrorName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::QuoteDanger => "quote-danger",
            Self::EolBackslash => "eol-backslash",
            Self::UnclosedQuote => "unclosed-quote",
            Self::UnclosedParen => "unclosed-paren",
            Self::UnmatchedCloseParen => "unmatched-close-paren",
            Self::UnmatchedOpenParen => "unmatched-open-paren",
            Self::LeadingCloseParen => "leading-close-paren",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::QuoteDanger => "Quotes must balanced inside comment blocks.",
            Self::EolBackslash => "Line cannot end in a hanging backslash.",
            Self::UnclosedQuote => "String is missing a closing quote.",
            Self::UnclosedParen => "Unclosed open-paren.",
            Self::UnmatchedCloseParen => "Unmatched close-paren.",
            Self::UnmatchedOpenParen => "Unmatched open-paren.",
            Self::LeadingCloseParen => "Line cannot lead with a close-paren.",
        }
    }
}

/// A logical processing failure, attached to [`Answer`] when `success` is
/// false. This is plain data, not a Rust `std::error::Error` — a failed
/// parse/balance is a fully-specified outcome of a call, not an exceptional
/// one, so `process` never returns `Result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error {
    pub name: ErrorName,
    pub msg: &'static str,
    pub x: Column,
    pub line_no: LineNumber,
    pub input_x: Column,
    pub input_line_no: LineNumber,
}

impl Error {
    pub fn new(name: ErrorName, x: Column, line_no: LineNumber, input_x: Column, input_line_no: LineNumber) -> Self {
        Self {
            name,
            msg: name.message(),
            x,
            line_no,
            input_x,
            input_line_no,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.msg)
    }
}

/// The result of one `process` call.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub success: bool,
    pub error: Option<Error>,
    pub cursor_x: Option<Column>,
    pub cursor_line: Option<LineNumber>,
    pub tab_stops: Vec<TabStop>,
    pub paren_trails: Vec<ParenTrail>,
    pub parens: Vec<Paren>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_end_delta_counts_codepoints_not_bytes() {
        let c = Change::new(0, 0, "a", "界界"); // 1 codepoint -> 2 codepoints
        assert_eq!(c.end_delta(), 1);
    }

    #[test]
    fn change_map_last_writer_wins_on_collision() {
        let mut opts = Options::new();
        opts.changes.push(Change::new(0, 0, "a", "b"));
        opts.changes.push(Change::new(0, 0, "a", "cc"));
        let map = opts.change_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map[&(0, 0)].new_text, "cc");
    }

    #[test]
    fn error_name_strings_are_bit_exact() {
        assert_eq!(ErrorName::UnmatchedCloseParen.as_str(), "unmatched-close-paren");
        assert_eq!(
            ErrorName::LeadingCloseParen.message(),
            "Line cannot lead with a close-paren."
        );
    }

    #[test]
    fn paren_trail_empty_when_start_equals_end() {
        let t = ParenTrail::new(0, 3);
        assert!(t.is_empty());
    }

    #[test]
    fn opener_char_round_trips() {
        for c in ['(', '[', '{'] {
            let kind = OpenerChar::from_char(c).unwrap();
            assert_eq!(kind.opener(), c);
            assert!(kind.matches_closer(kind.closer()));
        }
        assert!(OpenerChar::from_char('a').is_none());
    }
}
