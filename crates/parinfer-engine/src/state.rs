//! The engine's working set: one `State` per `process_text` call,
//! exclusively owned for the duration of that call — never shared across
//! threads.

use std::borrow::Cow;
use std::collections::HashMap;

use parinfer_model::{Change, Column, LineNumber, Options, Paren, ParenTrail, TabStop};

use crate::error_cache::ErrorPositionCache;

/// Which top-level algorithm is running. Smart mode always dispatches as
/// `Indent` with `smart = true`; there is no third internal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalMode {
    Indent,
    Paren,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Code,
    Comment,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeState {
    Normal,
    /// The previous character was an unescaped `\`; this character has no
    /// special meaning no matter what it is.
    Escaping,
}

/// Tracks the hunt for the grapheme right after the first open-paren's
/// argument column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgTabStop {
    NotSearching,
    Space,
    Arg,
}

/// The pre-clamp shadow of a paren trail: the range (and, conceptually,
/// the openers) a cursor-clamp or cursor-hold cut away from the trail
/// that's actually reported. Kept for callers that want to see what was
/// held back, not just what was committed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClampedTrail {
    pub start_x: Column,
    pub end_x: Column,
}

/// The in-progress paren trail on the current line: the run of trailing
/// close-parens seen so far, not yet committed to `paren_trails`.
#[derive(Debug, Clone, Default)]
pub struct TrailState {
    pub line_no: LineNumber,
    pub start_x: Column,
    pub end_x: Column,
    pub clamped: Option<ClampedTrail>,
}

impl TrailState {
    pub fn reset(&mut self, line_no: LineNumber, x: Column) {
        self.line_no = line_no;
        self.start_x = x;
        self.end_x = x;
        self.clamped = None;
    }

    pub fn is_empty(&self) -> bool {
        self.start_x == self.end_x
    }
}

/// One working source line: either a borrowed slice of the original input
/// or an owned string once the engine has spliced an edit into it. `Cow`
/// is the idiomatic Rust shape for exactly this "borrowed or owned" split
/// (see `SPEC_FULL.md` §3).
pub type WorkingLine<'a> = Cow<'a, str>;

pub struct State<'a> {
    pub mode: InternalMode,
    pub smart: bool,

    pub orig_text: &'a str,
    pub orig_cursor_x: Option<Column>,
    pub orig_cursor_line: Option<LineNumber>,
    pub crlf: bool,

    pub input_lines: &'a [String],
    pub input_line_no: usize,
    pub input_x: Column,

    pub working_lines: Vec<WorkingLine<'a>>,
    pub line_no: LineNumber,
    pub x: Column,
    pub ch: String,

    pub paren_stack: Vec<Paren>,
    pub tab_stops: Vec<TabStop>,
    pub trail: TrailState,
    pub paren_trails: Vec<ParenTrail>,
    pub parens: Vec<Paren>,

    pub cursor_x: Option<Column>,
    pub cursor_line: Option<LineNumber>,
    pub prev_cursor_x: Option<Column>,
    pub prev_cursor_line: Option<LineNumber>,
    pub selection_start_line: Option<LineNumber>,

    pub context: Context,
    pub escape: EscapeState,

    pub quote_danger: bool,
    pub partial_result: bool,
    pub force_balance: bool,
    pub return_parens: bool,

    pub indent_delta: isize,
    pub tracking_arg_tab_stop: ArgTabStop,

    /// Set at the start of every line (unless it starts mid-string) and
    /// cleared the moment the line's first non-whitespace grapheme is
    /// classified (`on_indent`). Gates the once-per-line indent checks
    /// (leading-close-paren, comment-line propagation, indent correction).
    pub tracking_indent: bool,

    /// Root-level indent cap for paren mode: the narrowest paren-trail
    /// start column yet seen among top-level (no enclosing opener) lines.
    /// Mirrors `Paren::max_child_indent`, which plays the same role for a
    /// line nested inside an open paren.
    pub max_indent: Option<Column>,

    /// The most recent line that actually carried code (not blank, not
    /// comment-only). Indent mode's dedent-close step appends synthetic
    /// closers here, since the line whose indentation triggers a close is
    /// never the line the closer belongs on.
    pub last_code_line_no: Option<LineNumber>,

    /// `(input_line, input_column) -> Change`, built once from
    /// `Options::changes` (or the `Change` synthesized from `prev_text`).
    /// Consulted once per grapheme to fold an edit's width delta into
    /// `indent_delta`.
    pub change_map: HashMap<(LineNumber, Column), &'a Change>,

    pub err: Option<parinfer_model::Error>,
    pub error_cache: ErrorPositionCache,
}

impl<'a> State<'a> {
    pub fn new(
        mode: InternalMode,
        smart: bool,
        orig_text: &'a str,
        input_lines: &'a [String],
        options: &'a Options,
        crlf: bool,
    ) -> Self {
        State {
            mode,
            smart,
            orig_text,
            orig_cursor_x: options.cursor_x,
            orig_cursor_line: options.cursor_line,
            crlf,
            input_lines,
            input_line_no: 0,
            input_x: 0,
            working_lines: Vec::with_capacity(input_lines.len() + 1),
            line_no: 0,
            x: 0,
            ch: String::new(),
            paren_stack: Vec::new(),
            tab_stops: Vec::new(),
            trail: TrailState::default(),
            paren_trails: Vec::new(),
            parens: Vec::new(),
            cursor_x: options.cursor_x,
            cursor_line: options.cursor_line,
            prev_cursor_x: options.prev_cursor_x,
            prev_cursor_line: options.prev_cursor_line,
            selection_start_line: options.selection_start_line,
            context: Context::Code,
            escape: EscapeState::Normal,
            quote_danger: false,
            partial_result: options.partial_result,
            force_balance: options.force_balance,
            return_parens: options.return_parens,
            indent_delta: 0,
            tracking_arg_tab_stop: ArgTabStop::NotSearching,
            tracking_indent: true,
            max_indent: None,
            last_code_line_no: None,
            change_map: options.change_map(),
            err: None,
            error_cache: ErrorPositionCache::default(),
        }
    }
}
