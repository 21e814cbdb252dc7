//! The single-pass character walk: one line at a time, one grapheme at a
//! time, dispatched by context (code / line-comment / string).

use std::borrow::Cow;

use parinfer_model::{Closer, Column, Delta, Error, ErrorName, LineNumber, OpenerChar, Paren, ParenTrail, TabStop};
use parinfer_text::{codepoint_width, graphemes};
use tracing::trace;

use crate::error_cache::CachedPosition;
use crate::signal::{EngineResult, EngineSignal};
use crate::state::{ArgTabStop, ClampedTrail, Context, EscapeState, InternalMode, State};

impl<'a> State<'a> {
    fn init_line(&mut self, line_no: LineNumber) {
        self.line_no = line_no;
        self.input_line_no = line_no;
        self.x = 0;
        self.input_x = 0;
        self.tracking_arg_tab_stop = ArgTabStop::NotSearching;
        self.tracking_indent = self.context != Context::String;
        self.indent_delta = 0;
        self.trail.reset(line_no, 0);
        self.error_cache.clear_line_scoped();
        self.working_lines.push(Cow::Borrowed(self.input_lines[line_no].as_str()));
    }

    /// §4.4 step 2: if this grapheme's input position carries a caller- or
    /// `prev_text`-derived edit, fold its net width change into
    /// `indent_delta`. Only consulted in paren mode or smart mode — plain
    /// indent mode never looks at edits, it only looks at indentation.
    fn apply_change_delta(&mut self) {
        if self.change_map.is_empty() || !(self.smart || self.mode == InternalMode::Paren) {
            return;
        }
        if let Some(change) = self.change_map.get(&(self.input_line_no, self.input_x)) {
            self.indent_delta += change.end_delta();
        }
    }

    /// Shift `x` by `delta`, keeping `indent_delta` in sync with the actual
    /// move (never letting `x` go negative).
    fn add_indent(&mut self, delta: Delta) {
        if delta == 0 {
            return;
        }
        let shifted = (self.x as Delta + delta).max(0) as Column;
        self.indent_delta += shifted as Delta - self.x as Delta;
        self.x = shifted;
    }

    fn cached(&self, x: Column) -> CachedPosition {
        CachedPosition {
            x,
            line_no: self.line_no,
            input_x: self.input_x,
            input_line_no: self.input_line_no,
        }
    }

    fn fail(&self, name: ErrorName, pos: CachedPosition) -> EngineSignal {
        EngineSignal::Failed(Error::new(name, pos.x, pos.line_no, pos.input_x, pos.input_line_no))
    }

    fn reset_trail_at(&mut self, x: Column) {
        self.trail.start_x = x;
        self.trail.end_x = x;
    }

    fn attach_closed_paren(&mut self, paren: Paren) {
        if !self.return_parens {
            return;
        }
        if let Some(parent) = self.paren_stack.last_mut() {
            parent.children.push(paren);
        } else {
            self.parens.push(paren);
        }
    }

    fn maybe_shift_cursor(&mut self) {
        if self.cursor_line != Some(self.line_no) {
            return;
        }
        if let Some(orig_x) = self.orig_cursor_x {
            if self.input_x == orig_x {
                let shifted = orig_x as isize + self.indent_delta;
                self.cursor_x = Some(shifted.max(0) as Column);
            }
        }
    }

    fn maybe_record_tab_stop(&mut self, ch: char, arg_x: Option<Column>) {
        let on_cursor_line = self.cursor_line == Some(self.line_no);
        let on_selection_line = self.selection_start_line == Some(self.line_no);
        if on_cursor_line || on_selection_line {
            self.tab_stops.push(TabStop {
                ch,
                x: self.x,
                line_no: self.line_no,
                arg_x,
            });
        }
    }

    fn on_open_paren(&mut self) {
        let ch = self.ch.chars().next().expect("open-paren char is non-empty");
        let mut paren = Paren::new(self.line_no, self.x, ch, self.input_line_no, self.input_x);
        paren.indent_delta = self.indent_delta;
        trace!(target: "engine.process", x = self.x, line = self.line_no, %ch, "open paren");
        self.maybe_record_tab_stop(ch, None);
        self.paren_stack.push(paren);
        self.tracking_arg_tab_stop = ArgTabStop::Space;
        self.reset_trail_at(self.x + 1);
    }

    fn on_close_paren(&mut self) -> EngineResult<()> {
        let ch = self.ch.chars().next().expect("close-paren char is non-empty");
        let top_matches = self
            .paren_stack
            .last()
            .map(|p| p.opener_kind().map(|k| k.matches_closer(ch)).unwrap_or(false))
            .unwrap_or(false);

        if !top_matches {
            return self.on_unmatched_close_paren();
        }

        if self.mode == InternalMode::Indent && self.smart && self.check_restart_on_cursor_holding() {
            return Err(EngineSignal::Restart);
        }
        let holding = self.mode == InternalMode::Indent && self.smart && self.check_cursor_holding(self.cursor_x, self.cursor_line);

        let mut opener = self.paren_stack.pop().expect("checked top_matches above");
        let closer = Closer {
            line_no: self.line_no,
            x: self.x,
            ch,
            trail: None,
        };
        opener.closer = Some(closer);
        trace!(target: "engine.process", x = self.x, line = self.line_no, %ch, "close paren matched");
        self.attach_closed_paren(opener);

        if holding {
            self.trail.clamped = Some(ClampedTrail {
                start_x: self.trail.start_x,
                end_x: self.trail.end_x,
            });
            self.reset_trail_at(self.x + 1);
        } else {
            if self.trail.is_empty() {
                self.trail.start_x = self.x;
            }
            self.trail.end_x = self.x + 1;
        }
        Ok(())
    }

    /// `hold_min_x..=hold_max_x` is the window, on the about-to-close
    /// opener's own line, the cursor must sit in for "holding" to apply:
    /// the user is positioned where they could still type more into this
    /// paren, so its trail shouldn't reset under them.
    fn check_cursor_holding(&self, cursor_x: Option<Column>, cursor_line: Option<LineNumber>) -> bool {
        let Some(top) = self.paren_stack.last() else {
            return false;
        };
        if cursor_line != Some(top.line_no) {
            return false;
        }
        let Some(cx) = cursor_x else {
            return false;
        };
        let len = self.paren_stack.len();
        let hold_min_x = if len >= 2 { self.paren_stack[len - 2].x + 1 } else { 0 };
        let hold_max_x = top.x;
        cx >= hold_min_x && cx <= hold_max_x
    }

    /// If there's no pending edit and the cursor *was* holding this opener
    /// before the latest keystroke but no longer is, indent mode has lost
    /// the context it needs to keep going; restart from scratch in paren
    /// mode rather than guess.
    fn check_restart_on_cursor_holding(&self) -> bool {
        if !self.change_map.is_empty() {
            return false;
        }
        let (Some(_), Some(_)) = (self.prev_cursor_x, self.prev_cursor_line) else {
            return false;
        };
        let was_holding = self.check_cursor_holding(self.prev_cursor_x, self.prev_cursor_line);
        let holding_now = self.check_cursor_holding(self.cursor_x, self.cursor_line);
        was_holding && !holding_now
    }

    fn on_unmatched_close_paren(&mut self) -> EngineResult<()> {
        let pos = self.cached(self.x);

        match self.mode {
            InternalMode::Indent => {
                self.error_cache.record(ErrorName::UnmatchedCloseParen, pos);
                if let Some(top) = self.paren_stack.last() {
                    self.error_cache.record(
                        ErrorName::UnmatchedOpenParen,
                        CachedPosition {
                            x: top.x,
                            line_no: top.line_no,
                            input_x: top.input_x,
                            input_line_no: top.input_line_no,
                        },
                    );
                }
                trace!(target: "engine.process", x = self.x, line = self.line_no, "unmatched close paren elided");
                self.ch.clear();
                Ok(())
            }
            InternalMode::Paren => {
                let in_leading_trail = self.trail.is_empty() || self.x == self.trail.end_x;
                if self.smart && in_leading_trail {
                    self.ch.clear();
                    Ok(())
                } else {
                    Err(self.fail(ErrorName::UnmatchedCloseParen, pos))
                }
            }
        }
    }

    /// `force_balance` always just elides the character, no error raised,
    /// ever. Otherwise: smart mode abandons the in-progress indent-mode
    /// parse and restarts in paren mode (the caller resolves what happens
    /// to this closer from the paren-structure side); non-smart caches the
    /// error and elides, leaving `finish_line` to raise it once the whole
    /// line — and its paren trail — is known.
    fn on_leading_close_paren(&mut self) -> EngineResult<()> {
        if self.force_balance {
            self.ch.clear();
            return Ok(());
        }
        if self.smart {
            return Err(EngineSignal::Restart);
        }
        let pos = self.cached(self.x);
        self.error_cache.record(ErrorName::LeadingCloseParen, pos);
        self.ch.clear();
        Ok(())
    }

    fn on_quote(&mut self) -> EngineResult<()> {
        match self.context {
            Context::Code => {
                self.context = Context::String;
                let pos = self.cached(self.x);
                self.error_cache.record(ErrorName::UnclosedQuote, pos);
                self.reset_trail_at(self.x + 1);
            }
            Context::String => {
                self.context = Context::Code;
                self.reset_trail_at(self.x + 1);
            }
            Context::Comment => {
                let was_danger = self.quote_danger;
                self.quote_danger = !self.quote_danger;
                if !was_danger && self.quote_danger {
                    let pos = self.cached(self.x);
                    self.error_cache.record(ErrorName::QuoteDanger, pos);
                }
            }
        }
        Ok(())
    }

    fn on_semicolon(&mut self) {
        if self.context == Context::Code {
            self.context = Context::Comment;
            self.reset_trail_at(self.x + 1);
        }
    }

    fn on_backslash(&mut self) {
        if self.context == Context::String && self.escape == EscapeState::Normal {
            self.escape = EscapeState::Escaping;
        }
    }

    fn on_other_code_char(&mut self) {
        if matches!(self.tracking_arg_tab_stop, ArgTabStop::Space) && !self.ch.trim().is_empty() {
            self.tracking_arg_tab_stop = ArgTabStop::Arg;
            if let Some(top) = self.paren_stack.last_mut() {
                top.arg_x = Some(self.x);
            }
            if let Some(ch) = self.ch.chars().next() {
                self.maybe_record_tab_stop(ch, Some(self.x));
            }
        }
        self.reset_trail_at(self.x + self.ch.chars().next().map(codepoint_width).unwrap_or(0) as Column);
    }

    fn dispatch_code_char(&mut self) -> EngineResult<()> {
        let ch = self.ch.chars().next().expect("non-empty grapheme");
        if OpenerChar::from_char(ch).is_some() {
            self.on_open_paren();
        } else if matches!(ch, ')' | ']' | '}') {
            self.on_close_paren()?;
        } else if ch == '"' {
            self.on_quote()?;
        } else if ch == ';' {
            self.on_semicolon();
        } else if ch == '\t' {
            // Tabs inside code content are rewritten as two literal spaces,
            // the same width a leading-indentation tab is rebuilt at.
            self.ch = "  ".to_string();
        } else if ch.is_whitespace() {
            // whitespace never breaks an in-progress trail
        } else {
            self.on_other_code_char();
        }
        Ok(())
    }

    fn dispatch_comment_char(&mut self) -> EngineResult<()> {
        if self.ch == "\"" {
            self.on_quote()?;
        }
        Ok(())
    }

    fn dispatch_string_char(&mut self) -> EngineResult<()> {
        match self.escape {
            EscapeState::Escaping => {
                self.escape = EscapeState::Normal;
            }
            EscapeState::Normal => {
                if self.ch == "\\" {
                    self.on_backslash();
                } else if self.ch == "\"" {
                    self.on_quote()?;
                }
            }
        }
        Ok(())
    }

    /// Called once per line, the moment its first non-whitespace character
    /// is found. Dispatches the leading-close-paren / comment-line special
    /// cases, and — in indent mode — closes every open paren whose column
    /// has been dedented past.
    fn on_indent(&mut self, first_char: char) -> EngineResult<()> {
        self.tracking_indent = false;
        let is_comment_line = first_char == ';';

        if is_comment_line {
            self.on_comment_line();
            return Ok(());
        }

        let is_leading_close = matches!(first_char, ')' | ']' | '}');
        if self.mode == InternalMode::Indent && is_leading_close {
            self.on_leading_close_paren()?;
        }

        if self.mode == InternalMode::Indent {
            self.close_opens_above(self.x)?;
        }

        if self.mode == InternalMode::Paren {
            self.correct_indent();
        }

        self.last_code_line_no = Some(self.line_no);
        Ok(())
    }

    /// A comment-only line never joins or triggers a paren close; it only
    /// inherits whatever indent shift its parent opener has accumulated, so
    /// a reindented block doesn't leave its own comments behind. Indent
    /// mode leaves comment-only lines alone entirely — the §9 asymmetry is
    /// deliberate, not an oversight.
    fn on_comment_line(&mut self) {
        if self.mode != InternalMode::Paren {
            return;
        }
        let (depth, _) = self.get_parent_opener_index(self.x);
        let len = self.paren_stack.len();
        if depth < len {
            let shift = self.paren_stack[len - 1 - depth].indent_delta;
            self.add_indent(shift);
        }
    }

    /// `getParentOpenerIndex`: how many openers, counted from innermost,
    /// no longer have this line as a descendant once it lands at column
    /// `indent_x`. Returns `(count, adopted)`; `count == paren_stack.len()`
    /// means none of them survive (the whole stack closes against this
    /// dedent). `adopted` is true only when the returned boundary opener
    /// was kept via the ADOPTION branch below, in which case its
    /// `indent_delta` must be pinned to zero by the caller.
    ///
    /// Each stack entry is classified by comparing where it sits relative
    /// to `indent_x` now versus where it sat relative to the same line's
    /// indent before this run's accumulated `indent_delta` was applied:
    /// "outside" means the opener's own column is left of the indent (it
    /// stays an ancestor); "inside" means the indent has caught up to or
    /// passed it (it should close). Both agreeing is the easy case.
    /// Disagreeing is where edits can shuffle which opener is "the parent"
    /// out from under indentation that never actually moved:
    /// FRAGMENTATION (was outside, now inside) keeps the opener as parent
    /// only when nothing shifted this line (`indent_delta == 0`) — a real
    /// width change is trusted, a phantom one isn't. ADOPTION (was inside,
    /// now outside) hands parenthood to this opener unless the next opener
    /// out would cleanly qualify as parent on its own, in which case
    /// deferring to it is more conservative than claiming this one.
    fn get_parent_opener_index(&self, indent_x: Column) -> (usize, bool) {
        let prev_indent_x = indent_x as Delta - self.indent_delta;
        let len = self.paren_stack.len();

        let outside_both = |opener: &Paren| {
            let curr_outside = (opener.x as Delta) < indent_x as Delta;
            let prev_outside = (opener.x as Delta - opener.indent_delta) < prev_indent_x;
            (curr_outside, prev_outside)
        };

        for depth in 0..len {
            let opener = &self.paren_stack[len - 1 - depth];
            match outside_both(opener) {
                (true, true) => return (depth, false),
                (false, false) => {}
                (false, true) => {
                    if self.indent_delta == 0 {
                        return (depth, false);
                    }
                }
                (true, false) => {
                    let next_is_clean_parent = len
                        .checked_sub(depth + 2)
                        .and_then(|i| self.paren_stack.get(i))
                        .map(|next| outside_both(next) == (true, true))
                        .unwrap_or(false);
                    if !next_is_clean_parent {
                        return (depth, true);
                    }
                }
            }
        }
        (len, false)
    }

    /// Indent mode's defining behavior: a new line's indentation closes
    /// every open paren `getParentOpenerIndex` decides no longer parents
    /// it, with the synthetic closers appended to the last code line seen
    /// (not to this one — this line is what *triggered* the close, not
    /// where the closers belong).
    pub(crate) fn close_opens_above(&mut self, new_indent: Column) -> EngineResult<()> {
        let Some(prev_line) = self.last_code_line_no else {
            return Ok(());
        };

        let (count, adopted) = self.get_parent_opener_index(new_indent);
        if count == 0 {
            return Ok(());
        }
        if adopted {
            let len = self.paren_stack.len();
            if count < len {
                self.paren_stack[len - 1 - count].indent_delta = 0;
            }
        }

        let mut buf = self.working_lines[prev_line].to_string();
        while buf.ends_with(' ') || buf.ends_with('\t') {
            buf.pop();
        }
        let trail_start = parinfer_text::display_width(&buf);
        let mut x = trail_start;

        for _ in 0..count {
            let mut opener = self.paren_stack.pop().expect("count is bounded by stack length");
            let kind = opener
                .opener_kind()
                .expect("paren_stack only ever holds recognized openers");
            buf.push(kind.closer());
            opener.closer = Some(Closer {
                line_no: prev_line,
                x,
                ch: kind.closer(),
                trail: None,
            });
            trace!(target: "engine.process", line = prev_line, x, "indent-dedent close");
            self.attach_closed_paren(opener);
            x += 1;
        }

        self.working_lines[prev_line] = Cow::Owned(buf);
        self.paren_trails.push(ParenTrail {
            line_no: prev_line,
            start_x: trail_start,
            end_x: x,
        });
        Ok(())
    }

    /// Paren mode's defining behavior: the open structure is authoritative,
    /// so a new line's leading whitespace is rewritten to align with the
    /// innermost open paren's argument column (or one past the opener),
    /// clamped to that opener's `max_child_indent` (or, at the top level,
    /// to `max_indent`) so a line never drifts past the shallowest sibling
    /// already seen. Only `self.x` is updated here; `process_line`
    /// regenerates the actual leading-whitespace text from it.
    fn correct_indent(&mut self) {
        let opener_shift = self.paren_stack.last().map(|o| o.indent_delta).unwrap_or(0);
        let shifted = (self.x as Delta + opener_shift).max(0) as Column;

        let (lower, upper) = match self.paren_stack.last() {
            Some(top) => (top.arg_x.unwrap_or(top.x + 1), top.max_child_indent.unwrap_or(Column::MAX)),
            None => (0, self.max_indent.unwrap_or(Column::MAX)),
        };
        let target = shifted.clamp(lower, upper.max(lower));

        if target == self.x {
            return;
        }
        self.indent_delta += target as Delta - self.x as Delta;
        trace!(target: "engine.process", line = self.line_no, target, "indent corrected");
        self.x = target;
    }

    /// Runs after the character walk for one line: structural checks that
    /// can only be settled once the whole line (and its final paren trail)
    /// is known.
    fn finish_line(&mut self) -> EngineResult<()> {
        if self.context == Context::String && self.escape == EscapeState::Escaping {
            let pos = self.cached(self.x);
            return Err(self.fail(ErrorName::EolBackslash, pos));
        }

        // Smart mode never reaches here with a cached leading-close-paren:
        // `on_leading_close_paren` raises `Restart` for it instead. The
        // unmatched-close-paren cache can still apply to a smart run, but
        // that path already elided the character at the point of
        // occurrence (`on_unmatched_close_paren`), so it has no deferred
        // error to raise either.
        if self.mode == InternalMode::Indent && !self.force_balance && !self.smart {
            if let Some(pos) = self.error_cache.get(ErrorName::LeadingCloseParen) {
                return Err(self.fail(ErrorName::LeadingCloseParen, pos));
            }
            if let Some(pos) = self.error_cache.get(ErrorName::UnmatchedCloseParen) {
                if pos.x < self.trail.start_x {
                    return Err(self.fail(ErrorName::UnmatchedCloseParen, pos));
                }
            }
        }

        if self.mode == InternalMode::Indent
            && self.context != Context::Comment
            && self.cursor_line == Some(self.line_no)
        {
            if let Some(cx) = self.cursor_x {
                if cx > self.trail.start_x && cx < self.trail.end_x {
                    self.trail.clamped = Some(ClampedTrail {
                        start_x: self.trail.start_x,
                        end_x: self.trail.end_x,
                    });
                    self.trail.start_x = cx;
                    self.trail.end_x = cx;
                }
            }
        }

        if self.mode == InternalMode::Paren {
            if !self.trail.is_empty() {
                match self.paren_stack.last_mut() {
                    Some(top) => {
                        top.max_child_indent = Some(top.max_child_indent.map_or(self.trail.start_x, |m| m.min(self.trail.start_x)));
                    }
                    None => {
                        self.max_indent = Some(self.max_indent.map_or(self.trail.start_x, |m| m.min(self.trail.start_x)));
                    }
                }
            }
        }

        if !self.trail.is_empty() {
            self.paren_trails.push(ParenTrail {
                line_no: self.line_no,
                start_x: self.trail.start_x,
                end_x: self.trail.end_x,
            });
        }

        if self.context != Context::String {
            let mut buf = self.working_lines[self.line_no].to_string();
            let trimmed_len = buf.trim_end_matches([' ', '\t']).len();
            if trimmed_len != buf.len() {
                buf.truncate(trimmed_len);
                self.working_lines[self.line_no] = Cow::Owned(buf);
            }
        }

        if self.context == Context::Comment {
            self.context = Context::Code;
        }

        Ok(())
    }
}

pub(crate) fn process_line(state: &mut State, line_no: LineNumber) -> EngineResult<()> {
    state.init_line(line_no);
    let text = state.input_lines[line_no].clone();
    let mut buf = String::with_capacity(text.len());

    for g in graphemes(&text) {
        state.ch = g.text.to_string();
        state.apply_change_delta();

        if state.tracking_indent && !g.text.chars().all(char::is_whitespace) {
            let first_char = g.text.chars().next().expect("non-empty grapheme");
            state.on_indent(first_char)?;
            // Regenerate the leading whitespace from `x`: a no-op rewrite
            // in indent mode (x is unchanged), the actual realignment in
            // paren mode (correct_indent may have just changed x).
            buf.clear();
            buf.push_str(&" ".repeat(state.x));
        }

        // `on_indent`'s leading-close-paren handling may already have
        // elided this grapheme (smart mode restarts instead); nothing left
        // to dispatch.
        if !state.ch.is_empty() {
            match state.context {
                Context::Code => state.dispatch_code_char()?,
                Context::Comment => state.dispatch_comment_char()?,
                Context::String => state.dispatch_string_char()?,
            }
        }

        buf.push_str(&state.ch);
        // Sum every char's width, not just the first: a dispatched tab can
        // expand `ch` into two space characters, and the column has to
        // advance by both.
        let width: Column = state.ch.chars().map(|c| codepoint_width(c) as Column).sum();
        state.x += width;
        state.input_x += g.width as Column;
        state.maybe_shift_cursor();
    }

    // A fully blank line carries no indentation signal of its own; the
    // dedent-close decision waits for the next line that actually starts
    // with code (see `close_opens_above`).
    state.working_lines[line_no] = Cow::Owned(buf);
    state.finish_line()?;
    Ok(())
}
