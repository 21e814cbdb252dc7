//! End-of-text wrap-up: closing anything indent mode left open, checking
//! the error conditions that can only be known once the whole text has
//! been walked, and assembling the public `Answer`.

use parinfer_model::{Answer, ErrorName};

use crate::lines::join_lines;
use crate::signal::{EngineResult, EngineSignal};
use crate::state::{Context, InternalMode, State};

pub(crate) fn finalize_result(state: &mut State) -> EngineResult<()> {
    // Checked before the dedent-close sweep: a text that ends mid-string or
    // mid-quote-danger is malformed, and synthesizing closers over it would
    // just fabricate structure from a context that was never valid code.
    if state.quote_danger {
        let pos = state.error_cache.get(ErrorName::QuoteDanger);
        return Err(signal_for(state, ErrorName::QuoteDanger, pos));
    }

    if state.context == Context::String {
        let pos = state.error_cache.get(ErrorName::UnclosedQuote);
        return Err(signal_for(state, ErrorName::UnclosedQuote, pos));
    }

    if state.mode == InternalMode::Indent {
        // A virtual final empty line at column 0: reset the running delta
        // the same way `init_line` would, so `getParentOpenerIndex` isn't
        // judging this dedent against the last real line's accumulated
        // shift.
        state.indent_delta = 0;
        state.close_opens_above(0)?;
    }

    if state.mode == InternalMode::Paren {
        if let Some(opener) = state.paren_stack.first() {
            return Err(EngineSignal::Failed(parinfer_model::Error::new(
                ErrorName::UnclosedParen,
                opener.x,
                opener.line_no,
                opener.input_x,
                opener.input_line_no,
            )));
        }
    }

    Ok(())
}

fn signal_for(
    state: &State,
    name: ErrorName,
    cached: Option<crate::error_cache::CachedPosition>,
) -> EngineSignal {
    let pos = cached.unwrap_or_else(|| crate::error_cache::CachedPosition {
        x: state.x,
        line_no: state.line_no,
        input_x: state.input_x,
        input_line_no: state.input_line_no,
    });
    EngineSignal::Failed(parinfer_model::Error::new(name, pos.x, pos.line_no, pos.input_x, pos.input_line_no))
}

/// On success the output always comes from the working state. On error,
/// the original text and cursor are reported unless `partial_result` asks
/// for the partially-transformed working state instead.
pub(crate) fn build_answer(state: State) -> Answer {
    let success = state.err.is_none();

    let (text, cursor_x, cursor_line) = if success || state.partial_result {
        let text_lines: Vec<String> = state.working_lines.iter().map(|line| line.to_string()).collect();
        (join_lines(&text_lines, state.crlf), state.cursor_x, state.cursor_line)
    } else {
        (state.orig_text.to_string(), state.orig_cursor_x, state.orig_cursor_line)
    };

    Answer {
        text,
        success,
        error: state.err,
        cursor_x,
        cursor_line,
        tab_stops: state.tab_stops,
        paren_trails: state.paren_trails,
        parens: state.parens,
    }
}
