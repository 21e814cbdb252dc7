//! The parinfer processing engine: given a mode, text and options, produces
//! an [`Answer`](parinfer_model::Answer) by walking the text once, tracking
//! paren structure and indentation as it goes.
//!
//! Indent mode infers close-parens from indentation; paren mode infers
//! indentation from close-parens; smart mode runs indent mode but elides
//! (rather than rejects) close-paren ambiguities a human editing session
//! would rather paper over than interrupt.

mod error_cache;
mod finalize;
mod lines;
mod process;
mod signal;
mod state;

use parinfer_model::{Answer, Mode, Options};
use tracing::debug;

use lines::split_lines;
use signal::EngineSignal;
use state::{InternalMode, State};

/// Run one parinfer transformation.
pub fn process(mode: Mode, text: &str, mut options: Options) -> Answer {
    // If the caller handed us `prev_text` but no explicit `Change`, derive
    // the one edit that turned it into `text` before anything else runs.
    if options.changes.is_empty() {
        if let Some(prev) = options.prev_text.as_deref() {
            if let Some(change) = parinfer_text::compute_text_change(prev, text) {
                options.changes.push(change);
            }
        }
    }

    let (input_lines, crlf) = split_lines(text);
    // A selection disables smart behavior and reverts to plain indent: the
    // user has marked a range rather than positioned a single cursor, and
    // smart mode's elision rules only make sense relative to one point.
    let mut smart = mode == Mode::Smart && options.selection_start_line.is_none();
    let mut internal_mode = match mode {
        Mode::Paren => InternalMode::Paren,
        Mode::Indent | Mode::Smart => InternalMode::Indent,
    };

    loop {
        let mut st = State::new(internal_mode, smart, text, &input_lines, &options, crlf);
        match run(&mut st) {
            Ok(()) => return finalize::build_answer(st),
            Err(EngineSignal::Restart) => {
                debug!(target: "engine.restart", "indent mode gave up, restarting in paren mode");
                // Restart always lands on *plain* paren mode: the restart
                // invariant (process(smart, T) == process(paren, T)) only
                // holds if smart's leniency doesn't survive the fallback.
                internal_mode = InternalMode::Paren;
                smart = false;
            }
            Err(EngineSignal::Failed(err)) => {
                st.err = Some(err);
                return finalize::build_answer(st);
            }
        }
    }
}

fn run(state: &mut State) -> Result<(), EngineSignal> {
    for line_no in 0..state.input_lines.len() {
        process::process_line(state, line_no)?;
    }
    finalize::finalize_result(state)?;
    Ok(())
}
