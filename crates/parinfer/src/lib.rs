//! Keeps S-expression paren structure in sync with indentation.
//!
//! Three transformations share one engine:
//!
//! - [`indent_mode`] infers close-parens from indentation.
//! - [`paren_mode`] infers indentation from close-parens.
//! - [`smart_mode`] runs indent mode but elides rather than rejects the
//!   close-paren ambiguities a human mid-edit would rather have papered
//!   over than interrupted on.
//!
//! This crate does not install a `tracing` subscriber — the engine only
//! emits `trace!`/`debug!` events under the `engine.*` targets. A caller
//! that wants to see them should install one itself, e.g.:
//!
//! ```no_run
//! tracing_subscriber::fmt::init();
//! ```

pub use parinfer_model::{
    Answer, Change, Closer, Column, Delta, Error, ErrorName, LineNumber, Mode, OpenerChar, Options,
    Paren, ParenTrail, Request, TabStop,
};

/// Run whichever transformation `request.mode` names.
pub fn process(request: Request) -> Answer {
    parinfer_engine::process(request.mode, &request.text, request.options)
}

/// Infer close-parens from indentation.
pub fn indent_mode(text: &str, options: Options) -> Answer {
    parinfer_engine::process(Mode::Indent, text, options)
}

/// Infer indentation from close-parens.
pub fn paren_mode(text: &str, options: Options) -> Answer {
    parinfer_engine::process(Mode::Paren, text, options)
}

/// Indent mode, but ambiguous close-paren structure is elided rather than
/// rejected.
pub fn smart_mode(text: &str, options: Options) -> Answer {
    parinfer_engine::process(Mode::Smart, text, options)
}
