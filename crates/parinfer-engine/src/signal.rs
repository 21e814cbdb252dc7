//! Internal control-flow signals for the processing loop.
//!
//! Neither variant ever reaches a caller of `parinfer::process`: a logical
//! parse failure is a fully-specified `Answer { success: false, .. }`, not
//! a Rust exception. `EngineSignal` exists purely so the line-by-line walk
//! inside this crate can use `?` instead of hand-rolled early returns.

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum EngineSignal {
    /// Indent mode hit a structural ambiguity it can only resolve by
    /// abandoning the in-progress parse and re-running from scratch in
    /// paren mode.
    #[error("restart in paren mode")]
    Restart,

    /// A genuine, reportable processing error.
    #[error("{0}")]
    Failed(parinfer_model::Error),
}

pub type EngineResult<T> = Result<T, EngineSignal>;
