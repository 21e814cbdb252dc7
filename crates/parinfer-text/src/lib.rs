//! Grapheme clustering, display width, and change inference.
//!
//! This crate has no notion of parens, modes, or the engine's state
//! machine — it is the leaf layer the engine builds column arithmetic on
//! top of, grounded in the same separation of concerns the teacher crate
//! draws between its text layer and its editor state.

pub mod change;
pub mod segment;
pub mod width;

pub use change::compute_text_change;
pub use segment::{column_byte_index, display_width, graphemes, Grapheme, Graphemes};
pub use width::{codepoint_width, grapheme_width};
