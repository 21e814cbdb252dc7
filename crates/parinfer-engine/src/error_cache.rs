//! Per-error-kind position cache.
//!
//! The first time a given error condition is seen during processing, its
//! position is cached in both working and input coordinates. If the error
//! is ultimately raised, the cached position — not the position at the
//! point of raising — is used.

use parinfer_model::{Column, ErrorName, LineNumber};

#[derive(Debug, Clone, Copy)]
pub struct CachedPosition {
    pub x: Column,
    pub line_no: LineNumber,
    pub input_x: Column,
    pub input_line_no: LineNumber,
}

#[derive(Debug, Default, Clone)]
pub struct ErrorPositionCache {
    unmatched_close_paren: Option<CachedPosition>,
    unmatched_open_paren: Option<CachedPosition>,
    leading_close_paren: Option<CachedPosition>,
    unclosed_quote: Option<CachedPosition>,
    quote_danger: Option<CachedPosition>,
}

impl ErrorPositionCache {
    /// Cache `pos` for `name`, but only the first time it's seen.
    pub fn record(&mut self, name: ErrorName, pos: CachedPosition) {
        let slot = self.slot_mut(name);
        if slot.is_none() {
            *slot = Some(pos);
        }
    }

    pub fn get(&self, name: ErrorName) -> Option<CachedPosition> {
        match name {
            ErrorName::UnmatchedCloseParen => self.unmatched_close_paren,
            ErrorName::UnmatchedOpenParen => self.unmatched_open_paren,
            ErrorName::LeadingCloseParen => self.leading_close_paren,
            ErrorName::UnclosedQuote => self.unclosed_quote,
            ErrorName::QuoteDanger => self.quote_danger,
            ErrorName::EolBackslash | ErrorName::UnclosedParen => None,
        }
    }

    /// Called when a new line starts: a fresh line gets a fresh chance at
    /// each of these three line-scoped error kinds.
    pub fn clear_line_scoped(&mut self) {
        self.unmatched_close_paren = None;
        self.unmatched_open_paren = None;
        self.leading_close_paren = None;
    }

    fn slot_mut(&mut self, name: ErrorName) -> &mut Option<CachedPosition> {
        match name {
            ErrorName::UnmatchedCloseParen => &mut self.unmatched_close_paren,
            ErrorName::UnmatchedOpenParen => &mut self.unmatched_open_paren,
            ErrorName::LeadingCloseParen => &mut self.leading_close_paren,
            ErrorName::UnclosedQuote => &mut self.unclosed_quote,
            ErrorName::QuoteDanger => &mut self.quote_danger,
            ErrorName::EolBackslash | ErrorName::UnclosedParen => {
                unreachable!("{:?} is never cached", name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_recorded_position_wins() {
        let mut cache = ErrorPositionCache::default();
        let first = CachedPosition { x: 1, line_no: 0, input_x: 1, input_line_no: 0 };
        let second = CachedPosition { x: 9, line_no: 9, input_x: 9, input_line_no: 9 };
        cache.record(ErrorName::LeadingCloseParen, first);
        cache.record(ErrorName::LeadingCloseParen, second);
        assert_eq!(cache.get(ErrorName::LeadingCloseParen).unwrap().x, 1);
    }

    #[test]
    fn clear_line_scoped_only_clears_the_three_named_kinds() {
        let mut cache = ErrorPositionCache::default();
        let pos = CachedPosition { x: 0, line_no: 0, input_x: 0, input_line_no: 0 };
        cache.record(ErrorName::UnclosedQuote, pos);
        cache.record(ErrorName::LeadingCloseParen, pos);
        cache.clear_line_scoped();
        assert!(cache.get(ErrorName::LeadingCloseParen).is_none());
        assert!(cache.get(ErrorName::UnclosedQuote).is_some());
    }
}
