use std::{fmt, ops::Range};

use serde::Serialize;

/// A byte range in the reconstructed text of a [`crate::Document`].
///
/// The empty span at offset zero is used for findings that concern the whole
/// document rather than a specific piece of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Span {
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Span {
    /// The span used for document-wide findings.
    pub const DOCUMENT: Self = Self::new(0, 0);

    /// Creates a span covering `start..end`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Whether this is the document-wide `(0, 0)` span.
    #[must_use]
    pub const fn is_document_wide(self) -> bool {
        self.start == 0 && self.end == 0
    }

    /// Returns the text covered by this span, if it lies on character
    /// boundaries inside `text`.
    #[must_use]
    pub fn slice(self, text: &str) -> Option<&str> {
        text.get(self.start..self.end)
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_span_is_empty_at_zero() {
        assert!(Span::DOCUMENT.is_document_wide());
        assert!(!Span::new(0, 3).is_document_wide());
    }

    #[test]
    fn slice_respects_char_boundaries() {
        let text = "ÖVRIGT";
        assert_eq!(Span::new(0, 2).slice(text), Some("Ö"));
        assert_eq!(Span::new(0, 1).slice(text), None);
    }
}
