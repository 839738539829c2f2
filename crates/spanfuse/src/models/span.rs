//! Character spans and the canonical document text they point into.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A half-open character range `[start, end)` in a canonical text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Character positions covered by this span.
    pub fn offsets(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn contains_offset(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// True if `other` lies fully inside this span.
    pub fn contains(&self, other: &Span) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Smallest span covering both spans.
    pub fn union(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Formats as `start-end`, the offset notation used in output records.
impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// The single text all layers of a document are anchored to.
///
/// Offsets count characters, so the byte position of every character is
/// kept to make slicing constant time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalText {
    text: String,
    /// Byte offset of each character, plus the total byte length.
    boundaries: Vec<usize>,
}

impl CanonicalText {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        Self { text, boundaries }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.boundaries.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Text covered by `span`, or `None` if the span is inverted or exceeds
    /// the text.
    pub fn slice(&self, span: Span) -> Option<&str> {
        if span.start > span.end || span.end > self.len() {
            return None;
        }
        Some(&self.text[self.boundaries[span.start]..self.boundaries[span.end]])
    }

    /// Character offset for a byte offset that falls on a character boundary.
    pub fn char_offset(&self, byte: usize) -> Option<usize> {
        self.boundaries.binary_search(&byte).ok()
    }
}

impl From<&str> for CanonicalText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_display() {
        assert_eq!(Span::new(5, 15).to_string(), "5-15");
    }

    #[test]
    fn test_span_contains() {
        let outer = Span::new(10, 20);
        assert!(outer.contains(&Span::new(10, 20)));
        assert!(outer.contains(&Span::new(12, 15)));
        assert!(!outer.contains(&Span::new(9, 15)));
        assert!(!outer.contains(&Span::new(15, 21)));
    }

    #[test]
    fn test_span_union() {
        let merged = Span::new(14, 23).union(&Span::new(0, 9));
        assert_eq!(merged, Span::new(0, 23));
    }

    #[test]
    fn test_empty_span_covers_nothing() {
        let span = Span::new(7, 7);
        assert!(span.is_empty());
        assert_eq!(span.offsets().count(), 0);
        assert!(!span.contains_offset(7));
    }

    #[test]
    fn test_slice_ascii() {
        let text = CanonicalText::new("Acme Corp announced a merger");
        assert_eq!(text.slice(Span::new(0, 9)), Some("Acme Corp"));
        assert_eq!(text.slice(Span::new(0, 0)), Some(""));
        assert_eq!(text.slice(Span::new(0, 29)), None);
        assert_eq!(text.slice(Span::new(5, 4)), None);
    }

    #[test]
    fn test_slice_counts_characters() {
        let text = CanonicalText::new("The café costs €50");
        assert_eq!(text.len(), 18);
        assert_eq!(text.slice(Span::new(4, 8)), Some("café"));
        assert_eq!(text.slice(Span::new(15, 18)), Some("€50"));
    }

    #[test]
    fn test_char_offset_from_byte() {
        let text = CanonicalText::new("café x");
        // 'é' is two bytes, so the space sits at byte 5 and char 4
        assert_eq!(text.char_offset(5), Some(4));
        assert_eq!(text.char_offset(4), None);
        assert_eq!(text.char_offset(7), Some(6));
    }
}
