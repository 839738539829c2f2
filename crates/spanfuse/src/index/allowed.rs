//! Character positions considered indexable for a document.

use crate::models::{Span, SpanAnnotation};

/// Sentence type assigned to linguistically well-formed sentences.
pub const NORMAL_SENTENCE: &str = "normal";

/// Union of character positions covered by well-formed sentences.
///
/// Stored as sorted, merged ranges; adjacent ranges are joined so a span
/// crossing a sentence boundary between two normal sentences is allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedOffsets {
    ranges: Vec<Span>,
}

impl AllowedOffsets {
    pub fn from_spans(spans: impl IntoIterator<Item = Span>) -> Self {
        let mut spans: Vec<Span> = spans.into_iter().filter(|s| !s.is_empty()).collect();
        spans.sort();

        let mut ranges: Vec<Span> = Vec::with_capacity(spans.len());
        for span in spans {
            match ranges.last_mut() {
                Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
                _ => ranges.push(span),
            }
        }
        Self { ranges }
    }

    /// Positions covered by sentences whose `type` feature is `normal`.
    pub fn from_sentences<'a>(sentences: impl IntoIterator<Item = &'a SpanAnnotation>) -> Self {
        Self::from_spans(
            sentences
                .into_iter()
                .filter(|s| s.features().sentence_type() == Some(NORMAL_SENTENCE))
                .map(|s| s.span()),
        )
    }

    pub fn contains(&self, offset: usize) -> bool {
        let idx = self.ranges.partition_point(|r| r.end <= offset);
        self.ranges.get(idx).is_some_and(|r| r.start <= offset)
    }

    /// True if every position of `span` is allowed. Empty spans cover no
    /// positions and are always allowed.
    pub fn allows(&self, span: Span) -> bool {
        if span.is_empty() {
            return true;
        }
        let idx = self.ranges.partition_point(|r| r.end <= span.start);
        self.ranges.get(idx).is_some_and(|r| r.contains(&span))
    }

    pub fn ranges(&self) -> &[Span] {
        &self.ranges
    }

    /// Number of allowed positions.
    pub fn len(&self) -> usize {
        self.ranges.iter().map(Span::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
