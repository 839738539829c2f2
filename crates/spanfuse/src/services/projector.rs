//! Restriction of a document index to a sub-span.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::document::{DocumentAnnotationSet, DocumentInfo};
use crate::models::Span;

/// Derives section and sentence indexes from a finished document index
/// without revisiting the raw layers.
pub struct SpanProjector;

impl SpanProjector {
    /// Keep the annotations and relations fully contained in `target`.
    ///
    /// Relations are kept by their combined span and are not validated again.
    /// The projected set covers `target` of the same canonical text and is
    /// identified by `docid`.
    pub fn project(
        set: &DocumentAnnotationSet,
        target: Span,
        docid: impl Into<String>,
    ) -> DocumentAnnotationSet {
        let indexes: BTreeMap<_, _> = set
            .categories()
            .map(|index| (index.category(), index.restricted_to(target)))
            .collect();

        let relations = set
            .relations()
            .iter()
            .filter(|r| target.contains(&r.span()))
            .cloned()
            .collect();

        let info = DocumentInfo {
            docid: docid.into(),
            ..set.info().clone()
        };

        DocumentAnnotationSet::from_parts(
            info,
            Arc::clone(set.canonical_text()),
            target,
            indexes,
            relations,
        )
    }
}
