//! Error types for annotation fusion.

use serde::Serialize;
use thiserror::Error;

use crate::models::Category;

/// Errors raised while fusing annotation layers.
///
/// Per-annotation (`OffsetOutOfBounds`) and per-relation
/// (`MalformedMarkableReference`) errors are recovered where they occur;
/// the remaining variants abort a single document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FuseError {
    #[error("Layer '{layer}' is missing for document {document_id}")]
    LayerMissing { document_id: String, layer: String },

    #[error("Annotation {id} spans {start}-{end} outside text of length {text_len}")]
    OffsetOutOfBounds {
        id: String,
        start: i64,
        end: i64,
        text_len: usize,
    },

    #[error("Relation {relation_id} references unknown markable '{markable_id}'")]
    MalformedMarkableReference {
        relation_id: String,
        markable_id: String,
    },

    #[error("Layer '{layer}' of document {document_id} is anchored to a different text")]
    CanonicalTextMismatch { document_id: String, layer: String },

    #[error("Index for {category} is finalized and no longer accepts annotations")]
    IndexFinalized { category: Category },

    #[error("Document {document_id} is finalized and no longer accepts relations")]
    DocumentFinalized { document_id: String },

    #[error("Category {category} is not active for this document")]
    InactiveCategory { category: Category },

    #[error("Source error for document {document_id}: {message}")]
    Source {
        document_id: String,
        message: String,
    },
}

impl FuseError {
    /// Whether this error means the document should be skipped rather than
    /// counted as a failure.
    pub fn is_skip(&self) -> bool {
        matches!(self, FuseError::LayerMissing { .. })
    }
}

/// Counts of locally recovered errors for one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Annotations dropped because their offsets fell outside the text.
    pub dropped_annotations: usize,
    /// Relations dropped because they referenced unknown markables.
    pub dropped_relations: usize,
    /// Well-formed relations rejected by validation.
    pub rejected_relations: usize,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.dropped_annotations == 0 && self.dropped_relations == 0
    }

    pub fn merge(&mut self, other: &Diagnostics) {
        self.dropped_annotations += other.dropped_annotations;
        self.dropped_relations += other.dropped_relations;
        self.rejected_relations += other.rejected_relations;
    }
}
