//! Extracted relations between a predicate and two arguments.

use std::collections::HashMap;

use super::annotation::{RawAnnotation, SpanAnnotation};
use super::record::RelationRecord;
use super::span::Span;
use crate::error::FuseError;

/// Annotation type suffix of relation predicates and arguments.
pub const MARKABLE_TYPE: &str = "Markable";
/// Annotation type suffix of relation annotations.
pub const RELATION_TYPE: &str = "GenericRelation";

/// A predicate with two arguments, all drawn from the markable sub-layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    id: String,
    predicate: SpanAnnotation,
    arg1: SpanAnnotation,
    arg2: SpanAnnotation,
    span: Span,
    verb_classes: Option<Vec<String>>,
}

impl Relation {
    pub fn new(
        id: impl Into<String>,
        predicate: SpanAnnotation,
        arg1: SpanAnnotation,
        arg2: SpanAnnotation,
    ) -> Self {
        let span = predicate
            .span()
            .union(&arg1.span())
            .union(&arg2.span());
        Self {
            id: id.into(),
            predicate,
            arg1,
            arg2,
            span,
            verb_classes: None,
        }
    }

    /// Build a relation from a relation annotation whose `relation` feature
    /// names the predicate markable and whose `arguments` feature names the
    /// two argument markables.
    pub fn from_markables(
        annotation: &RawAnnotation,
        markables: &HashMap<String, SpanAnnotation>,
    ) -> Result<Self, FuseError> {
        let lookup = |markable_id: Option<&str>| {
            markable_id
                .and_then(|id| markables.get(id))
                .cloned()
                .ok_or_else(|| FuseError::MalformedMarkableReference {
                    relation_id: annotation.id.clone(),
                    markable_id: markable_id.unwrap_or_default().to_string(),
                })
        };

        let arguments = annotation.features.get_str_list("arguments");
        let predicate = lookup(annotation.features.get_str("relation"))?;
        let arg1 = lookup(arguments.first().copied())?;
        let arg2 = lookup(arguments.get(1).copied())?;

        Ok(Self::new(annotation.id.clone(), predicate, arg1, arg2))
    }

    pub fn with_verb_classes(mut self, verb_classes: Option<Vec<String>>) -> Self {
        self.verb_classes = verb_classes;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn predicate(&self) -> &SpanAnnotation {
        &self.predicate
    }

    pub fn arg1(&self) -> &SpanAnnotation {
        &self.arg1
    }

    pub fn arg2(&self) -> &SpanAnnotation {
        &self.arg2
    }

    /// Combined span covering the predicate and both arguments.
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn verb_classes(&self) -> Option<&[String]> {
        self.verb_classes.as_deref()
    }

    pub fn to_record(&self) -> RelationRecord {
        RelationRecord {
            pred: self.predicate.text().to_string(),
            vnc: self.verb_classes.clone(),
            arg1: self.arg1.text().to_string(),
            arg2: self.arg2.text().to_string(),
            pred_offsets: self.predicate.span().to_string(),
            arg1_offsets: self.arg1.span().to_string(),
            arg2_offsets: self.arg2.span().to_string(),
        }
    }
}
