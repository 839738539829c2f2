//! Cross-layer validation of extracted relations.

use tracing::debug;

use crate::document::DocumentAnnotationSet;
use crate::index::IndexedAnnotations;
use crate::models::{Category, Relation, Span, SpanAnnotation};

/// True if some entry of `index` starts inside `span` and the position just
/// before its end also lies inside `span`.
///
/// Only the entry's start and its last position are compared against the
/// span, so an entry that ends one position later than `span` is rejected
/// while one that ends earlier is accepted. Empty spans never match.
pub fn span_matches_index(span: Span, index: &IndexedAnnotations) -> bool {
    if span.is_empty() {
        return false;
    }
    index
        .entries_starting_within(span)
        .any(|(_, end)| end.checked_sub(1).is_some_and(|last| span.contains_offset(last)))
}

/// Accepts or rejects relation candidates against the finished category
/// indexes of one document.
pub struct RelationValidator<'a> {
    events: Option<&'a IndexedAnnotations>,
    entities: Vec<&'a IndexedAnnotations>,
}

impl<'a> RelationValidator<'a> {
    pub fn new(set: &'a DocumentAnnotationSet) -> Self {
        Self {
            events: set.category(Category::Event),
            entities: Category::ENTITIES
                .iter()
                .filter_map(|c| set.category(*c))
                .collect(),
        }
    }

    pub fn predicate_is_event(&self, predicate: Span) -> bool {
        self.events
            .is_some_and(|events| span_matches_index(predicate, events))
    }

    pub fn arguments_contain_entity(&self, arg1: Span, arg2: Span) -> bool {
        [arg1, arg2].iter().any(|arg| {
            self.entities
                .iter()
                .any(|index| span_matches_index(*arg, index))
        })
    }

    pub fn is_acceptable(&self, relation: &Relation) -> bool {
        self.predicate_is_event(relation.predicate().span())
            && self.arguments_contain_entity(relation.arg1().span(), relation.arg2().span())
    }

    /// Split candidates into accepted relations and the number rejected.
    pub fn validate(&self, candidates: Vec<Relation>) -> (Vec<Relation>, usize) {
        let total = candidates.len();
        let accepted: Vec<Relation> = candidates
            .into_iter()
            .filter(|relation| {
                let ok = self.is_acceptable(relation);
                if !ok {
                    debug!("Rejected relation {} at {}", relation.id(), relation.span());
                }
                ok
            })
            .collect();
        let rejected = total - accepted.len();
        (accepted, rejected)
    }
}

/// Tags of the last verb-class annotation that starts at or after the
/// predicate start and ends no more than one position past the predicate end.
/// Annotations whose first tag is the "no class" sentinel are ignored.
pub fn verb_classes_for(predicate: Span, verb_classes: &[SpanAnnotation]) -> Option<Vec<String>> {
    verb_classes
        .iter()
        .filter(|vnc| vnc.start() >= predicate.start && vnc.end() <= predicate.end + 1)
        .filter(|vnc| !vnc.features().has_sentinel_tag())
        .filter_map(|vnc| vnc.features().tags.clone())
        .last()
}

/// Attach verb classes to each relation from the verb-class annotations,
/// given in layer order.
pub fn attach_verb_classes(relations: Vec<Relation>, verb_classes: &[SpanAnnotation]) -> Vec<Relation> {
    relations
        .into_iter()
        .map(|relation| {
            let tags = verb_classes_for(relation.predicate().span(), verb_classes);
            relation.with_verb_classes(tags)
        })
        .collect()
}
