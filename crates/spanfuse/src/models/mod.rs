mod annotation;
mod category;
mod metadata;
mod record;
mod relation;
mod span;

pub use annotation::{
    AnnotationLayer, Coordinates, Features, RawAnnotation, SpanAnnotation, NO_TAG_SENTINEL,
};
pub use category::Category;
pub use metadata::DocumentMetadata;
pub use record::{CondensedAnnotation, DocumentRecord, RelationRecord, ScopedRecord};
pub use relation::{Relation, MARKABLE_TYPE, RELATION_TYPE};
pub use span::{CanonicalText, Span};
