//! spanfuse - annotation layer fusion and indexing.
//!
//! Merges independently produced annotation layers (entities, technologies,
//! events, topics, relations, verb classes) that share one canonical document
//! text into a per-document index, and projects that index onto sections and
//! sentences to produce search-ready records.

// Model types use `from_str` methods that return Option<Self>,
// not Result<Self, Error> as std::str::FromStr requires.
#![allow(clippy::should_implement_trait)]

pub mod config;
pub mod document;
pub mod error;
pub mod index;
pub mod models;
pub mod services;

pub use config::{ConfigError, FusionConfig, LayerNames};
pub use document::{DocumentAnnotationSet, DocumentInfo};
pub use error::{Diagnostics, FuseError};
pub use index::{AllowedOffsets, IndexState, IndexedAnnotations};
pub use models::{
    AnnotationLayer, CanonicalText, Category, CondensedAnnotation, Coordinates, DocumentMetadata,
    DocumentRecord, Features, RawAnnotation, Relation, RelationRecord, ScopedRecord, Span,
    SpanAnnotation,
};
pub use services::{
    DocumentFuser, DocumentInput, FusedDocument, Gazetteer, RelationValidator, ScopeKind,
    ScopedSet, SpanProjector, StaticGazetteer, TechnologyOntology,
};
