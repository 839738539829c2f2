mod fusion;
pub mod gazetteer;
mod ontology;
mod projector;
pub mod relation_validator;

pub use fusion::{DocumentFuser, DocumentInput, FusedDocument, ScopeKind, ScopedSet};
pub use gazetteer::{Gazetteer, StaticGazetteer};
pub use ontology::{TechnologyOntology, TECHNOLOGY_TYPE};
pub use projector::SpanProjector;
pub use relation_validator::RelationValidator;
