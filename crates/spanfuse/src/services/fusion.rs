//! Fusion of one document's annotation layers into its index.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use chrono::Datelike;
use tracing::{debug, info};

use super::gazetteer::{self, Gazetteer};
use super::ontology::TechnologyOntology;
use super::projector::SpanProjector;
use super::relation_validator::{attach_verb_classes, RelationValidator};
use crate::config::FusionConfig;
use crate::document::{DocumentAnnotationSet, DocumentInfo};
use crate::error::{Diagnostics, FuseError};
use crate::index::{AllowedOffsets, NORMAL_SENTENCE};
use crate::models::{
    AnnotationLayer, CanonicalText, Category, DocumentMetadata, DocumentRecord, RawAnnotation,
    Relation, ScopedRecord, SpanAnnotation, MARKABLE_TYPE, RELATION_TYPE,
};

const SECTION_TYPE: &str = "Section";
const TITLE_TYPE: &str = "Title";
const ABSTRACT_TYPE: &str = "Abstract";
const TOPIC_TYPE: &str = "SemanticTag";
const EVENT_TYPE: &str = "Event";
const TIME_TYPE: &str = "TimeExpression";

/// Raw material for one document.
#[derive(Debug, Clone, Default)]
pub struct DocumentInput {
    pub docname: String,
    pub text: String,
    pub layers: HashMap<String, AnnotationLayer>,
    pub metadata: DocumentMetadata,
}

impl DocumentInput {
    pub fn new(docname: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            docname: docname.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_layer(mut self, layer: AnnotationLayer) -> Self {
        self.layers.insert(layer.name.clone(), layer);
        self
    }

    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Section,
    Sentence,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Section => "section",
            Self::Sentence => "sentence",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document index projected onto one section or sentence.
#[derive(Debug, Clone)]
pub struct ScopedSet {
    pub kind: ScopeKind,
    pub set: DocumentAnnotationSet,
}

/// Result of fusing one document.
#[derive(Debug, Clone)]
pub struct FusedDocument {
    pub document: DocumentAnnotationSet,
    pub sections: Vec<ScopedSet>,
    pub sentences: Vec<ScopedSet>,
    pub diagnostics: Diagnostics,
}

impl FusedDocument {
    pub fn record(&self) -> DocumentRecord {
        self.document.to_record()
    }

    /// Section records followed by sentence records.
    pub fn scoped_records(&self, omit_empty: bool) -> Vec<(ScopeKind, ScopedRecord)> {
        self.sections
            .iter()
            .chain(&self.sentences)
            .map(|scoped| (scoped.kind, scoped.set.to_scoped_record(omit_empty)))
            .collect()
    }
}

/// Builds document indexes from annotation layers.
///
/// Holds only read-only state, so one fuser can serve many documents
/// concurrently.
#[derive(Clone)]
pub struct DocumentFuser {
    config: Arc<FusionConfig>,
    ontology: Option<Arc<TechnologyOntology>>,
    gazetteer: Option<Arc<dyn Gazetteer>>,
    current_year: i32,
}

impl DocumentFuser {
    pub fn new(config: Arc<FusionConfig>) -> Self {
        Self {
            config,
            ontology: None,
            gazetteer: None,
            current_year: chrono::Utc::now().year(),
        }
    }

    pub fn with_ontology(mut self, ontology: Arc<TechnologyOntology>) -> Self {
        self.ontology = Some(ontology);
        self
    }

    pub fn with_gazetteer(mut self, gazetteer: Arc<dyn Gazetteer>) -> Self {
        self.gazetteer = Some(gazetteer);
        self
    }

    /// Year used to cap reference years when the metadata has none.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Fuse the document at 1-based position `sequence` of its batch.
    pub fn fuse(&self, sequence: usize, input: DocumentInput) -> Result<FusedDocument, FuseError> {
        let docid = format!("{:04}", sequence);
        let layers = LayerView::new(&self.config, &docid, &input)?;
        let text = Arc::new(CanonicalText::new(input.text.as_str()));
        let mut resolver = Resolver {
            text: &text,
            diagnostics: Diagnostics::default(),
        };

        let names = &self.config.layers;
        let sentences = resolver.resolve(layers.get(&names.sentence), |a| {
            a.features.sentence_type() == Some(NORMAL_SENTENCE)
        });
        let sections = resolver.resolve(layers.get(&names.structure), |a| a.has_type(SECTION_TYPE));

        let allowed = match layers.get(&names.sentence) {
            Some(_) if self.config.quality_filter => {
                Some(Arc::new(AllowedOffsets::from_sentences(&sentences)))
            }
            _ => None,
        };

        let mut by_category: BTreeMap<Category, Vec<SpanAnnotation>> = BTreeMap::new();

        if self.config.is_active(Category::Technology) {
            let mut technologies = resolver.resolve(layers.get(&names.technology), |_| true);
            if let Some(ontology) = &self.ontology {
                technologies = ontology.apply_stoplist(technologies);
                let found = ontology.find_terms(&text, &technologies);
                technologies.extend(found);
            }
            by_category.insert(Category::Technology, technologies);
        }

        for entity in resolver.resolve(layers.get(&names.ner), |a| a.features.category.is_some()) {
            let category = entity
                .features()
                .category
                .as_deref()
                .map(str::to_lowercase)
                .and_then(|c| Category::from_str(&c));
            let entity = match (category, &self.gazetteer) {
                (Some(Category::Location), Some(places)) => gazetteer::locate(entity, places.as_ref()),
                _ => entity,
            };
            match category {
                Some(c @ (Category::Person | Category::Location | Category::Organization)) => {
                    by_category.entry(c).or_default().push(entity)
                }
                _ => debug!("{}: ignoring entity {} of unknown category", docid, entity.id()),
            }
        }

        for annotation in resolver.resolve(layers.get(&names.tarsqi), |a| {
            a.has_type(EVENT_TYPE) || a.has_type(TIME_TYPE)
        }) {
            let category = if annotation.has_type(TIME_TYPE) {
                Category::Time
            } else {
                Category::Event
            };
            by_category.entry(category).or_default().push(annotation);
        }

        // relations read verb classes from the layer, not the quality-filtered index
        let verb_classes = resolver.resolve(layers.get(&names.verb_class), |a| {
            !a.features.has_sentinel_tag()
        });
        if self.config.is_active(Category::VerbClass) {
            by_category.insert(Category::VerbClass, verb_classes.clone());
        }

        let markables = resolver.resolve(layers.get(&names.relation), |a| a.has_type(MARKABLE_TYPE));
        let mut diagnostics = resolver.diagnostics;

        let info = self.document_info(&docid, &input, &layers, &text);
        let mut set =
            DocumentAnnotationSet::new(info, Arc::clone(&text), &self.config.categories, allowed);
        for category in self.config.categories.iter().copied() {
            let annotations = by_category.remove(&category).unwrap_or_default();
            set.add_all(category, annotations)?;
        }

        let candidates =
            self.relation_candidates(&docid, layers.get(&names.relation), markables, &mut diagnostics);
        let relations = if self.config.validate_relations {
            let (accepted, rejected) = RelationValidator::new(&set).validate(candidates);
            diagnostics.rejected_relations = rejected;
            accepted
        } else {
            candidates
        };
        for relation in attach_verb_classes(relations, &verb_classes) {
            set.add_relation(relation)?;
        }
        set.finish();

        let sections = if self.config.emit_sections {
            project_all(&set, &sections, ScopeKind::Section)
        } else {
            Vec::new()
        };
        let sentences = if self.config.emit_sentences {
            project_all(&set, &sentences, ScopeKind::Sentence)
        } else {
            Vec::new()
        };

        info!(
            "Fused {} ({}): {} sections={} sentences={}",
            input.docname,
            docid,
            set,
            sections.len(),
            sentences.len()
        );

        Ok(FusedDocument {
            document: set,
            sections,
            sentences,
            diagnostics,
        })
    }

    fn document_info(
        &self,
        docid: &str,
        input: &DocumentInput,
        layers: &LayerView<'_>,
        text: &CanonicalText,
    ) -> DocumentInfo {
        let metadata = &input.metadata;
        let structure = layers.get(&self.config.layers.structure);
        let structure_text = |suffix: &str| {
            structure
                .into_iter()
                .flat_map(|layer| &layer.annotations)
                .filter(|a| a.has_type(suffix))
                .find_map(|a| SpanAnnotation::resolve(a.clone(), text).ok())
                .map(|a| a.text().to_string())
        };

        let mut topics = Vec::new();
        let mut topic_elements = BTreeSet::new();
        let topic_names = layers
            .get(&self.config.layers.topic)
            .into_iter()
            .flat_map(|layer| &layer.annotations)
            .filter(|a| a.has_type(TOPIC_TYPE))
            .filter_map(|a| a.features.topic_name.as_deref());
        for name in topic_names {
            topic_elements.extend(name.split_whitespace().map(str::to_string));
            topics.push(name.to_string());
        }

        DocumentInfo {
            docid: docid.to_string(),
            docname: input.docname.clone(),
            title: metadata.title.clone().or_else(|| structure_text(TITLE_TYPE)),
            year: metadata.resolved_year(self.current_year),
            authors: metadata.authors.clone(),
            abstract_text: metadata
                .abstract_text
                .clone()
                .or_else(|| structure_text(ABSTRACT_TYPE)),
            topics,
            topic_elements: topic_elements.into_iter().collect(),
        }
    }

    fn relation_candidates(
        &self,
        docid: &str,
        layer: Option<&AnnotationLayer>,
        markables: Vec<SpanAnnotation>,
        diagnostics: &mut Diagnostics,
    ) -> Vec<Relation> {
        let Some(layer) = layer else {
            return Vec::new();
        };
        let markables: HashMap<String, SpanAnnotation> = markables
            .into_iter()
            .map(|m| (m.id().to_string(), m))
            .collect();

        layer
            .annotations
            .iter()
            .filter(|a| a.has_type(RELATION_TYPE))
            .filter_map(|a| match Relation::from_markables(a, &markables) {
                Ok(relation) => Some(relation),
                Err(e) => {
                    debug!("{}: {}", docid, e);
                    diagnostics.dropped_relations += 1;
                    None
                }
            })
            .collect()
    }
}

/// The layers of one document, checked against the configuration.
struct LayerView<'a> {
    layers: &'a HashMap<String, AnnotationLayer>,
}

impl<'a> LayerView<'a> {
    /// Fails when a required layer is missing or a layer was anchored to a
    /// different text.
    fn new(config: &FusionConfig, docid: &str, input: &'a DocumentInput) -> Result<Self, FuseError> {
        for name in config.wanted_layers() {
            if !input.layers.contains_key(name) && !config.is_optional(name) {
                return Err(FuseError::LayerMissing {
                    document_id: docid.to_string(),
                    layer: name.to_string(),
                });
            }
        }
        for layer in input.layers.values() {
            if layer.text.as_deref().is_some_and(|t| t != input.text) {
                return Err(FuseError::CanonicalTextMismatch {
                    document_id: docid.to_string(),
                    layer: layer.name.clone(),
                });
            }
        }
        Ok(Self {
            layers: &input.layers,
        })
    }

    fn get(&self, name: &str) -> Option<&'a AnnotationLayer> {
        self.layers.get(name)
    }
}

/// Anchors layer annotations to the canonical text, counting the ones
/// dropped for bad offsets.
struct Resolver<'t> {
    text: &'t CanonicalText,
    diagnostics: Diagnostics,
}

impl Resolver<'_> {
    /// Annotations of `layer` accepted by `keep`. A missing layer yields none.
    fn resolve(
        &mut self,
        layer: Option<&AnnotationLayer>,
        keep: impl Fn(&RawAnnotation) -> bool,
    ) -> Vec<SpanAnnotation> {
        let Some(layer) = layer else {
            return Vec::new();
        };
        let mut resolved = Vec::with_capacity(layer.annotations.len());
        for raw in layer.annotations.iter().filter(|a| keep(a)) {
            match SpanAnnotation::resolve(raw.clone(), self.text) {
                Ok(annotation) => resolved.push(annotation),
                Err(e) => {
                    debug!("{}: {}", layer.name, e);
                    self.diagnostics.dropped_annotations += 1;
                }
            }
        }
        resolved
    }
}

fn project_all(
    set: &DocumentAnnotationSet,
    spans: &[SpanAnnotation],
    kind: ScopeKind,
) -> Vec<ScopedSet> {
    spans
        .iter()
        .enumerate()
        .map(|(i, scope)| ScopedSet {
            kind,
            set: SpanProjector::project(set, scope.span(), format!("{}-{:04}", set.docid(), i + 1)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, Features};
    use crate::services::StaticGazetteer;

    const TEXT: &str = "Acme Corp announced a merger with Globex. The deal closed in March 2020.";

    fn raw(id: &str, kind: &str, start: i64, end: i64) -> RawAnnotation {
        RawAnnotation::new(id, kind, start, end)
    }

    fn with_extra(raw: RawAnnotation, key: &str, value: serde_json::Value) -> RawAnnotation {
        let mut features = raw.features.clone();
        features.extra.insert(key.into(), value);
        raw.with_features(features)
    }

    fn entity(id: &str, category: &str, start: i64, end: i64) -> RawAnnotation {
        let features = Features {
            category: Some(category.into()),
            ..Default::default()
        };
        raw(id, "NamedEntity", start, end).with_features(features)
    }

    fn tagged(id: &str, start: i64, end: i64, tag: &str) -> RawAnnotation {
        let features = Features {
            tags: Some(vec![tag.into()]),
            ..Default::default()
        };
        raw(id, "VerbClass", start, end).with_features(features)
    }

    fn relation(id: &str, pred: &str, args: [&str; 2]) -> RawAnnotation {
        let r = with_extra(raw(id, "GenericRelation", 0, 0), "relation", pred.into());
        with_extra(r, "arguments", serde_json::json!(args))
    }

    fn sentence(id: &str, start: i64, end: i64, kind: &str) -> RawAnnotation {
        with_extra(raw(id, "Sentence", start, end), "type", kind.into())
    }

    fn input() -> DocumentInput {
        let topic = raw("tp1", "http://vocab/SemanticTag", 0, 0).with_features(Features {
            topic_name: Some("corporate mergers".into()),
            ..Default::default()
        });
        DocumentInput::new("acme.lif", TEXT)
            .with_layer(AnnotationLayer::new(
                "ner",
                vec![
                    entity("n1", "organization", 0, 9),
                    entity("n2", "Organization", 34, 40),
                    entity("n3", "person", 70, 80),
                ],
            ))
            .with_layer(AnnotationLayer::new(
                "ttk",
                vec![
                    raw("e1", "Event", 10, 19),
                    raw("e2", "Event", 51, 57),
                    raw("t1", "TimeExpression", 61, 71),
                    raw("x1", "TLINK", 0, 0),
                ],
            ))
            .with_layer(AnnotationLayer::new(
                "tex",
                vec![raw("t1", "Technology", 46, 50), raw("t2", "Technology", 22, 28)],
            ))
            .with_layer(AnnotationLayer::new(
                "rel",
                vec![
                    raw("m1", "Markable", 10, 19),
                    raw("m2", "Markable", 0, 9),
                    raw("m3", "Markable", 34, 40),
                    raw("m4", "Markable", 51, 57),
                    raw("m5", "Markable", 42, 50),
                    raw("m6", "Markable", 22, 28),
                    relation("r1", "m1", ["m2", "m3"]),
                    relation("r2", "m4", ["m5", "m3"]),
                    relation("r3", "m6", ["m2", "m3"]),
                    relation("r4", "m1", ["m2", "m99"]),
                ],
            ))
            .with_layer(AnnotationLayer::new(
                "vnc",
                vec![tagged("v1", 10, 19, "say-37.7"), tagged("v2", 51, 57, "None")],
            ))
            .with_layer(AnnotationLayer::new(
                "sen",
                vec![sentence("s1", 0, 41, "normal"), sentence("s2", 42, 72, "normal")],
            ))
            .with_layer(AnnotationLayer::new("top", vec![topic]))
            .with_layer(AnnotationLayer::new(
                "structure",
                vec![raw("h1", "Title", 0, 9), raw("sec1", "Section", 0, 72)],
            ))
            .with_metadata(DocumentMetadata {
                authors: vec!["R. Reporter".into()],
                reference_years: vec![2019, 2020],
                ..Default::default()
            })
    }

    fn fuser(config: FusionConfig) -> DocumentFuser {
        DocumentFuser::new(Arc::new(config)).with_current_year(2026)
    }

    #[test]
    fn test_fuse_document() {
        let fused = fuser(FusionConfig::default()).fuse(1, input()).unwrap();
        let record = fused.record();

        assert_eq!(record.docid, "0001");
        assert_eq!(record.docname, "acme.lif");
        assert_eq!(record.title.as_deref(), Some("Acme Corp"));
        assert_eq!(record.year, Some(2020));
        assert_eq!(record.author, vec!["R. Reporter"]);
        assert_eq!(record.topic, vec!["corporate mergers"]);
        assert_eq!(record.topic_element, vec!["corporate", "mergers"]);
        assert_eq!(record.organization.len(), 2);
        assert!(record.person.is_empty());
        assert_eq!(record.event.len(), 2);
        assert_eq!(record.time[0].text, "March 2020");
        assert_eq!(record.technology.len(), 2);

        let preds: Vec<_> = record.relation.iter().map(|r| r.pred.as_str()).collect();
        assert_eq!(preds, vec!["announced", "closed"]);
        assert_eq!(record.relation[0].vnc, Some(vec!["say-37.7".to_string()]));
        assert_eq!(record.relation[1].vnc, None);
        assert_eq!(record.relation[0].arg2_offsets, "34-40");

        assert_eq!(
            fused.diagnostics,
            Diagnostics {
                dropped_annotations: 1,
                dropped_relations: 1,
                rejected_relations: 1,
            }
        );
    }

    #[test]
    fn test_sections_and_sentences() {
        let fused = fuser(FusionConfig::default()).fuse(3, input()).unwrap();
        assert_eq!(fused.sections.len(), 1);
        assert_eq!(fused.sections[0].set.docid(), "0003-0001");
        assert_eq!(fused.sentences.len(), 2);

        let records = fused.scoped_records(true);
        assert_eq!(records.len(), 3);
        let (kind, first) = &records[1];
        assert_eq!(*kind, ScopeKind::Sentence);
        assert_eq!(first.docid, "0003-0001");
        assert_eq!(first.text, "Acme Corp announced a merger with Globex.");
        assert_eq!(first.relation.as_ref().map(Vec::len), Some(1));
        assert!(first.time.is_none());

        let (_, second) = &records[2];
        assert_eq!(second.docid, "0003-0002");
        assert_eq!(second.time.as_ref().map(|t| t[0].offsets.as_str()), Some("61-71"));
        // r2 spans both sentences and belongs to neither
        assert!(second.relation.is_none());
    }

    #[test]
    fn test_missing_required_layer() {
        let mut doc = input();
        doc.layers.remove("ttk");
        let err = fuser(FusionConfig::default()).fuse(1, doc).unwrap_err();
        assert_eq!(
            err,
            FuseError::LayerMissing {
                document_id: "0001".into(),
                layer: "ttk".into(),
            }
        );
        assert!(err.is_skip());
    }

    #[test]
    fn test_missing_optional_layer() {
        let mut doc = input();
        doc.layers.remove("vnc");
        doc.layers.remove("structure");
        let fused = fuser(FusionConfig::default()).fuse(1, doc).unwrap();
        assert!(fused.sections.is_empty());
        assert_eq!(fused.record().title, None);
        assert!(fused.record().relation.iter().all(|r| r.vnc.is_none()));
    }

    #[test]
    fn test_unneeded_layer_not_required() {
        let mut doc = input();
        doc.layers.remove("ttk");
        let config = FusionConfig {
            categories: vec![Category::Technology, Category::Organization],
            validate_relations: false,
            ..Default::default()
        };
        let fused = fuser(config).fuse(1, doc).unwrap();
        assert_eq!(fused.record().relation.len(), 3);
        assert!(fused.record().event.is_empty());
    }

    #[test]
    fn test_canonical_text_mismatch() {
        let doc = input().with_layer(
            AnnotationLayer::new("ner", vec![entity("n1", "person", 0, 4)]).with_text("Acme Corp."),
        );
        let err = fuser(FusionConfig::default()).fuse(1, doc).unwrap_err();
        assert!(matches!(err, FuseError::CanonicalTextMismatch { ref layer, .. } if layer == "ner"));
    }

    #[test]
    fn test_validation_toggle() {
        let config = FusionConfig {
            validate_relations: false,
            ..Default::default()
        };
        let fused = fuser(config).fuse(1, input()).unwrap();
        assert_eq!(fused.record().relation.len(), 3);
        assert_eq!(fused.diagnostics.rejected_relations, 0);
    }

    #[test]
    fn test_quality_filter() {
        let mut doc = input();
        doc.layers.insert(
            "sen".into(),
            AnnotationLayer::new(
                "sen",
                vec![sentence("s1", 0, 41, "normal"), sentence("s2", 42, 72, "header")],
            ),
        );
        let config = FusionConfig {
            quality_filter: true,
            ..Default::default()
        };
        let fused = fuser(config).fuse(1, doc).unwrap();
        let record = fused.record();
        assert!(record.time.is_empty());
        assert_eq!(record.event.len(), 1);
        // the second sentence is not normal, so only one sentence record
        assert_eq!(fused.sentences.len(), 1);
    }

    fn announced_vnc(fused: &FusedDocument) -> Option<Vec<String>> {
        fused
            .record()
            .relation
            .into_iter()
            .find(|r| r.pred == "announced")
            .and_then(|r| r.vnc)
    }

    #[test]
    fn test_verb_classes_attach_without_verb_class_category() {
        let config = FusionConfig {
            categories: Category::ALL
                .into_iter()
                .filter(|c| *c != Category::VerbClass)
                .collect(),
            ..Default::default()
        };
        assert!(config.wanted_layers().contains(&"vnc"));

        let fused = fuser(config).fuse(1, input()).unwrap();
        assert!(fused.document.category(Category::VerbClass).is_none());
        assert_eq!(announced_vnc(&fused), Some(vec!["say-37.7".to_string()]));
    }

    #[test]
    fn test_verb_classes_ignore_quality_filter() {
        let mut doc = input();
        doc.layers.insert(
            "sen".into(),
            AnnotationLayer::new(
                "sen",
                vec![sentence("s1", 0, 41, "header"), sentence("s2", 42, 72, "normal")],
            ),
        );
        let config = FusionConfig {
            quality_filter: true,
            validate_relations: false,
            ..Default::default()
        };
        let fused = fuser(config).fuse(1, doc).unwrap();

        let indexed = fused.document.category(Category::VerbClass).unwrap();
        assert_eq!(indexed.annotation_count(), 0);
        assert_eq!(announced_vnc(&fused), Some(vec!["say-37.7".to_string()]));
    }

    #[test]
    fn test_title_fallback_skips_unresolvable_annotation() {
        let doc = input().with_layer(AnnotationLayer::new(
            "structure",
            vec![
                raw("h0", "Title", 100, 120),
                raw("h1", "Title", 0, 9),
                raw("sec1", "Section", 0, 72),
            ],
        ));
        let record = fuser(FusionConfig::default()).fuse(1, doc).unwrap().record();
        assert_eq!(record.title.as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn test_fused_document_is_finalized() {
        let fused = fuser(FusionConfig::default()).fuse(1, input()).unwrap();
        assert!(fused.document.is_finalized());
        assert!(fused.sentences.iter().all(|s| s.set.is_finalized()));
    }

    #[test]
    fn test_metadata_wins_over_structure() {
        let doc = input().with_metadata(DocumentMetadata {
            title: Some("Merger news".into()),
            year: Some(2021),
            ..Default::default()
        });
        let record = fuser(FusionConfig::default()).fuse(1, doc).unwrap().record();
        assert_eq!(record.title.as_deref(), Some("Merger news"));
        assert_eq!(record.year, Some(2021));
    }

    #[test]
    fn test_ontology_and_gazetteer() {
        let text = "Globex opened an office in Langley to build GPU servers.";
        let doc = DocumentInput::new("globex.lif", text)
            .with_layer(AnnotationLayer::new(
                "ner",
                vec![entity("n1", "organization", 0, 6), entity("n2", "location", 27, 34)],
            ))
            .with_layer(AnnotationLayer::new("ttk", vec![]))
            .with_layer(AnnotationLayer::new(
                "tex",
                vec![raw("t4", "Technology", 17, 23), raw("t5", "Technology", 48, 55)],
            ))
            .with_layer(AnnotationLayer::new("rel", vec![]))
            .with_layer(AnnotationLayer::new("sen", vec![]))
            .with_layer(AnnotationLayer::new("top", vec![]));

        let ontology = TechnologyOntology::parse("+ GPU\n- office\n").unwrap();
        let gazetteer: StaticGazetteer = [("langley".to_string(), Coordinates::new(38.93, -77.17))]
            .into_iter()
            .collect();
        let fused = fuser(FusionConfig::default())
            .with_ontology(Arc::new(ontology))
            .with_gazetteer(Arc::new(gazetteer))
            .fuse(1, doc)
            .unwrap();

        let record = fused.record();
        let techs: Vec<_> = record.technology.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(techs, vec!["servers", "GPU"]);
        assert_eq!(record.technology[1].offsets, "44-47");
        assert_eq!(
            record.location[0].coordinates,
            Some(Coordinates::new(38.93, -77.17))
        );
        let techs = fused.document.category(Category::Technology).unwrap();
        assert_eq!(techs.entry_at(44), Some((47, "t6")));
    }
}
