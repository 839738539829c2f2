//! The fused annotation index of one document (or one part of it).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::error::FuseError;
use crate::index::{AllowedOffsets, IndexedAnnotations};
use crate::models::{
    CanonicalText, Category, CondensedAnnotation, DocumentRecord, Relation, ScopedRecord, Span,
    SpanAnnotation,
};

/// Scalar metadata carried into the document record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentInfo {
    /// Zero-padded sequence id (`0001`, or `0001-0003` for a section).
    pub docid: String,
    pub docname: String,
    pub title: Option<String>,
    pub year: Option<i32>,
    pub authors: Vec<String>,
    pub abstract_text: Option<String>,
    pub topics: Vec<String>,
    pub topic_elements: Vec<String>,
}

/// One index per active category plus validated relations, anchored to a
/// shared canonical text.
///
/// A set covers `scope` of the canonical text: the whole text for a document,
/// a section or sentence span for a projected copy. Offsets are always
/// relative to the whole document.
#[derive(Debug, Clone)]
pub struct DocumentAnnotationSet {
    info: DocumentInfo,
    text: Arc<CanonicalText>,
    scope: Span,
    indexes: BTreeMap<Category, IndexedAnnotations>,
    relations: Vec<Relation>,
    finalized: bool,
}

impl DocumentAnnotationSet {
    /// An empty set over the whole of `text` with one index per category.
    /// When `allowed` is given every index filters against it on `finish()`.
    pub fn new(
        info: DocumentInfo,
        text: Arc<CanonicalText>,
        categories: &[Category],
        allowed: Option<Arc<AllowedOffsets>>,
    ) -> Self {
        let indexes = categories
            .iter()
            .map(|&category| {
                let index = match &allowed {
                    Some(allowed) => {
                        IndexedAnnotations::with_quality_filter(category, Arc::clone(allowed))
                    }
                    None => IndexedAnnotations::new(category),
                };
                (category, index)
            })
            .collect();
        let scope = Span::new(0, text.len());

        Self {
            info,
            text,
            scope,
            indexes,
            relations: Vec::new(),
            finalized: false,
        }
    }

    /// A finalized set built from already finished indexes.
    pub(crate) fn from_parts(
        info: DocumentInfo,
        text: Arc<CanonicalText>,
        scope: Span,
        indexes: BTreeMap<Category, IndexedAnnotations>,
        relations: Vec<Relation>,
    ) -> Self {
        Self {
            info,
            text,
            scope,
            indexes,
            relations,
            finalized: true,
        }
    }

    pub fn add(&mut self, category: Category, annotation: SpanAnnotation) -> Result<(), FuseError> {
        self.index_mut(category)?.add(annotation)
    }

    /// Add annotations to one category and finish that category.
    pub fn add_all(
        &mut self,
        category: Category,
        annotations: impl IntoIterator<Item = SpanAnnotation>,
    ) -> Result<(), FuseError> {
        self.index_mut(category)?.add_all(annotations)
    }

    pub fn add_relation(&mut self, relation: Relation) -> Result<(), FuseError> {
        if self.finalized {
            return Err(FuseError::DocumentFinalized {
                document_id: self.info.docid.clone(),
            });
        }
        self.relations.push(relation);
        Ok(())
    }

    /// Finish every category index and close the set to further relations.
    pub fn finish(&mut self) {
        for index in self.indexes.values_mut() {
            index.finish();
        }
        self.finalized = true;
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn index_mut(&mut self, category: Category) -> Result<&mut IndexedAnnotations, FuseError> {
        self.indexes
            .get_mut(&category)
            .ok_or(FuseError::InactiveCategory { category })
    }

    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    pub fn docid(&self) -> &str {
        &self.info.docid
    }

    pub fn docname(&self) -> &str {
        &self.info.docname
    }

    pub fn canonical_text(&self) -> &Arc<CanonicalText> {
        &self.text
    }

    pub fn scope(&self) -> Span {
        self.scope
    }

    /// The part of the canonical text this set covers.
    pub fn text(&self) -> &str {
        self.text.slice(self.scope).unwrap_or_default()
    }

    pub fn category(&self, category: Category) -> Option<&IndexedAnnotations> {
        self.indexes.get(&category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &IndexedAnnotations> {
        self.indexes.values()
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    fn count(&self, category: Category) -> usize {
        self.category(category).map_or(0, IndexedAnnotations::len)
    }

    fn condensed(&self, category: Category) -> Vec<CondensedAnnotation> {
        self.category(category)
            .map(IndexedAnnotations::get_condensed_annotations)
            .unwrap_or_default()
    }

    pub fn to_record(&self) -> DocumentRecord {
        let info = &self.info;
        DocumentRecord {
            text: self.text().to_string(),
            docid: info.docid.clone(),
            docname: info.docname.clone(),
            title: info.title.clone(),
            year: info.year,
            author: info.authors.clone(),
            topic: info.topics.clone(),
            topic_element: info.topic_elements.clone(),
            abstract_text: info.abstract_text.clone(),
            technology: self.condensed(Category::Technology),
            person: self.condensed(Category::Person),
            location: self.condensed(Category::Location),
            organization: self.condensed(Category::Organization),
            event: self.condensed(Category::Event),
            time: self.condensed(Category::Time),
            relation: self.relations.iter().map(Relation::to_record).collect(),
        }
    }

    /// Record for a section or sentence. With `omit_empty`, categories with
    /// no entries are left out.
    pub fn to_scoped_record(&self, omit_empty: bool) -> ScopedRecord {
        let field = |category: Category| {
            let values = self.condensed(category);
            (!omit_empty || !values.is_empty()).then_some(values)
        };
        let relations: Vec<_> = self.relations.iter().map(Relation::to_record).collect();

        ScopedRecord {
            text: self.text().to_string(),
            docid: self.info.docid.clone(),
            technology: field(Category::Technology),
            person: field(Category::Person),
            location: field(Category::Location),
            organization: field(Category::Organization),
            event: field(Category::Event),
            time: field(Category::Time),
            relation: (!omit_empty || !relations.is_empty()).then_some(relations),
        }
    }

    /// Text->offsets and lemma->phrases indexes of every category.
    pub fn offsets_and_lemmas(&self) -> Value {
        let categories: serde_json::Map<String, Value> = self
            .indexes
            .iter()
            .map(|(category, index)| {
                (
                    category.as_str().to_string(),
                    json!({
                        "offsets": index.text_offsets(),
                        "lemmas": index.lemma_phrases(),
                    }),
                )
            })
            .collect();
        json!({
            "docid": self.info.docid,
            "categories": categories,
        })
    }
}

impl fmt::Display for DocumentAnnotationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Index {}", self.info.docid)?;
        for category in Category::ALL.iter().filter(|c| c.is_emitted()) {
            write!(f, " {}:{}", category.short_name(), self.count(*category))?;
        }
        write!(
            f,
            " rel:{} top:{}>",
            self.relations.len(),
            self.info.topics.len()
        )
    }
}
