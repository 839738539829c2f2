//! Per-category annotation index.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use super::allowed::AllowedOffsets;
use crate::error::FuseError;
use crate::models::{Category, CondensedAnnotation, Coordinates, Span, SpanAnnotation};

/// Lifecycle of an index: it accepts annotations until `finish()` is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    Building,
    Finalized,
}

/// All annotations of one category in a document, with derived lookups.
///
/// Derived indexes are only valid after `finish()`, which may be called any
/// number of times and always rebuilds them from the annotation list.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedAnnotations {
    category: Category,
    state: IndexState,
    quality_filter: Option<Arc<AllowedOffsets>>,
    annotations: Vec<SpanAnnotation>,
    texts: BTreeSet<String>,
    size: usize,
    /// start -> (end, id)
    offset_index: BTreeMap<usize, (usize, String)>,
    /// text -> "s1-e1 s2-e2 ..."
    text_offsets: BTreeMap<String, String>,
    /// token -> phrases containing it
    lemma_phrases: BTreeMap<String, Vec<String>>,
}

impl IndexedAnnotations {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            state: IndexState::Building,
            quality_filter: None,
            annotations: Vec::new(),
            texts: BTreeSet::new(),
            size: 0,
            offset_index: BTreeMap::new(),
            text_offsets: BTreeMap::new(),
            lemma_phrases: BTreeMap::new(),
        }
    }

    /// An index whose `finish()` drops annotations that are not fully inside
    /// the allowed positions.
    pub fn with_quality_filter(category: Category, allowed: Arc<AllowedOffsets>) -> Self {
        Self {
            quality_filter: Some(allowed),
            ..Self::new(category)
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn state(&self) -> IndexState {
        self.state
    }

    pub fn is_finalized(&self) -> bool {
        self.state == IndexState::Finalized
    }

    pub fn has_quality_filter(&self) -> bool {
        self.quality_filter.is_some()
    }

    pub fn add(&mut self, annotation: SpanAnnotation) -> Result<(), FuseError> {
        if self.is_finalized() {
            return Err(FuseError::IndexFinalized {
                category: self.category,
            });
        }
        self.texts.insert(annotation.display_text().to_string());
        self.annotations.push(annotation);
        Ok(())
    }

    /// Add every annotation, then finish.
    pub fn add_all(
        &mut self,
        annotations: impl IntoIterator<Item = SpanAnnotation>,
    ) -> Result<(), FuseError> {
        for annotation in annotations {
            self.add(annotation)?;
        }
        self.finish();
        Ok(())
    }

    /// Apply the quality filter (if any) and rebuild every derived index.
    pub fn finish(&mut self) {
        if let Some(allowed) = &self.quality_filter {
            let before = self.annotations.len();
            self.annotations.retain(|a| allowed.allows(a.span()));
            if self.annotations.len() != before {
                tracing::debug!(
                    "{}: quality filter dropped {} of {} annotations",
                    self.category,
                    before - self.annotations.len(),
                    before
                );
                self.texts = self
                    .annotations
                    .iter()
                    .map(|a| a.display_text().to_string())
                    .collect();
            }
        }
        self.size = self.texts.len();

        self.offset_index = self
            .annotations
            .iter()
            .map(|a| (a.start(), (a.end(), a.id().to_string())))
            .collect();

        let mut offsets: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for anno in &self.annotations {
            offsets
                .entry(anno.display_text())
                .or_default()
                .push(anno.span().to_string());
        }
        self.text_offsets = offsets
            .into_iter()
            .map(|(text, spans)| (text.to_string(), spans.join(" ")))
            .collect();

        self.lemma_phrases = BTreeMap::new();
        let mut seen = HashSet::new();
        for anno in &self.annotations {
            let phrase = anno.display_text();
            if !seen.insert(phrase) {
                continue;
            }
            for token in phrase.split_whitespace() {
                if token == phrase {
                    continue;
                }
                let phrases = self.lemma_phrases.entry(token.to_string()).or_default();
                if !phrases.iter().any(|p| p == phrase) {
                    phrases.push(phrase.to_string());
                }
            }
        }

        self.state = IndexState::Finalized;
    }

    /// A finished copy holding only the annotations fully inside `target`.
    /// The copy carries no quality filter.
    pub fn restricted_to(&self, target: Span) -> Self {
        let mut restricted = Self::new(self.category);
        restricted.annotations = self
            .annotations
            .iter()
            .filter(|a| target.contains(&a.span()))
            .cloned()
            .collect();
        restricted.texts = restricted
            .annotations
            .iter()
            .map(|a| a.display_text().to_string())
            .collect();
        restricted.finish();
        restricted
    }

    /// Number of distinct texts.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
    }

    pub fn annotations(&self) -> &[SpanAnnotation] {
        &self.annotations
    }

    /// Distinct texts, sorted.
    pub fn get_text_strings(&self) -> Vec<String> {
        self.texts.iter().cloned().collect()
    }

    pub fn offset_index(&self) -> &BTreeMap<usize, (usize, String)> {
        &self.offset_index
    }

    /// `(end, id)` of the annotation registered at `start`.
    pub fn entry_at(&self, start: usize) -> Option<(usize, &str)> {
        self.offset_index
            .get(&start)
            .map(|(end, id)| (*end, id.as_str()))
    }

    /// `(start, end)` of every registered annotation starting inside `span`.
    pub fn entries_starting_within(&self, span: Span) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.offset_index
            .range(span.offsets())
            .map(|(start, (end, _))| (*start, *end))
    }

    pub fn text_offsets(&self) -> &BTreeMap<String, String> {
        &self.text_offsets
    }

    pub fn offsets_for(&self, text: &str) -> Option<&str> {
        self.text_offsets.get(text).map(String::as_str)
    }

    pub fn lemma_phrases(&self) -> &BTreeMap<String, Vec<String>> {
        &self.lemma_phrases
    }

    pub fn phrases_for(&self, lemma: &str) -> &[String] {
        self.lemma_phrases
            .get(lemma)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// One entry per display text, in order of first appearance, with the
    /// offsets of every instance. Coordinates come from the first instance.
    pub fn get_condensed_annotations(&self) -> Vec<CondensedAnnotation> {
        let mut groups: Vec<(&str, Vec<String>, Option<Coordinates>)> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for anno in &self.annotations {
            let key = anno.display_text();
            let idx = *positions.entry(key).or_insert_with(|| {
                groups.push((key, Vec::new(), anno.features().coordinates));
                groups.len() - 1
            });
            groups[idx].1.push(anno.span().to_string());
        }

        groups
            .into_iter()
            .map(|(text, offsets, coordinates)| CondensedAnnotation {
                text: text.to_string(),
                offsets: offsets.join(" "),
                coordinates,
            })
            .collect()
    }
}

impl fmt::Display for IndexedAnnotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<IndexedAnnotations {} count={}>", self.category, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CanonicalText, Features, RawAnnotation};

    fn annotation(text: &CanonicalText, id: &str, start: i64, end: i64) -> SpanAnnotation {
        SpanAnnotation::resolve(RawAnnotation::new(id, "Technology", start, end), text).unwrap()
    }

    fn normalized(text: &CanonicalText, id: &str, start: i64, end: i64, term: &str) -> SpanAnnotation {
        let features = Features {
            term_normalized: Some(term.to_string()),
            ..Default::default()
        };
        let raw = RawAnnotation::new(id, "Technology", start, end).with_features(features);
        SpanAnnotation::resolve(raw, text).unwrap()
    }

    fn sample_text() -> CanonicalText {
        CanonicalText::new("neural network and neural network training on a network of GPUs")
    }

    fn sample_index() -> IndexedAnnotations {
        let text = sample_text();
        let mut index = IndexedAnnotations::new(Category::Technology);
        index.add(annotation(&text, "t1", 0, 14)).unwrap(); // neural network
        index.add(annotation(&text, "t2", 19, 33)).unwrap(); // neural network
        index.add(annotation(&text, "t3", 19, 42)).unwrap(); // neural network training
        index.add(annotation(&text, "t4", 48, 55)).unwrap(); // network
        index.finish();
        index
    }

    #[test]
    fn test_size_counts_distinct_texts() {
        let index = sample_index();
        assert_eq!(index.len(), 3);
        assert_eq!(index.annotation_count(), 4);
    }

    #[test]
    fn test_text_offsets_in_insertion_order() {
        let index = sample_index();
        assert_eq!(index.offsets_for("neural network"), Some("0-14 19-33"));
        assert_eq!(index.offsets_for("neural network training"), Some("19-42"));
        assert_eq!(index.offsets_for("network"), Some("48-55"));
        assert_eq!(index.text_offsets().len(), index.len());
    }

    #[test]
    fn test_offset_index_last_write_wins() {
        let index = sample_index();
        // t2 and t3 both start at 19; t3 was added later
        assert_eq!(index.entry_at(19), Some((42, "t3")));
        assert_eq!(index.entry_at(0), Some((14, "t1")));
        assert_eq!(index.entry_at(1), None);
        assert_eq!(index.offset_index().len(), 3);
    }

    #[test]
    fn test_lemma_index() {
        let index = sample_index();
        assert_eq!(
            index.phrases_for("neural"),
            &["neural network".to_string(), "neural network training".to_string()]
        );
        assert_eq!(
            index.phrases_for("network"),
            &["neural network".to_string(), "neural network training".to_string()]
        );
        // single-token phrases do not index themselves
        assert!(index.phrases_for("GPUs").is_empty());
        assert!(!index.lemma_phrases().contains_key("network training"));
    }

    #[test]
    fn test_text_strings_sorted() {
        let index = sample_index();
        assert_eq!(
            index.get_text_strings(),
            vec!["network", "neural network", "neural network training"]
        );
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut index = sample_index();
        let first = index.clone();
        index.finish();
        assert_eq!(index, first);
        assert_eq!(
            serde_json::to_string(index.text_offsets()).unwrap(),
            serde_json::to_string(first.text_offsets()).unwrap()
        );
    }

    #[test]
    fn test_add_after_finish_is_rejected() {
        let text = sample_text();
        let mut index = sample_index();
        let err = index.add(annotation(&text, "t5", 59, 63)).unwrap_err();
        assert_eq!(
            err,
            FuseError::IndexFinalized {
                category: Category::Technology
            }
        );
        assert_eq!(index.annotation_count(), 4);
    }

    #[test]
    fn test_derived_indexes_stale_until_finish() {
        let text = sample_text();
        let mut index = IndexedAnnotations::new(Category::Technology);
        index.add(annotation(&text, "t1", 0, 14)).unwrap();
        assert_eq!(index.state(), IndexState::Building);
        assert!(index.offset_index().is_empty());
        index.finish();
        assert_eq!(index.state(), IndexState::Finalized);
        assert_eq!(index.entry_at(0), Some((14, "t1")));
    }

    #[test]
    fn test_empty_category_is_valid() {
        let mut index = IndexedAnnotations::new(Category::Time);
        index.finish();
        assert!(index.is_empty());
        assert!(index.get_condensed_annotations().is_empty());
        assert!(index.text_offsets().is_empty());
    }

    #[test]
    fn test_condensed_groups_by_display_text() {
        let text = CanonicalText::new(format!(
            "We ran Kubernetes{}kubernetes clusters.",
            " ".repeat(33)
        ));
        let mut index = IndexedAnnotations::new(Category::Technology);
        index
            .add_all(vec![
                normalized(&text, "t1", 7, 17, "Kubernetes"),
                normalized(&text, "t2", 50, 60, "Kubernetes"),
            ])
            .unwrap();

        // raw texts differ in case, display texts agree
        assert_eq!(index.len(), 1);
        assert_eq!(index.get_text_strings(), vec!["Kubernetes"]);
        assert_eq!(index.offsets_for("Kubernetes"), Some("7-17 50-60"));
        assert_eq!(index.offsets_for("kubernetes"), None);
        assert_eq!(
            index.get_condensed_annotations(),
            vec![CondensedAnnotation {
                text: "Kubernetes".into(),
                offsets: "7-17 50-60".into(),
                coordinates: None,
            }]
        );
    }

    #[test]
    fn test_size_matches_condensed_entries() {
        let text = CanonicalText::new("Kubernetes and kubernetes on large language model hosts");
        let mut index = IndexedAnnotations::new(Category::Technology);
        index
            .add_all(vec![
                normalized(&text, "t1", 0, 10, "Kubernetes"),
                normalized(&text, "t2", 15, 25, "Kubernetes"),
                normalized(&text, "t3", 29, 49, "large language model"),
            ])
            .unwrap();

        assert_eq!(index.len(), index.get_condensed_annotations().len());
        assert_eq!(index.text_offsets().len(), 2);
        assert_eq!(index.offsets_for("Kubernetes"), Some("0-10 15-25"));
        assert_eq!(
            index.phrases_for("language"),
            &["large language model".to_string()]
        );
        assert!(!index.lemma_phrases().contains_key("kubernetes"));
    }

    #[test]
    fn test_condensation_scenario() {
        let text = CanonicalText::new(format!("Uses Kubernetes{}Kubernetes", " ".repeat(35)));
        let mut index = IndexedAnnotations::new(Category::Technology);
        index
            .add_all(vec![
                normalized(&text, "t1", 5, 15, "Kubernetes"),
                normalized(&text, "t2", 50, 60, "Kubernetes"),
            ])
            .unwrap();
        let condensed = index.get_condensed_annotations();
        assert_eq!(condensed.len(), 1);
        assert_eq!(condensed[0].text, "Kubernetes");
        assert_eq!(condensed[0].offsets, "5-15 50-60");
    }

    #[test]
    fn test_condensed_coordinates_from_first_instance() {
        let text = CanonicalText::new("Langley and Langley");
        let with_coords = Features {
            coordinates: Some(Coordinates::new(38.93, -77.17)),
            ..Default::default()
        };
        let first = SpanAnnotation::resolve(
            RawAnnotation::new("l1", "Location", 0, 7).with_features(with_coords),
            &text,
        )
        .unwrap();
        let second =
            SpanAnnotation::resolve(RawAnnotation::new("l2", "Location", 12, 19), &text).unwrap();

        let mut index = IndexedAnnotations::new(Category::Location);
        index.add_all(vec![first, second]).unwrap();
        let condensed = index.get_condensed_annotations();
        assert_eq!(condensed.len(), 1);
        assert_eq!(condensed[0].offsets, "0-7 12-19");
        assert_eq!(condensed[0].coordinates, Some(Coordinates::new(38.93, -77.17)));
    }

    #[test]
    fn test_quality_filter_enabled_drops_annotation() {
        let text = CanonicalText::new("x".repeat(200));
        let allowed = Arc::new(AllowedOffsets::from_spans([
            Span::new(0, 100),
            Span::new(140, 200),
        ]));
        let mut index = IndexedAnnotations::with_quality_filter(Category::Person, allowed);
        index.add(annotation(&text, "p1", 110, 120)).unwrap();
        index.add(annotation(&text, "p2", 10, 15)).unwrap();
        index.finish();

        assert_eq!(index.annotation_count(), 1);
        assert_eq!(index.entry_at(110), None);
        assert_eq!(index.entry_at(10), Some((15, "p2")));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_quality_filter_disabled_keeps_annotation() {
        let text = CanonicalText::new("x".repeat(200));
        let mut index = IndexedAnnotations::new(Category::Person);
        index.add(annotation(&text, "p1", 110, 120)).unwrap();
        index.add(annotation(&text, "p2", 10, 15)).unwrap();
        index.finish();

        assert_eq!(index.annotation_count(), 2);
        assert_eq!(index.entry_at(110), Some((120, "p1")));
    }

    #[test]
    fn test_entries_starting_within() {
        let index = sample_index();
        let found: Vec<_> = index.entries_starting_within(Span::new(10, 50)).collect();
        assert_eq!(found, vec![(19, 42), (48, 55)]);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            sample_index().to_string(),
            "<IndexedAnnotations technology count=3>"
        );
    }
}
