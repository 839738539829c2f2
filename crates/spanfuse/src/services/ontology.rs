//! Curated technology terms and a stoplist of false technology mentions.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::Path;

use regex::Regex;

use crate::config::ConfigError;
use crate::models::{CanonicalText, Features, RawAnnotation, SpanAnnotation};

/// Annotation type given to technology mentions found by term search.
pub const TECHNOLOGY_TYPE: &str = "http://vocab.lappsgrid.org/Technology";

/// Technology terms to search for and terms never to accept as technologies.
///
/// The source format has one term per line prefixed by `+` (known technology)
/// or `-` (stoplist). Blank lines are ignored.
#[derive(Debug, Clone, Default)]
pub struct TechnologyOntology {
    technologies: BTreeSet<String>,
    stoplist: HashSet<String>,
    patterns: Vec<(String, Regex)>,
}

impl TechnologyOntology {
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let mut technologies = BTreeSet::new();
        let mut stoplist = HashSet::new();

        for line in contents.lines() {
            let mut tokens = line.split_whitespace();
            let Some(sign) = tokens.next() else {
                continue;
            };
            let term = tokens.collect::<Vec<_>>().join(" ");
            if term.is_empty() {
                continue;
            }
            if sign == "+" {
                technologies.insert(term);
            } else {
                stoplist.insert(term);
            }
        }

        let patterns = technologies
            .iter()
            .map(|term| {
                Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term)))
                    .map(|re| (term.clone(), re))
                    .map_err(|e| ConfigError::Invalid(format!("technology term '{}': {}", term, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            technologies,
            stoplist,
            patterns,
        })
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub fn len(&self) -> usize {
        self.technologies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.technologies.is_empty()
    }

    pub fn is_stopped(&self, text: &str) -> bool {
        self.stoplist.contains(text)
    }

    /// Drop annotations whose text is on the stoplist.
    pub fn apply_stoplist(&self, annotations: Vec<SpanAnnotation>) -> Vec<SpanAnnotation> {
        annotations
            .into_iter()
            .filter(|a| !self.is_stopped(a.text()))
            .collect()
    }

    /// Technology annotations for every occurrence of a known term in `text`.
    ///
    /// Matching ignores case and respects word boundaries. New ids continue
    /// the `t<N>` numbering of `existing`, and each annotation displays as
    /// the ontology term.
    pub fn find_terms(&self, text: &CanonicalText, existing: &[SpanAnnotation]) -> Vec<SpanAnnotation> {
        let mut next_id = next_technology_id(existing);
        let mut found = Vec::new();

        for (term, pattern) in &self.patterns {
            for m in pattern.find_iter(text.as_str()) {
                let (Some(start), Some(end)) = (text.char_offset(m.start()), text.char_offset(m.end()))
                else {
                    continue;
                };
                let features = Features {
                    term_normalized: Some(term.clone()),
                    ..Default::default()
                };
                let raw = RawAnnotation::new(
                    format!("t{}", next_id),
                    TECHNOLOGY_TYPE,
                    start as i64,
                    end as i64,
                )
                .with_features(features);
                if let Ok(annotation) = SpanAnnotation::resolve(raw, text) {
                    found.push(annotation);
                    next_id += 1;
                }
            }
        }
        found
    }
}

/// One past the highest numeric suffix of `t<N>` ids, or 1 when there is none.
fn next_technology_id(existing: &[SpanAnnotation]) -> u64 {
    existing
        .iter()
        .filter_map(|a| a.id().strip_prefix('t')?.parse::<u64>().ok())
        .max()
        .map_or(1, |max| max + 1)
}

impl fmt::Display for TechnologyOntology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<TechnologyOntology terms={}>", self.len())
    }
}
