//! Span annotations and the layers that carry them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::span::{CanonicalText, Span};
use crate::error::FuseError;

/// Tag value verb-class layers use for "no class assigned".
pub const NO_TAG_SENTINEL: &str = "None";

/// Geographic coordinates attached to a location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude")]
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Feature bag of an annotation.
///
/// Keys every layer agrees on are typed fields; anything else lands in
/// `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Features {
    /// Entity class from the named-entity layer (`person`, `location`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Canonical name that overrides the extracted text for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_normalized: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// Verb-class tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_name: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Features {
    /// String value of an extension key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }

    /// String items of an extension key holding a list. Non-string items are
    /// skipped.
    pub fn get_str_list(&self, key: &str) -> Vec<&str> {
        self.extra
            .get(key)
            .and_then(|v| v.as_array())
            .map(|items| items.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }

    /// Sentence classification (`normal` for well-formed sentences).
    pub fn sentence_type(&self) -> Option<&str> {
        self.get_str("type")
    }

    /// True when the first verb-class tag is the "no class" sentinel.
    pub fn has_sentinel_tag(&self) -> bool {
        self.tags
            .as_ref()
            .and_then(|tags| tags.first())
            .is_some_and(|tag| tag == NO_TAG_SENTINEL)
    }
}

/// An annotation as delivered by a layer, before it is anchored to the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAnnotation {
    pub id: String,
    #[serde(rename = "@type", alias = "type")]
    pub kind: String,
    #[serde(default)]
    pub start: i64,
    #[serde(default)]
    pub end: i64,
    #[serde(default)]
    pub features: Features,
}

impl RawAnnotation {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            start,
            end,
            features: Features::default(),
        }
    }

    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    pub fn has_type(&self, suffix: &str) -> bool {
        self.kind.ends_with(suffix)
    }
}

/// One named set of annotations produced by one upstream analysis step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationLayer {
    pub name: String,
    /// Text the producer anchored its offsets to, when it ships one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub annotations: Vec<RawAnnotation>,
}

impl AnnotationLayer {
    pub fn new(name: impl Into<String>, annotations: Vec<RawAnnotation>) -> Self {
        Self {
            name: name.into(),
            text: None,
            annotations,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// An annotation anchored to the canonical text. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanAnnotation {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    span: Span,
    text: String,
    features: Features,
}

impl SpanAnnotation {
    /// Anchor `raw` to `text`, caching the covered substring.
    pub fn resolve(raw: RawAnnotation, text: &CanonicalText) -> Result<Self, FuseError> {
        let out_of_bounds = || FuseError::OffsetOutOfBounds {
            id: raw.id.clone(),
            start: raw.start,
            end: raw.end,
            text_len: text.len(),
        };
        let start = usize::try_from(raw.start).map_err(|_| out_of_bounds())?;
        let end = usize::try_from(raw.end).map_err(|_| out_of_bounds())?;
        let span = Span::new(start, end);
        let covered = text.slice(span).ok_or_else(out_of_bounds)?.to_string();

        Ok(Self {
            id: raw.id,
            kind: raw.kind,
            span,
            text: covered,
            features: raw.features,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn has_type(&self, suffix: &str) -> bool {
        self.kind.ends_with(suffix)
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }

    /// Text covered by the span, as extracted.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text used when grouping for output: the normalized term if the
    /// producer supplied one, otherwise the extracted text.
    pub fn display_text(&self) -> &str {
        self.features
            .term_normalized
            .as_deref()
            .unwrap_or(&self.text)
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    pub(crate) fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.features.coordinates = Some(coordinates);
        self
    }
}
