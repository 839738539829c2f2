//! Search-ready output records.

use serde::{Deserialize, Serialize};

use super::annotation::Coordinates;

/// All instances of one display text with their combined offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CondensedAnnotation {
    pub text: String,
    /// Space-separated `start-end` pairs, e.g. `"5-15 50-60"`.
    pub offsets: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub pred: String,
    pub vnc: Option<Vec<String>>,
    pub arg1: String,
    pub arg2: String,
    pub pred_offsets: String,
    pub arg1_offsets: String,
    pub arg2_offsets: String,
}

/// Document-level record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub text: String,
    pub docid: String,
    pub docname: String,
    pub title: Option<String>,
    pub year: Option<i32>,
    pub author: Vec<String>,
    pub topic: Vec<String>,
    pub topic_element: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub technology: Vec<CondensedAnnotation>,
    pub person: Vec<CondensedAnnotation>,
    pub location: Vec<CondensedAnnotation>,
    pub organization: Vec<CondensedAnnotation>,
    pub event: Vec<CondensedAnnotation>,
    pub time: Vec<CondensedAnnotation>,
    pub relation: Vec<RelationRecord>,
}

/// Section or sentence record. Fields are `None` when empty and the
/// configuration asks for empty fields to be omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopedRecord {
    pub text: String,
    pub docid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<Vec<CondensedAnnotation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<Vec<CondensedAnnotation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Vec<CondensedAnnotation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<Vec<CondensedAnnotation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<Vec<CondensedAnnotation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Vec<CondensedAnnotation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<Vec<RelationRecord>>,
}
