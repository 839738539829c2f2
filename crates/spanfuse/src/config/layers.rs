//! Names of the annotation layers each role is read from.

use serde::{Deserialize, Serialize};

/// Layer name per role. Producers name their views differently, so every
/// role can be renamed from the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerNames {
    /// Named entities (person, location, organization).
    pub ner: String,
    /// Events and time expressions.
    pub tarsqi: String,
    pub technology: String,
    pub verb_class: String,
    /// Markables and generic relations.
    pub relation: String,
    pub sentence: String,
    pub topic: String,
    /// Titles, abstracts and sections.
    pub structure: String,
}

impl Default for LayerNames {
    fn default() -> Self {
        Self {
            ner: "ner".to_string(),
            tarsqi: "ttk".to_string(),
            technology: "tex".to_string(),
            verb_class: "vnc".to_string(),
            relation: "rel".to_string(),
            sentence: "sen".to_string(),
            topic: "top".to_string(),
            structure: "structure".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let names: LayerNames = serde_json::from_str(r#"{"ner": "stanford"}"#).unwrap();
        assert_eq!(names.ner, "stanford");
        assert_eq!(names.tarsqi, "ttk");
        assert_eq!(names.structure, "structure");
    }
}
