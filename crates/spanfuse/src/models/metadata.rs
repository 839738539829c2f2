//! Document-level metadata supplied alongside the annotation layers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    /// Publication years of cited references, used when `year` is absent.
    #[serde(default)]
    pub reference_years: Vec<i32>,
}

impl DocumentMetadata {
    /// The document year, or the latest reference year (capped at
    /// `current_year`) when the metadata has none.
    pub fn resolved_year(&self, current_year: i32) -> Option<i32> {
        if self.year.is_some() {
            return self.year;
        }
        self.reference_years
            .iter()
            .map(|&year| year.min(current_year))
            .filter(|&year| year > 0)
            .max()
    }
}
