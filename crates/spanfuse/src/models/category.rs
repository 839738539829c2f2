//! Annotation categories indexed per document.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A category of span annotations with its own index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Technology,
    Person,
    Organization,
    Location,
    Event,
    Time,
    VerbClass,
}

impl Category {
    /// Every category, in record field order.
    pub const ALL: [Category; 7] = [
        Category::Technology,
        Category::Person,
        Category::Location,
        Category::Organization,
        Category::Event,
        Category::Time,
        Category::VerbClass,
    ];

    /// Categories whose spans make a relation argument acceptable.
    pub const ENTITIES: [Category; 4] = [
        Category::Technology,
        Category::Person,
        Category::Organization,
        Category::Location,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technology => "technology",
            Self::Person => "person",
            Self::Organization => "organization",
            Self::Location => "location",
            Self::Event => "event",
            Self::Time => "time",
            Self::VerbClass => "verb_class",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "technology" => Some(Self::Technology),
            "person" => Some(Self::Person),
            "organization" => Some(Self::Organization),
            "location" => Some(Self::Location),
            "event" => Some(Self::Event),
            "time" => Some(Self::Time),
            "verb_class" => Some(Self::VerbClass),
            _ => None,
        }
    }

    /// Abbreviation used in index summaries.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Technology => "tech",
            Self::Person => "person",
            Self::Organization => "org",
            Self::Location => "loc",
            Self::Event => "event",
            Self::Time => "time",
            Self::VerbClass => "vnc",
        }
    }

    /// Whether this category is written to output records. Verb classes only
    /// surface through the relations they attach to.
    pub fn is_emitted(&self) -> bool {
        !matches!(self, Self::VerbClass)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
