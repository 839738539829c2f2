//! Location name to coordinate lookup.

use std::collections::HashMap;

use crate::models::{Coordinates, SpanAnnotation};

/// Resolves location names to coordinates.
pub trait Gazetteer: Send + Sync {
    fn lookup(&self, name: &str) -> Option<Coordinates>;
}

/// In-memory gazetteer with case-insensitive names.
#[derive(Debug, Clone, Default)]
pub struct StaticGazetteer {
    entries: HashMap<String, Coordinates>,
}

impl StaticGazetteer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, coordinates: Coordinates) {
        self.entries.insert(name.to_lowercase(), coordinates);
    }

    /// Parse tab-separated `name<TAB>lat<TAB>lon` lines. Lines that do not
    /// parse are skipped.
    pub fn parse_tsv(contents: &str) -> Self {
        let mut gazetteer = Self::new();
        for line in contents.lines() {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 3 {
                continue;
            }
            let (Ok(lat), Ok(lon)) = (
                fields[1].trim().parse::<f64>(),
                fields[2].trim().parse::<f64>(),
            ) else {
                continue;
            };
            gazetteer.insert(fields[0].trim(), Coordinates::new(lat, lon));
        }
        gazetteer
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Coordinates)> for StaticGazetteer {
    fn from_iter<I: IntoIterator<Item = (String, Coordinates)>>(iter: I) -> Self {
        let mut gazetteer = Self::new();
        for (name, coordinates) in iter {
            gazetteer.insert(&name, coordinates);
        }
        gazetteer
    }
}

impl Gazetteer for StaticGazetteer {
    fn lookup(&self, name: &str) -> Option<Coordinates> {
        self.entries.get(&name.to_lowercase()).copied()
    }
}

/// Fill in coordinates for a location that has none. The display text is
/// looked up first, then the extracted text.
pub fn locate(annotation: SpanAnnotation, gazetteer: &dyn Gazetteer) -> SpanAnnotation {
    if annotation.features().coordinates.is_some() {
        return annotation;
    }
    let found = gazetteer
        .lookup(annotation.display_text())
        .or_else(|| gazetteer.lookup(annotation.text()));
    match found {
        Some(coordinates) => annotation.with_coordinates(coordinates),
        None => annotation,
    }
}
