//! Fusion configuration.
//!
//! Loaded from a JSON, TOML or YAML file chosen by extension, then adjusted
//! from `SPANFUSE_*` environment variables.

mod layers;

pub use layers::LayerNames;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Category;

/// Environment variable overriding `quality_filter`.
pub const ENV_QUALITY_FILTER: &str = "SPANFUSE_QUALITY_FILTER";
/// Environment variable overriding `workers`.
pub const ENV_WORKERS: &str = "SPANFUSE_WORKERS";

const DEFAULT_WORKERS: usize = 4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    #[error("Invalid value '{value}' for {key}")]
    InvalidOverride { key: &'static str, value: String },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Runtime configuration of the fusion pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Categories indexed for each document.
    pub categories: Vec<Category>,
    /// Drop annotations outside well-formed sentences.
    pub quality_filter: bool,
    /// Keep only relations whose predicate is an event and whose arguments
    /// contain an entity. When off every well-formed relation is kept.
    pub validate_relations: bool,
    pub emit_sections: bool,
    pub emit_sentences: bool,
    /// Leave empty category fields out of section and sentence records.
    pub omit_empty_fields: bool,
    /// Documents processed concurrently.
    pub workers: usize,
    pub layers: LayerNames,
    /// Layers a document may lack without being skipped.
    pub optional_layers: Vec<String>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        let layers = LayerNames::default();
        Self {
            categories: Category::ALL.to_vec(),
            quality_filter: false,
            validate_relations: true,
            emit_sections: true,
            emit_sentences: true,
            omit_empty_fields: true,
            workers: DEFAULT_WORKERS,
            optional_layers: vec![layers.verb_class.clone(), layers.structure.clone()],
            layers,
        }
    }
}

impl FusionConfig {
    /// Load configuration from a file, choosing the format by extension.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let config: FusionConfig = match ext {
            "toml" => toml::from_str(&contents).map_err(|e| ConfigError::Parse {
                format: "TOML",
                message: e.to_string(),
            })?,
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
                format: "YAML",
                message: e.to_string(),
            })?,
            _ => serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
                format: "JSON",
                message: e.to_string(),
            })?,
        };

        config.with_env_overrides()?.validated()
    }

    /// Apply `SPANFUSE_*` environment variables.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(val) = lookup(ENV_QUALITY_FILTER) {
            self.quality_filter = parse_flag(&val).ok_or(ConfigError::InvalidOverride {
                key: ENV_QUALITY_FILTER,
                value: val,
            })?;
        }

        if let Some(val) = lookup(ENV_WORKERS) {
            self.workers = val
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOverride {
                    key: ENV_WORKERS,
                    value: val.clone(),
                })?;
        }

        Ok(self)
    }

    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        if self.categories.is_empty() {
            return Err(ConfigError::Invalid("no categories enabled".into()));
        }
        Ok(self)
    }

    pub fn is_active(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    pub fn is_optional(&self, layer: &str) -> bool {
        self.optional_layers.iter().any(|l| l == layer)
    }

    /// Layers a document must be fetched with, given the active categories
    /// and output options. Duplicate names are listed once.
    pub fn wanted_layers(&self) -> Vec<&str> {
        let l = &self.layers;
        let mut names: Vec<&str> = Vec::new();
        if self.is_active(Category::Technology) {
            names.push(&l.technology);
        }
        if [Category::Person, Category::Organization, Category::Location]
            .iter()
            .any(|c| self.is_active(*c))
        {
            names.push(&l.ner);
        }
        if self.is_active(Category::Event) || self.is_active(Category::Time) {
            names.push(&l.tarsqi);
        }
        // verb classes attach to relations whether or not they are indexed
        names.push(&l.relation);
        names.push(&l.verb_class);
        if self.quality_filter || self.emit_sentences {
            names.push(&l.sentence);
        }
        names.push(&l.topic);
        names.push(&l.structure);

        let mut wanted: Vec<&str> = Vec::with_capacity(names.len());
        for name in names {
            if !wanted.contains(&name) {
                wanted.push(name);
            }
        }
        wanted
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(ext: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(&format!(".{}", ext))
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = FusionConfig::default();
        assert_eq!(config.categories.len(), 7);
        assert!(!config.quality_filter);
        assert!(config.validate_relations);
        assert!(config.is_optional("vnc"));
        assert!(config.is_optional("structure"));
        assert!(!config.is_optional("ner"));
    }

    #[test]
    fn test_load_toml() {
        let file = write_config(
            "toml",
            r#"
categories = ["technology", "person", "event"]
quality_filter = true
workers = 2

[layers]
ner = "stanford"
"#,
        );
        let config = FusionConfig::load_from_path(file.path()).unwrap();
        assert_eq!(
            config.categories,
            vec![Category::Technology, Category::Person, Category::Event]
        );
        assert!(config.quality_filter);
        assert_eq!(config.workers, 2);
        assert_eq!(config.layers.ner, "stanford");
        assert_eq!(config.layers.tarsqi, "ttk");
        assert!(config.validate_relations);
    }

    #[test]
    fn test_load_yaml() {
        let file = write_config(
            "yml",
            "validate_relations: false\nemit_sentences: false\noptional_layers: [vnc]\n",
        );
        let config = FusionConfig::load_from_path(file.path()).unwrap();
        assert!(!config.validate_relations);
        assert!(!config.emit_sentences);
        assert_eq!(config.optional_layers, vec!["vnc"]);
    }

    #[test]
    fn test_unknown_extension_parses_as_json() {
        let file = write_config("conf", r#"{"categories": ["verb_class", "time"]}"#);
        let config = FusionConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.categories, vec![Category::VerbClass, Category::Time]);
    }

    #[test]
    fn test_parse_error_names_format() {
        let file = write_config("toml", "categories = [");
        let err = FusionConfig::load_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: "TOML", .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = FusionConfig::load_from_path(Path::new("/nonexistent/spanfuse.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let file = write_config("json", r#"{"workers": 0}"#);
        let err = FusionConfig::load_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_overrides() {
        let config = FusionConfig::default()
            .with_overrides(|key| match key {
                ENV_QUALITY_FILTER => Some("yes".to_string()),
                ENV_WORKERS => Some("8".to_string()),
                _ => None,
            })
            .unwrap();
        assert!(config.quality_filter);
        assert_eq!(config.workers, 8);
    }

    #[test]
    fn test_invalid_override() {
        let err = FusionConfig::default()
            .with_overrides(|key| (key == ENV_WORKERS).then(|| "many".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidOverride { key: ENV_WORKERS, .. }
        ));
    }

    #[test]
    fn test_wanted_layers_follow_categories() {
        let config = FusionConfig {
            categories: vec![Category::Technology],
            emit_sentences: false,
            ..Default::default()
        };
        assert_eq!(
            config.wanted_layers(),
            vec!["tex", "rel", "vnc", "top", "structure"]
        );

        let defaults = FusionConfig::default();
        assert_eq!(
            defaults.wanted_layers(),
            vec!["tex", "ner", "ttk", "rel", "vnc", "sen", "top", "structure"]
        );
    }
}
