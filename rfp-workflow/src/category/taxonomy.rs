use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::category::normalize;
use crate::error::{Result, WorkflowError};

const BUILTIN_TAXONOMY: &str = include_str!("../../data/categories.json");

pub const NO_DESCRIPTION: &str = "No description available.";

#[derive(Debug, Clone, Deserialize)]
struct TaxonomyFile {
    #[serde(default)]
    categories: Vec<TaxonomyEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaxonomyEntry {
    pub title: String,
    #[serde(default)]
    pub description: Vec<String>,
}

/// Static category descriptions keyed by normalized title
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    entries: HashMap<String, TaxonomyEntry>,
}

impl Taxonomy {
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let file: TaxonomyFile = serde_json::from_str(json)?;
        let entries = file
            .categories
            .into_iter()
            .map(|entry| (normalize(&entry.title), entry))
            .collect();
        Ok(Self { entries })
    }

    /// The taxonomy shipped with the crate
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_TAXONOMY).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Built-in taxonomy is malformed");
            Self::default()
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            WorkflowError::Config(config::ConfigError::Message(format!(
                "Failed to read taxonomy {}: {e}",
                path.display()
            )))
        })?;
        Self::from_json(&json).map_err(|e| {
            WorkflowError::Config(config::ConfigError::Message(format!(
                "Failed to parse taxonomy {}: {e}",
                path.display()
            )))
        })
    }

    /// Description lines for `name`, or the placeholder line on a miss
    pub fn describe(&self, name: &str) -> Vec<String> {
        self.entries
            .get(&normalize(name))
            .map(|entry| entry.description.clone())
            .unwrap_or_else(|| vec![NO_DESCRIPTION.to_string()])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_taxonomy_parses() {
        let taxonomy = Taxonomy::builtin();
        assert!(!taxonomy.is_empty());
        assert_ne!(taxonomy.describe("Compliance"), vec![NO_DESCRIPTION.to_string()]);
    }

    #[test]
    fn test_lookup_ignores_case_and_whitespace() {
        let taxonomy = Taxonomy::from_json(
            r#"{"categories": [{"title": "User Experience", "description": ["Channels"]}]}"#,
        )
        .unwrap();

        assert_eq!(taxonomy.describe("  user   experience "), vec!["Channels"]);
        assert_eq!(taxonomy.describe("Billing"), vec![NO_DESCRIPTION]);
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = Taxonomy::load(Path::new("/nonexistent/categories.json")).unwrap_err();
        assert!(matches!(err, WorkflowError::Config(_)));
    }
}
