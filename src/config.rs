use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::model::Column;
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Column aliases: source label → canonical column
// ---------------------------------------------------------------------------

/// Maps cleaned source labels to canonical columns.
///
/// Labels are matched exactly after whitespace cleaning. A label that is
/// neither an alias nor a canonical label is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnAliases(BTreeMap<String, Column>);

impl Default for ColumnAliases {
    /// Identity map over the canonical labels.
    fn default() -> Self {
        Self(
            Column::ALL
                .into_iter()
                .map(|c| (c.label().to_string(), c))
                .collect(),
        )
    }
}

impl ColumnAliases {
    /// An alias map with no entries; only canonical labels resolve.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, source_label: impl Into<String>, column: Column) {
        self.0.insert(source_label.into(), column);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, source_label: impl Into<String>, column: Column) -> Self {
        self.insert(source_label, column);
        self
    }

    /// Resolve a cleaned label: an explicit alias first, then the canonical
    /// label itself.
    pub fn resolve(&self, label: &str) -> Option<Column> {
        self.0
            .get(label)
            .copied()
            .or_else(|| Column::from_label(label))
    }
}

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub aliases: ColumnAliases,
    /// Display text for "no class restriction".
    pub all_classes_label: String,
    /// Display text for "no subject restriction".
    pub all_subjects_label: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            aliases: ColumnAliases::default(),
            all_classes_label: "Toate clasele".to_string(),
            all_subjects_label: "Toate probele".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Parse a JSON config. Missing keys keep their defaults.
    ///
    /// ```json
    /// { "aliases": { "Nota Bac": "Bacalaureat", "Student": "name" } }
    /// ```
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        log::debug!("Loaded dashboard config from {}", path.display());
        Ok(config)
    }
}
