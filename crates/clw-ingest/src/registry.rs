// Source registry: which pages to ingest, in what order, with which
// per-source overrides.
//
// Every behavioral deviation a source needs lives on its descriptor; the
// pipeline body never branches on source position.

use crate::locator::TableSelector;
use clw_common::{CommonError, Result};
use serde::Deserialize;
use std::path::Path;

/// Structural edit applied to a source's table before filtering: insert a
/// null-filled column named `insert` immediately after column `after`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnFixup {
    pub insert: String,
    pub after: String,
}

/// Configuration for one external document to ingest
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceDescriptor {
    /// Wiki page identifier
    pub page: String,

    /// Logical title label assigned to every fact row from this source
    pub label: String,

    /// Which tabular block holds the lineage data
    #[serde(default)]
    pub selector: TableSelector,

    /// Structural edits applied before filtering
    #[serde(default)]
    pub fixups: Vec<ColumnFixup>,
}

impl SourceDescriptor {
    pub fn new(page: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            label: label.into(),
            selector: TableSelector::default(),
            fixups: Vec::new(),
        }
    }

    pub fn with_selector(mut self, selector: TableSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_fixup(mut self, fixup: ColumnFixup) -> Self {
        self.fixups.push(fixup);
        self
    }
}

/// The fixed-order set of sources for one load run
#[derive(Debug, Clone, Deserialize)]
pub struct SourceRegistry {
    pub sources: Vec<SourceDescriptor>,
}

impl SourceRegistry {
    /// The fourteen championship lineages tracked by default.
    ///
    /// Most pages render the lineage as the third table; the sources that
    /// deviate carry their override on the descriptor.
    pub fn builtin() -> Self {
        let fixup_days_recognized = ColumnFixup {
            insert: "days recog.".to_string(),
            after: "days".to_string(),
        };

        SourceRegistry {
            sources: vec![
                SourceDescriptor::new("List_of_WWE_Champions", "WWE Championship"),
                SourceDescriptor::new(
                    "List_of_World_Heavyweight_Champions_(WWE,_2002\u{2013}2013)",
                    "World Heavyweight Championship",
                ),
                SourceDescriptor::new(
                    "World_Heavyweight_Championship_(WWE)",
                    "World Heavyweight Championship (WWE)",
                )
                .with_selector(TableSelector::Index(3)),
                SourceDescriptor::new(
                    "List_of_WWE_Intercontinental_Champions",
                    "Intercontinental Championship",
                ),
                SourceDescriptor::new(
                    "List_of_WWE_United_States_Champions",
                    "United States Championship",
                ),
                SourceDescriptor::new(
                    "List of WWE Women's Champions (1956\u{2013}2010)",
                    "WWE Women's Championship",
                ),
                SourceDescriptor::new(
                    "List of Women's World Champions (WWE)",
                    "Women's World Championship",
                ),
                SourceDescriptor::new(
                    "List of WWE Women's Champions",
                    "WWE Women's Championship (2016)",
                ),
                SourceDescriptor::new("List of WWE Divas Champions", "WWE Divas Championship"),
                SourceDescriptor::new(
                    "List of ECW World Heavyweight Champions",
                    "ECW World Heavyweight Championship",
                ),
                SourceDescriptor::new(
                    "List of World Tag Team Champions (WWE)",
                    "World Tag Team Championship",
                ),
                SourceDescriptor::new(
                    "List of World Tag Team Champions (WWE, 1971\u{2013}2010)",
                    "World Tag Team Championship (WWE)",
                )
                .with_fixup(fixup_days_recognized),
                SourceDescriptor::new("List of WWE Tag Team Champions", "WWE Tag Team Championship"),
                SourceDescriptor::new(
                    "List of WWE Women's Tag Team Champions",
                    "WWE Women's Tag Team Championship",
                )
                .with_selector(TableSelector::Index(1)),
            ],
        }
    }

    /// Load a registry from a TOML file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let registry: SourceRegistry = toml::from_str(&text).map_err(|e| {
            CommonError::config(format!(
                "invalid source registry '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        if registry.sources.is_empty() {
            return Err(CommonError::config("source registry lists no sources"));
        }

        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceDescriptor> {
        self.sources.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_order_and_overrides() {
        let registry = SourceRegistry::builtin();

        assert_eq!(registry.len(), 14);
        assert_eq!(registry.sources[0].page, "List_of_WWE_Champions");
        assert_eq!(registry.sources[0].selector, TableSelector::Index(2));

        assert_eq!(registry.sources[2].selector, TableSelector::Index(3));
        assert_eq!(registry.sources[13].selector, TableSelector::Index(1));

        let tag_team = &registry.sources[11];
        assert_eq!(tag_team.fixups.len(), 1);
        assert_eq!(tag_team.fixups[0].after, "days");
    }

    #[test]
    fn test_labels_are_unique() {
        let registry = SourceRegistry::builtin();
        let mut labels: Vec<&str> = registry.iter().map(|s| s.label.as_str()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), registry.len());
    }

    #[test]
    fn test_registry_from_toml() {
        let toml = r#"
            [[sources]]
            page = "Some_Page"
            label = "Some Title"

            [[sources]]
            page = "Other_Page"
            label = "Other Title"
            selector = { index = 3 }
            fixups = [{ insert = "days recog.", after = "days" }]

            [[sources]]
            page = "Marker_Page"
            label = "Marker Title"
            selector = { header = "event" }
        "#;

        let registry: SourceRegistry = toml::from_str(toml).unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.sources[0].selector, TableSelector::default());
        assert_eq!(registry.sources[1].selector, TableSelector::Index(3));
        assert_eq!(registry.sources[1].fixups[0].insert, "days recog.");
        assert_eq!(
            registry.sources[2].selector,
            TableSelector::Header("event".to_string())
        );
    }
}
