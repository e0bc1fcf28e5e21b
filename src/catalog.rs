//! Catalog Navigator
//!
//! Lists loadable appendices from the catalog manifest, filters them by category
//! or free text, and turns a pick into a typed `SelectionChanged` event.

use crate::error::FetchError;
use crate::source::DocumentSource;
use serde::{Deserialize, Serialize};

/// Category filter value that matches every entry
pub const ALL_CATEGORIES: &str = "all";

/// One loadable hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    /// Path of the source configuration document, relative to the data root
    #[serde(default)]
    pub config_path: String,
}

/// Catalog manifest document (`config.json`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogManifest {
    #[serde(default)]
    pub appendices: Vec<CatalogEntry>,
}

/// Emitted when the user picks an entry; consumed once by the load pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChanged(pub CatalogEntry);

/// Catalog browsing state
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    filtered: Vec<usize>,
    query: String,
    category: String,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let filtered = (0..entries.len()).collect();
        Self {
            entries,
            filtered,
            query: String::new(),
            category: ALL_CATEGORIES.to_string(),
        }
    }

    /// Fetch and parse the manifest
    pub async fn load(source: &dyn DocumentSource, manifest_path: &str) -> Result<Self, FetchError> {
        let value = source.fetch(manifest_path).await?;
        let manifest: CatalogManifest =
            serde_json::from_value(value).map_err(|e| FetchError::Json {
                path: manifest_path.to_string(),
                source: e,
            })?;
        log::info!("Loaded catalog with {} entries", manifest.appendices.len());
        Ok(Self::new(manifest.appendices))
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn first(&self) -> Option<&CatalogEntry> {
        self.entries.first()
    }

    /// Entries passing the current filter, in manifest order
    pub fn visible(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.filtered.iter().map(move |&i| &self.entries[i])
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Distinct categories in first-seen order
    pub fn categories(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for entry in &self.entries {
            if !seen.iter().any(|c| c.eq_ignore_ascii_case(&entry.category)) {
                seen.push(entry.category.clone());
            }
        }
        seen
    }

    /// Case-insensitive category filter; `"all"` shows everything
    pub fn filter_by_category(&mut self, category: &str) {
        self.category = category.to_string();
        self.filtered = if category.eq_ignore_ascii_case(ALL_CATEGORIES) {
            (0..self.entries.len()).collect()
        } else {
            let wanted = category.to_lowercase();
            self.entries
                .iter()
                .enumerate()
                .filter(|(_, e)| e.category.to_lowercase() == wanted)
                .map(|(i, _)| i)
                .collect()
        };
    }

    /// Free-text search over name and category
    pub fn search(&mut self, query: &str) {
        self.query = query.to_string();
        let term = query.to_lowercase();
        self.filtered = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                e.name.to_lowercase().contains(&term) || e.category.to_lowercase().contains(&term)
            })
            .map(|(i, _)| i)
            .collect();
    }

    /// Turn a pick into an event; entries without a config path are rejected
    pub fn select(&self, id: &str) -> Option<SelectionChanged> {
        let entry = self.entries.iter().find(|e| e.id == id)?;
        if entry.config_path.trim().is_empty() {
            log::error!("Invalid appendix config: {} has no configPath", entry.id);
            return None;
        }
        log::info!("Selected appendix: {}", entry.name);
        Some(SelectionChanged(entry.clone()))
    }
}
