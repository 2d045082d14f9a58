use crate::error::{CoreError, Result};
use privharvest_scanner::RawToolEntry;
use privharvest_scanner::heuristics::derive_fields;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub description: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub url: String,
    pub github_url: Option<String>,
    pub license: Option<String>,
    pub is_open_source: bool,
    pub is_free: bool,
    pub has_paid_plan: bool,
    pub platforms: Vec<String>,
    pub tags: BTreeSet<String>,
    pub category_slug: String,
}

impl Tool {
    /// Build a tool from a parsed entry block, deriving every computed field.
    pub fn from_entry(entry: &RawToolEntry, category_slug: &str) -> Self {
        let derived = derive_fields(&entry.link, &entry.description);

        Self {
            name: entry.name.clone(),
            description: entry.description.clone(),
            url: entry.link.clone(),
            github_url: derived.github_url,
            license: derived.license,
            is_open_source: derived.is_open_source,
            is_free: derived.is_free,
            has_paid_plan: derived.has_paid_plan,
            platforms: derived.platforms,
            tags: derived.tags,
            category_slug: category_slug.to_string(),
        }
    }
}

/// Everything one scraping run produced. Tools are only accepted for
/// categories already present, so every `category_slug` resolves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    categories: BTreeMap<String, Category>,
    tools: Vec<Tool>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a category keyed by its slug. A later category with the same
    /// slug replaces the earlier one.
    pub fn insert_category(&mut self, category: Category) {
        if let Some(previous) = self.categories.get(&category.slug) {
            warn!(
                "Category slug '{}' seen twice ('{}' then '{}'), keeping the latest",
                category.slug, previous.name, category.name
            );
        }
        self.categories.insert(category.slug.clone(), category);
    }

    pub fn add_tool(&mut self, tool: Tool) -> Result<()> {
        if !self.categories.contains_key(&tool.category_slug) {
            return Err(CoreError::UnknownCategory {
                tool: tool.name,
                slug: tool.category_slug,
            });
        }
        self.tools.push(tool);
        Ok(())
    }

    pub fn categories(&self) -> &BTreeMap<String, Category> {
        &self.categories
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.tools.is_empty()
    }

    /// Tools whose category is missing. Always empty for snapshots built in
    /// process; a hand-edited file can still contain them.
    pub fn dangling_tools(&self) -> Vec<&Tool> {
        self.tools
            .iter()
            .filter(|t| !self.categories.contains_key(&t.category_slug))
            .collect()
    }
}
