//! Keyword-based tool prefiltering
//!
//! Large tool catalogs eat context window. Before each model call the
//! catalog is reduced to a small core set plus the categories whose
//! keywords appear in the user's message.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::types::ToolDefinition;

/// A group of tools offered when any of its keywords appears
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCategory {
    pub name: String,
    pub keywords: Vec<String>,
    pub tools: Vec<String>,
}

impl ToolCategory {
    pub fn new<K, T>(name: impl Into<String>, keywords: K, tools: T) -> Self
    where
        K: IntoIterator,
        K::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            name: name.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
            tools: tools.into_iter().map(Into::into).collect(),
        }
    }

    /// Byte offset of the earliest keyword hit in an already-lowercased message
    fn first_hit(&self, message: &str) -> Option<usize> {
        self.keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .filter_map(|k| first_word_match(message, &k.trim().to_lowercase()))
            .min()
    }
}

/// Core tool names plus the category table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPrefilter {
    /// Always offered when present in the catalog
    pub core: Vec<String>,
    pub categories: Vec<ToolCategory>,
}

impl ToolPrefilter {
    pub fn new<C>(core: C) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            core: core.into_iter().map(Into::into).collect(),
            categories: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: ToolCategory) -> Self {
        self.categories.push(category);
        self
    }

    /// Categories whose keywords occur in `user_message`, earliest hit first
    pub fn matched_categories(&self, user_message: &str) -> Vec<&ToolCategory> {
        let message = user_message.to_lowercase();
        let mut hits: Vec<(usize, &ToolCategory)> = self
            .categories
            .iter()
            .filter_map(|c| c.first_hit(&message).map(|pos| (pos, c)))
            .collect();
        // Stable, so equal positions keep table order
        hits.sort_by_key(|(pos, _)| *pos);
        hits.into_iter().map(|(_, c)| c).collect()
    }

    /// Reduce `all_tools` to what should be offered for this message
    ///
    /// Core tools always come first and are never dropped, even past
    /// `max_tools`. Category tools follow in match order until the cap is
    /// reached. Names missing from the catalog are skipped.
    pub fn filter(&self, user_message: &str, all_tools: &[ToolDefinition], max_tools: usize) -> Vec<ToolDefinition> {
        let catalog: HashMap<&str, &ToolDefinition> =
            all_tools.iter().map(|t| (t.name.as_str(), t)).collect();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut selected: Vec<ToolDefinition> = Vec::new();

        for name in &self.core {
            if let Some(tool) = catalog.get(name.as_str()) {
                if seen.insert(tool.name.as_str()) {
                    selected.push((*tool).clone());
                }
            }
        }

        'categories: for category in self.matched_categories(user_message) {
            for name in &category.tools {
                if selected.len() >= max_tools {
                    break 'categories;
                }
                if let Some(tool) = catalog.get(name.as_str()) {
                    if seen.insert(tool.name.as_str()) {
                        selected.push((*tool).clone());
                    }
                }
            }
        }

        selected
    }
}

/// First position where `needle` starts a word in `haystack`
fn first_word_match(haystack: &str, needle: &str) -> Option<usize> {
    haystack.match_indices(needle).map(|(idx, _)| idx).find(|&idx| {
        haystack[..idx]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric())
    })
}
