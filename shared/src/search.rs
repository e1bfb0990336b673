use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Recipe;
use crate::MIN_SEARCH_QUERY_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    #[default]
    Remote,
    /// Backend search failed; results come from the cached feed.
    LocalFallback,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    query: String,
    excluded: Vec<String>,
    raw_results: Vec<Recipe>,
    results: Vec<Recipe>,
    pub source: ResultSource,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Case-insensitive substring filter used when the backend search fails.
#[must_use]
pub fn local_search(cache: &[Recipe], query: &str) -> Vec<Recipe> {
    let query = query.trim();
    cache.iter().filter(|r| r.mentions(query)).cloned().collect()
}

impl SearchState {
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    #[must_use]
    pub fn results(&self) -> &[Recipe] {
        &self.results
    }

    /// Store the query. Returns the trimmed query to send, or `None` when it is
    /// too short to search (results are cleared in that case).
    pub fn set_query(&mut self, query: impl Into<String>) -> Option<String> {
        self.query = query.into();
        let trimmed = self.query.trim();
        if trimmed.chars().count() < MIN_SEARCH_QUERY_LEN {
            self.raw_results.clear();
            self.results.clear();
            self.is_loading = false;
            self.error = None;
            return None;
        }
        self.is_loading = true;
        self.error = None;
        Some(trimmed.to_string())
    }

    /// Whether a response for `query` still matches what the user typed.
    #[must_use]
    pub fn is_current(&self, query: &str) -> bool {
        self.query.trim() == query
    }

    pub fn apply_results(&mut self, query: &str, recipes: Vec<Recipe>, source: ResultSource) {
        if !self.is_current(query) {
            debug!(query, current = %self.query, "dropping stale search results");
            return;
        }
        self.raw_results = recipes;
        self.source = source;
        self.is_loading = false;
        if source == ResultSource::Remote {
            self.error = None;
        }
        self.refilter();
    }

    /// Serve `recipes` from the cached feed and keep `reason` for the view.
    pub fn apply_fallback(&mut self, query: &str, recipes: Vec<Recipe>, reason: String) {
        if !self.is_current(query) {
            return;
        }
        self.apply_results(query, recipes, ResultSource::LocalFallback);
        self.error = Some(reason);
    }

    /// Trimmed, non-blank, no duplicates. Returns whether the list changed.
    pub fn add_exclusion(&mut self, ingredient: &str) -> bool {
        let ingredient = ingredient.trim();
        if ingredient.is_empty() || self.excluded.iter().any(|e| e == ingredient) {
            return false;
        }
        self.excluded.push(ingredient.to_string());
        self.refilter();
        true
    }

    pub fn remove_exclusion(&mut self, ingredient: &str) -> bool {
        let before = self.excluded.len();
        self.excluded.retain(|e| e != ingredient);
        let changed = self.excluded.len() != before;
        if changed {
            self.refilter();
        }
        changed
    }

    fn refilter(&mut self) {
        self.results = self
            .raw_results
            .iter()
            .filter(|r| !self.excluded.iter().any(|ex| r.mentions(ex)))
            .cloned()
            .collect();
    }
}
