//! Feed composition.
//!
//! The visible feed is never stored as ground truth: it is re-derived from the
//! cached recipes, the followed-user set and the two filter axes after every
//! mutation. Favorite toggles are applied optimistically and remember the
//! pre-toggle value until the backend answers.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::model::{category_matches, Recipe, RecipeId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeedScope {
    #[default]
    All,
    FollowingOnly,
}

/// Pure visible-list derivation. Order is the cached order; no sorting.
#[must_use]
pub fn derive_visible(
    all_recipes: &[Recipe],
    followed_user_ids: &HashSet<UserId>,
    selected_category: Option<&str>,
    scope: FeedScope,
) -> Vec<Recipe> {
    all_recipes
        .iter()
        .filter(|r| scope == FeedScope::All || followed_user_ids.contains(&r.user_id))
        .filter(|r| selected_category.map_or(true, |c| category_matches(r.category.as_deref(), c)))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedState {
    all_recipes: Vec<Recipe>,
    followed_user_ids: HashSet<UserId>,
    selected_category: Option<String>,
    scope: FeedScope,
    visible: Vec<Recipe>,
    /// recipe id -> favorite flag before the in-flight toggle
    pending_favorites: HashMap<RecipeId, bool>,
    pub is_loading: bool,
    /// A write landed while a reload was in flight; fetch again once it ends.
    pub reload_queued: bool,
    pub error: Option<String>,
    pub has_loaded: bool,
}

impl FeedState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn recompute(&mut self) {
        self.visible = derive_visible(
            &self.all_recipes,
            &self.followed_user_ids,
            self.selected_category.as_deref(),
            self.scope,
        );
    }

    #[must_use]
    pub fn visible(&self) -> &[Recipe] {
        &self.visible
    }

    #[must_use]
    pub fn all_recipes(&self) -> &[Recipe] {
        &self.all_recipes
    }

    #[must_use]
    pub fn followed_user_ids(&self) -> &HashSet<UserId> {
        &self.followed_user_ids
    }

    #[must_use]
    pub fn selected_category(&self) -> Option<&str> {
        self.selected_category.as_deref()
    }

    #[must_use]
    pub fn scope(&self) -> FeedScope {
        self.scope
    }

    #[must_use]
    pub fn recipe(&self, id: &RecipeId) -> Option<&Recipe> {
        self.all_recipes.iter().find(|r| &r.id == id)
    }

    #[must_use]
    pub fn is_following(&self, user_id: &UserId) -> bool {
        self.followed_user_ids.contains(user_id)
    }

    #[must_use]
    pub fn is_favorite_pending(&self, id: &RecipeId) -> bool {
        self.pending_favorites.contains_key(id)
    }

    /// Recipes owned by `user_id`, in cached order.
    pub fn recipes_by<'a>(&'a self, user_id: &'a UserId) -> impl Iterator<Item = &'a Recipe> {
        self.all_recipes.iter().filter(move |r| r.is_owned_by(user_id))
    }

    /// Favorites in cached order.
    pub fn favorites(&self) -> impl Iterator<Item = &Recipe> {
        self.all_recipes.iter().filter(|r| r.is_favorite)
    }

    /// Wholesale replacement after a successful fetch. Flags of favorites that
    /// are still in flight keep their optimistic value.
    pub fn replace_recipes(&mut self, mut recipes: Vec<Recipe>) {
        for recipe in &mut recipes {
            if let Some(before) = self.pending_favorites.get(&recipe.id) {
                recipe.is_favorite = !*before;
            }
        }
        self.all_recipes = recipes;
        self.has_loaded = true;
        self.error = None;
        self.recompute();
        debug!(count = self.all_recipes.len(), "feed cache replaced");
    }

    pub fn replace_followed(&mut self, ids: impl IntoIterator<Item = UserId>) {
        self.followed_user_ids = ids.into_iter().collect();
        self.recompute();
    }

    /// Same category twice clears the selection.
    pub fn select_category(&mut self, category: &str) {
        if self.selected_category.as_deref() == Some(category) {
            self.selected_category = None;
        } else {
            self.selected_category = Some(category.to_string());
        }
        self.recompute();
    }

    pub fn select_scope(&mut self, scope: FeedScope) {
        self.scope = scope;
        self.recompute();
    }

    /// Flip the flag locally and return the state to send to the backend.
    /// `None` when the recipe is unknown or a toggle is already in flight.
    pub fn begin_favorite_toggle(&mut self, id: &RecipeId) -> Option<bool> {
        if self.pending_favorites.contains_key(id) {
            debug!(recipe_id = %id, "favorite toggle already in flight");
            return None;
        }
        let recipe = self.all_recipes.iter_mut().find(|r| &r.id == id)?;
        let before = recipe.is_favorite;
        recipe.is_favorite = !before;
        self.pending_favorites.insert(id.clone(), before);
        self.recompute();
        Some(!before)
    }

    pub fn confirm_favorite(&mut self, id: &RecipeId) {
        self.pending_favorites.remove(id);
    }

    /// Restore the pre-toggle flag. Returns whether anything was reverted.
    pub fn rollback_favorite(&mut self, id: &RecipeId) -> bool {
        let Some(before) = self.pending_favorites.remove(id) else {
            return false;
        };
        let Some(recipe) = self.all_recipes.iter_mut().find(|r| &r.id == id) else {
            return false;
        };
        recipe.is_favorite = before;
        self.recompute();
        warn!(recipe_id = %id, "favorite toggle rolled back");
        true
    }

    /// Apply the follow state the backend reports for `user_id`.
    pub fn apply_follow(&mut self, user_id: &UserId, following: bool) {
        let changed = if following {
            self.followed_user_ids.insert(user_id.clone())
        } else {
            self.followed_user_ids.remove(user_id)
        };
        if changed {
            self.recompute();
        }
    }

    /// Insert or refresh one recipe, keeping the local favorite flag.
    pub fn upsert_recipe(&mut self, mut recipe: Recipe) {
        if let Some(existing) = self.all_recipes.iter_mut().find(|r| r.id == recipe.id) {
            recipe.is_favorite = existing.is_favorite;
            *existing = recipe;
        } else {
            self.all_recipes.push(recipe);
        }
        self.recompute();
    }

    pub fn remove_recipe(&mut self, id: &RecipeId) {
        self.all_recipes.retain(|r| &r.id != id);
        self.pending_favorites.remove(id);
        self.recompute();
    }

    pub fn clear_followed(&mut self) {
        self.followed_user_ids.clear();
        self.recompute();
    }
}
