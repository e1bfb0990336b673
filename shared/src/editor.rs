//! Recipe create/edit form.
//!
//! `created_at` contract: a new recipe is stamped once, on create. An edit
//! carries the timestamp loaded with the original recipe and never replaces an
//! existing value with `None`.

use serde::{Deserialize, Serialize};

use crate::model::{Category, Recipe, RecipeId, UnixTimeMs, UserId};
use crate::{ValidationError, MAX_COOK_TIME_MINUTES, MAX_TITLE_LEN};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub image_url: String,
    pub category: String,
    pub time_minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    Title,
    Ingredients,
    Instructions,
    ImageUrl,
    Category,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditMode {
    Create,
    Edit {
        recipe_id: RecipeId,
        created_at: Option<UnixTimeMs>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorState {
    pub mode: EditMode,
    pub draft: RecipeDraft,
    pub is_loading: bool,
    pub is_saved: bool,
    pub error: Option<String>,
}

impl EditorState {
    #[must_use]
    pub fn create() -> Self {
        Self {
            mode: EditMode::Create,
            draft: RecipeDraft::default(),
            is_loading: false,
            is_saved: false,
            error: None,
        }
    }

    /// Edit form for a recipe that still has to be fetched.
    #[must_use]
    pub fn loading(recipe_id: RecipeId) -> Self {
        Self {
            mode: EditMode::Edit {
                recipe_id,
                created_at: None,
            },
            draft: RecipeDraft::default(),
            is_loading: true,
            is_saved: false,
            error: None,
        }
    }

    pub fn load(&mut self, recipe: &Recipe) {
        self.mode = EditMode::Edit {
            recipe_id: recipe.id.clone(),
            created_at: recipe.created_at,
        };
        self.draft = RecipeDraft::from(recipe);
        self.is_loading = false;
        self.error = None;
    }

    #[must_use]
    pub fn editing_id(&self) -> Option<&RecipeId> {
        match &self.mode {
            EditMode::Create => None,
            EditMode::Edit { recipe_id, .. } => Some(recipe_id),
        }
    }

    pub fn set_field(&mut self, field: DraftField, value: String) {
        let slot = match field {
            DraftField::Title => &mut self.draft.title,
            DraftField::Ingredients => &mut self.draft.ingredients,
            DraftField::Instructions => &mut self.draft.instructions,
            DraftField::ImageUrl => &mut self.draft.image_url,
            DraftField::Category => &mut self.draft.category,
        };
        *slot = value;
        self.error = None;
    }

    /// Validate and build the record to send. Create stamps `now`; edit keeps
    /// the loaded timestamp. Rating aggregates are owned by the backend.
    pub fn build(&self, owner: &UserId, now: UnixTimeMs) -> Result<Recipe, ValidationError> {
        self.draft.validate()?;
        let (id, created_at) = match &self.mode {
            EditMode::Create => (RecipeId::generate(), Some(now)),
            EditMode::Edit {
                recipe_id,
                created_at,
            } => (recipe_id.clone(), *created_at),
        };
        let image_url = non_blank(&self.draft.image_url);
        let category = non_blank(&self.draft.category)
            .and_then(|c| Category::parse(&c))
            .map(|c| c.as_str().to_string());

        Ok(Recipe {
            id,
            user_id: owner.clone(),
            title: self.draft.title.trim().to_string(),
            ingredients: self.draft.ingredients.trim().to_string(),
            instructions: self.draft.instructions.trim().to_string(),
            image_url,
            category,
            average_rating: 0.0,
            rating_count: 0,
            created_at,
            username: None,
            time_minutes: self.draft.time_minutes,
            is_favorite: false,
        })
    }
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

impl From<&Recipe> for RecipeDraft {
    fn from(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
            image_url: recipe.image_url.clone().unwrap_or_default(),
            category: recipe.category.clone().unwrap_or_default(),
            time_minutes: recipe.time_minutes,
        }
    }
}

impl RecipeDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty()
            || self.ingredients.trim().is_empty()
            || self.instructions.trim().is_empty()
        {
            return Err(ValidationError::MissingRequiredFields);
        }
        let title_len = self.title.trim().len();
        if title_len > MAX_TITLE_LEN {
            return Err(ValidationError::TooLong {
                field: "title",
                len: title_len,
                max: MAX_TITLE_LEN,
            });
        }
        if let Some(raw) = non_blank(&self.image_url) {
            let parsed =
                url::Url::parse(&raw).map_err(|_| ValidationError::InvalidUrl(raw.clone()))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ValidationError::InvalidUrl(raw));
            }
        }
        if let Some(category) = non_blank(&self.category) {
            if Category::parse(&category).is_none() {
                return Err(ValidationError::UnknownCategory(category));
            }
        }
        if self.time_minutes > MAX_COOK_TIME_MINUTES {
            return Err(ValidationError::CookTimeOutOfRange {
                minutes: self.time_minutes,
                max: MAX_COOK_TIME_MINUTES,
            });
        }
        Ok(())
    }
}
