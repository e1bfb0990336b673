use serde::{Deserialize, Serialize};

use crate::model::{Comment, CommentId, Recipe, RecipeId};
use crate::{ValidationError, MAX_COMMENT_LEN, MAX_RATING, MIN_RATING};

/// State of the recipe detail screen. Favorite and follow flags are read from
/// the feed so both screens agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailState {
    pub recipe_id: RecipeId,
    pub recipe: Option<Recipe>,
    pub comments: Vec<Comment>,
    pub user_rating: Option<u8>,
    pub is_loading: bool,
    pub is_comment_loading: bool,
    pub is_deleted: bool,
    pub error: Option<String>,
}

impl DetailState {
    #[must_use]
    pub fn new(recipe_id: RecipeId, cached: Option<Recipe>) -> Self {
        Self {
            recipe_id,
            recipe: cached,
            comments: Vec::new(),
            user_rating: None,
            is_loading: true,
            is_comment_loading: false,
            is_deleted: false,
            error: None,
        }
    }

    #[must_use]
    pub fn is_for(&self, recipe_id: &RecipeId) -> bool {
        &self.recipe_id == recipe_id
    }

    pub fn set_comment_liked(&mut self, comment_id: &CommentId, liked: bool) {
        if let Some(comment) = self.comments.iter_mut().find(|c| &c.id == comment_id) {
            if comment.is_liked_by_me != liked {
                comment.is_liked_by_me = liked;
                comment.like_count = if liked {
                    comment.like_count.saturating_add(1)
                } else {
                    comment.like_count.saturating_sub(1)
                };
            }
        }
    }
}

pub fn validate_rating(rating: u8) -> Result<u8, ValidationError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(rating)
    } else {
        Err(ValidationError::RatingOutOfRange {
            rating,
            min: MIN_RATING,
            max: MAX_RATING,
        })
    }
}

pub fn validate_comment(content: &str) -> Result<String, ValidationError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ValidationError::Required { field: "comment" });
    }
    if content.len() > MAX_COMMENT_LEN {
        return Err(ValidationError::TooLong {
            field: "comment",
            len: content.len(),
            max: MAX_COMMENT_LEN,
        });
    }
    Ok(content.to_string())
}
