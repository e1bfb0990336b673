//! Remote data contract. The shell talks to the hosted backend; the core only
//! sees typed operations and results.

use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    Comment, CommentId, Recipe, RecipeId, ShoppingItem, ShoppingItemId, UserId, UserProfile,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum BackendOperation {
    FetchAllRecipes,
    FetchFollowedUserIds {
        user_id: UserId,
    },
    FetchRecipeById {
        recipe_id: RecipeId,
    },
    SearchRecipes {
        query: String,
    },
    SetFavorite {
        recipe_id: RecipeId,
        favorite: bool,
    },
    SetFollow {
        user_id: UserId,
        follow: bool,
    },
    FetchIsFollowing {
        user_id: UserId,
    },
    FetchUserRating {
        recipe_id: RecipeId,
    },
    RateRecipe {
        recipe_id: RecipeId,
        rating: u8,
    },
    FetchComments {
        recipe_id: RecipeId,
    },
    AddComment {
        recipe_id: RecipeId,
        content: String,
        rating: u8,
    },
    ToggleCommentLike {
        comment_id: CommentId,
    },
    CreateRecipe {
        recipe: Recipe,
    },
    UpdateRecipe {
        recipe: Recipe,
    },
    DeleteRecipe {
        recipe_id: RecipeId,
    },
    FetchShoppingItems,
    AddShoppingItem {
        item_name: String,
    },
    SetShoppingItemChecked {
        item_id: ShoppingItemId,
        checked: bool,
    },
    DeleteShoppingItem {
        item_id: ShoppingItemId,
    },
    FetchProfile {
        user_id: UserId,
    },
    UpdateUsername {
        username: String,
    },
}

impl BackendOperation {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::FetchAllRecipes => "fetch_all_recipes",
            Self::FetchFollowedUserIds { .. } => "fetch_followed_user_ids",
            Self::FetchRecipeById { .. } => "fetch_recipe_by_id",
            Self::SearchRecipes { .. } => "search_recipes",
            Self::SetFavorite { .. } => "set_favorite",
            Self::SetFollow { .. } => "set_follow",
            Self::FetchIsFollowing { .. } => "fetch_is_following",
            Self::FetchUserRating { .. } => "fetch_user_rating",
            Self::RateRecipe { .. } => "rate_recipe",
            Self::FetchComments { .. } => "fetch_comments",
            Self::AddComment { .. } => "add_comment",
            Self::ToggleCommentLike { .. } => "toggle_comment_like",
            Self::CreateRecipe { .. } => "create_recipe",
            Self::UpdateRecipe { .. } => "update_recipe",
            Self::DeleteRecipe { .. } => "delete_recipe",
            Self::FetchShoppingItems => "fetch_shopping_items",
            Self::AddShoppingItem { .. } => "add_shopping_item",
            Self::SetShoppingItemChecked { .. } => "set_shopping_item_checked",
            Self::DeleteShoppingItem { .. } => "delete_shopping_item",
            Self::FetchProfile { .. } => "fetch_profile",
            Self::UpdateUsername { .. } => "update_username",
        }
    }

    /// Writes need a signed-in user; the shell attaches the session.
    #[must_use]
    pub const fn requires_auth(&self) -> bool {
        !matches!(
            self,
            Self::FetchAllRecipes
                | Self::FetchRecipeById { .. }
                | Self::SearchRecipes { .. }
                | Self::FetchComments { .. }
                | Self::FetchProfile { .. }
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum BackendOutput {
    Done,
    Recipes(Vec<Recipe>),
    Recipe(Recipe),
    UserIds(Vec<UserId>),
    Following(bool),
    Liked(bool),
    Rating(Option<u8>),
    Comments(Vec<Comment>),
    ShoppingItems(Vec<ShoppingItem>),
    ShoppingItem(ShoppingItem),
    Profile(UserProfile),
}

macro_rules! output_accessor {
    ($fn_name:ident, $variant:ident, $ty:ty) => {
        pub fn $fn_name(self) -> Result<$ty, BackendError> {
            match self {
                Self::$variant(value) => Ok(value),
                other => Err(BackendError::unexpected(&other)),
            }
        }
    };
}

impl BackendOutput {
    output_accessor!(into_recipes, Recipes, Vec<Recipe>);
    output_accessor!(into_recipe, Recipe, Recipe);
    output_accessor!(into_user_ids, UserIds, Vec<UserId>);
    output_accessor!(into_rating, Rating, Option<u8>);
    output_accessor!(into_comments, Comments, Vec<Comment>);
    output_accessor!(into_shopping_items, ShoppingItems, Vec<ShoppingItem>);
    output_accessor!(into_shopping_item, ShoppingItem, ShoppingItem);
    output_accessor!(into_profile, Profile, UserProfile);

    /// `Following` and `Liked` both carry the new state of a toggle.
    pub fn into_flag(self) -> Result<bool, BackendError> {
        match self {
            Self::Following(flag) | Self::Liked(flag) => Ok(flag),
            other => Err(BackendError::unexpected(&other)),
        }
    }

    /// For writes whose payload the core does not need.
    pub fn into_done(self) -> Result<(), BackendError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum BackendError {
    #[error("network unavailable")]
    Network,
    #[error("not found")]
    NotFound,
    #[error("not signed in or session expired")]
    Unauthorized,
    #[error("conflicting change")]
    Conflict,
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Unknown(String),
}

impl BackendError {
    /// Maps an HTTP-ish status from the shell's client onto the error set.
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 | 403 => Self::Unauthorized,
            404 => Self::NotFound,
            409 => Self::Conflict,
            _ => Self::Server {
                status,
                message: message.into(),
            },
        }
    }

    fn unexpected(output: &BackendOutput) -> Self {
        Self::Unknown(format!("unexpected output: {output:?}"))
    }
}

pub type BackendResult = Result<BackendOutput, BackendError>;

impl Operation for BackendOperation {
    type Output = BackendResult;
}

#[derive(Capability)]
pub struct Backend<Ev> {
    context: CapabilityContext<BackendOperation, Ev>,
}

impl<Ev> Backend<Ev>
where
    Ev: 'static,
{
    #[must_use]
    pub fn new(context: CapabilityContext<BackendOperation, Ev>) -> Self {
        Self { context }
    }

    /// Send `operation` and feed its result back through `callback`.
    pub fn request<F>(&self, operation: BackendOperation, callback: F)
    where
        F: FnOnce(BackendResult) -> Ev + Send + 'static,
        Ev: Send,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx.request_from_shell(operation).await;
            ctx.update_app(callback(result));
        });
    }

    pub fn fetch_all_recipes<F>(&self, callback: F)
    where
        F: FnOnce(BackendResult) -> Ev + Send + 'static,
        Ev: Send,
    {
        self.request(BackendOperation::FetchAllRecipes, callback);
    }

    pub fn fetch_followed_user_ids<F>(&self, user_id: UserId, callback: F)
    where
        F: FnOnce(BackendResult) -> Ev + Send + 'static,
        Ev: Send,
    {
        self.request(BackendOperation::FetchFollowedUserIds { user_id }, callback);
    }

    pub fn fetch_recipe<F>(&self, recipe_id: RecipeId, callback: F)
    where
        F: FnOnce(BackendResult) -> Ev + Send + 'static,
        Ev: Send,
    {
        self.request(BackendOperation::FetchRecipeById { recipe_id }, callback);
    }

    pub fn set_favorite<F>(&self, recipe_id: RecipeId, favorite: bool, callback: F)
    where
        F: FnOnce(BackendResult) -> Ev + Send + 'static,
        Ev: Send,
    {
        self.request(
            BackendOperation::SetFavorite {
                recipe_id,
                favorite,
            },
            callback,
        );
    }

    pub fn set_follow<F>(&self, user_id: UserId, follow: bool, callback: F)
    where
        F: FnOnce(BackendResult) -> Ev + Send + 'static,
        Ev: Send,
    {
        self.request(BackendOperation::SetFollow { user_id, follow }, callback);
    }
}
