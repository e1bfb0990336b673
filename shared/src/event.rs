use serde::{Deserialize, Serialize};

use crate::capabilities::BackendResult;
use crate::editor::DraftField;
use crate::feed::FeedScope;
use crate::model::{CommentId, Recipe, RecipeId, ShoppingItemId, UserId};
use crate::settings::Settings;

// --- Event enum: capability responses boxed to keep the enum small ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub enum Event {
    #[default]
    Noop,

    // Session & settings
    SignedIn {
        user_id: UserId,
        username: Option<String>,
    },
    SignedOut,
    SettingsChanged(Settings),

    // Feed
    ReloadFeed,
    RecipesLoaded(Box<BackendResult>),
    FollowedUserIdsLoaded(Box<BackendResult>),
    SelectCategory {
        category: String,
    },
    SelectScope {
        scope: FeedScope,
    },
    ToggleFavorite {
        recipe_id: RecipeId,
    },
    FavoriteSet {
        recipe_id: RecipeId,
        result: Box<BackendResult>,
    },
    ToggleFollow {
        user_id: UserId,
    },
    FollowSet {
        user_id: UserId,
        result: Box<BackendResult>,
    },

    // Cooking
    OpenCooking {
        recipe_id: RecipeId,
    },
    CookingRecipeLoaded {
        recipe_id: RecipeId,
        result: Box<BackendResult>,
    },
    NextStep,
    PreviousStep,
    StartTimer {
        minutes: u32,
    },
    /// Start with the current step's hint, or the default duration.
    StartSuggestedTimer,
    StopTimer,
    TimerTicked {
        generation: u64,
    },
    TimerCancelled {
        generation: u64,
    },
    ToggleKeepScreenOn,
    CloseCooking,

    // Search
    SearchQueryChanged {
        query: String,
    },
    SearchResults {
        query: String,
        result: Box<BackendResult>,
    },
    AddExcludedIngredient {
        ingredient: String,
    },
    RemoveExcludedIngredient {
        ingredient: String,
    },

    // Recipe detail
    OpenRecipe {
        recipe_id: RecipeId,
    },
    CloseRecipe,
    DetailRecipeFetched {
        recipe_id: RecipeId,
        result: Box<BackendResult>,
    },
    UserRatingFetched {
        recipe_id: RecipeId,
        result: Box<BackendResult>,
    },
    CommentsFetched {
        recipe_id: RecipeId,
        result: Box<BackendResult>,
    },
    IsFollowingFetched {
        user_id: UserId,
        result: Box<BackendResult>,
    },
    RateRecipe {
        rating: u8,
    },
    RecipeRated {
        recipe_id: RecipeId,
        rating: u8,
        result: Box<BackendResult>,
    },
    AddComment {
        content: String,
        rating: u8,
    },
    CommentAdded {
        recipe_id: RecipeId,
        result: Box<BackendResult>,
    },
    ToggleCommentLike {
        comment_id: CommentId,
    },
    CommentLikeToggled {
        recipe_id: RecipeId,
        comment_id: CommentId,
        result: Box<BackendResult>,
    },
    DeleteRecipe,
    RecipeDeleted {
        recipe_id: RecipeId,
        result: Box<BackendResult>,
    },
    AddIngredientToShoppingList {
        ingredient: String,
    },

    // Editor
    NewRecipe,
    EditRecipe {
        recipe_id: RecipeId,
    },
    EditorRecipeLoaded {
        recipe_id: RecipeId,
        result: Box<BackendResult>,
    },
    DraftFieldChanged {
        field: DraftField,
        value: String,
    },
    DraftTimeChanged {
        minutes: u32,
    },
    SaveRecipe,
    /// Carries the recipe that was sent so it can be shown before the next
    /// reload lands.
    RecipeSaved {
        recipe: Box<Recipe>,
        result: Box<BackendResult>,
    },
    CloseEditor,

    // Profile
    /// `None` opens the signed-in user's own profile.
    OpenProfile {
        user_id: Option<UserId>,
    },
    ProfileFetched {
        user_id: UserId,
        result: Box<BackendResult>,
    },
    ToggleProfileEditing,
    UsernameChanged {
        username: String,
    },
    SaveUsername,
    UsernameSaved {
        username: String,
        result: Box<BackendResult>,
    },
    CloseProfile,

    // Shopping list
    LoadShoppingList,
    ShoppingListLoaded(Box<BackendResult>),
    AddShoppingItem {
        item_name: String,
    },
    ShoppingItemAdded(Box<BackendResult>),
    ToggleShoppingItem {
        item_id: ShoppingItemId,
    },
    ShoppingItemChecked {
        item_id: ShoppingItemId,
        checked: bool,
        result: Box<BackendResult>,
    },
    DeleteShoppingItem {
        item_id: ShoppingItemId,
    },
    ShoppingItemDeleted {
        item_id: ShoppingItemId,
        result: Box<BackendResult>,
    },

    DismissError,
    DismissToast,
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::SignedIn { .. } => "signed_in",
            Self::SignedOut => "signed_out",
            Self::SettingsChanged(_) => "settings_changed",
            Self::ReloadFeed => "reload_feed",
            Self::RecipesLoaded(_) => "recipes_loaded",
            Self::FollowedUserIdsLoaded(_) => "followed_user_ids_loaded",
            Self::SelectCategory { .. } => "select_category",
            Self::SelectScope { .. } => "select_scope",
            Self::ToggleFavorite { .. } => "toggle_favorite",
            Self::FavoriteSet { .. } => "favorite_set",
            Self::ToggleFollow { .. } => "toggle_follow",
            Self::FollowSet { .. } => "follow_set",
            Self::OpenCooking { .. } => "open_cooking",
            Self::CookingRecipeLoaded { .. } => "cooking_recipe_loaded",
            Self::NextStep => "next_step",
            Self::PreviousStep => "previous_step",
            Self::StartTimer { .. } => "start_timer",
            Self::StartSuggestedTimer => "start_suggested_timer",
            Self::StopTimer => "stop_timer",
            Self::TimerTicked { .. } => "timer_ticked",
            Self::TimerCancelled { .. } => "timer_cancelled",
            Self::ToggleKeepScreenOn => "toggle_keep_screen_on",
            Self::CloseCooking => "close_cooking",
            Self::SearchQueryChanged { .. } => "search_query_changed",
            Self::SearchResults { .. } => "search_results",
            Self::AddExcludedIngredient { .. } => "add_excluded_ingredient",
            Self::RemoveExcludedIngredient { .. } => "remove_excluded_ingredient",
            Self::OpenRecipe { .. } => "open_recipe",
            Self::CloseRecipe => "close_recipe",
            Self::DetailRecipeFetched { .. } => "detail_recipe_fetched",
            Self::UserRatingFetched { .. } => "user_rating_fetched",
            Self::CommentsFetched { .. } => "comments_fetched",
            Self::IsFollowingFetched { .. } => "is_following_fetched",
            Self::RateRecipe { .. } => "rate_recipe",
            Self::RecipeRated { .. } => "recipe_rated",
            Self::AddComment { .. } => "add_comment",
            Self::CommentAdded { .. } => "comment_added",
            Self::ToggleCommentLike { .. } => "toggle_comment_like",
            Self::CommentLikeToggled { .. } => "comment_like_toggled",
            Self::DeleteRecipe => "delete_recipe",
            Self::RecipeDeleted { .. } => "recipe_deleted",
            Self::AddIngredientToShoppingList { .. } => "add_ingredient_to_shopping_list",
            Self::NewRecipe => "new_recipe",
            Self::EditRecipe { .. } => "edit_recipe",
            Self::EditorRecipeLoaded { .. } => "editor_recipe_loaded",
            Self::DraftFieldChanged { .. } => "draft_field_changed",
            Self::DraftTimeChanged { .. } => "draft_time_changed",
            Self::SaveRecipe => "save_recipe",
            Self::RecipeSaved { .. } => "recipe_saved",
            Self::CloseEditor => "close_editor",
            Self::OpenProfile { .. } => "open_profile",
            Self::ProfileFetched { .. } => "profile_fetched",
            Self::ToggleProfileEditing => "toggle_profile_editing",
            Self::UsernameChanged { .. } => "username_changed",
            Self::SaveUsername => "save_username",
            Self::UsernameSaved { .. } => "username_saved",
            Self::CloseProfile => "close_profile",
            Self::LoadShoppingList => "load_shopping_list",
            Self::ShoppingListLoaded(_) => "shopping_list_loaded",
            Self::AddShoppingItem { .. } => "add_shopping_item",
            Self::ShoppingItemAdded(_) => "shopping_item_added",
            Self::ToggleShoppingItem { .. } => "toggle_shopping_item",
            Self::ShoppingItemChecked { .. } => "shopping_item_checked",
            Self::DeleteShoppingItem { .. } => "delete_shopping_item",
            Self::ShoppingItemDeleted { .. } => "shopping_item_deleted",
            Self::DismissError => "dismiss_error",
            Self::DismissToast => "dismiss_toast",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::ReloadFeed
                | Self::SelectCategory { .. }
                | Self::SelectScope { .. }
                | Self::ToggleFavorite { .. }
                | Self::ToggleFollow { .. }
                | Self::OpenCooking { .. }
                | Self::NextStep
                | Self::PreviousStep
                | Self::StartTimer { .. }
                | Self::StartSuggestedTimer
                | Self::StopTimer
                | Self::ToggleKeepScreenOn
                | Self::CloseCooking
                | Self::SearchQueryChanged { .. }
                | Self::AddExcludedIngredient { .. }
                | Self::RemoveExcludedIngredient { .. }
                | Self::OpenRecipe { .. }
                | Self::CloseRecipe
                | Self::RateRecipe { .. }
                | Self::AddComment { .. }
                | Self::ToggleCommentLike { .. }
                | Self::DeleteRecipe
                | Self::AddIngredientToShoppingList { .. }
                | Self::NewRecipe
                | Self::EditRecipe { .. }
                | Self::DraftFieldChanged { .. }
                | Self::DraftTimeChanged { .. }
                | Self::SaveRecipe
                | Self::CloseEditor
                | Self::OpenProfile { .. }
                | Self::ToggleProfileEditing
                | Self::UsernameChanged { .. }
                | Self::SaveUsername
                | Self::CloseProfile
                | Self::LoadShoppingList
                | Self::AddShoppingItem { .. }
                | Self::ToggleShoppingItem { .. }
                | Self::DeleteShoppingItem { .. }
                | Self::DismissError
                | Self::DismissToast
        )
    }
}
