use tracing::{debug, info, trace, warn};

use crate::capabilities::{
    BackendError, BackendOperation, BackendOutput, BackendResult, Capabilities, TimerOutput,
};
use crate::cooking::{format_countdown, CookingSession, TickOutcome};
use crate::detail::{validate_comment, validate_rating, DetailState};
use crate::editor::{EditMode, EditorState};
use crate::event::Event;
use crate::model::{Comment, Recipe, RecipeId, UnixTimeMs, UserId};
use crate::profile::{validate_username, ProfileState};
use crate::search::{local_search, ResultSource};
use crate::shopping::validate_item_name;
use crate::{
    format_cook_time, format_rating, format_time_ago, AppError, AppResult, CategoryChip,
    CommentView, CookingView, DetailView, EditorView, ErrorKind, FeedScope, FeedView, Model,
    ProfileView, RecipeCard, SearchView, Session, ShoppingItemView, ShoppingView, ToastKind, ToastView,
    UserFacingError, ViewModel, CATEGORIES, DEFAULT_TIMER_MINUTES, MIN_SEARCH_QUERY_LEN,
    TIMER_TICK_MS,
};

#[derive(Default)]
pub struct App;

impl App {
    fn require_user(model: &mut Model, prompt: &str) -> AppResult<UserId> {
        if let Some(user) = model.current_user().cloned() {
            return Ok(user);
        }
        model.show_toast(prompt, ToastKind::Info);
        Err(AppError::new(ErrorKind::Authentication, prompt))
    }

    /// Log a failed backend call. Blocking errors go to the global error
    /// slot, everything else is toasted.
    fn report(model: &mut Model, operation: &'static str, error: BackendError) -> AppError {
        let app_error = AppError::from(error).with_context("operation", operation);
        warn!(operation, code = app_error.code(), error = %app_error, "backend request failed");
        if app_error.is_blocking() {
            model.set_error(app_error.clone());
        } else {
            model.show_toast(app_error.user_facing_message(), ToastKind::Error);
        }
        app_error
    }

    fn show_validation(model: &mut Model, error: crate::ValidationError) {
        let app_error = AppError::from(error);
        debug!(error = %app_error, "input rejected");
        model.show_toast(app_error.user_facing_message(), ToastKind::Warning);
    }

    // --- Feed ---

    fn reload_feed(model: &mut Model, caps: &Capabilities) {
        if model.feed.is_loading {
            debug!("feed reload already in flight");
            return;
        }
        model.feed.is_loading = true;
        caps.backend
            .fetch_all_recipes(|result| Event::RecipesLoaded(Box::new(result)));
        Self::fetch_followed(model, caps);
    }

    /// Reload after a local write. An in-flight reload may predate the write,
    /// so queue another one behind it instead of coalescing.
    fn refresh_feed_after_write(model: &mut Model, caps: &Capabilities) {
        if model.feed.is_loading {
            debug!("feed reload queued behind in-flight request");
            model.feed.reload_queued = true;
        } else {
            Self::reload_feed(model, caps);
        }
    }

    fn fetch_followed(model: &Model, caps: &Capabilities) {
        if let Some(user_id) = model.current_user() {
            caps.backend.fetch_followed_user_ids(user_id.clone(), |result| {
                Event::FollowedUserIdsLoaded(Box::new(result))
            });
        }
    }

    fn handle_recipes_loaded(model: &mut Model, result: BackendResult) {
        model.feed.is_loading = false;
        match result.and_then(BackendOutput::into_recipes) {
            Ok(recipes) => {
                info!(count = recipes.len(), "feed loaded");
                model.feed.replace_recipes(recipes);
            }
            Err(e) => {
                let error = Self::report(model, "fetch_all_recipes", e);
                model.feed.error = Some(error.user_facing_message());
            }
        }
    }

    fn toggle_favorite(model: &mut Model, caps: &Capabilities, recipe_id: RecipeId) {
        if Self::require_user(model, "Sign in to save favorites.").is_err() {
            return;
        }
        let Some(desired) = model.feed.begin_favorite_toggle(&recipe_id) else {
            return;
        };
        debug!(recipe_id = %recipe_id, desired, "favorite toggled optimistically");
        let id = recipe_id.clone();
        caps.backend.set_favorite(recipe_id, desired, move |result| {
            Event::FavoriteSet {
                recipe_id: id,
                result: Box::new(result),
            }
        });
    }

    fn toggle_follow(model: &mut Model, caps: &Capabilities, user_id: UserId) {
        let Ok(me) = Self::require_user(model, "Sign in to follow cooks.") else {
            return;
        };
        if me == user_id {
            debug!("ignoring follow of self");
            return;
        }
        let desired = !model.feed.is_following(&user_id);
        let id = user_id.clone();
        caps.backend.set_follow(user_id, desired, move |result| Event::FollowSet {
            user_id: id,
            result: Box::new(result),
        });
    }

    // --- Cooking ---

    fn open_cooking(model: &mut Model, caps: &Capabilities, recipe_id: RecipeId) {
        Self::close_cooking(model, caps);
        if let Some(recipe) = model.feed.recipe(&recipe_id) {
            model.cooking = Some(CookingSession::new(
                recipe_id,
                recipe.title.clone(),
                &recipe.instructions,
            ));
            return;
        }
        model.pending_cooking = Some(recipe_id.clone());
        let id = recipe_id.clone();
        caps.backend.fetch_recipe(recipe_id, move |result| Event::CookingRecipeLoaded {
            recipe_id: id,
            result: Box::new(result),
        });
    }

    fn close_cooking(model: &mut Model, caps: &Capabilities) {
        model.pending_cooking = None;
        if let Some(mut session) = model.cooking.take() {
            if let Some(generation) = session.stop_timer() {
                caps.timer.cancel(generation);
            }
            debug!(recipe_id = %session.recipe_id(), "cooking session closed");
        }
    }

    fn start_timer(model: &mut Model, caps: &Capabilities, minutes: u32) {
        let Some(session) = model.cooking.as_mut() else {
            return;
        };
        let previous = session
            .timer()
            .running
            .then(|| session.timer().generation);
        if let Some(generation) = session.start_timer(minutes) {
            if let Some(previous) = previous {
                caps.timer.cancel(previous);
            }
            Self::schedule_tick(caps, generation);
        }
    }

    fn schedule_tick(caps: &Capabilities, generation: u64) {
        caps.timer
            .start(generation, TIMER_TICK_MS, move |output| match output {
                TimerOutput::Elapsed { .. } => Event::TimerTicked { generation },
                TimerOutput::Cancelled => Event::TimerCancelled { generation },
            });
    }

    // --- Detail ---

    fn open_recipe(model: &mut Model, caps: &Capabilities, recipe_id: RecipeId) {
        let cached = model.feed.recipe(&recipe_id).cloned();
        let mut detail = DetailState::new(recipe_id.clone(), cached);
        detail.is_comment_loading = true;
        model.detail = Some(detail);

        Self::fetch_detail_recipe(caps, recipe_id.clone());
        Self::fetch_comments(caps, recipe_id.clone());
        if model.current_user().is_some() {
            let id = recipe_id.clone();
            caps.backend.request(
                BackendOperation::FetchUserRating { recipe_id },
                move |result| Event::UserRatingFetched {
                    recipe_id: id,
                    result: Box::new(result),
                },
            );
        }
    }

    fn fetch_detail_recipe(caps: &Capabilities, recipe_id: RecipeId) {
        let id = recipe_id.clone();
        caps.backend.fetch_recipe(recipe_id, move |result| Event::DetailRecipeFetched {
            recipe_id: id,
            result: Box::new(result),
        });
    }

    fn fetch_comments(caps: &Capabilities, recipe_id: RecipeId) {
        let id = recipe_id.clone();
        caps.backend.request(
            BackendOperation::FetchComments { recipe_id },
            move |result| Event::CommentsFetched {
                recipe_id: id,
                result: Box::new(result),
            },
        );
    }

    fn handle_detail_recipe(
        model: &mut Model,
        caps: &Capabilities,
        recipe_id: &RecipeId,
        result: BackendResult,
    ) {
        let me = model.current_user().cloned();
        let Some(detail) = model.detail.as_mut().filter(|d| d.is_for(recipe_id)) else {
            debug!(recipe_id = %recipe_id, "detail closed before recipe arrived");
            return;
        };
        detail.is_loading = false;
        match result.and_then(BackendOutput::into_recipe) {
            Ok(recipe) => {
                let owner = recipe.user_id.clone();
                detail.recipe = Some(recipe.clone());
                detail.error = None;
                model.feed.upsert_recipe(recipe);
                if me.as_ref().is_some_and(|me| me != &owner) {
                    let id = owner.clone();
                    caps.backend.request(
                        BackendOperation::FetchIsFollowing { user_id: owner },
                        move |result| Event::IsFollowingFetched {
                            user_id: id,
                            result: Box::new(result),
                        },
                    );
                }
            }
            Err(e) => {
                let error = AppError::from(e).with_context("recipe_id", recipe_id.as_str());
                warn!(recipe_id = %recipe_id, error = %error, "recipe detail failed");
                detail.error = Some(error.user_facing_message());
            }
        }
    }

    fn rate_recipe(model: &mut Model, caps: &Capabilities, rating: u8) {
        if Self::require_user(model, "Sign in to rate recipes.").is_err() {
            return;
        }
        let Some(recipe_id) = model.detail.as_ref().map(|d| d.recipe_id.clone()) else {
            return;
        };
        let rating = match validate_rating(rating) {
            Ok(rating) => rating,
            Err(e) => return Self::show_validation(model, e),
        };
        let id = recipe_id.clone();
        caps.backend.request(
            BackendOperation::RateRecipe { recipe_id, rating },
            move |result| Event::RecipeRated {
                recipe_id: id,
                rating,
                result: Box::new(result),
            },
        );
    }

    fn add_comment(model: &mut Model, caps: &Capabilities, content: &str, rating: u8) {
        if Self::require_user(model, "Sign in to leave a review.").is_err() {
            return;
        }
        let Some(recipe_id) = model.detail.as_ref().map(|d| d.recipe_id.clone()) else {
            return;
        };
        let validated = validate_comment(content)
            .and_then(|content| validate_rating(rating).map(|rating| (content, rating)));
        let (content, rating) = match validated {
            Ok(v) => v,
            Err(e) => return Self::show_validation(model, e),
        };
        if let Some(detail) = model.detail.as_mut() {
            detail.is_comment_loading = true;
        }
        let id = recipe_id.clone();
        caps.backend.request(
            BackendOperation::AddComment {
                recipe_id,
                content,
                rating,
            },
            move |result| Event::CommentAdded {
                recipe_id: id,
                result: Box::new(result),
            },
        );
    }

    fn delete_recipe(model: &mut Model, caps: &Capabilities) {
        let Ok(me) = Self::require_user(model, "Sign in to manage your recipes.") else {
            return;
        };
        let Some(recipe) = model.detail.as_ref().and_then(|d| d.recipe.as_ref()) else {
            return;
        };
        if !recipe.is_owned_by(&me) {
            model.show_toast("You can only delete your own recipes.", ToastKind::Warning);
            return;
        }
        let recipe_id = recipe.id.clone();
        let id = recipe_id.clone();
        caps.backend.request(
            BackendOperation::DeleteRecipe { recipe_id },
            move |result| Event::RecipeDeleted {
                recipe_id: id,
                result: Box::new(result),
            },
        );
    }

    // --- Editor ---

    fn edit_recipe(model: &mut Model, caps: &Capabilities, recipe_id: RecipeId) {
        let Ok(me) = Self::require_user(model, "Sign in to edit recipes.") else {
            return;
        };
        if let Some(recipe) = model.feed.recipe(&recipe_id) {
            if !recipe.is_owned_by(&me) {
                model.show_toast("You can only edit your own recipes.", ToastKind::Warning);
                return;
            }
            let mut editor = EditorState::loading(recipe_id);
            editor.load(recipe);
            model.editor = Some(editor);
            return;
        }
        model.editor = Some(EditorState::loading(recipe_id.clone()));
        let id = recipe_id.clone();
        caps.backend.fetch_recipe(recipe_id, move |result| Event::EditorRecipeLoaded {
            recipe_id: id,
            result: Box::new(result),
        });
    }

    fn save_recipe(model: &mut Model, caps: &Capabilities) {
        let Ok(me) = Self::require_user(model, "Sign in to publish recipes.") else {
            return;
        };
        let Some(editor) = model.editor.as_mut() else {
            return;
        };
        if editor.is_loading {
            debug!("save already in flight");
            return;
        }
        let recipe = match editor.build(&me, UnixTimeMs::now()) {
            Ok(recipe) => recipe,
            Err(e) => {
                editor.error = Some(AppError::from(e).user_facing_message());
                return;
            }
        };
        editor.is_loading = true;
        editor.error = None;
        let sent = Box::new(recipe.clone());
        let operation = match editor.mode {
            EditMode::Create => BackendOperation::CreateRecipe { recipe },
            EditMode::Edit { .. } => BackendOperation::UpdateRecipe { recipe },
        };
        info!(operation = operation.name(), "saving recipe");
        caps.backend.request(operation, move |result| Event::RecipeSaved {
            recipe: sent,
            result: Box::new(result),
        });
    }

    // --- Shopping list ---

    fn add_shopping_item(model: &mut Model, caps: &Capabilities, name: &str) {
        if Self::require_user(model, "Sign in to use the shopping list.").is_err() {
            return;
        }
        let item_name = match validate_item_name(name) {
            Ok(name) => name,
            Err(e) => return Self::show_validation(model, e),
        };
        caps.backend.request(
            BackendOperation::AddShoppingItem { item_name },
            |result| Event::ShoppingItemAdded(Box::new(result)),
        );
    }

    // --- Profile ---

    fn open_profile(model: &mut Model, caps: &Capabilities, user_id: Option<UserId>) {
        let user_id = match user_id {
            Some(user_id) => user_id,
            None => match Self::require_user(model, "Sign in to see your profile.") {
                Ok(me) => me,
                Err(_) => return,
            },
        };
        model.profile = Some(ProfileState::loading(user_id.clone()));
        if !model.feed.has_loaded {
            Self::reload_feed(model, caps);
        }
        let id = user_id.clone();
        caps.backend.request(
            BackendOperation::FetchProfile { user_id },
            move |result| Event::ProfileFetched {
                user_id: id,
                result: Box::new(result),
            },
        );
    }

    fn save_username(model: &mut Model, caps: &Capabilities) {
        if Self::require_user(model, "Sign in to edit your profile.").is_err() {
            return;
        }
        let Some(profile) = model.profile.as_mut().filter(|p| p.is_me() && p.is_editing) else {
            return;
        };
        if profile.is_saving {
            debug!("username save already in flight");
            return;
        }
        let username = match validate_username(&profile.draft_username) {
            Ok(username) => username,
            Err(e) => {
                profile.error = Some(AppError::from(e).user_facing_message());
                return;
            }
        };
        profile.is_saving = true;
        let sent = username.clone();
        caps.backend.request(
            BackendOperation::UpdateUsername { username },
            move |result| Event::UsernameSaved {
                username: sent,
                result: Box::new(result),
            },
        );
    }

    // --- View helpers ---

    fn recipe_card(model: &Model, recipe: &Recipe) -> RecipeCard {
        let me = model.current_user();
        let cached = model.feed.recipe(&recipe.id);
        RecipeCard {
            id: recipe.id.to_string(),
            title: recipe.title.clone(),
            author: recipe
                .username
                .clone()
                .unwrap_or_else(|| "Unknown cook".into()),
            author_id: recipe.user_id.to_string(),
            category: recipe.category.clone(),
            image_url: recipe.image_url.clone(),
            rating_label: format_rating(recipe.average_rating, recipe.rating_count),
            cook_time_label: format_cook_time(recipe.time_minutes),
            created_ago: recipe
                .created_at
                .map(|t| format_time_ago(t.as_millis(), model.view_timestamp_ms)),
            is_favorite: cached.map_or(recipe.is_favorite, |r| r.is_favorite),
            is_favorite_pending: model.feed.is_favorite_pending(&recipe.id),
            is_following_author: model.feed.is_following(&recipe.user_id),
            is_mine: me.is_some_and(|me| recipe.is_owned_by(me)),
        }
    }

    fn comment_view(model: &Model, comment: &Comment) -> CommentView {
        CommentView {
            id: comment.id.to_string(),
            author: comment
                .username
                .clone()
                .unwrap_or_else(|| "Anonymous".into()),
            content: comment.content.clone(),
            rating: comment.rating,
            like_count: comment.like_count,
            is_liked_by_me: comment.is_liked_by_me,
            reply_count: comment.reply_count,
            created_ago: comment
                .created_at
                .map(|t| format_time_ago(t.as_millis(), model.view_timestamp_ms)),
        }
    }

    fn detail_view(model: &Model, detail: &DetailState) -> DetailView {
        let me = model.current_user();
        let recipe = detail.recipe.as_ref();
        let is_mine = recipe.is_some_and(|r| me.is_some_and(|me| r.is_owned_by(me)));
        DetailView {
            recipe_id: detail.recipe_id.to_string(),
            recipe: recipe.map(|r| Self::recipe_card(model, r)),
            ingredients: recipe
                .map(|r| r.ingredient_lines().map(str::to_string).collect())
                .unwrap_or_default(),
            instructions: recipe
                .map(|r| crate::cooking::parse_steps(&r.instructions))
                .unwrap_or_default(),
            comments: detail
                .comments
                .iter()
                .map(|c| Self::comment_view(model, c))
                .collect(),
            user_rating: detail.user_rating,
            can_follow: recipe.is_some() && me.is_some() && !is_mine,
            can_edit: is_mine,
            is_loading: detail.is_loading,
            is_comment_loading: detail.is_comment_loading,
            is_deleted: detail.is_deleted,
            error: detail.error.clone(),
        }
    }

    fn profile_view(model: &Model, state: &ProfileState) -> ProfileView {
        let profile = state.profile.as_ref();
        let is_me = state.is_me();
        ProfileView {
            user_id: state.user_id.to_string(),
            username: profile
                .and_then(|p| p.username.clone())
                .unwrap_or_default(),
            avatar_url: profile.and_then(|p| p.avatar_url.clone()),
            follower_count: profile.map_or(0, |p| p.follower_count),
            following_count: profile.map_or(0, |p| p.following_count),
            is_following: profile.is_some_and(|p| p.is_following),
            is_me,
            can_follow: profile.is_some() && !is_me && model.is_authenticated(),
            is_editing: state.is_editing,
            draft_username: state.draft_username.clone(),
            recipes: model
                .feed
                .recipes_by(&state.user_id)
                .map(|r| Self::recipe_card(model, r))
                .collect(),
            is_loading: state.is_loading,
            is_saving: state.is_saving,
            error: state.error.clone(),
        }
    }

    fn cooking_view(session: &CookingSession) -> CookingView {
        let timer = session.timer();
        let seconds = if timer.running || timer.remaining_seconds > 0 {
            timer.remaining_seconds
        } else {
            timer.initial_seconds
        };
        CookingView {
            recipe_id: session.recipe_id().to_string(),
            title: session.title().to_string(),
            empty_message: (!session.has_steps()).then(|| "No instructions found".to_string()),
            step_count: session.steps().len(),
            current_index: session.current_index(),
            current_step: session.current_step().map(str::to_string),
            can_go_back: session.current_index() > 0,
            can_go_forward: session.has_steps() && !session.is_last_step(),
            progress: session.progress(),
            timer_label: format_countdown(seconds),
            timer_running: timer.running,
            suggested_minutes: session.suggested_minutes(),
            keep_screen_on: session.keep_screen_on(),
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        model.update_timestamp();

        let event_name = event.name();
        if event.is_user_initiated() {
            debug!(event = event_name, "user action");
        } else {
            trace!(event = event_name, "event");
        }

        match event {
            Event::Noop => return,

            // --- Session & settings ---
            Event::SignedIn { user_id, username } => {
                info!(user_id = %user_id, "signed in");
                model.session = Some(Session { user_id, username });
                Self::fetch_followed(model, caps);
            }

            Event::SignedOut => {
                info!("signed out");
                model.session = None;
                model.feed.clear_followed();
                model.feed.select_scope(FeedScope::All);
                model.shopping = crate::shopping::ShoppingList::default();
                model.editor = None;
                model.profile = None;
                if let Some(detail) = model.detail.as_mut() {
                    detail.user_rating = None;
                }
            }

            Event::SettingsChanged(settings) => {
                model.settings = settings;
                if settings.guest_mode && model.feed.scope() == FeedScope::FollowingOnly {
                    model.feed.select_scope(FeedScope::All);
                }
            }

            // --- Feed ---
            Event::ReloadFeed => Self::reload_feed(model, caps),

            Event::RecipesLoaded(result) => {
                Self::handle_recipes_loaded(model, *result);
                if std::mem::take(&mut model.feed.reload_queued) {
                    Self::reload_feed(model, caps);
                }
            }

            Event::FollowedUserIdsLoaded(result) => {
                match (*result).and_then(BackendOutput::into_user_ids) {
                    Ok(ids) => model.feed.replace_followed(ids),
                    Err(e) => warn!(error = %e, "followed users fetch failed; keeping previous set"),
                }
            }

            Event::SelectCategory { category } => model.feed.select_category(&category),

            Event::SelectScope { scope } => {
                if scope == FeedScope::FollowingOnly && model.current_user().is_none() {
                    model.show_toast(
                        "Sign in to see recipes from cooks you follow.",
                        ToastKind::Warning,
                    );
                } else {
                    model.feed.select_scope(scope);
                }
            }

            Event::ToggleFavorite { recipe_id } => Self::toggle_favorite(model, caps, recipe_id),

            Event::FavoriteSet { recipe_id, result } => {
                match (*result).and_then(BackendOutput::into_done) {
                    Ok(()) => model.feed.confirm_favorite(&recipe_id),
                    Err(e) => {
                        warn!(recipe_id = %recipe_id, error = %e, "set favorite failed");
                        if model.feed.rollback_favorite(&recipe_id) {
                            model.show_toast(
                                "Couldn't update favorites. Please try again.",
                                ToastKind::Warning,
                            );
                        }
                    }
                }
            }

            Event::ToggleFollow { user_id } => Self::toggle_follow(model, caps, user_id),

            Event::FollowSet { user_id, result } => {
                match (*result).and_then(BackendOutput::into_flag) {
                    Ok(following) => {
                        info!(user_id = %user_id, following, "follow state changed");
                        model.feed.apply_follow(&user_id, following);
                        if let Some(profile) = model.profile.as_mut() {
                            profile.apply_follow(&user_id, following);
                        }
                    }
                    Err(e) => {
                        Self::report(model, "set_follow", e);
                    }
                }
            }

            // --- Cooking ---
            Event::OpenCooking { recipe_id } => Self::open_cooking(model, caps, recipe_id),

            Event::CookingRecipeLoaded { recipe_id, result } => {
                if model.pending_cooking.as_ref() != Some(&recipe_id) {
                    debug!(recipe_id = %recipe_id, "dropping recipe for abandoned cooking session");
                    return;
                }
                model.pending_cooking = None;
                match (*result).and_then(BackendOutput::into_recipe) {
                    Ok(recipe) => {
                        model.cooking = Some(CookingSession::new(
                            recipe.id.clone(),
                            recipe.title.clone(),
                            &recipe.instructions,
                        ));
                        model.feed.upsert_recipe(recipe);
                    }
                    Err(e) => {
                        Self::report(model, "fetch_recipe_by_id", e);
                    }
                }
            }

            Event::NextStep => {
                if let Some(session) = model.cooking.as_mut() {
                    session.next_step();
                }
            }

            Event::PreviousStep => {
                if let Some(session) = model.cooking.as_mut() {
                    session.previous_step();
                }
            }

            Event::StartTimer { minutes } => Self::start_timer(model, caps, minutes),

            Event::StartSuggestedTimer => {
                let Some(session) = model.cooking.as_ref() else {
                    return;
                };
                if session.timer().running {
                    debug!("suggested timer ignored while a countdown runs");
                    return;
                }
                let minutes = session.suggested_minutes().unwrap_or(DEFAULT_TIMER_MINUTES);
                Self::start_timer(model, caps, minutes);
            }

            Event::StopTimer => {
                if let Some(generation) = model.cooking.as_mut().and_then(CookingSession::stop_timer)
                {
                    caps.timer.cancel(generation);
                }
            }

            Event::TimerTicked { generation } => {
                let Some(session) = model.cooking.as_mut() else {
                    debug!(generation, "tick without a cooking session");
                    return;
                };
                match session.tick(generation) {
                    TickOutcome::Ignored => return,
                    TickOutcome::Continue(generation) => Self::schedule_tick(caps, generation),
                    TickOutcome::Finished => {
                        info!(recipe_id = %session.recipe_id(), "cooking timer finished");
                        model.show_toast("Timer finished!", ToastKind::Success);
                    }
                }
            }

            Event::TimerCancelled { generation } => {
                debug!(generation, "timer cancelled by shell");
                return;
            }

            Event::ToggleKeepScreenOn => {
                if let Some(session) = model.cooking.as_mut() {
                    session.toggle_keep_screen_on();
                }
            }

            Event::CloseCooking => Self::close_cooking(model, caps),

            // --- Search ---
            Event::SearchQueryChanged { query } => {
                if let Some(query) = model.search.set_query(query) {
                    let sent = query.clone();
                    caps.backend.request(
                        BackendOperation::SearchRecipes { query },
                        move |result| Event::SearchResults {
                            query: sent,
                            result: Box::new(result),
                        },
                    );
                }
            }

            Event::SearchResults { query, result } => {
                match (*result).and_then(BackendOutput::into_recipes) {
                    Ok(recipes) => {
                        model
                            .search
                            .apply_results(&query, recipes, ResultSource::Remote);
                    }
                    Err(e) => {
                        if model.search.is_current(&query) {
                            warn!(query = %query, error = %e, "search failed; filtering cached feed");
                            let local = local_search(model.feed.all_recipes(), &query);
                            model.search.apply_fallback(
                                &query,
                                local,
                                "Search is unavailable. Showing matches from loaded recipes."
                                    .into(),
                            );
                        }
                    }
                }
            }

            Event::AddExcludedIngredient { ingredient } => {
                model.search.add_exclusion(&ingredient);
            }

            Event::RemoveExcludedIngredient { ingredient } => {
                model.search.remove_exclusion(&ingredient);
            }

            // --- Detail ---
            Event::OpenRecipe { recipe_id } => Self::open_recipe(model, caps, recipe_id),

            Event::CloseRecipe => model.detail = None,

            Event::DetailRecipeFetched { recipe_id, result } => {
                Self::handle_detail_recipe(model, caps, &recipe_id, *result);
            }

            Event::UserRatingFetched { recipe_id, result } => {
                match (*result).and_then(BackendOutput::into_rating) {
                    Ok(rating) => {
                        if let Some(detail) =
                            model.detail.as_mut().filter(|d| d.is_for(&recipe_id))
                        {
                            detail.user_rating = rating;
                        }
                    }
                    Err(e) => debug!(recipe_id = %recipe_id, error = %e, "user rating unavailable"),
                }
            }

            Event::CommentsFetched { recipe_id, result } => {
                let comments = (*result).and_then(BackendOutput::into_comments);
                let Some(detail) = model.detail.as_mut().filter(|d| d.is_for(&recipe_id)) else {
                    return;
                };
                detail.is_comment_loading = false;
                match comments {
                    Ok(comments) => detail.comments = comments,
                    Err(e) => {
                        Self::report(model, "fetch_comments", e);
                    }
                }
            }

            Event::IsFollowingFetched { user_id, result } => {
                match (*result).and_then(BackendOutput::into_flag) {
                    Ok(following) => model.feed.apply_follow(&user_id, following),
                    Err(e) => debug!(user_id = %user_id, error = %e, "follow state unavailable"),
                }
            }

            Event::RateRecipe { rating } => Self::rate_recipe(model, caps, rating),

            Event::RecipeRated {
                recipe_id,
                rating,
                result,
            } => match (*result).and_then(BackendOutput::into_done) {
                Ok(()) => {
                    if let Some(detail) = model.detail.as_mut().filter(|d| d.is_for(&recipe_id)) {
                        detail.user_rating = Some(rating);
                        Self::fetch_detail_recipe(caps, recipe_id);
                    }
                    model.show_toast("Thanks for rating!", ToastKind::Success);
                }
                Err(e) => {
                    Self::report(model, "rate_recipe", e);
                }
            },

            Event::AddComment { content, rating } => {
                Self::add_comment(model, caps, &content, rating);
            }

            Event::CommentAdded { recipe_id, result } => {
                if let Some(detail) = model.detail.as_mut().filter(|d| d.is_for(&recipe_id)) {
                    detail.is_comment_loading = false;
                }
                match (*result).and_then(BackendOutput::into_done) {
                    Ok(()) => {
                        model.show_toast("Thank you for your review!", ToastKind::Success);
                        if model.detail.as_ref().is_some_and(|d| d.is_for(&recipe_id)) {
                            if let Some(detail) = model.detail.as_mut() {
                                detail.is_comment_loading = true;
                            }
                            Self::fetch_comments(caps, recipe_id);
                        }
                    }
                    Err(e) => {
                        Self::report(model, "add_comment", e);
                    }
                }
            }

            Event::ToggleCommentLike { comment_id } => {
                if Self::require_user(model, "Sign in to like reviews.").is_ok() {
                    if let Some(recipe_id) = model.detail.as_ref().map(|d| d.recipe_id.clone()) {
                        let id = comment_id.clone();
                        caps.backend.request(
                            BackendOperation::ToggleCommentLike { comment_id },
                            move |result| Event::CommentLikeToggled {
                                recipe_id,
                                comment_id: id,
                                result: Box::new(result),
                            },
                        );
                    }
                }
            }

            Event::CommentLikeToggled {
                recipe_id,
                comment_id,
                result,
            } => match (*result).and_then(BackendOutput::into_flag) {
                Ok(liked) => {
                    if let Some(detail) = model.detail.as_mut().filter(|d| d.is_for(&recipe_id)) {
                        detail.set_comment_liked(&comment_id, liked);
                        Self::fetch_comments(caps, recipe_id);
                    }
                }
                Err(e) => {
                    Self::report(model, "toggle_comment_like", e);
                }
            },

            Event::DeleteRecipe => Self::delete_recipe(model, caps),

            Event::RecipeDeleted { recipe_id, result } => {
                match (*result).and_then(BackendOutput::into_done) {
                    Ok(()) => {
                        info!(recipe_id = %recipe_id, "recipe deleted");
                        model.feed.remove_recipe(&recipe_id);
                        if let Some(detail) =
                            model.detail.as_mut().filter(|d| d.is_for(&recipe_id))
                        {
                            detail.is_deleted = true;
                        }
                        model.show_toast("Recipe deleted.", ToastKind::Success);
                    }
                    Err(e) => {
                        Self::report(model, "delete_recipe", e);
                    }
                }
            }

            Event::AddIngredientToShoppingList { ingredient } => {
                Self::add_shopping_item(model, caps, &ingredient);
            }

            // --- Editor ---
            Event::NewRecipe => {
                if Self::require_user(model, "Sign in to publish recipes.").is_ok() {
                    model.editor = Some(EditorState::create());
                }
            }

            Event::EditRecipe { recipe_id } => Self::edit_recipe(model, caps, recipe_id),

            Event::EditorRecipeLoaded { recipe_id, result } => {
                let me = model.current_user().cloned();
                let Some(editor) = model
                    .editor
                    .as_mut()
                    .filter(|e| e.editing_id() == Some(&recipe_id))
                else {
                    return;
                };
                editor.is_loading = false;
                match (*result).and_then(BackendOutput::into_recipe) {
                    Ok(recipe) if me.as_ref().is_some_and(|me| recipe.is_owned_by(me)) => {
                        editor.load(&recipe);
                    }
                    Ok(_) => editor.error = Some("You can only edit your own recipes.".into()),
                    Err(e) => editor.error = Some(AppError::from(e).user_facing_message()),
                }
            }

            Event::DraftFieldChanged { field, value } => {
                if let Some(editor) = model.editor.as_mut() {
                    editor.set_field(field, value);
                }
            }

            Event::DraftTimeChanged { minutes } => {
                if let Some(editor) = model.editor.as_mut() {
                    editor.draft.time_minutes = minutes;
                    editor.error = None;
                }
            }

            Event::SaveRecipe => Self::save_recipe(model, caps),

            Event::RecipeSaved { recipe, result } => {
                // The backend may echo the stored row; otherwise trust what was sent.
                let outcome = (*result).map(|output| match output {
                    BackendOutput::Recipe(saved) => saved,
                    _ => *recipe,
                });
                if let Some(editor) = model.editor.as_mut() {
                    editor.is_loading = false;
                    match &outcome {
                        Ok(_) => editor.is_saved = true,
                        Err(e) => {
                            editor.error = Some(AppError::from(e.clone()).user_facing_message());
                        }
                    }
                }
                match outcome {
                    Ok(saved) => {
                        model.show_toast("Recipe saved.", ToastKind::Success);
                        model.feed.upsert_recipe(saved);
                        Self::refresh_feed_after_write(model, caps);
                    }
                    Err(e) => warn!(error = %e, "saving recipe failed"),
                }
            }

            Event::CloseEditor => model.editor = None,

            // --- Profile ---
            Event::OpenProfile { user_id } => Self::open_profile(model, caps, user_id),

            Event::ProfileFetched { user_id, result } => {
                let Some(profile) = model.profile.as_mut().filter(|p| p.is_for(&user_id)) else {
                    debug!(user_id = %user_id, "profile closed before it loaded");
                    return;
                };
                match (*result).and_then(BackendOutput::into_profile) {
                    Ok(loaded) => {
                        if !loaded.is_me {
                            model.feed.apply_follow(&loaded.id, loaded.is_following);
                        }
                        profile.load(loaded);
                    }
                    Err(e) => {
                        profile.is_loading = false;
                        profile.error = Some(match e {
                            BackendError::NotFound => "Profile not found.".into(),
                            other => {
                                let error = AppError::from(other);
                                warn!(user_id = %user_id, error = %error, "profile fetch failed");
                                error.user_facing_message()
                            }
                        });
                    }
                }
            }

            Event::ToggleProfileEditing => {
                if let Some(profile) = model.profile.as_mut() {
                    profile.toggle_editing();
                }
            }

            Event::UsernameChanged { username } => {
                if let Some(profile) = model.profile.as_mut().filter(|p| p.is_editing) {
                    profile.set_draft_username(username);
                }
            }

            Event::SaveUsername => Self::save_username(model, caps),

            Event::UsernameSaved { username, result } => {
                if let Some(profile) = model.profile.as_mut() {
                    profile.is_saving = false;
                }
                match (*result).and_then(BackendOutput::into_done) {
                    Ok(()) => {
                        info!("username updated");
                        if let Some(profile) = model.profile.as_mut().filter(|p| p.is_me()) {
                            profile.apply_username(username.clone());
                        }
                        if let Some(session) = model.session.as_mut() {
                            session.username = Some(username);
                        }
                        model.show_toast("Username updated.", ToastKind::Success);
                    }
                    Err(e) => {
                        Self::report(model, "update_username", e);
                    }
                }
            }

            Event::CloseProfile => model.profile = None,

            // --- Shopping list ---
            Event::LoadShoppingList => {
                if Self::require_user(model, "Sign in to use the shopping list.").is_ok() {
                    model.shopping.is_loading = true;
                    caps.backend.request(BackendOperation::FetchShoppingItems, |result| {
                        Event::ShoppingListLoaded(Box::new(result))
                    });
                }
            }

            Event::ShoppingListLoaded(result) => {
                match (*result).and_then(BackendOutput::into_shopping_items) {
                    Ok(items) => model.shopping.replace(items),
                    Err(e) => {
                        model.shopping.is_loading = false;
                        let error = Self::report(model, "fetch_shopping_items", e);
                        model.shopping.error = Some(error.user_facing_message());
                    }
                }
            }

            Event::AddShoppingItem { item_name } => {
                Self::add_shopping_item(model, caps, &item_name);
            }

            Event::ShoppingItemAdded(result) => {
                match (*result).and_then(BackendOutput::into_shopping_item) {
                    Ok(item) => {
                        model.show_toast(
                            format!("{} added to shopping list.", item.item_name),
                            ToastKind::Success,
                        );
                        model.shopping.push(item);
                    }
                    Err(e) => {
                        Self::report(model, "add_shopping_item", e);
                    }
                }
            }

            Event::ToggleShoppingItem { item_id } => {
                let Some(checked) = model.shopping.item(&item_id).map(|i| !i.is_checked) else {
                    return;
                };
                let id = item_id.clone();
                caps.backend.request(
                    BackendOperation::SetShoppingItemChecked { item_id, checked },
                    move |result| Event::ShoppingItemChecked {
                        item_id: id,
                        checked,
                        result: Box::new(result),
                    },
                );
            }

            Event::ShoppingItemChecked {
                item_id,
                checked,
                result,
            } => match (*result).and_then(BackendOutput::into_done) {
                Ok(()) => model.shopping.set_checked(&item_id, checked),
                Err(e) => {
                    Self::report(model, "set_shopping_item_checked", e);
                }
            },

            Event::DeleteShoppingItem { item_id } => {
                if model.shopping.item(&item_id).is_some() {
                    let id = item_id.clone();
                    caps.backend.request(
                        BackendOperation::DeleteShoppingItem { item_id },
                        move |result| Event::ShoppingItemDeleted {
                            item_id: id,
                            result: Box::new(result),
                        },
                    );
                }
            }

            Event::ShoppingItemDeleted { item_id, result } => {
                match (*result).and_then(BackendOutput::into_done) {
                    Ok(()) => model.shopping.remove(&item_id),
                    Err(e) => {
                        Self::report(model, "delete_shopping_item", e);
                    }
                }
            }

            Event::DismissError => model.clear_error(),
            Event::DismissToast => model.clear_toast(),
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        let selected = model.feed.selected_category();
        let recipes: Vec<RecipeCard> = model
            .feed
            .visible()
            .iter()
            .map(|r| Self::recipe_card(model, r))
            .collect();

        let feed = FeedView {
            is_empty: recipes.is_empty() && model.feed.has_loaded,
            recipes,
            categories: CATEGORIES
                .iter()
                .map(|c| CategoryChip {
                    name: c.as_str().to_string(),
                    selected: selected.is_some_and(|s| s.eq_ignore_ascii_case(c.as_str())),
                })
                .collect(),
            scope: model.feed.scope(),
            is_loading: model.feed.is_loading,
            error: model.feed.error.clone(),
        };

        let query = model.search.query();
        let search = SearchView {
            query: query.to_string(),
            excluded_ingredients: model.search.excluded().to_vec(),
            results: model
                .search
                .results()
                .iter()
                .map(|r| Self::recipe_card(model, r))
                .collect(),
            is_loading: model.search.is_loading,
            is_offline_results: model.search.source == ResultSource::LocalFallback,
            error: model.search.error.clone(),
            hint: (!query.trim().is_empty() && query.trim().chars().count() < MIN_SEARCH_QUERY_LEN)
                .then(|| format!("Type at least {MIN_SEARCH_QUERY_LEN} characters to search.")),
        };

        let editor = model.editor.as_ref().map(|e| EditorView {
            is_edit: e.editing_id().is_some(),
            title: e.draft.title.clone(),
            ingredients: e.draft.ingredients.clone(),
            instructions: e.draft.instructions.clone(),
            image_url: e.draft.image_url.clone(),
            category: e.draft.category.clone(),
            time_minutes: e.draft.time_minutes,
            categories: CATEGORIES.iter().map(|c| c.as_str().to_string()).collect(),
            is_loading: e.is_loading,
            is_saved: e.is_saved,
            error: e.error.clone(),
        });

        let shopping = ShoppingView {
            items: model
                .shopping
                .items()
                .iter()
                .map(|i| ShoppingItemView {
                    id: i.id.to_string(),
                    name: i.item_name.clone(),
                    is_checked: i.is_checked,
                })
                .collect(),
            remaining: model.shopping.remaining(),
            is_loading: model.shopping.is_loading,
            error: model.shopping.error.clone(),
        };

        ViewModel {
            feed,
            favorites: model
                .feed
                .favorites()
                .map(|r| Self::recipe_card(model, r))
                .collect(),
            search,
            detail: model.detail.as_ref().map(|d| Self::detail_view(model, d)),
            editor,
            shopping,
            profile: model.profile.as_ref().map(|p| Self::profile_view(model, p)),
            cooking: model.cooking.as_ref().map(Self::cooking_view),
            is_cooking_loading: model.pending_cooking.is_some(),
            settings: model.settings,
            error: model.active_error.as_ref().map(UserFacingError::from),
            toast: model.active_toast.as_ref().map(ToastView::from),
            is_authenticated: model.is_authenticated(),
            username: model
                .session
                .as_ref()
                .filter(|_| model.is_authenticated())
                .and_then(|s| s.username.clone()),
        }
    }
}
