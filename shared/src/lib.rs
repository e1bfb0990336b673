// lib.rs - shared core of the recipe app

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod capabilities;
pub mod cooking;
pub mod detail;
pub mod editor;
pub mod event;
pub mod feed;
pub mod model;
pub mod profile;
pub mod search;
pub mod settings;
pub mod shopping;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub use app::App;
pub use capabilities::{BackendError, Capabilities, Effect};
pub use event::Event;
pub use feed::FeedScope;
pub use model::{Category, Recipe, RecipeId, UnixTimeMs, UserId};
pub use settings::{Settings, SettingsStore, SettingsSubscription};

use cooking::CookingSession;
use detail::DetailState;
use editor::EditorState;
use feed::FeedState;
use profile::ProfileState;
use search::SearchState;
use shopping::ShoppingList;

pub const MIN_SEARCH_QUERY_LEN: usize = 2;
pub const TIMER_TICK_MS: u64 = 1000;
pub const DEFAULT_TIMER_MINUTES: u32 = 5;
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
pub const MAX_COOK_TIME_MINUTES: u32 = 24 * 60;
pub const MAX_TITLE_LEN: usize = 120;
pub const MAX_COMMENT_LEN: usize = 1000;
pub const MAX_ITEM_NAME_LEN: usize = 100;
pub const MAX_USERNAME_LEN: usize = 40;
pub const CATEGORIES: [Category; 5] = Category::ALL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Transient,
    Permanent,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    NotFound,
    Validation,
    Authentication,
    Conflict,
    InvalidState,
    Internal,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION_ERROR",
            Self::Authentication => "AUTH_ERROR",
            Self::Conflict => "CONFLICT",
            Self::InvalidState => "INVALID_STATE",
            Self::Internal => "INTERNAL_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    #[must_use]
    pub const fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::Network | Self::Conflict => ErrorSeverity::Transient,
            Self::Internal | Self::InvalidState => ErrorSeverity::Fatal,
            Self::NotFound | Self::Validation | Self::Authentication | Self::Unknown => {
                ErrorSeverity::Permanent
            }
        }
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Conflict)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub severity: ErrorSeverity,
    pub message: String,
    pub internal_message: Option<String>,
    pub context: HashMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            internal_message: None,
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable() && !matches!(self.severity, ErrorSeverity::Fatal)
    }

    /// Errors the user has to act on (sign in again, restart) rather than
    /// just notice.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        matches!(self.severity, ErrorSeverity::Fatal)
            || matches!(self.kind, ErrorKind::Authentication)
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Network => {
                "Unable to connect. Please check your internet connection and try again.".into()
            }
            ErrorKind::NotFound => "Recipe not found.".into(),
            ErrorKind::Validation => self.message.clone(),
            ErrorKind::Authentication => "Please sign in to continue.".into(),
            ErrorKind::Conflict => {
                "This item was changed elsewhere. Please refresh and try again.".into()
            }
            ErrorKind::InvalidState => "Something went wrong. Please restart the app.".into(),
            ErrorKind::Internal | ErrorKind::Unknown => {
                "An unexpected error occurred. Please try again.".into()
            }
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<BackendError> for AppError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Network => Self::new(ErrorKind::Network, "network unavailable"),
            BackendError::NotFound => Self::new(ErrorKind::NotFound, "not found"),
            BackendError::Unauthorized => Self::new(ErrorKind::Authentication, "unauthorized"),
            BackendError::Conflict => Self::new(ErrorKind::Conflict, "conflict"),
            BackendError::Server { status, message } => {
                Self::new(ErrorKind::Internal, format!("server error {status}"))
                    .with_internal(message)
                    .with_context("http_status", status.to_string())
            }
            BackendError::Unknown(detail) => {
                Self::new(ErrorKind::Unknown, "unknown backend error").with_internal(detail)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill all required fields.")]
    MissingRequiredFields,
    #[error("Please enter a {field}.")]
    Required { field: &'static str },
    #[error("The {field} is too long ({len} > {max} characters).")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error("Rating must be between {min} and {max} (got {rating}).")]
    RatingOutOfRange { rating: u8, min: u8, max: u8 },
    #[error("Image URL must be a valid http or https address: {0}")]
    InvalidUrl(String),
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    #[error("Cooking time must be at most {max} minutes (got {minutes}).")]
    CookTimeOutOfRange { minutes: u32, max: u32 },
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        Self::new(ErrorKind::Validation, e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[must_use]
pub fn format_time_ago(timestamp_ms: u64, now_ms: u64) -> String {
    if timestamp_ms > now_ms {
        return "Just now".into();
    }

    let diff_secs = now_ms.saturating_sub(timestamp_ms) / 1000;
    if diff_secs < 60 {
        return "Just now".into();
    }

    let diff_mins = diff_secs / 60;
    if diff_mins < 60 {
        return format!("{diff_mins}m ago");
    }

    let diff_hours = diff_mins / 60;
    if diff_hours < 24 {
        return format!("{diff_hours}h ago");
    }

    let diff_days = diff_hours / 24;
    if diff_days < 7 {
        return format!("{diff_days}d ago");
    }
    if diff_days < 30 {
        return format!("{}w ago", diff_days / 7);
    }
    if diff_days < 365 {
        return format!("{}mo ago", diff_days / 30);
    }

    format!("{}y ago", diff_days / 365)
}

/// "4.5 (12)", or "New" before the first rating.
#[must_use]
pub fn format_rating(average: f64, count: u32) -> String {
    if count == 0 {
        "New".into()
    } else {
        format!("{average:.1} ({count})")
    }
}

#[must_use]
pub fn format_cook_time(minutes: u32) -> Option<String> {
    match minutes {
        0 => None,
        m if m < 60 => Some(format!("{m} min")),
        m if m % 60 == 0 => Some(format!("{} h", m / 60)),
        m => Some(format!("{} h {} min", m / 60, m % 60)),
    }
}

#[must_use]
pub fn get_current_time_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

// --- Toasts ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastMessage {
    pub message: String,
    pub kind: ToastKind,
    pub created_at_ms: u64,
    pub duration_ms: u64,
}

impl ToastMessage {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
            created_at_ms: get_current_time_ms(),
            duration_ms: kind.default_duration_ms(),
        }
    }

    #[must_use]
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_at_ms) > self.duration_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn default_duration_ms(self) -> u64 {
        match self {
            Self::Info => 3000,
            Self::Success => 2000,
            Self::Warning => 4000,
            Self::Error => 5000,
        }
    }
}

// --- Model ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub username: Option<String>,
}

#[derive(Debug)]
pub struct Model {
    pub session: Option<Session>,
    pub settings: Settings,
    pub feed: FeedState,
    pub search: SearchState,
    pub detail: Option<DetailState>,
    pub editor: Option<EditorState>,
    pub shopping: ShoppingList,
    pub profile: Option<ProfileState>,
    pub cooking: Option<CookingSession>,
    /// Recipe a cooking session is waiting on.
    pub pending_cooking: Option<RecipeId>,
    pub active_error: Option<AppError>,
    pub active_toast: Option<ToastMessage>,
    pub view_timestamp_ms: u64,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            session: None,
            settings: Settings::default(),
            feed: FeedState::new(),
            search: SearchState::default(),
            detail: None,
            editor: None,
            shopping: ShoppingList::default(),
            profile: None,
            cooking: None,
            pending_cooking: None,
            active_error: None,
            active_toast: None,
            view_timestamp_ms: get_current_time_ms(),
        }
    }
}

impl Model {
    pub fn update_timestamp(&mut self) {
        self.view_timestamp_ms = get_current_time_ms();
    }

    pub fn set_error(&mut self, error: AppError) {
        self.active_error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.active_error = None;
    }

    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.active_toast = Some(ToastMessage::new(message, kind));
    }

    pub fn clear_toast(&mut self) {
        self.active_toast = None;
    }

    /// The signed-in user, unless the app is browsing as a guest.
    #[must_use]
    pub fn current_user(&self) -> Option<&UserId> {
        if self.settings.guest_mode {
            return None;
        }
        self.session.as_ref().map(|s| &s.user_id)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }
}

// --- View model ---

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserFacingError {
    pub message: String,
    pub is_transient: bool,
    pub is_retryable: bool,
    pub error_code: String,
}

impl From<&AppError> for UserFacingError {
    fn from(e: &AppError) -> Self {
        Self {
            message: e.user_facing_message(),
            is_transient: e.severity == ErrorSeverity::Transient,
            is_retryable: e.is_retryable(),
            error_code: e.code().to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToastView {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl From<&ToastMessage> for ToastView {
    fn from(t: &ToastMessage) -> Self {
        Self {
            message: t.message.clone(),
            kind: t.kind,
            duration_ms: t.duration_ms,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RecipeCard {
    pub id: String,
    pub title: String,
    pub author: String,
    pub author_id: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub rating_label: String,
    pub cook_time_label: Option<String>,
    pub created_ago: Option<String>,
    pub is_favorite: bool,
    pub is_favorite_pending: bool,
    pub is_following_author: bool,
    pub is_mine: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryChip {
    pub name: String,
    pub selected: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FeedView {
    pub recipes: Vec<RecipeCard>,
    pub categories: Vec<CategoryChip>,
    pub scope: FeedScope,
    pub is_loading: bool,
    pub is_empty: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchView {
    pub query: String,
    pub excluded_ingredients: Vec<String>,
    pub results: Vec<RecipeCard>,
    pub is_loading: bool,
    /// Results come from the cached feed because the backend search failed.
    pub is_offline_results: bool,
    pub hint: Option<String>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentView {
    pub id: String,
    pub author: String,
    pub content: String,
    pub rating: u8,
    pub like_count: u32,
    pub is_liked_by_me: bool,
    pub reply_count: u32,
    pub created_ago: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DetailView {
    pub recipe_id: String,
    pub recipe: Option<RecipeCard>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub comments: Vec<CommentView>,
    pub user_rating: Option<u8>,
    pub can_follow: bool,
    pub can_edit: bool,
    pub is_loading: bool,
    pub is_comment_loading: bool,
    pub is_deleted: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EditorView {
    pub is_edit: bool,
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub image_url: String,
    pub category: String,
    pub time_minutes: u32,
    pub categories: Vec<String>,
    pub is_loading: bool,
    pub is_saved: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShoppingItemView {
    pub id: String,
    pub name: String,
    pub is_checked: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShoppingView {
    pub items: Vec<ShoppingItemView>,
    pub remaining: usize,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProfileView {
    pub user_id: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub follower_count: u32,
    pub following_count: u32,
    pub is_following: bool,
    pub is_me: bool,
    pub can_follow: bool,
    pub is_editing: bool,
    pub draft_username: String,
    /// The user's recipes from the feed cache, in cache order.
    pub recipes: Vec<RecipeCard>,
    pub is_loading: bool,
    pub is_saving: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CookingView {
    pub recipe_id: String,
    pub title: String,
    /// Set when the recipe has no usable steps.
    pub empty_message: Option<String>,
    pub step_count: usize,
    pub current_index: usize,
    pub current_step: Option<String>,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub progress: f32,
    pub timer_label: String,
    pub timer_running: bool,
    pub suggested_minutes: Option<u32>,
    pub keep_screen_on: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub feed: FeedView,
    pub favorites: Vec<RecipeCard>,
    pub search: SearchView,
    pub detail: Option<DetailView>,
    pub editor: Option<EditorView>,
    pub shopping: ShoppingView,
    pub profile: Option<ProfileView>,
    pub cooking: Option<CookingView>,
    pub is_cooking_loading: bool,
    pub settings: Settings,
    pub error: Option<UserFacingError>,
    pub toast: Option<ToastView>,
    pub is_authenticated: bool,
    pub username: Option<String>,
}
