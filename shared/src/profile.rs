//! Profile screen: one user's public profile, plus username editing when the
//! profile is the signed-in user's own.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{UserId, UserProfile};
use crate::{ValidationError, MAX_USERNAME_LEN};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileState {
    pub user_id: UserId,
    pub profile: Option<UserProfile>,
    pub is_loading: bool,
    pub is_editing: bool,
    pub draft_username: String,
    pub is_saving: bool,
    pub error: Option<String>,
}

impl ProfileState {
    #[must_use]
    pub fn loading(user_id: UserId) -> Self {
        Self {
            user_id,
            profile: None,
            is_loading: true,
            is_editing: false,
            draft_username: String::new(),
            is_saving: false,
            error: None,
        }
    }

    #[must_use]
    pub fn is_for(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    #[must_use]
    pub fn is_me(&self) -> bool {
        self.profile.as_ref().is_some_and(|p| p.is_me)
    }

    pub fn load(&mut self, profile: UserProfile) {
        self.draft_username = profile.username.clone().unwrap_or_default();
        self.profile = Some(profile);
        self.is_loading = false;
        self.error = None;
    }

    /// Enter or leave edit mode. Only the owner can edit; leaving discards
    /// the draft.
    pub fn toggle_editing(&mut self) {
        if !self.is_me() {
            debug!(user_id = %self.user_id, "profile is not editable");
            return;
        }
        self.is_editing = !self.is_editing;
        self.draft_username = self
            .profile
            .as_ref()
            .and_then(|p| p.username.clone())
            .unwrap_or_default();
        self.error = None;
    }

    pub fn set_draft_username(&mut self, username: String) {
        self.draft_username = username;
        self.error = None;
    }

    /// Follow state the backend reported for `user_id`. The follower count
    /// moves only when the flag actually flips.
    pub fn apply_follow(&mut self, user_id: &UserId, following: bool) {
        let Some(profile) = self.profile.as_mut().filter(|p| &p.id == user_id) else {
            return;
        };
        if profile.is_following == following {
            return;
        }
        profile.is_following = following;
        if following {
            profile.follower_count = profile.follower_count.saturating_add(1);
        } else {
            profile.follower_count = profile.follower_count.saturating_sub(1);
        }
    }

    pub fn apply_username(&mut self, username: String) {
        if let Some(profile) = self.profile.as_mut() {
            profile.username = Some(username.clone());
        }
        self.draft_username = username;
        self.is_editing = false;
        self.is_saving = false;
        self.error = None;
    }
}

/// Trimmed, non-blank, bounded.
pub fn validate_username(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::Required { field: "username" });
    }
    let len = name.chars().count();
    if len > MAX_USERNAME_LEN {
        return Err(ValidationError::TooLong {
            field: "username",
            len,
            max: MAX_USERNAME_LEN,
        });
    }
    Ok(name.to_string())
}
