//! Student profile: the cached user, the profile card and the student's
//! own feedback lists.

use serde::Serialize;
use tracing::{error, warn};

use super::backend::{FeedbackBackend, ProfileBackend};
use super::dates;
use super::local_store::LocalStore;
use crate::error::PortalError;
use crate::i18n::{self, Language};
use crate::models::{
    DisplayNameUpdate, FeedbackForm, FeedbackRecord, PortalStatistics, StoredUser, UserProfile,
};

pub const USER_CACHE_KEY: &str = "ums_user";

pub const DEFAULT_AVATAR: &str = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'%3E%3Ccircle cx='50' cy='50' r='50' fill='%23d0d0d0'/%3E%3Ccircle cx='50' cy='35' r='15' fill='%23a0a0a0'/%3E%3Cellipse cx='50' cy='70' rx='20' ry='18' fill='%23a0a0a0'/%3E%3C/svg%3E";

const EXCERPT_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileCard {
    pub picture: String,
    pub name: String,
    pub full_name: String,
    pub status: String,
    pub registered: Option<String>,
}

pub fn status_text(status: Option<&str>) -> String {
    match status {
        Some("active") => "Student (Active)".to_string(),
        Some(other) if !other.is_empty() => format!("Student ({})", other),
        _ => "Student (Pending)".to_string(),
    }
}

/// Cached values win over the server profile; the avatar falls back to
/// the built-in placeholder.
pub fn build_profile_card(cached: Option<&StoredUser>, profile: &UserProfile) -> ProfileCard {
    let non_empty = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(str::to_string);
    let cached_picture = cached.and_then(|u| u.picture.as_deref());
    let cached_name = cached.and_then(|u| u.name.as_deref());

    ProfileCard {
        picture: non_empty(cached_picture)
            .or_else(|| non_empty(profile.profile_picture_url.as_deref()))
            .unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
        name: non_empty(cached_name)
            .or_else(|| non_empty(profile.display_name.as_deref()))
            .or_else(|| non_empty(profile.full_name.as_deref()))
            .unwrap_or_default(),
        full_name: non_empty(profile.full_name.as_deref())
            .unwrap_or_else(|| "Not provided".to_string()),
        status: status_text(profile.status.as_deref()),
        registered: profile.created_at.as_deref().and_then(dates::long_date),
    }
}

/// First 50 characters, with "..." when the text was cut.
pub fn excerpt(text: &str) -> String {
    if text.chars().count() > EXCERPT_CHARS {
        format!("{}...", text.chars().take(EXCERPT_CHARS).collect::<String>())
    } else {
        text.to_string()
    }
}

pub struct ProfileService<'a> {
    store: &'a LocalStore,
    language: Language,
}

impl<'a> ProfileService<'a> {
    pub fn new(store: &'a LocalStore, language: Language) -> Self {
        Self { store, language }
    }

    /// The user cached at login. A corrupt entry is logged and treated as
    /// missing.
    pub fn cached_user(&self) -> Option<StoredUser> {
        match self.store.get::<StoredUser>(USER_CACHE_KEY) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Failed to parse stored user");
                None
            }
        }
    }

    pub fn cache_user(&self, user: &StoredUser) -> Result<(), PortalError> {
        self.store.set(USER_CACHE_KEY, user)
    }

    pub fn clear_cache(&self) -> Result<(), PortalError> {
        self.store.remove(USER_CACHE_KEY)
    }

    /// Refresh the cache from the server profile, or drop it when nobody is
    /// signed in.
    pub async fn sync_user(&self, backend: &dyn ProfileBackend) -> Result<Option<StoredUser>, PortalError> {
        let Some(profile) = backend.current_user().await? else {
            self.clear_cache()?;
            return Ok(None);
        };

        let user = StoredUser {
            name: profile
                .display_name
                .clone()
                .filter(|n| !n.is_empty())
                .or_else(|| profile.full_name.clone()),
            email: profile.email.clone(),
            picture: Some(
                profile
                    .profile_picture_url
                    .clone()
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
            ),
        };
        self.cache_user(&user)?;
        Ok(Some(user))
    }

    pub async fn profile_card(&self, backend: &dyn ProfileBackend) -> Result<Option<ProfileCard>, PortalError> {
        let Some(profile) = backend.current_user().await? else {
            return Ok(None);
        };
        let cached = self.cached_user();
        Ok(Some(build_profile_card(cached.as_ref(), &profile)))
    }

    /// The student's own submissions; empty on failure.
    pub async fn own_feedback(&self, user_id: &str, backend: &dyn ProfileBackend) -> Vec<FeedbackRecord> {
        backend.user_feedback(user_id).await.unwrap_or_else(|e| {
            error!(error = %e, "Error loading feedback");
            Vec::new()
        })
    }

    pub async fn resolved_feedback(&self, backend: &dyn ProfileBackend) -> Vec<FeedbackRecord> {
        backend.resolved_feedback().await.unwrap_or_else(|e| {
            error!(error = %e, "Error loading resolved feedback");
            Vec::new()
        })
    }

    /// Rename the user on the server and in the cache. Returns the message
    /// to show.
    pub async fn update_display_name(
        &self,
        user_id: Option<&str>,
        new_name: &str,
        backend: &dyn ProfileBackend,
    ) -> Result<&'static str, PortalError> {
        let name = new_name.trim();
        if name.is_empty() {
            return Err(PortalError::InvalidInput("Display name cannot be empty".to_string()));
        }

        let update = DisplayNameUpdate {
            user_id: user_id.map(str::to_string),
            display_name: name.to_string(),
        };
        backend.update_display_name(&update).await.map_err(|e| match e {
            PortalError::Api(message) if message == "Unknown error" => {
                PortalError::Api("Failed to update display name".to_string())
            }
            other => other,
        })?;

        let mut cached = self.cached_user().unwrap_or_default();
        cached.name = Some(name.to_string());
        self.cache_user(&cached)?;

        Ok(i18n::display_name_updated(self.language))
    }

    pub async fn portal_statistics(&self, backend: &dyn ProfileBackend) -> PortalStatistics {
        backend.portal_statistics().await.unwrap_or_else(|e| {
            error!(error = %e, "Error loading statistics");
            PortalStatistics::default()
        })
    }

    /// The classic feedback form. Returns the localized result message.
    pub async fn submit_form(&self, form: &FeedbackForm, backend: &dyn FeedbackBackend) -> (bool, &'static str) {
        let success = match backend.submit_form(form).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Error submitting feedback");
                false
            }
        };
        (success, i18n::feedback_form_result(self.language, success))
    }
}
