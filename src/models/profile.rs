use serde::{Deserialize, Serialize};
use super::lenient;

/// The user cached by the login page under `ums_user`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

/// `api/session.php?action=user`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "lenient::id_string")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}

/// `admin` object of `api/session.php?action=get-admin`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminProfile {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl AdminProfile {
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().filter(|n| !n.is_empty()).unwrap_or("Admin")
    }

    pub fn role_label(&self) -> &str {
        self.role.as_deref().filter(|r| !r.is_empty()).unwrap_or("Admin")
    }

    pub fn picture(&self) -> Option<&str> {
        self.profile_picture_url
            .as_deref()
            .or(self.profile_picture.as_deref())
            .filter(|p| !p.is_empty())
    }
}

/// Body of `update-profile.php`.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayNameUpdate {
    pub user_id: Option<String>,
    pub display_name: String,
}

/// Headline numbers on the student home page (`get-statistics.php`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortalStatistics {
    #[serde(default, deserialize_with = "lenient::int")]
    pub total_submissions: i64,
    #[serde(default)]
    pub avg_response_time: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub issues_resolved: i64,
    #[serde(default, deserialize_with = "lenient::float")]
    pub satisfaction_rate: f64,
}
