use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Custom,
    Feedback,
}

/// An entry of the admin reminder list. Custom reminders are persisted
/// under `adminReminders`; feedback reminders are derived from pending
/// feedback on every load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type", default = "custom_kind")]
    pub kind: ReminderKind,
}

fn custom_kind() -> ReminderKind {
    ReminderKind::Custom
}
