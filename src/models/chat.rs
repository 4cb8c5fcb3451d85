use serde::{Deserialize, Serialize};
use crate::i18n::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bot => "bot",
            Role::System => "system",
        }
    }
}

/// A message as shown in the chat window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: &str) -> Self {
        Self { role: Role::User, text: text.to_string() }
    }

    pub fn bot(text: &str) -> Self {
        Self { role: Role::Bot, text: text.to_string() }
    }
}

/// Identity of the conversation the chat window is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub session_id: String,
    pub user_id: Option<String>,
    pub history_loaded: bool,
}

/// Row of `load-chat.php` when called with a session id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub message_role: Role,
    pub message_text: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl From<StoredMessage> for ChatMessage {
    fn from(stored: StoredMessage) -> Self {
        Self {
            role: stored.message_role,
            text: stored.message_text,
        }
    }
}

/// Row of `load-chat.php` when called with only a user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_key: String,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub preview: Option<String>,
}

/// Body of `POST save-chat.php`.
#[derive(Debug, Clone, Serialize)]
pub struct SaveMessageRequest {
    pub session_id: String,
    pub message: String,
    pub sender: Role,
    pub language: Language,
    pub user_id: Option<String>,
}

/// Answer of `session.php?action=check`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionCheck {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default, deserialize_with = "opt_user_id")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

fn opt_user_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let id = super::lenient::id_string(deserializer)?;
    Ok(if id.is_empty() { None } else { Some(id) })
}
