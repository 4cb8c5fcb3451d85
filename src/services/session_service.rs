//! The chat window: which conversation is active, its transcript, and the
//! send path through the sensitive-topic filter to the bot.
//!
//! Methods take `&mut self`, so operations on one manager never overlap.
//! A `switch_session` awaiting its history therefore cannot be interleaved
//! with a send on the same manager. Requests already sent are not cancelled
//! when the user moves on; a front end that drives several managers from
//! one window has to order their results itself.

use std::time::Duration;

use chrono::{Local, NaiveDate, Utc};
use rand::Rng;
use tracing::{debug, info, warn};

use super::backend::ChatBackend;
use super::cooldown::SendCooldown;
use super::dates;
use super::sensitive_topics;
use crate::error::PortalError;
use crate::i18n::{self, Language};
use crate::models::{
    ChatSession, Role, SaveMessageRequest, SessionCheck, SessionSummary, StoredMessage,
};
use crate::render::{RenderTarget, RenderedMessage};

const SESSION_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SESSION_ID_SUFFIX_LEN: usize = 9;
const PREVIEW_CHARS: usize = 50;

/// Placeholder key of the unsaved conversation in the sidebar.
pub const CURRENT_SESSION_KEY: &str = "current";

/// `session_<epoch-ms>_<9 base36 chars>`.
pub fn generate_session_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SESSION_ID_SUFFIX_LEN)
        .map(|_| SESSION_ID_ALPHABET[rng.gen_range(0..SESSION_ID_ALPHABET.len())] as char)
        .collect();
    format!("session_{}_{}", Utc::now().timestamp_millis(), suffix)
}

pub fn format_session_date(started_at: Option<&str>, today: NaiveDate) -> String {
    match started_at {
        Some(raw) => dates::session_date_label(raw, today),
        None => "Today".to_string(),
    }
}

pub fn session_preview(preview: Option<&str>) -> String {
    match preview.map(str::trim).filter(|p| !p.is_empty()) {
        Some(text) => format!("{}...", text.chars().take(PREVIEW_CHARS).collect::<String>()),
        None => "No messages".to_string(),
    }
}

/// A sidebar row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionListEntry {
    pub session_key: String,
    pub date_label: String,
    pub preview: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input.
    Ignored,
    CoolingDown { remaining_secs: u64 },
    Replied { reply: String },
}

pub struct ChatSessionManager {
    session: ChatSession,
    identity: SessionCheck,
    sessions: Vec<SessionSummary>,
    cooldown: SendCooldown,
    language: Language,
}

impl ChatSessionManager {
    pub fn new(cooldown: Duration, language: Language) -> Self {
        Self {
            session: ChatSession {
                session_id: generate_session_id(),
                user_id: None,
                history_loaded: false,
            },
            identity: SessionCheck::default(),
            sessions: Vec::new(),
            cooldown: SendCooldown::new(cooldown),
            language,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn identity(&self) -> &SessionCheck {
        &self.identity
    }

    pub fn user_id(&self) -> Option<&str> {
        self.session.user_id.as_deref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.user_id.is_some()
    }

    pub fn sessions(&self) -> &[SessionSummary] {
        &self.sessions
    }

    pub fn cooldown(&self) -> &SendCooldown {
        &self.cooldown
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Sidebar rows. With no stored sessions there is a single placeholder
    /// for the conversation in progress.
    pub fn session_list(&self, today: NaiveDate) -> Vec<SessionListEntry> {
        if self.sessions.is_empty() {
            return vec![SessionListEntry {
                session_key: CURRENT_SESSION_KEY.to_string(),
                date_label: "Today".to_string(),
                preview: "New conversation".to_string(),
                active: true,
            }];
        }

        self.sessions
            .iter()
            .map(|s| SessionListEntry {
                session_key: s.session_key.clone(),
                date_label: format_session_date(s.started_at.as_deref(), today),
                preview: session_preview(s.preview.as_deref()),
                active: s.session_key == self.session.session_id,
            })
            .collect()
    }

    pub fn session_list_today(&self) -> Vec<SessionListEntry> {
        self.session_list(Local::now().date_naive())
    }

    /// Find out who is signed in, adopt their most recent conversation and
    /// show its history. Signed-out users get a fresh session.
    pub async fn initialize(
        &mut self,
        backend: &dyn ChatBackend,
        render: &mut dyn RenderTarget,
    ) -> &[SessionSummary] {
        self.identity = match backend.check_session().await {
            Ok(check) if check.authenticated => check,
            Ok(_) => SessionCheck::default(),
            Err(e) => {
                warn!(error = %e, "Could not fetch user session");
                SessionCheck::default()
            }
        };
        self.session.user_id = self.identity.user_id.clone();
        self.session.history_loaded = false;

        let Some(user_id) = self.session.user_id.clone() else {
            info!("User not authenticated, starting a fresh session");
            self.session.session_id = generate_session_id();
            self.show_welcome(render);
            return &self.sessions;
        };

        info!(user_id = %user_id, "User authenticated");
        match backend.list_sessions(&user_id).await {
            Ok(sessions) if !sessions.is_empty() => {
                self.session.session_id = sessions[0].session_key.clone();
                self.sessions = sessions;
                debug!(session_id = %self.session.session_id, "Using existing session");
                if !self.load_history(backend, render).await {
                    self.show_welcome(render);
                }
            }
            Ok(_) => {
                self.sessions.clear();
                self.session.session_id = generate_session_id();
                self.show_welcome(render);
            }
            Err(e) => {
                warn!(error = %e, "Could not initialize chat session");
                self.sessions.clear();
                self.session.session_id = generate_session_id();
                self.show_welcome(render);
            }
        }

        &self.sessions
    }

    fn show_welcome(&self, render: &mut dyn RenderTarget) {
        render.clear();
        render.append(RenderedMessage::plain(Role::Bot, i18n::welcome(self.language)));
    }

    fn show_history(&self, messages: Vec<StoredMessage>, render: &mut dyn RenderTarget) {
        render.clear();
        for message in messages {
            let rendered = match message.message_role {
                Role::Bot => RenderedMessage::bot_markdown(&message.message_text),
                role => RenderedMessage::plain(role, &message.message_text),
            };
            render.append(rendered);
        }
    }

    /// Fresh conversation. Signed-in users get it registered server-side
    /// right away so it shows up in the sidebar.
    pub async fn start_new_chat(&mut self, backend: &dyn ChatBackend, render: &mut dyn RenderTarget) {
        let previous = std::mem::replace(&mut self.session.session_id, generate_session_id());
        self.session.history_loaded = false;
        debug!(previous = %previous, new = %self.session.session_id, "Starting new chat");

        self.show_welcome(render);

        if self.is_signed_in() {
            let registration = i18n::session_registered(self.language).to_string();
            if self.save(&registration, Role::System, backend).await {
                self.refresh_sessions(backend).await;
            }
        }
    }

    pub async fn refresh_sessions(&mut self, backend: &dyn ChatBackend) {
        let Some(user_id) = self.session.user_id.clone() else {
            return;
        };
        match backend.list_sessions(&user_id).await {
            Ok(sessions) => self.sessions = sessions,
            Err(e) => warn!(error = %e, "Error loading chat sessions"),
        }
    }

    /// Load the active session's history once. Returns whether anything was
    /// shown.
    pub async fn load_history(
        &mut self,
        backend: &dyn ChatBackend,
        render: &mut dyn RenderTarget,
    ) -> bool {
        if self.session.history_loaded {
            debug!("Skipping chat history load: already loaded");
            return false;
        }
        let Some(user_id) = self.session.user_id.clone() else {
            debug!("Skipping chat history load: not signed in");
            return false;
        };

        match backend.load_messages(&user_id, &self.session.session_id).await {
            Ok(messages) if !messages.is_empty() => {
                self.show_history(messages, render);
                self.session.history_loaded = true;
                true
            }
            Ok(_) => {
                debug!("No chat history found");
                false
            }
            Err(e) => {
                warn!(error = %e, "Could not load chat history");
                false
            }
        }
    }

    /// Show another stored conversation. Empty or unreachable sessions leave
    /// the current one untouched.
    ///
    /// In-flight requests of the previous session are not cancelled; a reply
    /// that arrives late still lands in whatever transcript is current.
    pub async fn switch_session(
        &mut self,
        session_key: &str,
        backend: &dyn ChatBackend,
        render: &mut dyn RenderTarget,
    ) -> bool {
        let Some(user_id) = self.session.user_id.clone() else {
            return false;
        };
        if session_key.is_empty() {
            return false;
        }

        match backend.load_messages(&user_id, session_key).await {
            Ok(messages) if !messages.is_empty() => {
                self.show_history(messages, render);
                self.session.session_id = session_key.to_string();
                self.session.history_loaded = true;
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!(error = %e, session = session_key, "Could not load session chat");
                false
            }
        }
    }

    /// Delete a stored conversation. Returns `false` without calling the
    /// server for the placeholder row, an empty key or a signed-out user.
    pub async fn delete_session(
        &mut self,
        session_key: &str,
        backend: &dyn ChatBackend,
    ) -> Result<bool, PortalError> {
        if session_key.is_empty() || session_key == CURRENT_SESSION_KEY {
            return Ok(false);
        }
        let Some(user_id) = self.session.user_id.clone() else {
            return Ok(false);
        };

        backend.delete_session(&user_id, session_key).await?;
        info!(session = session_key, "Chat session deleted");
        self.sessions.retain(|s| s.session_key != session_key);
        self.refresh_sessions(backend).await;
        Ok(true)
    }

    pub async fn send_message(
        &mut self,
        text: &str,
        backend: &dyn ChatBackend,
        render: &mut dyn RenderTarget,
    ) -> SendOutcome {
        let message = text.trim();
        if message.is_empty() {
            return SendOutcome::Ignored;
        }
        if self.cooldown.is_active() {
            return SendOutcome::CoolingDown {
                remaining_secs: self.cooldown.remaining_secs(),
            };
        }
        self.cooldown.start();

        render.append(RenderedMessage::plain(Role::User, message));
        self.save(message, Role::User, backend).await;

        let reply = self.bot_reply(message, backend).await;
        render.append(RenderedMessage::bot_markdown(&reply));
        self.save(&reply, Role::Bot, backend).await;

        SendOutcome::Replied { reply }
    }

    async fn bot_reply(&self, message: &str, backend: &dyn ChatBackend) -> String {
        if let Some(topic) = sensitive_topics::matched_topic(message) {
            info!(%topic, "Refusing sensitive topic");
            return i18n::sensitive_topic_refusal(self.language).to_string();
        }

        match backend.bot_response(message, self.language).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Error getting bot response");
                i18n::technical_difficulties(self.language).to_string()
            }
        }
    }

    async fn save(&self, message: &str, sender: Role, backend: &dyn ChatBackend) -> bool {
        let request = SaveMessageRequest {
            session_id: self.session.session_id.clone(),
            message: message.to_string(),
            sender,
            language: self.language,
            user_id: self.session.user_id.clone(),
        };
        match backend.save_message(&request).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, sender = sender.as_str(), "Error saving chat message");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Transcript;
    use crate::services::testing::FakePortal;

    fn manager() -> ChatSessionManager {
        ChatSessionManager::new(Duration::from_secs(30), Language::En)
    }

    #[test]
    fn session_ids_have_the_portal_shape() {
        let id = generate_session_id();
        let parts: Vec<&str> = id.splitn(3, '_').collect();
        assert_eq!(parts[0], "session");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(generate_session_id(), id);
    }

    #[test]
    fn previews_are_cut_at_fifty_chars() {
        assert_eq!(session_preview(None), "No messages");
        assert_eq!(session_preview(Some("  ")), "No messages");
        assert_eq!(session_preview(Some("hi")), "hi...");
        let long = "a".repeat(80);
        assert_eq!(session_preview(Some(&long)), format!("{}...", "a".repeat(50)));
    }

    #[tokio::test]
    async fn signed_out_user_gets_a_fresh_session() {
        let backend = FakePortal::signed_out();
        let mut chat = manager();
        let mut transcript = Transcript::new();

        let sessions = chat.initialize(&backend, &mut transcript).await;
        assert!(sessions.is_empty());
        assert!(!chat.is_signed_in());
        assert!(chat.session().session_id.starts_with("session_"));
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.messages()[0].text, i18n::welcome(Language::En));

        let list = chat.session_list(NaiveDate::from_ymd_opt(2025, 5, 3).unwrap());
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].session_key, CURRENT_SESSION_KEY);
    }

    #[tokio::test]
    async fn signed_in_user_resumes_latest_session() {
        let backend = FakePortal::signed_in("17").with_history(
            "session_1_abc",
            &[(Role::User, "Where is the library?"), (Role::Bot, "**Level 2**")],
        );
        let mut chat = manager();
        let mut transcript = Transcript::new();

        chat.initialize(&backend, &mut transcript).await;

        assert_eq!(chat.user_id(), Some("17"));
        assert_eq!(chat.session().session_id, "session_1_abc");
        assert!(chat.session().history_loaded);
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[1].html, "<p><strong>Level 2</strong></p>");

        // Already loaded, so a second load is skipped.
        assert!(!chat.load_history(&backend, &mut transcript).await);
    }

    #[tokio::test]
    async fn unreachable_session_endpoint_reads_as_signed_out() {
        let backend = FakePortal { offline: true, ..FakePortal::signed_in("17") };
        let mut chat = manager();
        let mut transcript = Transcript::new();

        chat.initialize(&backend, &mut transcript).await;
        assert!(!chat.is_signed_in());
        assert_eq!(transcript.len(), 1);
    }

    #[tokio::test]
    async fn send_renders_saves_and_starts_cooldown() {
        let backend = FakePortal::signed_in("17");
        let mut chat = manager();
        let mut transcript = Transcript::new();
        chat.initialize(&backend, &mut transcript).await;
        transcript.clear();

        let outcome = chat.send_message("  When does the library open?  ", &backend, &mut transcript).await;
        assert_eq!(
            outcome,
            SendOutcome::Replied { reply: "**Library** opens at 8am.".to_string() }
        );
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].text, "When does the library open?");
        assert_eq!(
            transcript.messages()[1].html,
            "<p><strong>Library</strong> opens at 8am.</p>"
        );
        assert_eq!(
            backend.saved_texts(),
            vec![
                (Role::User, "When does the library open?".to_string()),
                (Role::Bot, "**Library** opens at 8am.".to_string()),
            ]
        );

        let blocked = chat.send_message("again", &backend, &mut transcript).await;
        assert!(matches!(blocked, SendOutcome::CoolingDown { remaining_secs } if remaining_secs > 0));
        assert_eq!(transcript.len(), 2);
    }

    #[tokio::test]
    async fn blank_input_is_ignored_without_cooldown() {
        let backend = FakePortal::signed_out();
        let mut chat = manager();
        let mut transcript = Transcript::new();

        assert_eq!(chat.send_message("   ", &backend, &mut transcript).await, SendOutcome::Ignored);
        assert!(!chat.cooldown().is_active());
        assert!(transcript.is_empty());
    }

    #[tokio::test]
    async fn sensitive_topics_never_reach_the_bot() {
        let backend = FakePortal::signed_out();
        let mut chat = manager();
        let mut transcript = Transcript::new();

        let outcome = chat.send_message("Tell me about POLITICS", &backend, &mut transcript).await;
        assert_eq!(
            outcome,
            SendOutcome::Replied { reply: i18n::sensitive_topic_refusal(Language::En).to_string() }
        );
        assert!(backend.bot_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bot_failure_falls_back_to_localized_apology() {
        let backend = FakePortal { bot_reply: None, ..FakePortal::signed_out() };
        let mut chat = ChatSessionManager::new(Duration::ZERO, Language::Bm);
        let mut transcript = Transcript::new();

        let outcome = chat.send_message("Bila peperiksaan?", &backend, &mut transcript).await;
        assert_eq!(
            outcome,
            SendOutcome::Replied { reply: i18n::technical_difficulties(Language::Bm).to_string() }
        );
    }

    #[tokio::test]
    async fn new_chat_registers_session_for_signed_in_users() {
        let backend = FakePortal::signed_in("17");
        let mut chat = manager();
        let mut transcript = Transcript::new();
        chat.initialize(&backend, &mut transcript).await;
        let before = chat.session().session_id.clone();

        chat.start_new_chat(&backend, &mut transcript).await;

        assert_ne!(chat.session().session_id, before);
        assert!(!chat.session().history_loaded);
        assert_eq!(transcript.len(), 1);
        let saved = backend.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].sender, Role::System);
        assert_eq!(saved[0].message, "New chat session started");
        assert_eq!(saved[0].session_id, chat.session().session_id);
    }

    #[tokio::test]
    async fn switching_to_an_empty_session_keeps_the_current_one() {
        let backend = FakePortal::signed_in("17")
            .with_history("session_1_abc", &[(Role::User, "first")])
            .with_history("session_2_def", &[(Role::Bot, "second")]);
        let mut chat = manager();
        let mut transcript = Transcript::new();
        chat.initialize(&backend, &mut transcript).await;

        assert!(chat.switch_session("session_2_def", &backend, &mut transcript).await);
        assert_eq!(chat.session().session_id, "session_2_def");
        assert_eq!(transcript.messages()[0].text, "second");

        assert!(!chat.switch_session("session_9_zzz", &backend, &mut transcript).await);
        assert_eq!(chat.session().session_id, "session_2_def");
        assert_eq!(transcript.len(), 1);
    }

    #[tokio::test]
    async fn delete_skips_placeholder_and_empty_keys() {
        let backend = FakePortal::signed_in("17").with_history("session_1_abc", &[(Role::User, "hi")]);
        let mut chat = manager();
        let mut transcript = Transcript::new();
        chat.initialize(&backend, &mut transcript).await;

        assert!(!chat.delete_session("", &backend).await.unwrap());
        assert!(!chat.delete_session(CURRENT_SESSION_KEY, &backend).await.unwrap());
        assert!(backend.deleted.lock().unwrap().is_empty());

        assert!(chat.delete_session("session_1_abc", &backend).await.unwrap());
        assert_eq!(*backend.deleted.lock().unwrap(), vec!["session_1_abc".to_string()]);
        assert!(chat.sessions().is_empty());
    }
}
