//! The student page: language, the main chat and the feedback panel.
//!
//! The two panels keep separate views so the chat transcript survives a
//! trip through the feedback wizard.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::backend::{ChatBackend, FeedbackBackend};
use super::feedback_dialogue::{DialogueOutcome, FeedbackDialogue};
use super::session_service::{ChatSessionManager, SendOutcome};
use crate::error::PortalError;
use crate::i18n::Language;
use crate::models::{Role, SessionSummary};
use crate::render::{RenderTarget, RenderedMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Chat,
    Feedback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalOutcome {
    Chat(SendOutcome),
    Feedback(DialogueOutcome),
}

pub struct StudentPortal<B, R> {
    backend: Arc<B>,
    language: Language,
    panel: Panel,
    chat: ChatSessionManager,
    dialogue: FeedbackDialogue,
    chat_view: R,
    feedback_view: R,
}

impl<B, R> StudentPortal<B, R>
where
    B: ChatBackend + FeedbackBackend,
    R: RenderTarget,
{
    pub fn new(
        backend: Arc<B>,
        language: Language,
        cooldown: Duration,
        feedback_reset_delay: Duration,
        chat_view: R,
        feedback_view: R,
    ) -> Self {
        Self {
            backend,
            language,
            panel: Panel::Chat,
            chat: ChatSessionManager::new(cooldown, language),
            dialogue: FeedbackDialogue::new(language, feedback_reset_delay),
            chat_view,
            feedback_view,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn chat(&self) -> &ChatSessionManager {
        &self.chat
    }

    pub fn dialogue(&self) -> &FeedbackDialogue {
        &self.dialogue
    }

    pub fn chat_view(&self) -> &R {
        &self.chat_view
    }

    pub fn feedback_view(&self) -> &R {
        &self.feedback_view
    }

    pub fn is_signed_in(&self) -> bool {
        self.chat.is_signed_in()
    }

    pub async fn initialize(&mut self) -> Vec<SessionSummary> {
        self.chat
            .initialize(&*self.backend, &mut self.chat_view)
            .await
            .to_vec()
    }

    /// Switch language for everything shown from now on. Messages already
    /// rendered keep their language.
    pub fn set_language(&mut self, language: Language) {
        debug!(%language, "Language changed");
        self.language = language;
        self.chat.set_language(language);
        self.dialogue.set_language(language);
    }

    pub fn open_feedback(&mut self) -> DialogueOutcome {
        self.panel = Panel::Feedback;
        self.dialogue.open(self.chat.is_signed_in(), &mut self.feedback_view)
    }

    pub fn back_to_chat(&mut self) {
        self.panel = Panel::Chat;
        self.dialogue.reset();
    }

    /// Route one line of input to whichever panel is showing.
    pub async fn handle_input(&mut self, input: &str) -> PortalOutcome {
        match self.panel {
            Panel::Chat => PortalOutcome::Chat(
                self.chat
                    .send_message(input, &*self.backend, &mut self.chat_view)
                    .await,
            ),
            Panel::Feedback => {
                let message = input.trim();
                if !message.is_empty() {
                    self.feedback_view
                        .append(RenderedMessage::plain(Role::User, message));
                }
                let outcome = self
                    .dialogue
                    .handle_input(message, &*self.backend, &mut self.feedback_view)
                    .await;
                if matches!(outcome, DialogueOutcome::Submitted { .. }) {
                    self.back_to_chat();
                }
                PortalOutcome::Feedback(outcome)
            }
        }
    }

    pub async fn new_chat(&mut self) {
        self.panel = Panel::Chat;
        self.chat.start_new_chat(&*self.backend, &mut self.chat_view).await;
    }

    pub async fn switch_session(&mut self, session_key: &str) -> bool {
        self.panel = Panel::Chat;
        self.chat
            .switch_session(session_key, &*self.backend, &mut self.chat_view)
            .await
    }

    pub async fn delete_session(&mut self, session_key: &str) -> Result<bool, PortalError> {
        self.chat.delete_session(session_key, &*self.backend).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Transcript;
    use crate::services::feedback_dialogue::DialoguePhase;
    use crate::services::testing::FakePortal;

    fn portal(backend: FakePortal) -> StudentPortal<FakePortal, Transcript> {
        StudentPortal::new(
            Arc::new(backend),
            Language::En,
            Duration::ZERO,
            Duration::ZERO,
            Transcript::new(),
            Transcript::new(),
        )
    }

    #[tokio::test]
    async fn chat_input_reaches_the_bot() {
        let mut portal = portal(FakePortal::signed_in("17"));
        portal.initialize().await;

        let outcome = portal.handle_input("When does the library open?").await;
        assert_eq!(
            outcome,
            PortalOutcome::Chat(SendOutcome::Replied {
                reply: "**Library** opens at 8am.".to_string()
            })
        );
        assert_eq!(
            portal.chat_view().last().unwrap().html,
            "<p><strong>Library</strong> opens at 8am.</p>"
        );
    }

    #[tokio::test]
    async fn feedback_round_trip_returns_to_chat() {
        let mut portal = portal(FakePortal::signed_in("17"));
        portal.initialize().await;
        let chat_before = portal.chat_view().len();

        assert_eq!(portal.open_feedback(), DialogueOutcome::Opened);
        assert_eq!(portal.panel(), Panel::Feedback);

        portal.handle_input("4").await;
        let outcome = portal.handle_input("Shuttle bus is always late").await;

        assert_eq!(
            outcome,
            PortalOutcome::Feedback(DialogueOutcome::Submitted {
                reference: "FB-2025-0042".to_string()
            })
        );
        assert_eq!(portal.panel(), Panel::Chat);
        assert_eq!(portal.dialogue().phase(), DialoguePhase::Idle);
        assert_eq!(portal.chat_view().len(), chat_before);

        let roles: Vec<Role> = portal.feedback_view().messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::Bot, Role::User, Role::Bot, Role::User, Role::Bot, Role::Bot]
        );
    }

    #[tokio::test]
    async fn language_applies_to_both_panels() {
        let mut portal = portal(FakePortal::signed_out());
        portal.initialize().await;
        portal.set_language(Language::Bm);

        assert_eq!(portal.open_feedback(), DialogueOutcome::SignInRequired);
        assert!(portal.feedback_view().messages()[0].text.starts_with("Nampaknya"));
        assert_eq!(portal.chat().language(), Language::Bm);
    }

    #[tokio::test]
    async fn new_chat_leaves_feedback_panel() {
        let mut portal = portal(FakePortal::signed_in("17"));
        portal.initialize().await;
        portal.open_feedback();

        portal.new_chat().await;
        assert_eq!(portal.panel(), Panel::Chat);
        assert!(!portal.delete_session("current").await.unwrap());
    }
}
