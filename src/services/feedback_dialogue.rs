//! The feedback wizard layered onto the chat panel.
//!
//! ```text
//! Idle -> AwaitingCategory -> AwaitingContent -> Submitting -> Idle
//! ```
//!
//! Strictly linear: an invalid category number re-prompts in place and
//! there is no way back to an earlier step. Every transition appends one
//! plain-text bot message to the render target.

use std::time::Duration;

use tracing::{info, warn};

use super::backend::FeedbackBackend;
use crate::i18n::{self, Language, Prompt};
use crate::models::{default_categories, FeedbackCategory, FeedbackSubmission, Role};
use crate::render::{RenderTarget, RenderedMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialoguePhase {
    #[default]
    Idle,
    AwaitingCategory,
    AwaitingContent,
    Submitting,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackDialogueState {
    pub phase: DialoguePhase,
    pub selected_category: Option<FeedbackCategory>,
    pub content: String,
}

impl FeedbackDialogueState {
    pub fn is_active(&self) -> bool {
        self.phase != DialoguePhase::Idle
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueOutcome {
    /// Blank input, or input while idle or submitting.
    Ignored,
    /// Category list shown.
    Opened,
    SignInRequired,
    InvalidSelection,
    CategorySelected(FeedbackCategory),
    Submitted { reference: String },
    /// Submission failed; the dialogue is back to idle.
    Failed { error: Option<String> },
}

pub struct FeedbackDialogue {
    state: FeedbackDialogueState,
    categories: Vec<FeedbackCategory>,
    language: Language,
    reset_delay: Duration,
}

impl FeedbackDialogue {
    pub fn new(language: Language, reset_delay: Duration) -> Self {
        Self::with_categories(default_categories(), language, reset_delay)
    }

    pub fn with_categories(
        categories: Vec<FeedbackCategory>,
        language: Language,
        reset_delay: Duration,
    ) -> Self {
        Self {
            state: FeedbackDialogueState::default(),
            categories,
            language,
            reset_delay,
        }
    }

    pub fn state(&self) -> &FeedbackDialogueState {
        &self.state
    }

    pub fn phase(&self) -> DialoguePhase {
        self.state.phase
    }

    pub fn categories(&self) -> &[FeedbackCategory] {
        &self.categories
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Hint for the input box in the current phase.
    pub fn placeholder(&self) -> String {
        match self.state.phase {
            DialoguePhase::AwaitingCategory => {
                i18n::enter_category_placeholder(self.language, self.categories.len())
            }
            DialoguePhase::Idle => Prompt::SignInFirst.text(self.language).to_string(),
            _ => String::new(),
        }
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    fn say(&self, render: &mut dyn RenderTarget, text: &str) {
        render.append(RenderedMessage::plain(Role::Bot, text));
    }

    /// Open the panel: clear it and show the category list, or the sign-in
    /// notice when nobody is signed in.
    pub fn open(&mut self, signed_in: bool, render: &mut dyn RenderTarget) -> DialogueOutcome {
        self.state.reset();
        render.clear();

        if !signed_in {
            self.say(render, Prompt::SignInRequired.text(self.language));
            return DialogueOutcome::SignInRequired;
        }

        let list = self
            .categories
            .iter()
            .enumerate()
            .map(|(idx, cat)| format!("{}. {}", idx + 1, cat.label_for(self.language)))
            .collect::<Vec<_>>()
            .join("\n");
        let greeting = format!("{}\n\n{}", Prompt::Greeting.text(self.language), list);
        self.say(render, &greeting);

        self.state.phase = DialoguePhase::AwaitingCategory;
        DialogueOutcome::Opened
    }

    /// Feed one line of user input to the dialogue.
    ///
    /// Content input runs the submission to completion before returning. On
    /// success the state is held for the reset delay so the reference stays
    /// on screen, then cleared.
    pub async fn handle_input(
        &mut self,
        input: &str,
        backend: &dyn FeedbackBackend,
        render: &mut dyn RenderTarget,
    ) -> DialogueOutcome {
        let input = input.trim();
        if input.is_empty() {
            return DialogueOutcome::Ignored;
        }

        match self.state.phase {
            DialoguePhase::Idle | DialoguePhase::Submitting => DialogueOutcome::Ignored,
            DialoguePhase::AwaitingCategory => self.select_category(input, render),
            DialoguePhase::AwaitingContent => {
                self.capture_content(input, render);
                self.submit(backend, render).await
            }
        }
    }

    fn select_category(&mut self, input: &str, render: &mut dyn RenderTarget) -> DialogueOutcome {
        let count = self.categories.len();
        let chosen = input
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=count).contains(n))
            .map(|n| self.categories[n - 1].clone());

        let Some(category) = chosen else {
            self.say(render, &i18n::invalid_selection(self.language, count));
            return DialogueOutcome::InvalidSelection;
        };

        let message = format!(
            "{}. {}",
            category.label_for(self.language),
            Prompt::CategorySelected.text(self.language)
        );
        self.say(render, &message);

        self.state.selected_category = Some(category.clone());
        self.state.phase = DialoguePhase::AwaitingContent;
        DialogueOutcome::CategorySelected(category)
    }

    fn capture_content(&mut self, input: &str, render: &mut dyn RenderTarget) {
        self.state.content = input.to_string();
        self.state.phase = DialoguePhase::Submitting;

        let label = self
            .state
            .selected_category
            .as_ref()
            .map(|c| c.label_for(self.language).to_string())
            .unwrap_or_default();
        let summary = i18n::feedback_summary(self.language, &label, &self.state.content);
        self.say(render, &summary);
    }

    async fn submit(
        &mut self,
        backend: &dyn FeedbackBackend,
        render: &mut dyn RenderTarget,
    ) -> DialogueOutcome {
        let Some(category) = self.state.selected_category.clone() else {
            self.state.reset();
            return DialogueOutcome::Failed { error: None };
        };
        let submission = FeedbackSubmission::new(&category, &self.state.content);

        match backend.submit_feedback(&submission).await {
            Ok(receipt) => {
                info!(reference = %receipt.reference, category = %category.id, "Feedback submitted");
                let confirmation = format!(
                    "{}{}. {}",
                    Prompt::Confirm.text(self.language),
                    receipt.reference,
                    Prompt::Appreciative.text(self.language)
                );
                self.say(render, &confirmation);

                if !self.reset_delay.is_zero() {
                    tokio::time::sleep(self.reset_delay).await;
                }
                self.state.reset();
                DialogueOutcome::Submitted {
                    reference: receipt.reference,
                }
            }
            Err(e) => {
                warn!(error = %e, "Feedback submission error");
                let server_error = e.server_message().map(str::to_string);
                let message = match &server_error {
                    Some(detail) => format!("{} {}", Prompt::Error.text(self.language), detail),
                    None => Prompt::Error.text(self.language).to_string(),
                };
                self.say(render, &message);

                self.state.reset();
                DialogueOutcome::Failed { error: server_error }
            }
        }
    }
}
