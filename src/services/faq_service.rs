use tracing::{error, warn};

use super::backend::FaqBackend;
use super::markdown::escape_html;
use crate::models::{Faq, VoteKind};

pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

/// Toast shown after an FAQ action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    fn new(level: NotificationLevel, message: &str) -> Self {
        Self { level, message: message.to_string() }
    }
}

/// FAQ list with a category filter and at most one expanded entry.
#[derive(Debug, Clone)]
pub struct FaqBrowser {
    category: String,
    faqs: Vec<Faq>,
    open_id: Option<i64>,
}

impl Default for FaqBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl FaqBrowser {
    pub fn new() -> Self {
        Self {
            category: ALL_CATEGORIES.to_string(),
            faqs: Vec::new(),
            open_id: None,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn faqs(&self) -> &[Faq] {
        &self.faqs
    }

    pub fn open_id(&self) -> Option<i64> {
        self.open_id
    }

    pub fn open_faq(&self) -> Option<&Faq> {
        self.open_id.and_then(|id| self.faqs.iter().find(|f| f.id == id))
    }

    /// The "no results" placeholder is shown when this is true.
    pub fn is_empty(&self) -> bool {
        self.faqs.is_empty()
    }

    /// Load the list for `category`; failures leave an empty list.
    pub async fn load(&mut self, category: &str, backend: &dyn FaqBackend) -> &[Faq] {
        self.category = category.to_string();
        self.reload(backend).await;
        &self.faqs
    }

    async fn reload(&mut self, backend: &dyn FaqBackend) {
        self.faqs = match backend.list_faqs(&self.category).await {
            Ok(faqs) => faqs,
            Err(e) => {
                error!(error = %e, category = %self.category, "Error loading FAQs");
                Vec::new()
            }
        };
        if self.open_id.is_some_and(|id| !self.faqs.iter().any(|f| f.id == id)) {
            self.open_id = None;
        }
    }

    /// Expand `faq_id`, collapsing any other entry, or collapse it if it is
    /// already open. Opening tracks a view. Returns whether it is now open.
    pub async fn toggle(&mut self, faq_id: i64, backend: &dyn FaqBackend) -> bool {
        if self.open_id == Some(faq_id) {
            self.open_id = None;
            return false;
        }

        self.open_id = Some(faq_id);
        if let Err(e) = backend.track_view(faq_id).await {
            error!(error = %e, faq_id, "Error tracking FAQ view");
        }
        true
    }

    pub async fn vote(
        &mut self,
        faq_id: i64,
        vote: VoteKind,
        backend: &dyn FaqBackend,
    ) -> Notification {
        match backend.track_vote(faq_id, vote).await {
            Ok(()) => {
                let message = match vote {
                    VoteKind::Helpful => "Thank you! We're glad this FAQ was helpful.",
                    VoteKind::Unhelpful => {
                        "Thank you for the feedback. We'll work on improving this FAQ."
                    }
                };
                self.reload(backend).await;
                Notification::new(NotificationLevel::Success, message)
            }
            Err(e) => match e.server_message() {
                Some(message) if message.contains("Please login") => Notification::new(
                    NotificationLevel::Warning,
                    "Please login to vote on FAQs",
                ),
                Some(message) => Notification::new(NotificationLevel::Error, message),
                None => {
                    warn!(error = %e, faq_id, "Error tracking FAQ feedback");
                    Notification::new(
                        NotificationLevel::Error,
                        "Error submitting vote. Please try again.",
                    )
                }
            },
        }
    }
}

pub fn category_label(category: &str) -> &str {
    match category {
        "academic" => "Academic",
        "technical" => "Technical",
        "account" => "Account",
        "other" => "Other",
        other => other,
    }
}

/// Answer text as HTML: bullet lines become `<li>`, the rest `<p>`.
pub fn format_answer(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            match line.strip_prefix("- ").or_else(|| line.strip_prefix("• ")) {
                Some(item) => format!("<li>{}</li>", escape_html(item)),
                None => format!("<p>{}</p>", escape_html(line)),
            }
        })
        .collect()
}

/// "1 view", "12 views"; nothing for unviewed entries.
pub fn view_count_label(count: i64) -> Option<String> {
    match count {
        0 => None,
        1 => Some("1 view".to_string()),
        n => Some(format!("{} views", n)),
    }
}
