//! Seams between the controllers and the portal API.
//!
//! [`super::api_client::ApiClient`] implements every trait over HTTP. Tests
//! plug in in-memory fakes so the state machines run without a server.

use async_trait::async_trait;

use crate::error::PortalError;
use crate::i18n::Language;
use crate::models::{
    AdminProfile, CategoryCount, DisplayNameUpdate, Faq, FaqPerformance, FaqStats, FeedbackForm,
    FeedbackRecord, FeedbackStats, FeedbackSubmission, LatencyPoint, PortalStatistics,
    ResolveRequest, SaveMessageRequest, SessionCheck, SessionSummary, StoredMessage,
    SubmissionReceipt, TrendPoint, UserProfile, VoteKind,
};

/// Chat persistence and the rule-based bot.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Who is signed in. An unreachable session endpoint reads as signed out.
    async fn check_session(&self) -> Result<SessionCheck, PortalError>;

    /// Sessions of a user, most recent first.
    async fn list_sessions(&self, user_id: &str) -> Result<Vec<SessionSummary>, PortalError>;

    async fn load_messages(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<Vec<StoredMessage>, PortalError>;

    /// Upserts the session on first use.
    async fn save_message(&self, request: &SaveMessageRequest) -> Result<(), PortalError>;

    async fn delete_session(&self, user_id: &str, session_id: &str) -> Result<(), PortalError>;

    async fn bot_response(&self, message: &str, language: Language) -> Result<String, PortalError>;
}

#[async_trait]
pub trait FeedbackBackend: Send + Sync {
    async fn submit_feedback(
        &self,
        submission: &FeedbackSubmission,
    ) -> Result<SubmissionReceipt, PortalError>;

    /// The classic modal form on the student home page.
    async fn submit_form(&self, form: &FeedbackForm) -> Result<(), PortalError>;
}

#[async_trait]
pub trait FaqBackend: Send + Sync {
    /// Visible FAQs of a category (`all` for every category).
    async fn list_faqs(&self, category: &str) -> Result<Vec<Faq>, PortalError>;

    async fn track_view(&self, faq_id: i64) -> Result<(), PortalError>;

    async fn track_vote(&self, faq_id: i64, vote: VoteKind) -> Result<(), PortalError>;
}

#[async_trait]
pub trait ProfileBackend: Send + Sync {
    async fn current_user(&self) -> Result<Option<UserProfile>, PortalError>;

    async fn user_feedback(&self, user_id: &str) -> Result<Vec<FeedbackRecord>, PortalError>;

    async fn resolved_feedback(&self) -> Result<Vec<FeedbackRecord>, PortalError>;

    async fn update_display_name(&self, update: &DisplayNameUpdate) -> Result<(), PortalError>;

    async fn portal_statistics(&self) -> Result<PortalStatistics, PortalError>;
}

#[async_trait]
pub trait AdminBackend: Send + Sync {
    async fn feedback_stats(&self) -> Result<FeedbackStats, PortalError>;
    async fn faq_stats(&self) -> Result<FaqStats, PortalError>;

    async fn all_feedback(&self) -> Result<Vec<FeedbackRecord>, PortalError>;
    async fn pending_feedback(&self) -> Result<Vec<FeedbackRecord>, PortalError>;
    async fn resolve_feedback(&self, request: &ResolveRequest) -> Result<(), PortalError>;

    /// Student-visible FAQs, as used by the statistics export.
    async fn public_faqs(&self) -> Result<Vec<Faq>, PortalError>;
    /// Every FAQ including hidden ones.
    async fn admin_faqs(&self) -> Result<Vec<Faq>, PortalError>;
    async fn delete_faq(&self, faq_id: i64) -> Result<(), PortalError>;
    async fn set_faq_visibility(&self, faq_id: i64, visible: bool) -> Result<(), PortalError>;

    async fn category_stats(&self) -> Result<Vec<CategoryCount>, PortalError>;
    async fn faq_performance(&self) -> Result<Vec<FaqPerformance>, PortalError>;
    async fn feedback_trend(&self) -> Result<Vec<TrendPoint>, PortalError>;
    async fn chatbot_latency(&self) -> Result<Vec<LatencyPoint>, PortalError>;

    async fn admin_profile(&self) -> Result<AdminProfile, PortalError>;
    async fn logout(&self) -> Result<(), PortalError>;
}
