//! In-memory portal used by controller tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::backend::{AdminBackend, ChatBackend, FaqBackend, FeedbackBackend, ProfileBackend};
use crate::error::PortalError;
use crate::i18n::Language;
use crate::models::{
    AdminProfile, CategoryCount, DisplayNameUpdate, Faq, FaqPerformance, FaqStats, FeedbackForm,
    FeedbackRecord, FeedbackStats, FeedbackSubmission, LatencyPoint, PortalStatistics,
    ResolveRequest, Role, SaveMessageRequest, SessionCheck, SessionSummary, StoredMessage,
    SubmissionReceipt, TrendPoint, UserProfile, VoteKind,
};

#[derive(Default)]
pub struct FakePortal {
    /// Every call fails as if the server were down.
    pub offline: bool,

    pub identity: SessionCheck,
    pub sessions: Mutex<Vec<SessionSummary>>,
    pub messages: Mutex<HashMap<String, Vec<StoredMessage>>>,
    pub saved: Mutex<Vec<SaveMessageRequest>>,
    pub deleted: Mutex<Vec<String>>,
    pub bot_reply: Option<String>,
    pub bot_calls: Mutex<Vec<String>>,

    pub submit_result: Option<Result<String, String>>,
    pub submissions: Mutex<Vec<FeedbackSubmission>>,
    pub forms: Mutex<Vec<FeedbackForm>>,

    pub faqs: Vec<Faq>,
    pub faq_categories_requested: Mutex<Vec<String>>,
    pub viewed: Mutex<Vec<i64>>,
    pub votes: Mutex<Vec<(i64, VoteKind)>>,
    pub vote_error: Option<String>,

    pub user: Option<UserProfile>,
    pub user_feedback: Vec<FeedbackRecord>,
    pub resolved: Vec<FeedbackRecord>,
    pub name_updates: Mutex<Vec<DisplayNameUpdate>>,
    pub statistics: PortalStatistics,

    pub feedback_stats: Option<FeedbackStats>,
    pub faq_stats: Option<FaqStats>,
    pub feedback: Mutex<Vec<FeedbackRecord>>,
    pub pending: Option<Vec<FeedbackRecord>>,
    pub resolutions: Mutex<Vec<(i64, String)>>,
    pub admin_faqs: Mutex<Vec<Faq>>,
    pub category_counts: Vec<CategoryCount>,
    pub performance: Vec<FaqPerformance>,
    pub trend: Vec<TrendPoint>,
    pub latency: Vec<LatencyPoint>,
    pub admin: Option<AdminProfile>,
    pub logged_out: Mutex<bool>,
}

impl FakePortal {
    pub fn signed_in(user_id: &str) -> Self {
        Self {
            identity: SessionCheck {
                authenticated: true,
                user_id: Some(user_id.to_string()),
                name: Some("Nur Aisyah".to_string()),
                email: Some("aisyah@student.ums.edu.my".to_string()),
            },
            bot_reply: Some("**Library** opens at 8am.".to_string()),
            submit_result: Some(Ok("FB-2025-0042".to_string())),
            ..Default::default()
        }
    }

    pub fn signed_out() -> Self {
        Self {
            bot_reply: Some("Hello!".to_string()),
            submit_result: Some(Ok("FB-2025-0042".to_string())),
            ..Default::default()
        }
    }

    pub fn with_history(self, session_key: &str, history: &[(Role, &str)]) -> Self {
        let stored = history
            .iter()
            .map(|(role, text)| StoredMessage {
                message_role: *role,
                message_text: text.to_string(),
                created_at: None,
            })
            .collect();
        self.messages.lock().unwrap().insert(session_key.to_string(), stored);
        self.sessions.lock().unwrap().push(SessionSummary {
            session_key: session_key.to_string(),
            started_at: Some("2025-05-03 09:00:00".to_string()),
            preview: history.last().map(|(_, text)| text.to_string()),
        });
        self
    }

    pub fn saved_texts(&self) -> Vec<(Role, String)> {
        self.saved
            .lock()
            .unwrap()
            .iter()
            .map(|r| (r.sender, r.message.clone()))
            .collect()
    }

    fn online(&self) -> Result<(), PortalError> {
        if self.offline {
            Err(PortalError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "portal unreachable",
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChatBackend for FakePortal {
    async fn check_session(&self) -> Result<SessionCheck, PortalError> {
        self.online()?;
        Ok(self.identity.clone())
    }

    async fn list_sessions(&self, _user_id: &str) -> Result<Vec<SessionSummary>, PortalError> {
        self.online()?;
        Ok(self.sessions.lock().unwrap().clone())
    }

    async fn load_messages(
        &self,
        _user_id: &str,
        session_id: &str,
    ) -> Result<Vec<StoredMessage>, PortalError> {
        self.online()?;
        Ok(self
            .messages
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_message(&self, request: &SaveMessageRequest) -> Result<(), PortalError> {
        self.online()?;
        self.saved.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn delete_session(&self, _user_id: &str, session_id: &str) -> Result<(), PortalError> {
        self.online()?;
        self.deleted.lock().unwrap().push(session_id.to_string());
        self.sessions
            .lock()
            .unwrap()
            .retain(|s| s.session_key != session_id);
        Ok(())
    }

    async fn bot_response(&self, message: &str, _language: Language) -> Result<String, PortalError> {
        self.online()?;
        self.bot_calls.lock().unwrap().push(message.to_string());
        self.bot_reply
            .clone()
            .ok_or_else(|| PortalError::Api("bot unavailable".to_string()))
    }
}

#[async_trait]
impl FeedbackBackend for FakePortal {
    async fn submit_feedback(
        &self,
        submission: &FeedbackSubmission,
    ) -> Result<SubmissionReceipt, PortalError> {
        self.online()?;
        self.submissions.lock().unwrap().push(submission.clone());
        match &self.submit_result {
            Some(Ok(reference)) => Ok(SubmissionReceipt { reference: reference.clone() }),
            Some(Err(error)) => Err(PortalError::Api(error.clone())),
            None => Err(PortalError::api(None)),
        }
    }

    async fn submit_form(&self, form: &FeedbackForm) -> Result<(), PortalError> {
        self.online()?;
        self.forms.lock().unwrap().push(form.clone());
        Ok(())
    }
}

#[async_trait]
impl FaqBackend for FakePortal {
    async fn list_faqs(&self, category: &str) -> Result<Vec<Faq>, PortalError> {
        self.online()?;
        self.faq_categories_requested
            .lock()
            .unwrap()
            .push(category.to_string());
        Ok(self
            .faqs
            .iter()
            .filter(|f| category == "all" || f.category.as_deref() == Some(category))
            .cloned()
            .collect())
    }

    async fn track_view(&self, faq_id: i64) -> Result<(), PortalError> {
        self.online()?;
        self.viewed.lock().unwrap().push(faq_id);
        Ok(())
    }

    async fn track_vote(&self, faq_id: i64, vote: VoteKind) -> Result<(), PortalError> {
        self.online()?;
        if let Some(error) = &self.vote_error {
            return Err(PortalError::Api(error.clone()));
        }
        self.votes.lock().unwrap().push((faq_id, vote));
        Ok(())
    }
}

#[async_trait]
impl ProfileBackend for FakePortal {
    async fn current_user(&self) -> Result<Option<UserProfile>, PortalError> {
        self.online()?;
        Ok(self.user.clone())
    }

    async fn user_feedback(&self, _user_id: &str) -> Result<Vec<FeedbackRecord>, PortalError> {
        self.online()?;
        Ok(self.user_feedback.clone())
    }

    async fn resolved_feedback(&self) -> Result<Vec<FeedbackRecord>, PortalError> {
        self.online()?;
        Ok(self.resolved.clone())
    }

    async fn update_display_name(&self, update: &DisplayNameUpdate) -> Result<(), PortalError> {
        self.online()?;
        self.name_updates.lock().unwrap().push(update.clone());
        Ok(())
    }

    async fn portal_statistics(&self) -> Result<PortalStatistics, PortalError> {
        self.online()?;
        Ok(self.statistics.clone())
    }
}

#[async_trait]
impl AdminBackend for FakePortal {
    async fn feedback_stats(&self) -> Result<FeedbackStats, PortalError> {
        self.online()?;
        self.feedback_stats.clone().ok_or_else(|| PortalError::api(None))
    }

    async fn faq_stats(&self) -> Result<FaqStats, PortalError> {
        self.online()?;
        self.faq_stats.clone().ok_or_else(|| PortalError::api(None))
    }

    async fn all_feedback(&self) -> Result<Vec<FeedbackRecord>, PortalError> {
        self.online()?;
        Ok(self.feedback.lock().unwrap().clone())
    }

    async fn pending_feedback(&self) -> Result<Vec<FeedbackRecord>, PortalError> {
        self.online()?;
        self.pending.clone().ok_or_else(|| PortalError::api(None))
    }

    async fn resolve_feedback(&self, request: &ResolveRequest) -> Result<(), PortalError> {
        self.online()?;
        self.resolutions
            .lock()
            .unwrap()
            .push((request.feedback_id, request.admin_response.clone()));
        for record in self.feedback.lock().unwrap().iter_mut() {
            if record.id == request.feedback_id {
                record.status = Some("resolved".to_string());
                record.admin_response = Some(request.admin_response.clone());
            }
        }
        Ok(())
    }

    async fn public_faqs(&self) -> Result<Vec<Faq>, PortalError> {
        self.online()?;
        Ok(self.faqs.clone())
    }

    async fn admin_faqs(&self) -> Result<Vec<Faq>, PortalError> {
        self.online()?;
        Ok(self.admin_faqs.lock().unwrap().clone())
    }

    async fn delete_faq(&self, faq_id: i64) -> Result<(), PortalError> {
        self.online()?;
        self.admin_faqs.lock().unwrap().retain(|f| f.id != faq_id);
        Ok(())
    }

    async fn set_faq_visibility(&self, faq_id: i64, visible: bool) -> Result<(), PortalError> {
        self.online()?;
        for faq in self.admin_faqs.lock().unwrap().iter_mut() {
            if faq.id == faq_id {
                faq.is_visible = i64::from(visible);
            }
        }
        Ok(())
    }

    async fn category_stats(&self) -> Result<Vec<CategoryCount>, PortalError> {
        self.online()?;
        Ok(self.category_counts.clone())
    }

    async fn faq_performance(&self) -> Result<Vec<FaqPerformance>, PortalError> {
        self.online()?;
        Ok(self.performance.clone())
    }

    async fn feedback_trend(&self) -> Result<Vec<TrendPoint>, PortalError> {
        self.online()?;
        Ok(self.trend.clone())
    }

    async fn chatbot_latency(&self) -> Result<Vec<LatencyPoint>, PortalError> {
        self.online()?;
        Ok(self.latency.clone())
    }

    async fn admin_profile(&self) -> Result<AdminProfile, PortalError> {
        self.online()?;
        self.admin.clone().ok_or_else(|| PortalError::api(None))
    }

    async fn logout(&self) -> Result<(), PortalError> {
        self.online()?;
        *self.logged_out.lock().unwrap() = true;
        Ok(())
    }
}
