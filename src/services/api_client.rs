use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use super::backend::{AdminBackend, ChatBackend, FaqBackend, FeedbackBackend, ProfileBackend};
use super::config_service::Config;
use crate::error::PortalError;
use crate::i18n::Language;
use crate::models::{
    lenient, AdminProfile, CategoryCount, DisplayNameUpdate, Faq, FaqPerformance, FaqStats,
    FeedbackForm, FeedbackRecord, FeedbackStats, FeedbackSubmission, LatencyPoint,
    PortalStatistics, ResolveRequest, SaveMessageRequest, SessionCheck, SessionSummary,
    StoredMessage, SubmissionReceipt, TrendPoint, UserProfile, VoteKind,
};

/// Places the session endpoint has been deployed under, tried in order.
const SESSION_CHECK_CANDIDATES: [&str; 3] = [
    "api/session.php?action=check",
    "/ums_feedback_system/api/session.php?action=check",
    "/api/session.php?action=check",
];

// ============================================================================
// RESPONSE ENVELOPES
// ============================================================================

/// The `{success, data, error}` shape most portal endpoints answer with.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient::id_string")]
    pub reference: String,
}

impl<T> ApiResponse<T> {
    /// `data` on success, the server's error text otherwise.
    pub fn into_result(self) -> Result<Option<T>, PortalError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(PortalError::api(self.error.or(self.message)))
        }
    }

    fn check(self) -> Result<Self, PortalError> {
        if self.success {
            Ok(self)
        } else {
            Err(PortalError::api(self.error.or(self.message)))
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    #[serde(default)]
    success: bool,
    user: Option<UserProfile>,
}

#[derive(Debug, Deserialize)]
struct UserFeedbackResponse {
    #[serde(default)]
    success: bool,
    feedback: Option<Vec<FeedbackRecord>>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AdminResponse {
    #[serde(default)]
    success: bool,
    admin: Option<AdminProfile>,
    error: Option<String>,
}

/// The latency endpoint has shipped both wrapped and bare arrays.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LatencyResponse {
    Wrapped { data: Option<Vec<LatencyPoint>> },
    Bare(Vec<LatencyPoint>),
}

/// Failures usually still carry a JSON error message. Anything else, such as
/// a PHP error page, is logged and reduced to the status code.
fn error_from_body(status: StatusCode, body: &str) -> PortalError {
    if let Ok(envelope) = serde_json::from_str::<ApiResponse<Value>>(body) {
        if let Some(error) = envelope.error.or(envelope.message) {
            return PortalError::Api(error);
        }
    }
    debug!(%status, body = body.trim(), "non-JSON error response");
    PortalError::Status(status)
}

// ============================================================================
// CLIENT
// ============================================================================

/// HTTP client for the portal API, rooted at the configured site URL.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    session_cookie: Option<String>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        session_cookie: Option<String>,
        timeout: Duration,
    ) -> Result<Self, PortalError> {
        let mut base_url = Url::parse(base_url)?;
        // Relative joins drop the last path segment unless it ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url,
            session_cookie,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, PortalError> {
        Self::new(
            &config.base_url,
            config.session_cookie.clone(),
            config.request_timeout(),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, PortalError> {
        Ok(self.base_url.join(path)?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "portal request");
        let builder = self.client.request(method, url);
        match &self.session_cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, PortalError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, PortalError> {
        let mut url = self.endpoint(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        let response = self.request(Method::GET, url).send().await?;
        Self::read_json(response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, PortalError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let response = self.request(Method::POST, url).json(body).send().await?;
        Self::read_json(response).await
    }

    pub async fn delete_json<B, T>(&self, path: &str, body: &B) -> Result<T, PortalError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let response = self.request(Method::DELETE, url).json(body).send().await?;
        Self::read_json(response).await
    }

    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<T, PortalError> {
        let url = self.endpoint(path)?;
        let response = self.request(Method::POST, url).form(form).send().await?;
        Self::read_json(response).await
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, PortalError> {
        let response: ApiResponse<Vec<T>> = self.get_json(path, &[]).await?;
        Ok(response.into_result()?.unwrap_or_default())
    }

    async fn get_data<T: DeserializeOwned + Default>(&self, path: &str) -> Result<T, PortalError> {
        let response: ApiResponse<T> = self.get_json(path, &[]).await?;
        Ok(response.into_result()?.unwrap_or_default())
    }

    fn session_check_urls(&self) -> Vec<Url> {
        let mut urls: Vec<Url> = Vec::new();
        for candidate in SESSION_CHECK_CANDIDATES {
            match self.endpoint(candidate) {
                Ok(url) if !urls.contains(&url) => urls.push(url),
                Ok(_) => {}
                Err(e) => debug!(candidate, error = %e, "skipping session endpoint"),
            }
        }
        urls
    }
}

// ============================================================================
// BACKEND IMPLEMENTATIONS
// ============================================================================

#[async_trait]
impl ChatBackend for ApiClient {
    async fn check_session(&self) -> Result<SessionCheck, PortalError> {
        for url in self.session_check_urls() {
            let response = match self.request(Method::GET, url.clone()).send().await {
                Ok(response) if response.status().is_success() => response,
                Ok(response) => {
                    debug!(%url, status = %response.status(), "session endpoint unavailable");
                    continue;
                }
                Err(e) => {
                    debug!(%url, error = %e, "session endpoint unreachable");
                    continue;
                }
            };

            let Ok(body) = response.json::<Value>().await else {
                continue;
            };
            if body.get("authenticated").is_some() {
                let check: SessionCheck = serde_json::from_value(body)?;
                return Ok(if check.authenticated { check } else { SessionCheck::default() });
            }
        }

        warn!("Failed to check auth: no reachable session endpoint");
        Ok(SessionCheck::default())
    }

    async fn list_sessions(&self, user_id: &str) -> Result<Vec<SessionSummary>, PortalError> {
        let response: ApiResponse<Vec<SessionSummary>> = self
            .get_json("students/load-chat.php", &[("user_id", user_id)])
            .await?;
        Ok(response.into_result()?.unwrap_or_default())
    }

    async fn load_messages(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<Vec<StoredMessage>, PortalError> {
        let response: ApiResponse<Vec<StoredMessage>> = self
            .get_json(
                "students/load-chat.php",
                &[("user_id", user_id), ("session_id", session_id)],
            )
            .await?;
        Ok(response.into_result()?.unwrap_or_default())
    }

    async fn save_message(&self, request: &SaveMessageRequest) -> Result<(), PortalError> {
        let response: ApiResponse<Value> = self.post_json("students/save-chat.php", request).await?;
        response.into_result().map(|_| ())
    }

    async fn delete_session(&self, user_id: &str, session_id: &str) -> Result<(), PortalError> {
        let body = json!({ "session_id": session_id, "user_id": user_id });
        let response: ApiResponse<Value> = self.delete_json("students/save-chat.php", &body).await?;
        response.into_result().map(|_| ())
    }

    async fn bot_response(&self, message: &str, language: Language) -> Result<String, PortalError> {
        let body = json!({ "message": message, "language": language });
        let response: ApiResponse<Value> = self
            .post_json("students/get-bot-response-improved.php", &body)
            .await?;
        let response = response.check()?;
        response
            .message
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| PortalError::Api("Empty bot response".to_string()))
    }
}

#[async_trait]
impl FeedbackBackend for ApiClient {
    async fn submit_feedback(
        &self,
        submission: &FeedbackSubmission,
    ) -> Result<SubmissionReceipt, PortalError> {
        let response: ApiResponse<Value> = self
            .post_json("api/feedback.php?action=submit", submission)
            .await?;
        let response = response.check()?;
        Ok(SubmissionReceipt {
            reference: response.reference,
        })
    }

    async fn submit_form(&self, form: &FeedbackForm) -> Result<(), PortalError> {
        let response: ApiResponse<Value> = self.post_json("students/submit-feedback.php", form).await?;
        response.into_result().map(|_| ())
    }
}

#[async_trait]
impl FaqBackend for ApiClient {
    async fn list_faqs(&self, category: &str) -> Result<Vec<Faq>, PortalError> {
        let response: ApiResponse<Vec<Faq>> = self
            .get_json(
                "api/faq.php",
                &[("action", "get-all"), ("category", category), ("source", "smart")],
            )
            .await?;
        Ok(response.into_result()?.unwrap_or_default())
    }

    async fn track_view(&self, faq_id: i64) -> Result<(), PortalError> {
        let body = json!({ "action": "track-view", "faq_id": faq_id });
        let response: ApiResponse<Value> = self.post_json("api/faq.php", &body).await?;
        response.into_result().map(|_| ())
    }

    async fn track_vote(&self, faq_id: i64, vote: VoteKind) -> Result<(), PortalError> {
        let body = json!({ "action": "track-vote", "faq_id": faq_id, "vote": vote.as_str() });
        let response: ApiResponse<Value> = self.post_json("api/faq.php", &body).await?;
        response
            .into_result()
            .map(|_| ())
            .map_err(|e| match e {
                PortalError::Api(message) if message == "Unknown error" => {
                    PortalError::Api("Failed to submit your vote".to_string())
                }
                other => other,
            })
    }
}

#[async_trait]
impl ProfileBackend for ApiClient {
    async fn current_user(&self) -> Result<Option<UserProfile>, PortalError> {
        let response: UserResponse = self.get_json("api/session.php?action=user", &[]).await?;
        Ok(if response.success { response.user } else { None })
    }

    async fn user_feedback(&self, user_id: &str) -> Result<Vec<FeedbackRecord>, PortalError> {
        let response: UserFeedbackResponse = self
            .get_json(
                "students/get-statistics.php",
                &[("action", "getUserFeedback"), ("user_id", user_id)],
            )
            .await?;
        if !response.success {
            return Err(PortalError::api(response.error));
        }
        Ok(response.feedback.unwrap_or_default())
    }

    async fn resolved_feedback(&self) -> Result<Vec<FeedbackRecord>, PortalError> {
        self.get_list("api/feedback.php?action=get-resolved").await
    }

    async fn update_display_name(&self, update: &DisplayNameUpdate) -> Result<(), PortalError> {
        let response: ApiResponse<Value> = self.post_json("students/update-profile.php", update).await?;
        response.into_result().map(|_| ())
    }

    async fn portal_statistics(&self) -> Result<PortalStatistics, PortalError> {
        self.get_data("students/get-statistics.php").await
    }
}

#[async_trait]
impl AdminBackend for ApiClient {
    async fn feedback_stats(&self) -> Result<FeedbackStats, PortalError> {
        self.get_data("api/feedback.php?action=get-stats").await
    }

    async fn faq_stats(&self) -> Result<FaqStats, PortalError> {
        self.get_data("api/faq.php?action=get-stats").await
    }

    async fn all_feedback(&self) -> Result<Vec<FeedbackRecord>, PortalError> {
        self.get_list("api/feedback.php?action=get-all").await
    }

    async fn pending_feedback(&self) -> Result<Vec<FeedbackRecord>, PortalError> {
        self.get_list("api/feedback.php?action=get-pending").await
    }

    async fn resolve_feedback(&self, request: &ResolveRequest) -> Result<(), PortalError> {
        let response: ApiResponse<Value> = self
            .post_json("api/feedback.php?action=resolve", request)
            .await?;
        response.into_result().map(|_| ())
    }

    async fn public_faqs(&self) -> Result<Vec<Faq>, PortalError> {
        self.get_list("api/faq.php?action=get-all").await
    }

    async fn admin_faqs(&self) -> Result<Vec<Faq>, PortalError> {
        self.get_list("api/faq.php?action=admin-get-all").await
    }

    async fn delete_faq(&self, faq_id: i64) -> Result<(), PortalError> {
        let response: ApiResponse<Value> = self
            .post_form("api/faq.php?action=admin-delete", &[("id", faq_id.to_string())])
            .await?;
        response.into_result().map(|_| ())
    }

    async fn set_faq_visibility(&self, faq_id: i64, visible: bool) -> Result<(), PortalError> {
        let form = [
            ("id", faq_id.to_string()),
            ("is_visible", if visible { "1" } else { "0" }.to_string()),
        ];
        let response: ApiResponse<Value> = self
            .post_form("api/faq.php?action=admin-toggle-visibility", &form)
            .await?;
        response.into_result().map(|_| ())
    }

    async fn category_stats(&self) -> Result<Vec<CategoryCount>, PortalError> {
        self.get_list("api/feedback.php?action=get-category-stats").await
    }

    async fn faq_performance(&self) -> Result<Vec<FaqPerformance>, PortalError> {
        self.get_list("api/faq.php?action=get-performance-stats").await
    }

    async fn feedback_trend(&self) -> Result<Vec<TrendPoint>, PortalError> {
        self.get_list("api/feedback.php?action=get-trend").await
    }

    async fn chatbot_latency(&self) -> Result<Vec<LatencyPoint>, PortalError> {
        let response: LatencyResponse = self
            .get_json("api/chat-analytics.php?action=get-latency", &[])
            .await?;
        Ok(match response {
            LatencyResponse::Wrapped { data } => data.unwrap_or_default(),
            LatencyResponse::Bare(points) => points,
        })
    }

    async fn admin_profile(&self) -> Result<AdminProfile, PortalError> {
        let response: AdminResponse = self.get_json("api/session.php?action=get-admin", &[]).await?;
        match response.admin {
            Some(admin) if response.success => Ok(admin),
            _ => Err(PortalError::api(response.error)),
        }
    }

    async fn logout(&self) -> Result<(), PortalError> {
        let url = self.endpoint("api/session.php?action=logout")?;
        let response = self.request(Method::GET, url).send().await?;
        if !response.status().is_success() {
            return Err(PortalError::Api(format!("Logout failed ({})", response.status())));
        }
        Ok(())
    }
}
