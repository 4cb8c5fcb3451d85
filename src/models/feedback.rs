use serde::{Deserialize, Serialize};
use crate::i18n::Language;
use super::lenient;

/// A category offered by the feedback dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackCategory {
    pub id: String,
    pub label: String,
    pub label_bm: String,
}

impl FeedbackCategory {
    pub fn new(id: &str, label: &str, label_bm: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            label_bm: label_bm.to_string(),
        }
    }

    pub fn label_for(&self, lang: Language) -> &str {
        lang.pick(&self.label, &self.label_bm)
    }
}

pub fn default_categories() -> Vec<FeedbackCategory> {
    vec![
        FeedbackCategory::new("facilities", "Facilities", "Kemudahan"),
        FeedbackCategory::new("academics", "Academics", "Akademik"),
        FeedbackCategory::new("administration", "Administration", "Pentadbiran"),
        FeedbackCategory::new("services", "Services", "Perkhidmatan"),
        FeedbackCategory::new("dormitory", "Dormitory", "Asrama"),
        FeedbackCategory::new("other", "Other", "Lain-lain"),
    ]
}

/// Body of `POST api/feedback.php?action=submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackSubmission {
    pub title: String,
    pub content: String,
    pub category: String,
}

impl FeedbackSubmission {
    pub fn new(category: &FeedbackCategory, content: &str) -> Self {
        Self {
            title: format!("Feedback - {}", category.id),
            content: content.to_string(),
            category: category.id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub reference: String,
}

/// The classic modal form on the student home page (`submit-feedback.php`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackForm {
    pub student_name: String,
    pub student_id: String,
    pub email: String,
    pub category: String,
    pub message: String,
    pub language: Language,
    #[serde(rename = "user_id")]
    pub user_id: Option<String>,
}

/// A feedback entry as listed by the admin and profile endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    #[serde(default, deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub admin_response: Option<String>,
    #[serde(default)]
    pub resolved_at: Option<String>,
}

impl FeedbackRecord {
    pub fn status_str(&self) -> &str {
        self.status.as_deref().unwrap_or("open")
    }

    pub fn category_str(&self) -> &str {
        self.category.as_deref().unwrap_or("General")
    }

    /// Title, or the first 50 characters of the content when there is none.
    pub fn display_title(&self) -> String {
        match self.title.as_deref().filter(|t| !t.trim().is_empty()) {
            Some(title) => title.to_string(),
            None => self.content.chars().take(50).collect(),
        }
    }
}

/// `api/feedback.php?action=get-stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackStats {
    #[serde(default, deserialize_with = "lenient::int")]
    pub total: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub this_month: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub pending: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub resolved: i64,
    #[serde(default, deserialize_with = "lenient::opt_float")]
    pub resolution_rate: Option<f64>,
}

impl FeedbackStats {
    /// Percentage of resolved feedback, rounded; zero when nothing was submitted.
    pub fn computed_resolution_rate(&self) -> i64 {
        if self.total > 0 {
            ((self.resolved as f64 / self.total as f64) * 100.0).round() as i64
        } else {
            0
        }
    }
}

/// Request body of `api/feedback.php?action=resolve`.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveRequest {
    pub feedback_id: i64,
    pub admin_response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_title_names_the_category() {
        let categories = default_categories();
        let submission = FeedbackSubmission::new(&categories[2], "Queue is too long");
        assert_eq!(submission.title, "Feedback - administration");
        assert_eq!(submission.category, "administration");
    }

    #[test]
    fn resolution_rate_handles_empty_totals() {
        let stats = FeedbackStats { total: 0, resolved: 0, ..Default::default() };
        assert_eq!(stats.computed_resolution_rate(), 0);

        let stats = FeedbackStats { total: 3, resolved: 2, ..Default::default() };
        assert_eq!(stats.computed_resolution_rate(), 67);
    }

    #[test]
    fn feedback_form_keeps_portal_field_names() {
        let form = FeedbackForm {
            student_name: "Ali".to_string(),
            student_id: "BI21".to_string(),
            email: "ali@example.edu".to_string(),
            category: "academics".to_string(),
            message: "More labs".to_string(),
            language: Language::En,
            user_id: Some("7".to_string()),
        };
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["studentName"], "Ali");
        assert_eq!(json["studentId"], "BI21");
        assert_eq!(json["user_id"], "7");
    }

    #[test]
    fn display_title_falls_back_to_content() {
        let record = FeedbackRecord {
            content: "x".repeat(80),
            ..Default::default()
        };
        assert_eq!(record.display_title().len(), 50);
    }
}
