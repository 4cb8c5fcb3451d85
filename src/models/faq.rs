use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use super::lenient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    #[serde(default, deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(default)]
    pub question_text: String,
    #[serde(default)]
    pub answer_text: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub view_count: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub helpful_count: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub unhelpful_count: i64,
    #[serde(default = "visible_by_default", deserialize_with = "visibility")]
    pub is_visible: i64,
    #[serde(default)]
    pub source: Option<String>,
}

fn visible_by_default() -> i64 {
    1
}

fn visibility<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => 1,
        Some(serde_json::Value::Bool(b)) => i64::from(b),
        Some(serde_json::Value::Number(n)) => n.as_i64().unwrap_or(1),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(1),
        Some(_) => 1,
    })
}

impl Faq {
    pub fn is_visible(&self) -> bool {
        self.is_visible != 0
    }

    /// Generated FAQs come from the "smart" source or use ids from 1000 up.
    pub fn is_smart(&self) -> bool {
        self.source.as_deref() == Some("smart") || self.id >= 1000
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Helpful,
    Unhelpful,
}

impl VoteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteKind::Helpful => "helpful",
            VoteKind::Unhelpful => "unhelpful",
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "helpful" | "up" | "yes" => Ok(VoteKind::Helpful),
            "unhelpful" | "down" | "no" => Ok(VoteKind::Unhelpful),
            other => Err(format!("Unknown vote: {}", other)),
        }
    }
}

/// `api/faq.php?action=get-stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaqStats {
    #[serde(default, deserialize_with = "lenient::int")]
    pub total: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub this_month: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub total_views: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub total_helpful: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub total_unhelpful: i64,
}

impl FaqStats {
    /// Totals recomputed from an admin FAQ list.
    pub fn from_faqs(faqs: &[Faq]) -> Self {
        Self {
            total: faqs.len() as i64,
            this_month: 0,
            total_views: faqs.iter().map(|f| f.view_count).sum(),
            total_helpful: faqs.iter().map(|f| f.helpful_count).sum(),
            total_unhelpful: faqs.iter().map(|f| f.unhelpful_count).sum(),
        }
    }
}
