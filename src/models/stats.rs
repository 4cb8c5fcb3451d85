use serde::{Deserialize, Serialize};
use super::lenient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub count: i64,
}

/// Hourly chatbot latency from `api/chat-analytics.php?action=get-latency`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyPoint {
    #[serde(default, deserialize_with = "lenient::id_string")]
    pub hour: String,
    #[serde(default, deserialize_with = "lenient::float")]
    pub avg_latency: f64,
    #[serde(default, deserialize_with = "lenient::float")]
    pub max_latency: f64,
    #[serde(default, deserialize_with = "lenient::float")]
    pub min_latency: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaqPerformance {
    #[serde(default)]
    pub question_text: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub view_count: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub helpful_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Doughnut,
    Bar,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
}

/// Chart-ready series; drawing is left to whatever charting front end is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub title: String,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}
