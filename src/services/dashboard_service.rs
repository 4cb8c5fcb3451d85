//! Admin dashboard: summary cards, moderation lists, chart series and the
//! statistics export.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Local, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use super::backend::AdminBackend;
use super::dates;
use super::profile_service::DEFAULT_AVATAR;
use crate::error::PortalError;
use crate::models::{
    CategoryCount, ChartData, ChartKind, Dataset, Faq, FaqPerformance, FaqStats, FeedbackRecord,
    FeedbackStats, LatencyPoint, ResolveRequest, TrendPoint,
};

const TOP_FAQS: usize = 5;
const CHART_LABEL_CHARS: usize = 30;

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub feedback: FeedbackStats,
    pub faq: FaqStats,
}

impl DashboardSummary {
    pub fn resolution_rate(&self) -> i64 {
        self.feedback.computed_resolution_rate()
    }
}

// ============================================================================
// FEEDBACK FILTERING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackSort {
    #[default]
    Newest,
    Oldest,
    Status,
}

impl FromStr for FeedbackSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" => Ok(FeedbackSort::Newest),
            "oldest" => Ok(FeedbackSort::Oldest),
            "status" => Ok(FeedbackSort::Status),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}

/// Moderation list filter. `None` for category or status means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackFilter {
    pub category: Option<String>,
    pub status: Option<String>,
    pub search: String,
    pub hide_resolved: bool,
    pub sort: FeedbackSort,
}

fn status_rank(status: Option<&str>) -> u8 {
    match status {
        Some("open") => 1,
        Some("in-progress") => 2,
        Some("resolved") => 3,
        Some("closed") => 4,
        _ => 5,
    }
}

fn matches_search(record: &FeedbackRecord, term: &str) -> bool {
    let contains = |value: &str| value.to_lowercase().contains(term);
    record.title.as_deref().is_some_and(contains)
        || contains(&record.content)
        || record.reference.as_deref().is_some_and(contains)
}

pub fn filter_feedback(records: &[FeedbackRecord], filter: &FeedbackFilter) -> Vec<FeedbackRecord> {
    let term = filter.search.trim().to_lowercase();

    let mut filtered: Vec<FeedbackRecord> = records
        .iter()
        .filter(|r| {
            filter
                .category
                .as_deref()
                .map_or(true, |c| r.category.as_deref() == Some(c))
        })
        .filter(|r| {
            filter
                .status
                .as_deref()
                .map_or(true, |s| r.status.as_deref() == Some(s))
        })
        .filter(|r| term.is_empty() || matches_search(r, &term))
        .filter(|r| !filter.hide_resolved || r.status.as_deref() != Some("resolved"))
        .cloned()
        .collect();

    let created = |r: &FeedbackRecord| r.created_at.as_deref().and_then(dates::parse_timestamp);
    match filter.sort {
        FeedbackSort::Newest => filtered.sort_by(|a, b| created(b).cmp(&created(a))),
        FeedbackSort::Oldest => filtered.sort_by(|a, b| created(a).cmp(&created(b))),
        FeedbackSort::Status => filtered.sort_by(|a, b| {
            status_rank(a.status.as_deref()).cmp(&status_rank(b.status.as_deref()))
        }),
    }
    filtered
}

// ============================================================================
// CHARTS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardCharts {
    pub feedback_by_category: Option<ChartData>,
    pub faq_performance: Option<ChartData>,
    pub feedback_trend: Option<ChartData>,
    pub chatbot_latency: Option<ChartData>,
}

pub fn category_chart(counts: &[CategoryCount]) -> Option<ChartData> {
    if counts.is_empty() {
        return None;
    }
    Some(ChartData {
        title: "Feedback by Category".to_string(),
        kind: ChartKind::Doughnut,
        labels: counts.iter().map(|c| c.category.clone()).collect(),
        datasets: vec![Dataset {
            label: "Feedback".to_string(),
            data: counts.iter().map(|c| c.count as f64).collect(),
        }],
    })
}

pub fn faq_performance_chart(performance: &[FaqPerformance]) -> Option<ChartData> {
    if performance.is_empty() {
        return None;
    }
    let top = &performance[..performance.len().min(TOP_FAQS)];
    Some(ChartData {
        title: "FAQ Performance".to_string(),
        kind: ChartKind::Bar,
        labels: top
            .iter()
            .map(|f| {
                format!(
                    "{}...",
                    f.question_text.chars().take(CHART_LABEL_CHARS).collect::<String>()
                )
            })
            .collect(),
        datasets: vec![
            Dataset {
                label: "Views".to_string(),
                data: top.iter().map(|f| f.view_count as f64).collect(),
            },
            Dataset {
                label: "Helpful".to_string(),
                data: top.iter().map(|f| f.helpful_count as f64).collect(),
            },
        ],
    })
}

pub fn trend_chart(trend: &[TrendPoint]) -> Option<ChartData> {
    if trend.is_empty() {
        return None;
    }
    Some(ChartData {
        title: "Feedback Trend".to_string(),
        kind: ChartKind::Line,
        labels: trend.iter().map(|p| p.date.clone()).collect(),
        datasets: vec![Dataset {
            label: "Feedback Submissions".to_string(),
            data: trend.iter().map(|p| p.count as f64).collect(),
        }],
    })
}

pub fn latency_chart(latency: &[LatencyPoint]) -> Option<ChartData> {
    if latency.is_empty() {
        return None;
    }
    Some(ChartData {
        title: "Chatbot Latency".to_string(),
        kind: ChartKind::Line,
        labels: latency.iter().map(|p| p.hour.clone()).collect(),
        datasets: vec![
            Dataset {
                label: "Average Latency (ms)".to_string(),
                data: latency.iter().map(|p| p.avg_latency).collect(),
            },
            Dataset {
                label: "Max Latency (ms)".to_string(),
                data: latency.iter().map(|p| p.max_latency).collect(),
            },
        ],
    })
}

fn chart_or_none<T>(
    result: Result<Vec<T>, PortalError>,
    name: &str,
    build: fn(&[T]) -> Option<ChartData>,
) -> Option<ChartData> {
    match result {
        Ok(points) => {
            let chart = build(&points);
            if chart.is_none() {
                warn!(chart = name, "No chart data received");
            }
            chart
        }
        Err(e) => {
            error!(error = %e, chart = name, "Error setting up chart");
            None
        }
    }
}

// ============================================================================
// CSV EXPORT
// ============================================================================

fn csv_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// The statistics report in the portal's export layout.
pub fn build_statistics_csv(
    generated: &str,
    feedback_stats: &FeedbackStats,
    faq_stats: &FaqStats,
    feedback: &[FeedbackRecord],
    faqs: &[Faq],
) -> String {
    let mut csv = String::from("ADMIN SYSTEM STATISTICS REPORT\n");
    csv.push_str(&format!("Generated: {}\n\n", generated));

    csv.push_str("=== FEEDBACK STATISTICS ===\n");
    csv.push_str(&format!("Total Feedbacks,{}\n", feedback_stats.total));
    csv.push_str(&format!("This Month,{}\n", feedback_stats.this_month));
    csv.push_str(&format!("Pending Reviews,{}\n", feedback_stats.pending));
    csv.push_str(&format!(
        "Resolution Rate,{:.1}%\n\n",
        feedback_stats.resolution_rate.unwrap_or(0.0)
    ));

    csv.push_str("=== FAQ STATISTICS ===\n");
    csv.push_str(&format!("Total FAQs,{}\n", faq_stats.total));
    csv.push_str(&format!("This Month,{}\n", faq_stats.this_month));
    csv.push_str(&format!("Total Views,{}\n", faq_stats.total_views));
    csv.push_str(&format!("Total Helpful,{}\n", faq_stats.total_helpful));
    csv.push_str(&format!("Total Unhelpful,{}\n\n", faq_stats.total_unhelpful));

    if !feedback.is_empty() {
        csv.push_str("=== FEEDBACK LIST ===\n");
        csv.push_str("ID,Title,Category,Status,Student,Date\n");
        for f in feedback {
            csv.push_str(&format!(
                "{},{},{},{},{},{}\n",
                f.id,
                csv_quote(&f.display_title()),
                csv_quote(f.category.as_deref().unwrap_or_default()),
                csv_quote(f.status.as_deref().unwrap_or_default()),
                csv_quote(f.student_name.as_deref().unwrap_or("Anonymous")),
                csv_quote(f.created_at.as_deref().unwrap_or_default()),
            ));
        }
        csv.push('\n');
    }

    if !faqs.is_empty() {
        csv.push_str("=== FAQ LIST ===\n");
        csv.push_str("ID,Question,Category,Views,Helpful,Unhelpful\n");
        for f in faqs {
            csv.push_str(&format!(
                "{},{},{},{},{},{}\n",
                f.id,
                csv_quote(&f.question_text),
                csv_quote(f.category.as_deref().unwrap_or_default()),
                f.view_count,
                f.helpful_count,
                f.unhelpful_count,
            ));
        }
    }

    csv
}

// ============================================================================
// ADMIN PROFILE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminCard {
    pub name: String,
    pub email: String,
    pub role: String,
    pub picture: String,
}

impl Default for AdminCard {
    fn default() -> Self {
        Self {
            name: "Admin".to_string(),
            email: String::new(),
            role: "Admin".to_string(),
            picture: DEFAULT_AVATAR.to_string(),
        }
    }
}

// ============================================================================
// CONTROLLER
// ============================================================================

#[derive(Debug, Default)]
pub struct AdminDashboard {
    feedback: Vec<FeedbackRecord>,
    filter: FeedbackFilter,
    faqs: Vec<Faq>,
    faq_category: Option<String>,
}

impl AdminDashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both stat blocks, loaded together. Either one falls back to zeros.
    pub async fn summary(&self, backend: &dyn AdminBackend) -> DashboardSummary {
        let (feedback, faq) = futures::join!(backend.feedback_stats(), backend.faq_stats());
        DashboardSummary {
            feedback: feedback.unwrap_or_else(|e| {
                error!(error = %e, "Error loading feedback stats");
                FeedbackStats::default()
            }),
            faq: faq.unwrap_or_else(|e| {
                error!(error = %e, "Error loading FAQ stats");
                FaqStats::default()
            }),
        }
    }

    // ------------------------------------------------------------------------
    // Feedback moderation
    // ------------------------------------------------------------------------

    /// Returns false when the list could not be loaded.
    pub async fn load_feedback(&mut self, backend: &dyn AdminBackend) -> bool {
        match backend.all_feedback().await {
            Ok(records) => {
                self.feedback = records;
                true
            }
            Err(e) => {
                error!(error = %e, "Error loading feedback");
                self.feedback.clear();
                false
            }
        }
    }

    pub fn filter(&self) -> &FeedbackFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: FeedbackFilter) {
        self.filter = filter;
    }

    pub fn visible_feedback(&self) -> Vec<FeedbackRecord> {
        filter_feedback(&self.feedback, &self.filter)
    }

    pub fn feedback_detail(&self, feedback_id: i64) -> Option<&FeedbackRecord> {
        self.feedback.iter().find(|f| f.id == feedback_id)
    }

    pub async fn resolve(
        &mut self,
        feedback_id: i64,
        response: &str,
        backend: &dyn AdminBackend,
    ) -> Result<&'static str, PortalError> {
        let response = response.trim();
        if response.is_empty() {
            return Err(PortalError::InvalidInput("Please enter a resolution message".to_string()));
        }

        let request = ResolveRequest {
            feedback_id,
            admin_response: response.to_string(),
        };
        backend.resolve_feedback(&request).await.map_err(|e| match e {
            PortalError::Api(message) if message == "Unknown error" => {
                PortalError::Api("Failed to resolve feedback".to_string())
            }
            other => other,
        })?;

        info!(feedback_id, "Feedback resolved");
        self.load_feedback(backend).await;
        Ok("Feedback resolved successfully!")
    }

    // ------------------------------------------------------------------------
    // FAQ moderation
    // ------------------------------------------------------------------------

    pub async fn load_faqs(&mut self, backend: &dyn AdminBackend) -> bool {
        match backend.admin_faqs().await {
            Ok(faqs) => {
                self.faqs = faqs;
                true
            }
            Err(e) => {
                error!(error = %e, "Error loading FAQs");
                self.faqs.clear();
                false
            }
        }
    }

    pub fn set_faq_category(&mut self, category: Option<String>) {
        self.faq_category = category.filter(|c| c != "all");
    }

    pub fn visible_faqs(&self) -> Vec<&Faq> {
        self.faqs
            .iter()
            .filter(|f| {
                self.faq_category
                    .as_deref()
                    .map_or(true, |c| f.category.as_deref() == Some(c))
            })
            .collect()
    }

    /// Totals over the FAQs currently listed.
    pub fn faq_totals(&self) -> FaqStats {
        let visible: Vec<Faq> = self.visible_faqs().into_iter().cloned().collect();
        FaqStats::from_faqs(&visible)
    }

    pub async fn delete_faq(
        &mut self,
        faq_id: i64,
        backend: &dyn AdminBackend,
    ) -> Result<&'static str, PortalError> {
        backend.delete_faq(faq_id).await?;
        self.faqs.retain(|f| f.id != faq_id);
        Ok("FAQ deleted successfully")
    }

    pub async fn set_faq_visibility(
        &mut self,
        faq_id: i64,
        visible: bool,
        backend: &dyn AdminBackend,
    ) -> Result<&'static str, PortalError> {
        backend.set_faq_visibility(faq_id, visible).await?;
        if let Some(faq) = self.faqs.iter_mut().find(|f| f.id == faq_id) {
            faq.is_visible = i64::from(visible);
        }
        Ok(if visible {
            "FAQ is now visible to students"
        } else {
            "FAQ is now hidden from students"
        })
    }

    // ------------------------------------------------------------------------
    // Charts and export
    // ------------------------------------------------------------------------

    pub async fn charts(&self, backend: &dyn AdminBackend) -> DashboardCharts {
        let (categories, performance, trend, latency) = futures::join!(
            backend.category_stats(),
            backend.faq_performance(),
            backend.feedback_trend(),
            backend.chatbot_latency(),
        );
        DashboardCharts {
            feedback_by_category: chart_or_none(categories, "category", category_chart),
            faq_performance: chart_or_none(performance, "faq-performance", faq_performance_chart),
            feedback_trend: chart_or_none(trend, "trend", trend_chart),
            chatbot_latency: chart_or_none(latency, "latency", latency_chart),
        }
    }

    /// Write the statistics report into `dir`. Any failed fetch aborts the
    /// export.
    pub async fn export_statistics(
        &self,
        dir: &Path,
        backend: &dyn AdminBackend,
    ) -> Result<PathBuf, PortalError> {
        let (feedback_stats, faq_stats, feedback, faqs) = futures::try_join!(
            backend.feedback_stats(),
            backend.faq_stats(),
            backend.all_feedback(),
            backend.public_faqs(),
        )?;

        let generated = Local::now().format("%-m/%-d/%Y, %-I:%M:%S %p").to_string();
        let csv = build_statistics_csv(&generated, &feedback_stats, &faq_stats, &feedback, &faqs);

        fs::create_dir_all(dir)?;
        let path = dir.join(format!("admin-statistics-{}.csv", Utc::now().timestamp_millis()));
        fs::write(&path, csv)?;
        info!(path = %path.display(), "Statistics exported");
        Ok(path)
    }

    // ------------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------------

    pub async fn admin_profile(&self, backend: &dyn AdminBackend) -> AdminCard {
        match backend.admin_profile().await {
            Ok(admin) => AdminCard {
                name: admin.display_name().to_string(),
                email: admin.email.clone().unwrap_or_default(),
                role: admin.role_label().to_string(),
                picture: admin.picture().unwrap_or(DEFAULT_AVATAR).to_string(),
            },
            Err(e) => {
                warn!(error = %e, "Could not load admin profile, using default");
                AdminCard::default()
            }
        }
    }

    /// Ends the server session. The caller signs out locally either way.
    pub async fn logout(&self, backend: &dyn AdminBackend) {
        if let Err(e) = backend.logout().await {
            warn!(error = %e, "Logout request failed");
        }
    }
}
