use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};
use serde_json::json;

use super::{print_json, AppContext};
use crate::error::PortalError;
use crate::models::{ChartData, FeedbackRecord};
use crate::services::dashboard_service::{AdminDashboard, FeedbackFilter, FeedbackSort};
use crate::services::dates;
use crate::services::profile_service::{excerpt, ProfileService};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Visibility {
    Show,
    Hide,
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Feedback and FAQ summary cards.
    Stats,

    /// List feedback for moderation.
    Feedback {
        #[arg(long)]
        category: Option<String>,

        /// open, in-progress, resolved or closed.
        #[arg(long)]
        status: Option<String>,

        /// Matches title, content and reference.
        #[arg(long, default_value = "")]
        search: String,

        #[arg(long)]
        hide_resolved: bool,

        /// newest, oldest or status.
        #[arg(long, default_value = "newest")]
        sort: FeedbackSort,
    },

    /// Show one feedback entry in full.
    Show {
        id: i64,
    },

    /// Resolve feedback with a response to the student.
    Resolve {
        id: i64,
        response: String,
    },

    /// List every FAQ, hidden ones included.
    Faqs {
        #[arg(long)]
        category: Option<String>,
    },

    /// Delete an FAQ.
    FaqDelete {
        id: i64,
    },

    /// Show or hide an FAQ from students.
    FaqVisibility {
        id: i64,
        visibility: Visibility,
    },

    /// Chart series for the dashboard graphs.
    Charts,

    /// Write the statistics report as CSV.
    Export {
        /// Target directory (defaults to the app's exports folder).
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// The signed-in admin.
    Profile,

    /// End the admin session.
    Logout,
}

fn print_feedback_row(record: &FeedbackRecord) {
    let date = record
        .created_at
        .as_deref()
        .and_then(dates::short_date)
        .unwrap_or_default();
    println!(
        "#{:<5} {:<12} {:<15} {:<13} {}",
        record.id,
        record.status_str(),
        record.category_str(),
        date,
        excerpt(&record.display_title()),
    );
}

fn print_chart(name: &str, chart: Option<&ChartData>) {
    let Some(chart) = chart else {
        println!("{}: no data", name);
        return;
    };
    println!("{}:", name);
    for dataset in &chart.datasets {
        println!("  {}", dataset.label);
        for (label, value) in chart.labels.iter().zip(&dataset.data) {
            println!("    {:<32} {}", label, value);
        }
    }
}

pub async fn handle_admin_command(cmd: AdminCommand, ctx: &AppContext) -> Result<(), PortalError> {
    let client = ctx.client()?;
    let mut dashboard = AdminDashboard::new();

    match cmd {
        AdminCommand::Stats => {
            let summary = dashboard.summary(&client).await;
            if ctx.json {
                return print_json(&json!({
                    "feedback": summary.feedback,
                    "faq": summary.faq,
                    "resolution_rate": summary.resolution_rate(),
                }));
            }
            let f = &summary.feedback;
            println!("Feedback");
            println!("  Total:            {}", f.total);
            println!("  This month:       {}", f.this_month);
            println!("  Pending:          {}", f.pending);
            println!("  Resolved:         {}", f.resolved);
            println!("  Resolution rate:  {}%", summary.resolution_rate());
            let q = &summary.faq;
            println!("FAQs");
            println!("  Total:            {}", q.total);
            println!("  This month:       {}", q.this_month);
            println!("  Views:            {}", q.total_views);
            println!("  Helpful votes:    {}", q.total_helpful);
            println!("  Unhelpful votes:  {}", q.total_unhelpful);
            Ok(())
        }
        AdminCommand::Feedback {
            category,
            status,
            search,
            hide_resolved,
            sort,
        } => {
            if !dashboard.load_feedback(&client).await {
                return Err(PortalError::Api("Error loading feedback".to_string()));
            }
            dashboard.set_filter(FeedbackFilter {
                category,
                status,
                search,
                hide_resolved,
                sort,
            });
            let visible = dashboard.visible_feedback();
            if ctx.json {
                return print_json(&visible);
            }
            if visible.is_empty() {
                println!("No feedback found.");
            }
            visible.iter().for_each(print_feedback_row);
            Ok(())
        }
        AdminCommand::Show { id } => {
            dashboard.load_feedback(&client).await;
            let Some(record) = dashboard.feedback_detail(id) else {
                return Err(PortalError::InvalidInput(format!("No feedback with id {}", id)));
            };
            if ctx.json {
                return print_json(record);
            }
            println!("{}", record.display_title());
            if let Some(reference) = record.reference.as_deref() {
                println!("Reference: {}", reference);
            }
            println!("Category:  {}", record.category_str());
            println!("Status:    {}", record.status_str());
            if let Some(name) = record.student_name.as_deref() {
                println!("Student:   {}", name);
            }
            if let Some(date) = record.created_at.as_deref().and_then(dates::long_date) {
                println!("Submitted: {}", date);
            }
            println!("\n{}", record.content);
            if let Some(response) = record.admin_response.as_deref() {
                println!("\nResponse: {}", response);
            }
            Ok(())
        }
        AdminCommand::Resolve { id, response } => {
            let message = dashboard.resolve(id, &response, &client).await?;
            if ctx.json {
                return print_json(&json!({ "success": true, "message": message }));
            }
            println!("{}", message);
            Ok(())
        }
        AdminCommand::Faqs { category } => {
            if !dashboard.load_faqs(&client).await {
                return Err(PortalError::Api("Error loading FAQs".to_string()));
            }
            dashboard.set_faq_category(category);
            let faqs = dashboard.visible_faqs();
            if ctx.json {
                return print_json(&json!({ "faqs": faqs, "totals": dashboard.faq_totals() }));
            }
            for faq in &faqs {
                let flag = if faq.is_visible() { " " } else { "H" };
                let smart = if faq.is_smart() { "smart" } else { "" };
                println!(
                    "{} #{:<5} {:<6} {:>5} views {:>4}+ {:>4}-  {}",
                    flag,
                    faq.id,
                    smart,
                    faq.view_count,
                    faq.helpful_count,
                    faq.unhelpful_count,
                    excerpt(&faq.question_text),
                );
            }
            let totals = dashboard.faq_totals();
            println!(
                "\n{} FAQs, {} views, {} helpful, {} unhelpful",
                totals.total, totals.total_views, totals.total_helpful, totals.total_unhelpful
            );
            Ok(())
        }
        AdminCommand::FaqDelete { id } => {
            let message = dashboard.delete_faq(id, &client).await?;
            println!("{}", message);
            Ok(())
        }
        AdminCommand::FaqVisibility { id, visibility } => {
            let message = dashboard
                .set_faq_visibility(id, visibility == Visibility::Show, &client)
                .await?;
            println!("{}", message);
            Ok(())
        }
        AdminCommand::Charts => {
            let charts = dashboard.charts(&client).await;
            if ctx.json {
                return print_json(&charts);
            }
            print_chart("Feedback by category", charts.feedback_by_category.as_ref());
            print_chart("FAQ performance", charts.faq_performance.as_ref());
            print_chart("Feedback trend", charts.feedback_trend.as_ref());
            print_chart("Chatbot latency", charts.chatbot_latency.as_ref());
            Ok(())
        }
        AdminCommand::Export { dir } => {
            let dir = match dir {
                Some(dir) => dir,
                None => ctx.store.exports_dir()?,
            };
            let path = dashboard.export_statistics(&dir, &client).await?;
            if ctx.json {
                return print_json(&json!({ "path": path }));
            }
            println!("Statistics exported to {}", path.display());
            Ok(())
        }
        AdminCommand::Profile => {
            let card = dashboard.admin_profile(&client).await;
            if ctx.json {
                return print_json(&card);
            }
            println!("{} ({})", card.name, card.role);
            if !card.email.is_empty() {
                println!("{}", card.email);
            }
            Ok(())
        }
        AdminCommand::Logout => {
            dashboard.logout(&client).await;
            ProfileService::new(&ctx.store, ctx.language()).clear_cache()?;
            println!("Signed out.");
            Ok(())
        }
    }
}
