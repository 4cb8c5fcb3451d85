use clap::Subcommand;
use serde_json::json;

use super::{print_json, AppContext};
use crate::error::PortalError;
use crate::models::VoteKind;
use crate::services::faq_service::{self, FaqBrowser, NotificationLevel, ALL_CATEGORIES};

#[derive(Subcommand)]
pub enum FaqCommand {
    /// List FAQs.
    #[command(alias = "ls")]
    List {
        /// academic, technical, account, other or all.
        #[arg(long, default_value = ALL_CATEGORIES)]
        category: String,
    },

    /// Show an FAQ's answer. Counts as a view.
    Open {
        /// FAQ id.
        id: i64,
    },

    /// Mark an FAQ helpful or unhelpful.
    Vote {
        /// FAQ id.
        id: i64,

        /// helpful or unhelpful.
        vote: VoteKind,
    },
}

pub async fn handle_faq_command(cmd: FaqCommand, ctx: &AppContext) -> Result<(), PortalError> {
    let client = ctx.client()?;
    let mut browser = FaqBrowser::new();

    match cmd {
        FaqCommand::List { category } => {
            let faqs = browser.load(&category, &client).await;
            if ctx.json {
                return print_json(faqs);
            }
            if faqs.is_empty() {
                println!("No FAQs found.");
                return Ok(());
            }
            for faq in faqs {
                let category = faq.category.as_deref().map(faq_service::category_label).unwrap_or("");
                let views = faq_service::view_count_label(faq.view_count).unwrap_or_default();
                println!("#{:<5} [{}] {}  {}", faq.id, category, faq.question_text, views);
            }
            Ok(())
        }
        FaqCommand::Open { id } => {
            browser.load(ALL_CATEGORIES, &client).await;
            browser.toggle(id, &client).await;
            let Some(faq) = browser.open_faq() else {
                return Err(PortalError::InvalidInput(format!("No FAQ with id {}", id)));
            };
            if ctx.json {
                return print_json(&json!({
                    "faq": faq,
                    "answer_html": faq_service::format_answer(&faq.answer_text),
                }));
            }
            println!("{}\n\n{}", faq.question_text, faq.answer_text);
            Ok(())
        }
        FaqCommand::Vote { id, vote } => {
            let note = browser.vote(id, vote, &client).await;
            if ctx.json {
                return print_json(&json!({
                    "success": note.level == NotificationLevel::Success,
                    "message": note.message,
                }));
            }
            match note.level {
                NotificationLevel::Success => {
                    println!("{}", note.message);
                    Ok(())
                }
                _ => Err(PortalError::Api(note.message)),
            }
        }
    }
}
