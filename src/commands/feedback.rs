use std::time::Duration;

use clap::Subcommand;
use serde_json::json;

use super::{print_json, AppContext};
use crate::error::PortalError;
use crate::models::{FeedbackCategory, FeedbackForm};
use crate::render::Transcript;
use crate::services::backend::ChatBackend;
use crate::services::feedback_dialogue::{DialogueOutcome, FeedbackDialogue};
use crate::services::profile_service::ProfileService;

#[derive(Subcommand)]
pub enum FeedbackCommand {
    /// Submit feedback the way the chat dialogue does.
    Submit {
        /// Category number (1-6) or id, e.g. "facilities".
        category: String,

        /// What you want to tell the university.
        content: String,
    },

    /// Submit the classic feedback form.
    Form {
        #[arg(long)]
        name: String,

        #[arg(long)]
        student_id: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        category: String,

        /// Your message.
        message: String,
    },
}

/// The dialogue's 1-based number for a category given by number, id or label.
fn category_number(input: &str, categories: &[FeedbackCategory]) -> String {
    let wanted = input.trim().to_lowercase();
    categories
        .iter()
        .position(|c| {
            c.id == wanted || c.label.to_lowercase() == wanted || c.label_bm.to_lowercase() == wanted
        })
        .map(|idx| (idx + 1).to_string())
        .unwrap_or_else(|| input.trim().to_string())
}

pub async fn handle_feedback_command(
    cmd: FeedbackCommand,
    ctx: &AppContext,
) -> Result<(), PortalError> {
    let client = ctx.client()?;
    let session = client.check_session().await?;

    match cmd {
        FeedbackCommand::Submit { category, content } => {
            let mut dialogue = FeedbackDialogue::new(ctx.language(), Duration::ZERO);
            let mut transcript = Transcript::new();

            let mut outcome = dialogue.open(session.authenticated, &mut transcript);
            let opened = outcome == DialogueOutcome::Opened;
            if opened {
                let number = category_number(&category, dialogue.categories());
                outcome = dialogue.handle_input(&number, &client, &mut transcript).await;
            }
            if matches!(outcome, DialogueOutcome::CategorySelected(_)) {
                outcome = dialogue.handle_input(&content, &client, &mut transcript).await;
            }

            if ctx.json {
                print_json(transcript.messages())?;
            } else {
                // The category menu is noise when the category came as an argument.
                for message in transcript.messages().iter().skip(usize::from(opened)) {
                    println!("{}\n", message.text);
                }
            }

            match outcome {
                DialogueOutcome::Submitted { .. } => Ok(()),
                DialogueOutcome::SignInRequired => Err(PortalError::NotSignedIn),
                DialogueOutcome::InvalidSelection => {
                    Err(PortalError::InvalidInput(format!("Unknown category: {}", category)))
                }
                _ => Err(PortalError::Api("Feedback was not submitted".to_string())),
            }
        }
        FeedbackCommand::Form {
            name,
            student_id,
            email,
            category,
            message,
        } => {
            let form = FeedbackForm {
                student_name: name,
                student_id,
                email,
                category,
                message,
                language: ctx.language(),
                user_id: session.user_id.clone(),
            };
            let (success, text) = ProfileService::new(&ctx.store, ctx.language())
                .submit_form(&form, &client)
                .await;
            if ctx.json {
                return print_json(&json!({ "success": success, "message": text }));
            }
            if success {
                println!("{}", text);
                Ok(())
            } else {
                Err(PortalError::Api(text.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_categories;

    #[test]
    fn categories_resolve_by_number_id_or_label() {
        let categories = default_categories();
        assert_eq!(category_number("3", &categories), "3");
        assert_eq!(category_number("dormitory", &categories), "5");
        assert_eq!(category_number("Akademik", &categories), "2");
        assert_eq!(category_number("parking", &categories), "parking");
    }
}
