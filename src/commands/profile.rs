use clap::Subcommand;
use serde_json::json;

use super::{print_json, AppContext};
use crate::error::PortalError;
use crate::models::FeedbackRecord;
use crate::services::backend::{ChatBackend, ProfileBackend};
use crate::services::dates;
use crate::services::profile_service::{excerpt, ProfileService};

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Your profile card and the portal's headline numbers.
    Show,

    /// Change the name other people see.
    Rename {
        name: String,
    },

    /// Feedback you submitted.
    Feedback,

    /// Recently resolved feedback.
    Resolved,
}

fn print_records(records: &[FeedbackRecord], empty: &str) {
    if records.is_empty() {
        println!("{}", empty);
        return;
    }
    for record in records {
        let date = record
            .created_at
            .as_deref()
            .and_then(dates::short_date)
            .unwrap_or_default();
        println!("{:<13} [{}] {}", date, record.status_str(), excerpt(&record.display_title()));
        if let Some(response) = record.admin_response.as_deref().filter(|r| !r.is_empty()) {
            println!("              Response: {}", excerpt(response));
        }
    }
}

pub async fn handle_profile_command(cmd: ProfileCommand, ctx: &AppContext) -> Result<(), PortalError> {
    let client = ctx.client()?;
    let profiles = ProfileService::new(&ctx.store, ctx.language());

    match cmd {
        ProfileCommand::Show => {
            profiles.sync_user(&client).await?;
            let Some(card) = profiles.profile_card(&client).await? else {
                return Err(PortalError::NotSignedIn);
            };
            let stats = profiles.portal_statistics(&client).await;
            if ctx.json {
                return print_json(&json!({ "profile": card, "statistics": stats }));
            }
            println!("{}", card.name);
            println!("  Full name:   {}", card.full_name);
            println!("  Status:      {}", card.status);
            if let Some(registered) = card.registered.as_deref() {
                println!("  Registered:  {}", registered);
            }
            println!("\nPortal");
            println!("  Submissions:      {}", stats.total_submissions);
            println!("  Issues resolved:  {}", stats.issues_resolved);
            println!("  Satisfaction:     {}%", stats.satisfaction_rate);
            Ok(())
        }
        ProfileCommand::Rename { name } => {
            let Some(user) = client.current_user().await? else {
                return Err(PortalError::NotSignedIn);
            };
            let message = profiles
                .update_display_name(Some(user.id.as_str()), &name, &client)
                .await?;
            println!("{}", message);
            Ok(())
        }
        ProfileCommand::Feedback => {
            let session = client.check_session().await?;
            let Some(user_id) = session.user_id.filter(|_| session.authenticated) else {
                return Err(PortalError::NotSignedIn);
            };
            let records = profiles.own_feedback(&user_id, &client).await;
            if ctx.json {
                return print_json(&records);
            }
            print_records(&records, "You have not submitted any feedback yet.");
            Ok(())
        }
        ProfileCommand::Resolved => {
            let records = profiles.resolved_feedback(&client).await;
            if ctx.json {
                return print_json(&records);
            }
            print_records(&records, "No resolved feedback yet.");
            Ok(())
        }
    }
}
