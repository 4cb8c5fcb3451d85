use clap::Subcommand;

use super::{print_json, AppContext};
use crate::error::PortalError;
use crate::models::ReminderKind;
use crate::services::dates;
use crate::services::reminder_service::{ReminderService, NO_REMINDERS};

#[derive(Subcommand)]
pub enum ReminderCommand {
    /// Your reminders plus feedback waiting for review.
    #[command(alias = "ls")]
    List,

    /// Add a reminder.
    Add {
        title: String,
    },

    /// Mark a reminder done.
    Done {
        id: String,
    },
}

pub async fn handle_reminder_command(
    cmd: ReminderCommand,
    ctx: &AppContext,
) -> Result<(), PortalError> {
    let reminders = ReminderService::new(&ctx.store);

    match cmd {
        ReminderCommand::List => {
            let client = ctx.client()?;
            let list = reminders.list(&client).await;
            if ctx.json {
                return print_json(&list);
            }
            if list.is_empty() {
                println!("{}", NO_REMINDERS);
                return Ok(());
            }
            for reminder in &list {
                let marker = match reminder.kind {
                    ReminderKind::Custom => "*",
                    ReminderKind::Feedback => "!",
                };
                println!(
                    "{} {:<18} {}  ({})",
                    marker,
                    dates::reminder_time(&reminder.created_at),
                    reminder.title,
                    reminder.id
                );
            }
            Ok(())
        }
        ReminderCommand::Add { title } => {
            let reminder = reminders.add(&title)?;
            if ctx.json {
                return print_json(&reminder);
            }
            println!("Added {}", reminder.id);
            Ok(())
        }
        ReminderCommand::Done { id } => {
            if !reminders.complete(&id)? {
                return Err(PortalError::InvalidInput(format!("No custom reminder with id {}", id)));
            }
            println!("Done.");
            Ok(())
        }
    }
}
