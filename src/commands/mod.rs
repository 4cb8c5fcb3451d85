//! Command-line surface of the `ums-feedback` binary.
//!
//! Each subcommand module owns its clap enum and a `handle_*` function that
//! drives the library controllers against the live portal.

mod admin;
mod chat;
mod config;
mod faq;
mod feedback;
mod profile;
mod reminders;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::error::PortalError;
use crate::i18n::Language;
use crate::services::api_client::ApiClient;
use crate::services::config_service::{self, Config};
use crate::services::local_store::LocalStore;

/// Student chat, FAQ browser and admin dashboard for the UMS feedback portal.
#[derive(Parser)]
#[command(name = "ums-feedback", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all logging except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log more (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Interface language: en or bm.
    #[arg(long, global = true, env = "UMS_LANGUAGE")]
    pub lang: Option<Language>,

    /// Portal site root, overriding the configured one.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chat with Aiva (/help inside the chat lists the slash commands).
    Chat,

    /// Browse and vote on FAQs.
    Faq {
        #[command(subcommand)]
        action: faq::FaqCommand,
    },

    /// Submit feedback.
    Feedback {
        #[command(subcommand)]
        action: feedback::FeedbackCommand,
    },

    /// Admin dashboard: statistics, moderation, charts and export.
    Admin {
        #[command(subcommand)]
        action: admin::AdminCommand,
    },

    /// Admin reminders.
    Reminders {
        #[command(subcommand)]
        action: reminders::ReminderCommand,
    },

    /// Your student profile and feedback history.
    Profile {
        #[command(subcommand)]
        action: profile::ProfileCommand,
    },

    /// Preview a Markdown file as chat HTML.
    Render {
        /// Markdown file to render.
        file: PathBuf,
    },

    /// Show or change settings.
    Config {
        #[command(subcommand)]
        action: config::ConfigCommand,
    },
}

/// What every command handler gets: storage, settings and output mode.
pub struct AppContext {
    pub store: LocalStore,
    pub config: Config,
    pub json: bool,
}

impl AppContext {
    pub fn load(cli: &Cli) -> Result<Self, PortalError> {
        let store = LocalStore::open_default()?;
        let mut config = config_service::effective_config(&store)?;
        if let Some(language) = cli.lang {
            config.language = language;
        }
        if let Some(base_url) = cli.base_url.as_ref() {
            config.base_url = base_url.clone();
        }
        Ok(Self {
            store,
            config,
            json: cli.json,
        })
    }

    pub fn language(&self) -> Language {
        self.config.language
    }

    pub fn client(&self) -> Result<ApiClient, PortalError> {
        ApiClient::from_config(&self.config)
    }
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), PortalError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn dispatch(cli: Cli) -> Result<(), PortalError> {
    let ctx = AppContext::load(&cli)?;

    match cli.command {
        Commands::Chat => chat::run_chat(&ctx).await,
        Commands::Faq { action } => faq::handle_faq_command(action, &ctx).await,
        Commands::Feedback { action } => feedback::handle_feedback_command(action, &ctx).await,
        Commands::Admin { action } => admin::handle_admin_command(action, &ctx).await,
        Commands::Reminders { action } => reminders::handle_reminder_command(action, &ctx).await,
        Commands::Profile { action } => profile::handle_profile_command(action, &ctx).await,
        Commands::Render { file } => render::render_file(&file, &ctx).await,
        Commands::Config { action } => config::handle_config_command(action, &ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_anywhere() {
        let cli = Cli::try_parse_from(["ums-feedback", "faq", "list", "--lang", "bm", "-vv"]).unwrap();
        assert_eq!(cli.lang, Some(Language::Bm));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Faq { .. }));
    }
}
