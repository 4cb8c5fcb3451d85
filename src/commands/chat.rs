use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info};

use super::AppContext;
use crate::error::PortalError;
use crate::i18n::{self, Language};
use crate::render::TerminalRenderer;
use crate::services::feedback_dialogue::DialogueOutcome;
use crate::services::session_service::{ChatSessionManager, SendOutcome};
use crate::services::student_portal::{Panel, PortalOutcome, StudentPortal};

const HELP: &str = "\
/new              start a new chat
/sessions         list your chats
/switch <key>     open another chat
/delete <key>     delete a chat
/feedback         submit feedback
/back             leave the feedback panel
/lang <en|bm>     change language
/quit             leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Message(String),
    NewChat,
    Sessions,
    Switch(String),
    Delete(String),
    Feedback,
    Back,
    Language(Language),
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_input(line: &str) -> ChatInput {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return ChatInput::Message(line.to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "new" => ChatInput::NewChat,
        "sessions" => ChatInput::Sessions,
        "switch" if !arg.is_empty() => ChatInput::Switch(arg.to_string()),
        "delete" if !arg.is_empty() => ChatInput::Delete(arg.to_string()),
        "feedback" => ChatInput::Feedback,
        "back" => ChatInput::Back,
        "lang" => match arg.parse() {
            Ok(language) => ChatInput::Language(language),
            Err(_) => ChatInput::Unknown(line.to_string()),
        },
        "help" => ChatInput::Help,
        "quit" | "exit" => ChatInput::Quit,
        _ => ChatInput::Unknown(line.to_string()),
    }
}

fn write_prompt(out: &mut impl Write, label: &str) -> std::io::Result<()> {
    write!(out, "{} ", label)?;
    out.flush()
}

fn prompt(label: &str) {
    if let Err(e) = write_prompt(&mut std::io::stdout(), label) {
        debug!(error = %e, "Failed to flush prompt");
    }
}

fn print_sessions(chat: &ChatSessionManager) {
    for entry in chat.session_list_today() {
        let marker = if entry.active { "*" } else { " " };
        println!(
            "{} {:<40} {:<10} {}",
            marker, entry.session_key, entry.date_label, entry.preview
        );
    }
}

async fn confirm(lines: &mut Lines<BufReader<Stdin>>, question: &str) -> Result<bool, PortalError> {
    prompt(&format!("{} [y/N]", question));
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub async fn run_chat(ctx: &AppContext) -> Result<(), PortalError> {
    let client = Arc::new(ctx.client()?);
    let mut portal = StudentPortal::new(
        client,
        ctx.language(),
        ctx.config.cooldown(),
        ctx.config.feedback_reset_delay(),
        TerminalRenderer::new(ctx.json),
        TerminalRenderer::new(ctx.json),
    );

    let sessions = portal.initialize().await;
    info!(sessions = sessions.len(), "Chat ready");
    if !ctx.json {
        println!("Type /help for commands.\n");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let label = match portal.panel() {
            Panel::Chat => ">".to_string(),
            Panel::Feedback => format!("[{}] >", portal.dialogue().placeholder()),
        };
        prompt(&label);

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            ChatInput::Quit => break,
            ChatInput::Help => println!("{}", HELP),
            ChatInput::NewChat => portal.new_chat().await,
            ChatInput::Sessions => print_sessions(portal.chat()),
            ChatInput::Switch(key) => {
                if !portal.switch_session(&key).await {
                    println!("Could not open chat {}", key);
                }
            }
            ChatInput::Delete(key) => {
                let language = portal.language();
                if confirm(&mut lines, i18n::confirm_delete_chat(language)).await? {
                    match portal.delete_session(&key).await {
                        Ok(true) => print_sessions(portal.chat()),
                        Ok(false) => {}
                        Err(_) => println!("{}", i18n::delete_chat_failed(language)),
                    }
                }
            }
            ChatInput::Feedback => {
                portal.open_feedback();
            }
            ChatInput::Back => portal.back_to_chat(),
            ChatInput::Language(language) => portal.set_language(language),
            ChatInput::Unknown(command) => println!("Unknown command: {} (try /help)", command),
            ChatInput::Message(text) => match portal.handle_input(&text).await {
                PortalOutcome::Chat(SendOutcome::CoolingDown { remaining_secs }) => {
                    println!("{}", i18n::cooldown_notice(portal.language(), remaining_secs));
                }
                PortalOutcome::Feedback(DialogueOutcome::Submitted { .. }) => {
                    println!("(back in chat)");
                }
                _ => {}
            },
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_message() {
        assert_eq!(parse_input("  hello  "), ChatInput::Message("hello".to_string()));
    }

    #[test]
    fn slash_commands() {
        assert_eq!(parse_input("/new"), ChatInput::NewChat);
        assert_eq!(
            parse_input("/switch session_1714_abc"),
            ChatInput::Switch("session_1714_abc".to_string())
        );
        assert_eq!(parse_input("/lang bm"), ChatInput::Language(Language::Bm));
        assert_eq!(parse_input("/exit"), ChatInput::Quit);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn prompt_is_written_without_newline() {
        let mut out = Vec::new();
        write_prompt(&mut out, "[1-6] >").unwrap();
        assert_eq!(out, b"[1-6] > ");
    }

    #[test]
    fn prompt_write_failures_are_reported() {
        let err = write_prompt(&mut BrokenPipe, ">").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn bad_commands_are_unknown() {
        assert_eq!(parse_input("/switch"), ChatInput::Unknown("/switch".to_string()));
        assert_eq!(parse_input("/lang fr"), ChatInput::Unknown("/lang fr".to_string()));
        assert_eq!(parse_input("/dance"), ChatInput::Unknown("/dance".to_string()));
    }
}
