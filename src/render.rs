//! Where chat and dialogue output goes.
//!
//! Controllers never touch a concrete UI. They append [`RenderedMessage`]s to
//! a [`RenderTarget`]; the terminal front end prints them, tests collect them
//! in a [`Transcript`].

use serde::Serialize;

use crate::models::Role;
use crate::services::markdown;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedMessage {
    pub role: Role,
    /// Source text as typed by the user or returned by the server.
    pub text: String,
    /// Sanitized HTML fragment for the message bubble.
    pub html: String,
}

impl RenderedMessage {
    /// Bot replies in the main chat are Markdown.
    pub fn bot_markdown(text: &str) -> Self {
        Self {
            role: Role::Bot,
            text: text.to_string(),
            html: markdown::render_markdown(text),
        }
    }

    /// Plain text bubble: escaped, newlines kept as `<br>`.
    pub fn plain(role: Role, text: &str) -> Self {
        Self {
            role,
            text: text.to_string(),
            html: markdown::render_plain_text(text),
        }
    }
}

pub trait RenderTarget {
    fn append(&mut self, message: RenderedMessage);

    /// Drop every message currently shown.
    fn clear(&mut self);
}

/// In-memory render target.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<RenderedMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[RenderedMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&RenderedMessage> {
        self.messages.last()
    }
}

impl RenderTarget for Transcript {
    fn append(&mut self, message: RenderedMessage) {
        self.messages.push(message);
    }

    fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Prints messages to stdout as they arrive.
///
/// The user's own lines are not echoed back; they are already on screen.
/// In JSON mode every message, including the user's, is one JSON line.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    json: bool,
}

impl TerminalRenderer {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn speaker(role: Role) -> &'static str {
        match role {
            Role::Bot => "Aiva",
            Role::User => "You",
            Role::System => "System",
        }
    }
}

impl RenderTarget for TerminalRenderer {
    fn append(&mut self, message: RenderedMessage) {
        if self.json {
            if let Ok(line) = serde_json::to_string(&message) {
                println!("{}", line);
            }
            return;
        }
        if message.role == Role::User {
            return;
        }
        println!("{}: {}\n", Self::speaker(message.role), message.text);
    }

    fn clear(&mut self) {
        if !self.json {
            println!("{}", "-".repeat(60));
        }
    }
}
