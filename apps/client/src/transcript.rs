//! The conversation transcript and the message renderer that appends to it.

use uuid::Uuid;

use crate::models::{Message, RenderMode, Sender};

pub const WELCOME_TEXT: &str =
    "Hello! Provide your birth details to receive your personalized astrological predictions.";

/// Ordered conversation. Grows only by `render_message`, except for the single
/// reset after the first successful prediction.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
    /// Entry the viewport is scrolled to.
    scroll_anchor: Option<Uuid>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::with_welcome()
    }
}

impl Transcript {
    /// A transcript holding only the welcome message.
    pub fn with_welcome() -> Self {
        let welcome = welcome_message();
        Self {
            scroll_anchor: Some(welcome.id),
            messages: vec![welcome],
        }
    }

    /// Drops every message and reinserts a fresh welcome message.
    pub fn reset_to_welcome(&mut self) {
        *self = Self::with_welcome();
    }

    /// Appends a labeled message and scrolls to it.
    pub fn render_message(&mut self, content: &str, sender: Sender, mode: RenderMode) {
        let message = Message::new(content, sender, mode);
        self.messages.push(message);
        self.scroll_to_latest();
    }

    pub fn scroll_to_latest(&mut self) {
        self.scroll_anchor = self.messages.last().map(|m| m.id);
    }

    pub fn scroll_anchor(&self) -> Option<Uuid> {
        self.scroll_anchor
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

fn welcome_message() -> Message {
    let mut welcome = Message::new(WELCOME_TEXT, Sender::Bot, RenderMode::Markup);
    welcome.initial = true;
    welcome
}
