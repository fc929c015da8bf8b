//! Conversation threads and their owning store.

pub mod store;

pub use store::ConversationStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{next_id, Message, MessageContent, Role};

/// Placeholder title until the first real message names the thread.
pub const DEFAULT_TITLE: &str = "New Conversation";

const PREVIEW_CHARS: usize = 100;
const TITLE_CHARS: usize = 30;

/// An ordered message thread.
///
/// Message order is the wire order sent to the provider; the thread is never
/// reordered or deduplicated implicitly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub preview: String,
}

impl Conversation {
    /// Create an empty conversation with a fresh id.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: next_id("conv"),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            preview: "...".to_string(),
        }
    }

    /// Append a message, updating `updated_at` and the derived preview/title.
    ///
    /// `updated_at` never moves backwards. The preview is the first 100
    /// characters of the latest non-system text content; the title is derived
    /// from the first such message while it still carries the placeholder.
    pub fn append(&mut self, message: Message) {
        if message.role != Role::System {
            if let Some(MessageContent::Text(text)) = &message.content {
                self.preview = truncate_chars(text, PREVIEW_CHARS);
                if self.title == DEFAULT_TITLE {
                    let derived = truncate_chars(text, TITLE_CHARS);
                    if !derived.is_empty() {
                        self.title = derived;
                    }
                }
            }
        }
        self.messages.push(message);
        self.updated_at = self.updated_at.max(Utc::now());
    }

    /// Drop all messages, keeping the thread itself.
    pub fn clear_messages(&mut self) {
        self.messages.clear();
        self.preview = "Cleared".to_string();
        self.updated_at = self.updated_at.max(Utc::now());
    }

    /// Delete one message by id. Returns whether anything was removed.
    pub fn delete_message(&mut self, message_id: &str) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| m.id != message_id);
        before != self.messages.len()
    }

    /// Toggle-free bookmark: marks the message if present.
    pub fn bookmark_message(&mut self, message_id: &str) -> bool {
        for msg in &mut self.messages {
            if msg.id == message_id {
                msg.bookmarked = true;
                return true;
            }
        }
        false
    }

    /// Render the thread as a Markdown document.
    pub fn export_markdown(&self) -> String {
        let mut out = format!("# {}\n\n", self.title);
        for msg in &self.messages {
            let sender = match msg.role {
                Role::User => "User",
                Role::Assistant => "Assistant",
                Role::System => "System",
                Role::Tool => "Tool",
            };
            let body = msg
                .content
                .as_ref()
                .map(MessageContent::to_display_string)
                .unwrap_or_default();
            out.push_str(&format!("**{sender}**: {body}\n\n"));
        }
        out
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
