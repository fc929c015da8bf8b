//! Message types for conversation threads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Conversation role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// Message body: plain text or a structured JSON value (tool payloads).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Data(serde_json::Value),
}

impl MessageContent {
    /// The text form, if this is a plain-text body.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            Self::Data(_) => None,
        }
    }

    /// Stringified form used for previews, titles, and wire bodies.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Text(t) => t.clone(),
            Self::Data(v) => v.to_string(),
        }
    }
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// A tool call requested by the model.
///
/// `arguments` is kept as raw JSON: providers deliver either an encoded
/// string or a structured object, and decoding is deferred to the executor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// A message in a conversation.
///
/// `content` may be `None` only on an assistant message that carries pending
/// tool calls. `id` and `role` never change after the message is appended;
/// `bookmarked` is the one mutable auxiliary field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: Option<MessageContent>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bookmarked: bool,
}

impl Message {
    fn base(role: Role, content: Option<MessageContent>) -> Self {
        Self {
            id: super::next_id("msg"),
            role,
            content,
            timestamp: Utc::now(),
            tool_call_id: None,
            tool_name: None,
            tool_calls: Vec::new(),
            bookmarked: false,
        }
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::base(Role::User, Some(MessageContent::Text(text.into())))
    }

    /// Create an assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::base(Role::Assistant, Some(MessageContent::Text(text.into())))
    }

    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self::base(Role::System, Some(MessageContent::Text(text.into())))
    }

    /// Create the assistant placeholder that records pending tool calls.
    /// This is the only message shape with no content.
    pub fn assistant_tool_calls(calls: Vec<ToolCallRequest>) -> Self {
        let mut msg = Self::base(Role::Assistant, None);
        msg.tool_calls = calls;
        msg
    }

    /// Create a tool-result message linked back to the originating request.
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        result: serde_json::Value,
    ) -> Self {
        let mut msg = Self::base(Role::Tool, Some(MessageContent::Data(result)));
        msg.tool_call_id = Some(tool_call_id.into());
        msg.tool_name = Some(tool_name.into());
        msg
    }

    /// The plain-text body, if any.
    pub fn text(&self) -> Option<&str> {
        self.content.as_ref().and_then(MessageContent::as_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_roles() {
        assert_eq!(Message::user("hi").role, Role::User);
        assert_eq!(Message::assistant("yo").role, Role::Assistant);
        assert_eq!(Message::system("err").role, Role::System);
    }

    #[test]
    fn tool_call_placeholder_has_no_content() {
        let call = ToolCallRequest {
            id: "tc_1".into(),
            name: "web_search".into(),
            arguments: serde_json::json!({"query": "rust"}),
        };
        let msg = Message::assistant_tool_calls(vec![call]);
        assert!(msg.content.is_none());
        assert_eq!(msg.tool_calls.len(), 1);
    }

    #[test]
    fn tool_result_links_back_to_request() {
        let msg = Message::tool_result("tc_9", "web_search", serde_json::json!({"items": []}));
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("tc_9"));
        assert_eq!(msg.tool_name.as_deref(), Some("web_search"));
    }

    #[test]
    fn content_roundtrips_as_untagged_json() {
        let text: MessageContent = serde_json::from_str("\"hello\"").unwrap();
        assert_eq!(text, MessageContent::Text("hello".into()));
        let data: MessageContent = serde_json::from_str("{\"a\":1}").unwrap();
        assert!(matches!(data, MessageContent::Data(_)));
    }
}
