//! OpenAI Chat Completions adapter.
//!
//! The wire format here (OpenAI chat style) is also the shape AI Pipe proxies,
//! so [`messages_to_wire`] and [`parse_reply`] are shared with that adapter.

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::settings::LlmSettings;
use crate::types::{Message, MessageContent, Role, ToolCallRequest};

use super::http::{bearer_headers, shared_client, status_to_error};
use super::{ChatProvider, NormalizedReply, ToolDefinition};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug)]
pub struct OpenAiProvider {
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        settings: &LlmSettings,
    ) -> Result<NormalizedReply> {
        let body = build_request_body(&settings.model, messages, tools, settings);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %settings.model, "openai chat");

        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let text = resp.text().await?;
        if !(200..300).contains(&status) {
            return Err(status_to_error(status, &text));
        }

        Ok(reply_from_body(&text))
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/models", self.base_url);
        let resp = shared_client()
            .get(&url)
            .headers(bearer_headers(&self.api_key))
            .send()
            .await?;

        let status = resp.status().as_u16();
        let text = resp.text().await?;
        if !(200..300).contains(&status) {
            return Err(status_to_error(status, &text));
        }

        let data: serde_json::Value = serde_json::from_str(&text)?;
        let mut models: Vec<String> = data
            .get("data")
            .and_then(|d| d.as_array())
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|m| m.get("id").and_then(|id| id.as_str()))
                    .filter(|id| id.contains("gpt"))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        models.sort();
        models.reverse();
        Ok(models)
    }
}

/// Parse a raw response body, degrading to the stringified payload as
/// assistant content when no known shape matches.
pub(crate) fn reply_from_body(body: &str) -> NormalizedReply {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(data) => parse_reply(&data),
        Err(_) => NormalizedReply::text(body),
    }
}

/// Normalize an OpenAI-style response value.
///
/// Tolerates both `choices` (message/text) and `candidates` shapes; absent
/// optional fields never fail. An unrecognized payload falls back to its
/// stringified form.
pub fn parse_reply(data: &serde_json::Value) -> NormalizedReply {
    if let Some(choice) = data
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
    {
        if let Some(message) = choice.get("message") {
            let content = message
                .get("content")
                .and_then(|c| c.as_str())
                .map(str::to_string);
            let tool_calls = message
                .get("tool_calls")
                .and_then(|tc| tc.as_array())
                .map(|calls| calls.iter().filter_map(parse_tool_call).collect())
                .unwrap_or_default();
            return NormalizedReply { content, tool_calls };
        }
        if let Some(text) = choice.get("text").and_then(|t| t.as_str()) {
            return NormalizedReply::text(text);
        }
    }

    // some gateways answer in the candidates shape even on OpenAI routes
    if let Some(candidate) = data
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
    {
        return NormalizedReply::text(candidate_text(candidate));
    }

    NormalizedReply::text(data.to_string())
}

fn parse_tool_call(value: &serde_json::Value) -> Option<ToolCallRequest> {
    let function = value.get("function")?;
    let name = function.get("name")?.as_str()?.to_string();
    let id = value
        .get("id")
        .and_then(|id| id.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4()));
    let arguments = match function.get("arguments") {
        Some(serde_json::Value::String(s)) => serde_json::from_str(s)
            .unwrap_or_else(|_| serde_json::Value::String(s.clone())),
        Some(v) => v.clone(),
        None => serde_json::json!({}),
    };
    Some(ToolCallRequest { id, name, arguments })
}

fn candidate_text(candidate: &serde_json::Value) -> String {
    match candidate.get("content") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(content) => {
            let parts = content.get("parts").unwrap_or(content);
            match parts.as_array() {
                Some(parts) => parts
                    .iter()
                    .map(|p| match p.get("text").and_then(|t| t.as_str()) {
                        Some(text) => text.to_string(),
                        None => p.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(""),
                None => parts.to_string(),
            }
        }
        None => candidate.to_string(),
    }
}

/// Build the OpenAI-style request body.
pub(crate) fn build_request_body(
    model: &str,
    messages: &[Message],
    tools: &[ToolDefinition],
    settings: &LlmSettings,
) -> serde_json::Value {
    let wire_messages: Vec<serde_json::Value> =
        messages.iter().filter_map(message_to_wire).collect();

    let mut body = serde_json::json!({
        "model": model,
        "messages": wire_messages,
        "max_tokens": settings.max_tokens,
        "temperature": settings.temperature,
    });

    if !tools.is_empty() {
        let defs: Vec<serde_json::Value> = tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    }
                })
            })
            .collect();
        body.as_object_mut()
            .expect("body is an object")
            .insert("tools".into(), defs.into());
    }

    body
}

/// Map one conversation message to the OpenAI wire shape.
///
/// Returns `None` for messages with nothing to send (defensive; the store
/// never produces them).
pub(crate) fn message_to_wire(msg: &Message) -> Option<serde_json::Value> {
    let role = match msg.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };

    if msg.role == Role::Tool {
        let content = msg
            .content
            .as_ref()
            .map(MessageContent::to_display_string)
            .unwrap_or_default();
        return Some(serde_json::json!({
            "role": role,
            "tool_call_id": msg.tool_call_id,
            "content": content,
        }));
    }

    if !msg.tool_calls.is_empty() {
        let calls: Vec<serde_json::Value> = msg
            .tool_calls
            .iter()
            .map(|tc| {
                serde_json::json!({
                    "id": tc.id,
                    "type": "function",
                    "function": {
                        "name": tc.name,
                        "arguments": arguments_as_string(&tc.arguments),
                    }
                })
            })
            .collect();
        let content = msg
            .content
            .as_ref()
            .map(|c| serde_json::Value::String(c.to_display_string()))
            .unwrap_or(serde_json::Value::Null);
        return Some(serde_json::json!({
            "role": role,
            "content": content,
            "tool_calls": calls,
        }));
    }

    let content = msg.content.as_ref()?;
    Some(serde_json::json!({
        "role": role,
        "content": content.to_display_string(),
    }))
}

fn arguments_as_string(arguments: &serde_json::Value) -> String {
    match arguments {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
