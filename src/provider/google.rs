//! Google Gemini adapter.
//!
//! The one provider with query-string auth and role remapping: assistant
//! messages travel as role `model`, tool results as `functionResponse` parts.

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::settings::LlmSettings;
use crate::types::{Message, MessageContent, Role, ToolCallRequest};

use super::http::{shared_client, status_to_error};
use super::{ChatProvider, NormalizedReply, ToolDefinition};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug)]
pub struct GoogleProvider {
    api_key: String,
    base_url: String,
}

impl GoogleProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

#[async_trait]
impl ChatProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        settings: &LlmSettings,
    ) -> Result<NormalizedReply> {
        let body = build_request_body(messages, tools, settings);
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, settings.model, self.api_key
        );

        debug!(model = %settings.model, "google chat");

        let resp = shared_client().post(&url).json(&body).send().await?;

        let status = resp.status().as_u16();
        let text = resp.text().await?;
        if !(200..300).contains(&status) {
            return Err(status_to_error(status, &text));
        }

        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(data) => Ok(parse_reply(&data)),
            Err(_) => Ok(NormalizedReply::text(text)),
        }
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/models?key={}", self.base_url, self.api_key);
        let resp = shared_client().get(&url).send().await?;

        let status = resp.status().as_u16();
        let text = resp.text().await?;
        if !(200..300).contains(&status) {
            return Err(status_to_error(status, &text));
        }

        let data: serde_json::Value = serde_json::from_str(&text)?;
        let models = data
            .get("models")
            .and_then(|m| m.as_array())
            .map(|entries| {
                entries
                    .iter()
                    .filter(|m| {
                        m.get("supportedGenerationMethods")
                            .and_then(|g| g.as_array())
                            .is_some_and(|methods| {
                                methods.iter().any(|v| v.as_str() == Some("generateContent"))
                            })
                    })
                    .filter_map(|m| m.get("name").and_then(|n| n.as_str()))
                    .map(|name| name.trim_start_matches("models/").to_string())
                    .collect()
            })
            .unwrap_or_default();
        Ok(models)
    }
}

/// Normalize a Gemini response: joined text parts plus any `functionCall`
/// parts as tool calls. Unrecognized payloads degrade to stringified form.
pub fn parse_reply(data: &serde_json::Value) -> NormalizedReply {
    let Some(candidate) = data
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
    else {
        return NormalizedReply::text(data.to_string());
    };

    let mut text = String::new();
    let mut tool_calls = Vec::new();

    if let Some(parts) = candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
    {
        for part in parts {
            if let Some(t) = part.get("text").and_then(|t| t.as_str()) {
                text.push_str(t);
            }
            if let Some(call) = part.get("functionCall") {
                if let Some(name) = call.get("name").and_then(|n| n.as_str()) {
                    tool_calls.push(ToolCallRequest {
                        id: format!("call_{}", uuid::Uuid::new_v4()),
                        name: name.to_string(),
                        arguments: call.get("args").cloned().unwrap_or(serde_json::json!({})),
                    });
                }
            }
        }
    }

    if text.is_empty() && tool_calls.is_empty() {
        return NormalizedReply::text(candidate.to_string());
    }

    NormalizedReply {
        content: (!text.is_empty()).then_some(text),
        tool_calls,
    }
}

fn build_request_body(
    messages: &[Message],
    tools: &[ToolDefinition],
    settings: &LlmSettings,
) -> serde_json::Value {
    let mut system_instruction = None;
    let mut contents = Vec::new();

    for msg in messages {
        match msg.role {
            Role::System => {
                let text = msg
                    .content
                    .as_ref()
                    .map(MessageContent::to_display_string)
                    .unwrap_or_default();
                system_instruction = Some(serde_json::json!({ "parts": [{"text": text}] }));
            }
            Role::User => {
                let text = msg
                    .content
                    .as_ref()
                    .map(MessageContent::to_display_string)
                    .unwrap_or_default();
                contents.push(serde_json::json!({
                    "role": "user",
                    "parts": [{"text": text}],
                }));
            }
            Role::Assistant => {
                if !msg.tool_calls.is_empty() {
                    let parts: Vec<serde_json::Value> = msg
                        .tool_calls
                        .iter()
                        .map(|tc| {
                            serde_json::json!({
                                "functionCall": { "name": tc.name, "args": tc.arguments }
                            })
                        })
                        .collect();
                    contents.push(serde_json::json!({ "role": "model", "parts": parts }));
                } else if let Some(content) = &msg.content {
                    contents.push(serde_json::json!({
                        "role": "model",
                        "parts": [{"text": content.to_display_string()}],
                    }));
                }
            }
            Role::Tool => {
                let response = match &msg.content {
                    Some(MessageContent::Data(v)) => v.clone(),
                    Some(MessageContent::Text(t)) => serde_json::json!({ "result": t }),
                    None => serde_json::json!({}),
                };
                contents.push(serde_json::json!({
                    "role": "function",
                    "parts": [{
                        "functionResponse": {
                            "name": msg.tool_name.clone().unwrap_or_default(),
                            "response": response,
                        }
                    }]
                }));
            }
        }
    }

    let mut body = serde_json::json!({
        "contents": contents,
        "generationConfig": {
            "maxOutputTokens": settings.max_tokens,
            "temperature": settings.temperature,
        },
    });
    let obj = body.as_object_mut().expect("body is an object");

    if let Some(sys) = system_instruction {
        obj.insert("systemInstruction".into(), sys);
    }

    if !tools.is_empty() {
        let decls: Vec<serde_json::Value> = tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "parameters": t.parameters,
                })
            })
            .collect();
        obj.insert(
            "tools".into(),
            serde_json::json!([{"functionDeclarations": decls}]),
        );
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assistant_role_remaps_to_model() {
        let messages = [
            Message::system("be brief"),
            Message::user("hi"),
            Message::assistant("hello"),
        ];
        let body = build_request_body(&messages, &[], &LlmSettings::default());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "be brief"
        );
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2000);
    }

    #[test]
    fn tool_results_travel_as_function_responses() {
        let msg = Message::tool_result("call_1", "web_search", json!({"items": []}));
        let body = build_request_body(&[msg], &[], &LlmSettings::default());
        let part = &body["contents"][0]["parts"][0];
        assert_eq!(part["functionResponse"]["name"], "web_search");
        assert_eq!(part["functionResponse"]["response"]["items"], json!([]));
    }

    #[test]
    fn parses_text_candidates() {
        let data = json!({
            "candidates": [{"content": {"parts": [{"text": "bonjour"}]}}]
        });
        let reply = parse_reply(&data);
        assert_eq!(reply.content.as_deref(), Some("bonjour"));
        assert!(reply.tool_calls.is_empty());
    }

    #[test]
    fn parses_function_call_parts() {
        let data = json!({
            "candidates": [{"content": {"parts": [
                {"functionCall": {"name": "web_search", "args": {"query": "rust"}}}
            ]}}]
        });
        let reply = parse_reply(&data);
        assert_eq!(reply.content, None);
        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(reply.tool_calls[0].name, "web_search");
        assert_eq!(reply.tool_calls[0].arguments["query"], "rust");
    }

    #[test]
    fn empty_payload_degrades_to_stringified_form() {
        let reply = parse_reply(&json!({"promptFeedback": {"blockReason": "SAFETY"}}));
        assert!(reply.content.unwrap().contains("SAFETY"));
    }
}
