//! AI Pipe proxy adapter.
//!
//! AI Pipe fronts several upstreams behind OpenAI-compatible routes; chat
//! goes through its OpenRouter endpoint, and model listing merges whatever
//! the proxy exposes with a curated fallback.

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::settings::LlmSettings;
use crate::types::Message;

use super::http::{bearer_headers, shared_client, status_to_error};
use super::openai::{build_request_body, reply_from_body};
use super::{ChatProvider, NormalizedReply, ToolDefinition};

const DEFAULT_BASE_URL: &str = "https://aipipe.org";
const FALLBACK_MODEL: &str = "openai/gpt-4o-mini";

/// Curated list used when the proxy's model endpoints return nothing usable.
const FALLBACK_MODELS: [&str; 5] = [
    "openai/gpt-4o-mini",
    "openai/gpt-4o",
    "openai/gpt-4.1",
    "openai/gpt-4o-realtime-preview",
    "openai/gpt-3.5-turbo",
];

#[derive(Debug)]
pub struct AiPipeProvider {
    api_key: String,
    base_url: String,
}

impl AiPipeProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    async fn fetch_model_ids(&self, path: &str, field: &str) -> Vec<String> {
        let url = format!("{}{}", self.base_url, path);
        let Ok(resp) = shared_client()
            .get(&url)
            .headers(bearer_headers(&self.api_key))
            .send()
            .await
        else {
            return Vec::new();
        };
        if !resp.status().is_success() {
            return Vec::new();
        }
        let Ok(data) = resp.json::<serde_json::Value>().await else {
            return Vec::new();
        };
        let entries = data
            .get(field)
            .and_then(|v| v.as_array())
            .or_else(|| data.as_array());
        entries
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|m| {
                        m.get("name")
                            .or_else(|| m.get("id"))
                            .and_then(|v| v.as_str())
                    })
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatProvider for AiPipeProvider {
    fn name(&self) -> &str {
        "aipipe"
    }

    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        settings: &LlmSettings,
    ) -> Result<NormalizedReply> {
        let model = if settings.model.is_empty() {
            FALLBACK_MODEL
        } else {
            settings.model.as_str()
        };
        let body = build_request_body(model, messages, tools, settings);
        let url = format!("{}/openrouter/v1/chat/completions", self.base_url);

        debug!(model, "aipipe chat");

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

    /// Try the OpenRouter listing, then the OpenAI one, then pad with the
    /// curated fallback — deduplicated, first occurrence wins.
    async fn list_models(&self) -> Result<Vec<String>> {
        let mut combined = self.fetch_model_ids("/openrouter/v1/models", "models").await;
        combined.extend(self.fetch_model_ids("/openai/v1/models", "data").await);
        combined.extend(FALLBACK_MODELS.iter().map(|m| m.to_string()));

        let mut seen = std::collections::HashSet::new();
        combined.retain(|m| seen.insert(m.clone()));
        Ok(combined)
    }
}
