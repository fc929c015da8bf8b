//! Provider adapters: normalize heterogeneous chat-completion APIs.

pub mod aipipe;
pub mod google;
pub mod http;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{Result, SamvadError};
use crate::settings::LlmSettings;
use crate::types::{Message, ToolCallRequest};

/// Provider-agnostic reply shape produced by every adapter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedReply {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
}

impl NormalizedReply {
    /// Plain text reply with no tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Whether the reply carries non-empty assistant text.
    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.is_empty())
    }
}

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// The fixed provider enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum ProviderKind {
    #[strum(serialize = "openai")]
    OpenAi,
    #[strum(serialize = "google")]
    Google,
    #[strum(serialize = "aipipe")]
    AiPipe,
}

/// One chat backend: request building, response normalization, model listing.
#[async_trait]
pub trait ChatProvider: Send + Sync + std::fmt::Debug {
    /// Provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Whether this adapter answers locally without touching the network.
    fn is_offline(&self) -> bool {
        false
    }

    /// Send the full message history and normalize the reply.
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        settings: &LlmSettings,
    ) -> Result<NormalizedReply>;

    /// List available model identifiers for this provider.
    async fn list_models(&self) -> Result<Vec<String>>;
}

/// Creates providers from the session's LLM settings.
pub trait ProviderFactory: Send + Sync {
    fn create(&self, llm: &LlmSettings) -> Result<Box<dyn ChatProvider>>;
}

/// Default factory over the fixed provider enumeration.
///
/// A missing credential yields the offline adapter rather than an error, so
/// the loop and UI stay exercisable without network access.
#[derive(Debug, Default)]
pub struct DefaultProviderFactory;

impl ProviderFactory for DefaultProviderFactory {
    fn create(&self, llm: &LlmSettings) -> Result<Box<dyn ChatProvider>> {
        create_provider(llm)
    }
}

/// Create a provider for the configured backend.
pub fn create_provider(llm: &LlmSettings) -> Result<Box<dyn ChatProvider>> {
    let kind: ProviderKind = llm
        .provider
        .parse()
        .map_err(|_| SamvadError::UnsupportedProvider(llm.provider.clone()))?;

    if llm.api_key.trim().is_empty() {
        return Ok(Box::new(OfflineProvider::new(kind)));
    }

    Ok(match kind {
        ProviderKind::OpenAi => Box::new(openai::OpenAiProvider::new(llm.api_key.clone(), None)),
        ProviderKind::Google => Box::new(google::GoogleProvider::new(llm.api_key.clone(), None)),
        ProviderKind::AiPipe => Box::new(aipipe::AiPipeProvider::new(llm.api_key.clone(), None)),
    })
}

/// Deterministic placeholder content served when no credential is set.
pub const OFFLINE_REPLY: &str =
    "Demo response: provide an API key in settings to use real models.";

/// Adapter used when the configured provider has no credential.
#[derive(Debug)]
pub struct OfflineProvider {
    kind: ProviderKind,
}

impl OfflineProvider {
    pub fn new(kind: ProviderKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl ChatProvider for OfflineProvider {
    fn name(&self) -> &str {
        "offline"
    }

    fn is_offline(&self) -> bool {
        true
    }

    async fn chat(
        &self,
        _messages: &[Message],
        _tools: &[ToolDefinition],
        _settings: &LlmSettings,
    ) -> Result<NormalizedReply> {
        Ok(NormalizedReply::text(OFFLINE_REPLY))
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        // a placeholder entry keeps pickers functional without a key
        let _ = self.kind;
        Ok(vec!["default-local-model".to_string()])
    }
}
