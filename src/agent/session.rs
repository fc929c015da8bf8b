//! The chat session: conversation state, settings, and the agent loop.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::conversation::{Conversation, ConversationStore};
use crate::error::{Result, SamvadError};
use crate::provider::{DefaultProviderFactory, ProviderFactory, ToolDefinition};
use crate::settings::Settings;
use crate::storage::{KeyValueStore, MemoryStore};
use crate::tools::ToolRegistry;
use crate::types::Message;

use super::events::{EventBus, EventSink, SessionEvent};
use super::turn::TurnOutcome;

/// Default round budget per turn.
pub const DEFAULT_MAX_ROUNDS: usize = 5;

/// An explicit, constructed session context: settings store, conversation
/// store, provider factory, and tool registry, wired together with no
/// global state. Multiple sessions can coexist independently.
pub struct ChatSession {
    settings: Settings,
    conversations: ConversationStore,
    tools: ToolRegistry,
    provider_factory: Box<dyn ProviderFactory>,
    storage: Arc<dyn KeyValueStore>,
    events: EventBus,
    is_processing: bool,
    api_calls: u64,
    max_rounds: usize,
    model_cache: HashMap<String, Vec<String>>,
}

impl ChatSession {
    /// Build a session on the given storage, restoring persisted settings
    /// and conversations. Restore failures degrade to fresh state; they
    /// never block startup.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let settings = Settings::load(storage.as_ref());
        let conversations = ConversationStore::restore(storage.as_ref());
        Self {
            settings,
            conversations,
            tools: ToolRegistry::with_builtin(),
            provider_factory: Box::new(DefaultProviderFactory),
            storage,
            events: EventBus::new(),
            is_processing: false,
            api_calls: 0,
            max_rounds: DEFAULT_MAX_ROUNDS,
            model_cache: HashMap::new(),
        }
    }

    /// In-memory session, used by tests and as the degraded mode when no
    /// disk storage is available.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn with_provider_factory(mut self, factory: Box<dyn ProviderFactory>) -> Self {
        self.provider_factory = factory;
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Subscribe to session events.
    pub fn subscribe(&mut self, sink: EventSink) {
        self.events.subscribe(sink);
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Commit new settings and persist them; a persistence failure keeps
    /// the new settings in memory with a warning.
    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.model_cache.clear();
        if let Err(err) = self.settings.save(self.storage.as_ref()) {
            warn!(error = %err, "could not persist settings, keeping in memory");
        }
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub fn conversations_mut(&mut self) -> &mut ConversationStore {
        &mut self.conversations
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.conversations.active()
    }

    /// Whether a turn is currently in flight.
    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    /// Number of provider network calls made over the session's lifetime.
    pub fn api_calls(&self) -> u64 {
        self.api_calls
    }

    /// Greet an empty active conversation, as a first-run hint.
    pub fn greet_if_empty(&mut self) {
        let Some(conv) = self.conversations.active() else {
            return;
        };
        if conv.messages.is_empty() {
            let id = conv.id.clone();
            let _ = self.append_and_emit(&id, Message::assistant("Welcome! How can I assist you?"));
        }
    }

    /// Submit one user message and run the turn to completion.
    ///
    /// Rejects while another turn is in flight. The turn itself never
    /// escapes as an error: provider failures end up as a system-role
    /// diagnostic in the conversation and in `TurnOutcome::error`.
    pub async fn submit_user_message(&mut self, text: &str) -> Result<TurnOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SamvadError::InvalidArgument("empty user message".into()));
        }
        if self.is_processing {
            return Err(SamvadError::TurnInFlight);
        }

        self.is_processing = true;
        self.events
            .emit(&SessionEvent::TurnStateChanged { processing: true });

        let conversation_id = match self.conversations.active_id() {
            Some(id) => id.to_string(),
            None => self.conversations.create(),
        };

        let result = match self.append_and_emit(&conversation_id, Message::user(text)) {
            Ok(()) => self.run_turn(&conversation_id).await,
            Err(err) => Err(err),
        };

        self.is_processing = false;
        self.events
            .emit(&SessionEvent::TurnStateChanged { processing: false });

        if self.settings.advanced.auto_save {
            if let Err(err) = self.conversations.persist(self.storage.as_ref()) {
                warn!(error = %err, "could not persist conversations, continuing in memory");
            }
        }

        result
    }

    /// Run one turn against the addressed conversation.
    ///
    /// Precondition: the conversation exists and the user message has
    /// already been appended. At most `max_rounds` provider rounds; budget
    /// exhaustion terminates silently and is reported via the outcome.
    pub async fn run_turn(&mut self, conversation_id: &str) -> Result<TurnOutcome> {
        if self.conversations.get(conversation_id).is_none() {
            return Err(SamvadError::ConversationNotFound(conversation_id.into()));
        }

        let llm = self.settings.llm.clone();
        let provider = match self.provider_factory.create(&llm) {
            Ok(provider) => provider,
            Err(err) => {
                self.append_diagnostic(conversation_id, &err);
                return Ok(TurnOutcome::failed(0, err.to_string()));
            }
        };

        let tool_defs: Vec<ToolDefinition> = self
            .tools
            .tools()
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters().schema.clone(),
            })
            .collect();

        let mut rounds = 0usize;

        while rounds < self.max_rounds {
            rounds += 1;

            // the store owns the thread; the provider gets a snapshot
            let messages = self
                .conversations
                .get(conversation_id)
                .map(|c| c.messages.clone())
                .unwrap_or_default();

            let reply = match provider.chat(&messages, &tool_defs, &llm).await {
                Ok(reply) => reply,
                Err(err) => {
                    warn!(round = rounds, error = %err, "provider call failed");
                    self.append_diagnostic(conversation_id, &err);
                    return Ok(TurnOutcome::failed(rounds, err.to_string()));
                }
            };

            if !provider.is_offline() {
                self.api_calls += 1;
            }

            debug!(
                round = rounds,
                has_content = reply.has_content(),
                tool_calls = reply.tool_calls.len(),
                "round complete"
            );

            if reply.has_content() {
                let content = reply.content.clone().unwrap_or_default();
                self.append_and_emit(conversation_id, Message::assistant(content))?;
            }

            if reply.tool_calls.is_empty() {
                return Ok(TurnOutcome::completed(rounds));
            }

            let calls = reply.tool_calls;
            self.append_and_emit(
                conversation_id,
                Message::assistant_tool_calls(calls.clone()),
            )?;

            // execute concurrently; join_all yields results in request order
            let results = join_all(calls.iter().map(|call| self.tools.execute(call))).await;

            for (call, result) in calls.iter().zip(results) {
                self.append_and_emit(
                    conversation_id,
                    Message::tool_result(call.id.clone(), call.name.clone(), result),
                )?;
            }
        }

        // budget exhausted: the last appended assistant content stands
        Ok(TurnOutcome::exhausted(self.max_rounds))
    }

    /// List models for the configured provider, cached per provider name.
    pub async fn list_models(&mut self) -> Result<Vec<String>> {
        let key = self.settings.llm.provider.clone();
        if let Some(models) = self.model_cache.get(&key) {
            return Ok(models.clone());
        }
        let provider = self.provider_factory.create(&self.settings.llm)?;
        let models = provider.list_models().await?;
        self.model_cache.insert(key, models.clone());
        Ok(models)
    }

    /// Persist conversations now, regardless of the auto-save setting.
    pub fn persist(&self) -> Result<()> {
        self.conversations.persist(self.storage.as_ref())?;
        self.settings.save(self.storage.as_ref())
    }

    /// Remove every persisted record and reset the session to fresh state.
    pub fn clear_all_data(&mut self) {
        for key in [crate::storage::SETTINGS_KEY, crate::storage::CONVERSATIONS_KEY] {
            if let Err(err) = self.storage.remove(key) {
                warn!(key, error = %err, "could not remove stored record");
            }
        }
        self.settings = Settings::default();
        self.conversations = ConversationStore::restore(self.storage.as_ref());
        self.model_cache.clear();
    }

    fn append_and_emit(&mut self, conversation_id: &str, message: Message) -> Result<()> {
        let event = SessionEvent::MessageAppended {
            conversation_id: conversation_id.to_string(),
            message: message.clone(),
        };
        self.conversations.append(conversation_id, message)?;
        self.events.emit(&event);
        Ok(())
    }

    fn append_diagnostic(&mut self, conversation_id: &str, err: &SamvadError) {
        let _ = self.append_and_emit(
            conversation_id,
            Message::system(format!("Agent iteration error: {err}")),
        );
    }
}
