//! Owning store for all conversations in a session.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use crate::error::{Result, SamvadError};
use crate::storage::{KeyValueStore, CONVERSATIONS_KEY};
use crate::types::Message;

use super::Conversation;

/// Exclusive owner of the session's conversations.
///
/// All mutation goes through the store; the agent loop addresses
/// conversations by id and never holds a private copy.
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    active_id: Option<String>,
}

/// Persisted shapes tolerated on restore: the order-preserving pair sequence
/// this crate writes, or a plain keyed map from older snapshots.
#[derive(Deserialize)]
#[serde(untagged)]
enum PersistedConversations {
    Pairs(Vec<(String, Conversation)>),
    Map(HashMap<String, Conversation>),
}

impl ConversationStore {
    /// Empty store with no active conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh conversation, make it active, and return its id.
    pub fn create(&mut self) -> String {
        let conv = Conversation::new();
        let id = conv.id.clone();
        self.conversations.push(conv);
        self.active_id = Some(id.clone());
        id
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    /// Append a message to the addressed conversation.
    pub fn append(&mut self, id: &str, message: Message) -> Result<()> {
        let conv = self
            .get_mut(id)
            .ok_or_else(|| SamvadError::ConversationNotFound(id.to_string()))?;
        conv.append(message);
        Ok(())
    }

    /// All conversations, most recently updated first.
    pub fn list_by_recency(&self) -> Vec<&Conversation> {
        let mut list: Vec<&Conversation> = self.conversations.iter().collect();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        list
    }

    pub fn clear_messages(&mut self, id: &str) -> Result<()> {
        let conv = self
            .get_mut(id)
            .ok_or_else(|| SamvadError::ConversationNotFound(id.to_string()))?;
        conv.clear_messages();
        Ok(())
    }

    /// Remove a conversation. If it was active, the most recently updated
    /// remaining conversation becomes active.
    pub fn remove(&mut self, id: &str) {
        self.conversations.retain(|c| c.id != id);
        if self.active_id.as_deref() == Some(id) {
            self.active_id = self
                .list_by_recency()
                .first()
                .map(|c| c.id.clone());
        }
    }

    pub fn set_active(&mut self, id: &str) -> Result<()> {
        if self.get(id).is_none() {
            return Err(SamvadError::ConversationNotFound(id.to_string()));
        }
        self.active_id = Some(id.to_string());
        Ok(())
    }

    pub fn active(&self) -> Option<&Conversation> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Serialize every conversation as an order-preserving pair sequence.
    pub fn persist(&self, storage: &dyn KeyValueStore) -> Result<()> {
        let pairs: Vec<(&str, &Conversation)> = self
            .conversations
            .iter()
            .map(|c| (c.id.as_str(), c))
            .collect();
        let raw = serde_json::to_string(&pairs)?;
        storage.write(CONVERSATIONS_KEY, &raw)
    }

    /// Restore a store from persisted state.
    ///
    /// Tolerates both the pair-sequence shape and a plain keyed map. A
    /// corrupt record degrades to a fresh store with a warning. After
    /// restore the store always holds at least one conversation, and the
    /// most recently updated one is active.
    pub fn restore(storage: &dyn KeyValueStore) -> Self {
        let mut store = Self::new();

        let raw = match storage.read(CONVERSATIONS_KEY) {
            Ok(Some(raw)) => Some(raw),
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "could not read stored conversations, starting fresh");
                None
            }
        };

        if let Some(raw) = raw {
            match serde_json::from_str::<PersistedConversations>(&raw) {
                Ok(PersistedConversations::Pairs(pairs)) => {
                    store.conversations = pairs.into_iter().map(|(_, conv)| conv).collect();
                }
                Ok(PersistedConversations::Map(map)) => {
                    let mut convs: Vec<Conversation> = map.into_values().collect();
                    // map order is not meaningful; fall back to creation order
                    convs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
                    store.conversations = convs;
                }
                Err(err) => {
                    warn!(error = %err, "stored conversations unreadable, starting fresh");
                }
            }
        }

        if store.conversations.is_empty() {
            store.create();
        } else {
            store.active_id = store.list_by_recency().first().map(|c| c.id.clone());
        }
        store
    }
}
