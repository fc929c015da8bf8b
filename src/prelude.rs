//! Convenience re-exports for common use.

pub use crate::agent::{ChatSession, EventSink, SessionEvent, TurnOutcome, DEFAULT_MAX_ROUNDS};
pub use crate::conversation::{Conversation, ConversationStore};
pub use crate::error::{Result, SamvadError};
pub use crate::provider::{ChatProvider, NormalizedReply, ProviderFactory, ProviderKind, ToolDefinition};
pub use crate::settings::Settings;
pub use crate::storage::{FileStore, KeyValueStore, MemoryStore};
pub use crate::tools::{AgentTool, Tool, ToolArguments, ToolParameters, ToolRegistry};
pub use crate::types::{Message, MessageContent, Role, ToolCallRequest};
