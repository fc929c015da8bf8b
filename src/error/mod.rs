//! Error types for Samvad.

use thiserror::Error;

/// Primary error type for all Samvad operations.
#[derive(Error, Debug)]
pub enum SamvadError {
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Tool execution error in {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("A turn is already in flight for this session")]
    TurnInFlight,

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl SamvadError {
    /// Create an API error from a status code and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether this error came from the provider boundary (network or API),
    /// as opposed to local state or storage.
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            Self::Api { .. } | Self::Network(_) | Self::UnsupportedProvider(_)
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SamvadError>;
