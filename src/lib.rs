//! Samvad — an agentic LLM chat core.
//!
//! Provides a multi-provider chat session with a bounded agent loop,
//! tool calling, and durable conversation and settings storage.
//!
//! # Quick Start
//!
//! ```no_run
//! use samvad::prelude::*;
//!
//! # async fn example() -> samvad::error::Result<()> {
//! let mut session = ChatSession::in_memory();
//! let outcome = session.submit_user_message("Hello!").await?;
//! println!("finished after {} round(s)", outcome.rounds);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod conversation;
pub mod error;
pub mod prelude;
pub mod provider;
pub mod settings;
pub mod storage;
pub mod tools;
pub mod types;
