//! Core data types shared across the crate.

pub mod message;

pub use message::{Message, MessageContent, Role, ToolCallRequest};

use std::sync::atomic::{AtomicU64, Ordering};

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique id with the given prefix.
///
/// Ids combine a millisecond timestamp with an atomic counter so that two
/// ids minted in the same millisecond never collide.
pub fn next_id(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let n = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{millis}_{n}")
}
