//! Agent loop: the session drives provider rounds and tool execution
//! until the model answers in plain text or the round budget runs out.

pub mod events;
pub mod session;
pub mod turn;

pub use events::{EventBus, EventSink, SessionEvent};
pub use session::{ChatSession, DEFAULT_MAX_ROUNDS};
pub use turn::TurnOutcome;
