//! Tool declaration, argument decoding, and dispatch.

pub mod arguments;
pub mod builtin;
pub mod tool;

pub use arguments::ToolArguments;
pub use tool::{AgentTool, Tool, ToolExecutionContext, ToolParameters};

use std::sync::Arc;

use tracing::warn;

use crate::types::ToolCallRequest;

/// Closed registry of callable tools.
///
/// Dispatch is by exact name match. [`ToolRegistry::execute`] upholds the
/// executor contract: it never fails and always yields a JSON-serializable
/// result — internal failures are folded into an `{"error": ...}` payload.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the built-in simulated tools.
    pub fn with_builtin() -> Self {
        Self {
            tools: builtin::all_tools(),
        }
    }

    /// Register an additional tool.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.push(tool);
    }

    /// The registered tools, in registration order.
    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute one tool-call request.
    ///
    /// Unknown names, undecodable arguments, and handler failures all come
    /// back as error payloads rather than propagating.
    pub async fn execute(&self, request: &ToolCallRequest) -> serde_json::Value {
        let Some(tool) = self.tools.iter().find(|t| t.name() == request.name) else {
            return serde_json::json!({ "error": format!("Unknown tool: {}", request.name) });
        };

        let args = ToolArguments::decode(&request.arguments)
            .apply_defaults(tool.parameters().defaults());
        let ctx = ToolExecutionContext {
            tool_call_id: Some(request.id.clone()),
            tool_name: Some(request.name.clone()),
        };

        match tool.execute(&args, &ctx).await {
            Ok(value) => value,
            Err(err) => {
                warn!(tool = %request.name, error = %err, "tool execution failed");
                serde_json::json!({ "error": err.to_string() })
            }
        }
    }
}
