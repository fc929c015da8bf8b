//! Built-in tools offered to the model.
//!
//! Every handler here is simulated: `web_search` performs no network lookup
//! and `execute_code` runs nothing. They keep the loop and UI exercisable
//! end to end; a host may register real implementations behind the same
//! [`Tool`] contract, provided handlers keep the "never panic, always return
//! a JSON-serializable result" guarantee.

use std::sync::Arc;

use serde_json::json;

use super::tool::{AgentTool, Tool, ToolExecutionContext, ToolParameters};

/// The `web_search` tool (simulated).
pub fn web_search_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "web_search",
        "Search the web for current information",
        ToolParameters::object()
            .string("query", "Search query", true)
            .integer("results", "Maximum number of results", false)
            .with_default("results", json!(5))
            .build(),
        |args, _ctx: ToolExecutionContext| async move {
            let query = args.get_str("query")?;
            let results = args.get_i64_opt("results").unwrap_or(5);
            Ok(json!({
                "status": format!("Simulated search for: {query}"),
                "requested": results,
                "items": [],
            }))
        },
    ))
}

/// The `execute_code` tool (simulated — no sandbox, nothing runs).
pub fn execute_code_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "execute_code",
        "Execute JavaScript code safely",
        ToolParameters::object()
            .string("code", "Code to execute", true)
            .build(),
        |args, _ctx: ToolExecutionContext| async move {
            let code = args.get_str("code")?;
            Ok(json!({ "output": format!("Simulated execution of: {code}") }))
        },
    ))
}

/// The `process_file` tool (simulated).
pub fn process_file_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "process_file",
        "Process and analyze uploaded files",
        ToolParameters::object()
            .string("fileId", "Identifier of the uploaded file", true)
            .string("operation", "Operation to perform", false)
            .with_default("operation", json!("analyze"))
            .build(),
        |args, _ctx: ToolExecutionContext| async move {
            let file_id = args.get_str("fileId")?;
            let operation = args.get_str_opt("operation").unwrap_or("analyze");
            Ok(json!({ "result": format!("Simulated {operation} on file {file_id}") }))
        },
    ))
}

/// The `create_visualization` tool (simulated).
pub fn create_visualization_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "create_visualization",
        "Create data visualizations",
        ToolParameters::object()
            .string("data", "Data to visualize", true)
            .string("type", "Chart type", false)
            .with_default("type", json!("line"))
            .string("title", "Chart title", false)
            .build(),
        |args, _ctx: ToolExecutionContext| async move {
            let _data = args.get_str("data")?;
            let chart_type = args.get_str_opt("type").unwrap_or("line");
            let title = args.get_str_opt("title").unwrap_or("Untitled");
            Ok(json!({
                "chartUrl": format!("Simulated {chart_type} chart titled \"{title}\"")
            }))
        },
    ))
}

/// All built-in tools.
pub fn all_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        web_search_tool(),
        execute_code_tool(),
        process_file_tool(),
        create_visualization_tool(),
    ]
}
