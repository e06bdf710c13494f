//! MCP server bridge using rmcp with a Hub backend
//!
//! Tool calls named `namespace.method` are routed to hub activations.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError,
    ServerHandler,
    model::*,
    service::{RequestContext, RoleServer},
};
use serde_json::json;

use crate::hub::{Hub, HubError, MethodSchema, ToolOutput};

// =============================================================================
// Schema Transformation
// =============================================================================

/// Convert hub method schemas to rmcp Tool format
///
/// MCP requires all tool inputSchema to have "type": "object" at root.
fn schemas_to_rmcp_tools(schemas: Vec<(String, MethodSchema)>) -> Vec<Tool> {
    schemas
        .into_iter()
        .map(|(name, method)| {
            let input_schema = method
                .params
                .and_then(|s| serde_json::to_value(s).ok())
                .and_then(|v| v.as_object().cloned())
                .map(|mut obj| {
                    if !obj.contains_key("type") {
                        obj.insert("type".to_string(), json!("object"));
                    }
                    Arc::new(obj)
                })
                .unwrap_or_else(|| {
                    Arc::new(serde_json::Map::from_iter([(
                        "type".to_string(),
                        json!("object"),
                    )]))
                });

            Tool::new(name, method.description, input_schema)
        })
        .collect()
}

// =============================================================================
// Result Mapping
// =============================================================================

/// Routing and argument problems are protocol errors; execution failures
/// are tool results with `isError` set
fn hub_to_mcp_result(result: Result<ToolOutput, HubError>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(output) => {
            let text = match output.content {
                serde_json::Value::String(s) => s,
                other => serde_json::to_string_pretty(&other).unwrap_or_default(),
            };
            if output.is_error {
                Ok(CallToolResult::error(vec![Content::text(text)]))
            } else {
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
        }
        Err(HubError::Execution(message)) => {
            Ok(CallToolResult::error(vec![Content::text(message)]))
        }
        Err(HubError::ActivationNotFound(name)) => Err(McpError::invalid_params(
            format!("Unknown tool namespace: {}", name),
            None,
        )),
        Err(HubError::MethodNotFound { activation, method }) => Err(McpError::invalid_params(
            format!("Unknown tool: {}.{}", activation, method),
            None,
        )),
        Err(HubError::InvalidParams(reason)) => Err(McpError::invalid_params(reason, None)),
    }
}

// =============================================================================
// Node-RED MCP Bridge
// =============================================================================

/// MCP handler that bridges to the hub
#[derive(Clone)]
pub struct NodeRedMcpBridge {
    hub: Arc<Hub>,
}

impl NodeRedMcpBridge {
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub }
    }

    pub fn tools(&self) -> Vec<Tool> {
        schemas_to_rmcp_tools(self.hub.list_schemas())
    }
}

impl ServerHandler for NodeRedMcpBridge {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_logging()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Node-RED admin tools. Flow tabs can be addressed by id or label; \
                 nodes added through flows.update, flows.add_nodes or flows.create \
                 are laid out automatically."
                    .into(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let tools = self.tools();
        tracing::debug!("Listing {} tools", tools.len());

        Ok(ListToolsResult {
            tools,
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool_name = request.name.to_string();
        let arguments = request
            .arguments
            .map(serde_json::Value::Object)
            .unwrap_or(json!({}));

        tracing::debug!(tool = %tool_name, "Calling tool");

        let result = tokio::select! {
            result = self.hub.route(&tool_name, arguments) => result,
            _ = ctx.ct.cancelled() => return Err(McpError::internal_error("Cancelled", None)),
        };

        if let Err(e) = &result {
            tracing::warn!(tool = %tool_name, "Tool failed: {}", e);
        }
        hub_to_mcp_result(result)
    }
}
