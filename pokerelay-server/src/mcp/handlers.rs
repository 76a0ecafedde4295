// Copyright 2025 Pokerelay Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! MCP Request Handlers
//!
//! Handles JSON-RPC 2.0 requests for the MCP protocol.

use crate::mcp::protocol::*;
use crate::mcp::tools::{ToolError, ToolRegistry};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Server name advertised during initialization
pub const MCP_SERVER_NAME: &str = "pokerelay-mcp";

/// MCP request handler
pub struct MCPHandler {
    registry: Arc<ToolRegistry>,
}

impl MCPHandler {
    /// Create a new MCP handler
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Handle a JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        info!(method = %request.method, "MCP request received");

        match request.method.as_str() {
            // Health check (MCP protocol standard)
            "ping" => self.handle_ping(request.id).await,

            // Initialization
            "initialize" => self.handle_initialize(request.id, request.params).await,
            "initialized" | "notifications/initialized" => {
                self.handle_initialized(request.id).await
            }

            // Tools
            "tools/list" => self.handle_tools_list(request.id).await,
            "tools/call" => self.handle_tools_call(request.id, request.params).await,

            // Unknown method
            _ => {
                warn!(method = %request.method, "Unknown MCP method");
                JsonRpcResponse::error(request.id, JsonRpcError::method_not_found(&request.method))
            }
        }
    }

    /// Handle ping request (MCP health check)
    /// Returns empty object per MCP protocol specification
    async fn handle_ping(&self, id: JsonRpcId) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({}))
    }

    /// Handle initialize request
    async fn handle_initialize(
        &self,
        id: JsonRpcId,
        params: Option<serde_json::Value>,
    ) -> JsonRpcResponse {
        let _init_params: InitializeParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_params(format!("Invalid initialize params: {}", e)),
                    )
                }
            },
            None => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params("Missing initialize params"),
                )
            }
        };

        let result = InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
                logging: Some(LoggingCapability {}),
            },
            server_info: ServerInfo {
                name: MCP_SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        JsonRpcResponse::success(id, serde_json::to_value(result).unwrap())
    }

    /// Handle initialized notification
    async fn handle_initialized(&self, id: JsonRpcId) -> JsonRpcResponse {
        info!("MCP client initialized");
        JsonRpcResponse::success(id, json!({}))
    }

    /// Handle tools/list
    async fn handle_tools_list(&self, id: JsonRpcId) -> JsonRpcResponse {
        let tools = self
            .registry
            .list()
            .into_iter()
            .map(|entry| Tool {
                name: entry.name,
                description: Some(entry.description),
                input_schema: entry.input_schema,
            })
            .collect();

        let result = ListToolsResult {
            tools,
            next_cursor: None,
        };

        JsonRpcResponse::success(id, serde_json::to_value(result).unwrap())
    }

    /// Handle tools/call
    async fn handle_tools_call(
        &self,
        id: JsonRpcId,
        params: Option<serde_json::Value>,
    ) -> JsonRpcResponse {
        let call_params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_params(format!("Invalid tool call params: {}", e)),
                    )
                }
            },
            None => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params("Missing tool call params"),
                )
            }
        };

        info!(tool = %call_params.name, "Executing MCP tool");

        let args = serde_json::Value::Object(
            call_params
                .arguments
                .into_iter()
                .collect::<serde_json::Map<String, serde_json::Value>>(),
        );

        match self.registry.execute(&call_params.name, args).await {
            Ok(output) => {
                let result = CallToolResult {
                    content: vec![ToolContent::Text { text: output.text }],
                    is_error: if output.is_error { Some(true) } else { None },
                };
                JsonRpcResponse::success(id, serde_json::to_value(result).unwrap())
            }
            Err(ToolError::NotFound(name)) => {
                warn!(tool = %name, "Unknown MCP tool");
                JsonRpcResponse::error(id, JsonRpcError::method_not_found(&name))
            }
            Err(ToolError::InvalidParams(message)) => {
                JsonRpcResponse::error(id, JsonRpcError::invalid_params(message))
            }
            Err(ToolError::Execution(message)) => {
                JsonRpcResponse::error(id, JsonRpcError::internal_error(message))
            }
        }
    }
}
