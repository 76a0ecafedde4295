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

//! MCP Server Implementation
//!
//! Drives a transport until the client disconnects, and exposes the same
//! handler over HTTP POST for hosts that speak JSON-RPC per request.

use crate::mcp::handlers::{MCPHandler, MCP_SERVER_NAME};
use crate::mcp::protocol::*;
use crate::mcp::transport::{McpTransport, TransportError};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tracing::{info, warn};

/// MCP Server state
#[derive(Clone)]
pub struct MCPServerState {
    pub handler: Arc<MCPHandler>,
}

/// MCP Server
pub struct MCPServer {
    state: MCPServerState,
}

impl MCPServer {
    /// Create a new MCP server
    pub fn new(handler: Arc<MCPHandler>) -> Self {
        Self {
            state: MCPServerState { handler },
        }
    }

    /// Get the Axum router for the MCP server
    pub fn router(&self) -> Router {
        Router::new()
            .route("/mcp", post(handle_mcp_request))
            .route("/mcp/health", get(handle_mcp_health))
            .with_state(self.state.clone())
    }

    /// Get the server state (for embedding in a larger server)
    pub fn state(&self) -> MCPServerState {
        self.state.clone()
    }

    /// Drive a transport until the peer disconnects.
    ///
    /// Invalid JSON is answered with a parse error and the loop keeps
    /// going; notifications are processed but produce no response on the
    /// wire.
    pub async fn serve<T: McpTransport>(&self, mut transport: T) -> Result<(), TransportError> {
        loop {
            let request = match transport.recv().await {
                Ok(request) => request,
                Err(TransportError::Json(e)) => {
                    warn!(error = %e, "Invalid JSON-RPC request");
                    let response = JsonRpcResponse::error(
                        JsonRpcId::Null,
                        JsonRpcError::parse_error(format!("Invalid JSON: {}", e)),
                    );
                    transport.send(response).await?;
                    continue;
                }
                Err(TransportError::ChannelClosed) => {
                    info!("MCP client disconnected");
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

            let is_notification = request.is_notification();
            let response = self.state.handler.handle_request(request).await;
            if is_notification {
                continue;
            }
            transport.send(response).await?;
        }
    }
}

/// Handle MCP health check (GET /mcp/health)
async fn handle_mcp_health(State(_state): State<MCPServerState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "protocol_version": MCP_PROTOCOL_VERSION,
        "server_name": MCP_SERVER_NAME,
        "server_version": env!("CARGO_PKG_VERSION"),
        "capabilities": {
            "tools": true,
            "logging": true
        }
    }))
}

/// Handle MCP JSON-RPC request over HTTP POST
async fn handle_mcp_request(
    State(state): State<MCPServerState>,
    Json(request): Json<JsonRpcRequest>,
) -> Json<JsonRpcResponse> {
    let response = state.handler.handle_request(request).await;
    Json(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_jsonrpc_response_creation() {
        let success =
            JsonRpcResponse::success(JsonRpcId::Number(1), serde_json::json!({"result": "test"}));
        assert!(success.result.is_some());
        assert!(success.error.is_none());

        let error = JsonRpcResponse::error(
            JsonRpcId::String("test".to_string()),
            JsonRpcError::method_not_found("unknown"),
        );
        assert!(error.result.is_none());
        assert!(error.error.is_some());
    }

    #[test]
    fn test_notification_detection() {
        let notification: JsonRpcRequest = serde_json::from_str(
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        )
        .unwrap();
        assert!(notification.is_notification());

        let request: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"ping","id":1}"#).unwrap();
        assert!(!request.is_notification());
    }
}
