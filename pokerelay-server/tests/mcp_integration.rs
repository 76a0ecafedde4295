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

// End-to-end tests for the MCP handler stack against a mocked upstream.

use mockito::{Matcher, Server};
use pokerelay_client::PokeApiClient;
use pokerelay_server::config::QueryDefaults;
use pokerelay_server::mcp::{
    BufferTransport, GetPokemonTool, JsonRpcId, JsonRpcRequest, ListPokemonTool, MCPHandler,
    MCPServer, ToolRegistry, JSONRPC_VERSION,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;

fn handler_for(base_url: String, defaults: QueryDefaults) -> Arc<MCPHandler> {
    let client = Arc::new(PokeApiClient::with_base_url(base_url));
    let registry = Arc::new(ToolRegistry::new());
    registry
        .register(Arc::new(GetPokemonTool::new(client.clone(), defaults)))
        .unwrap();
    registry
        .register(Arc::new(ListPokemonTool::new(client)))
        .unwrap();
    Arc::new(MCPHandler::new(registry))
}

fn request(method: &str, params: Value) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: JSONRPC_VERSION.to_string(),
        method: method.to_string(),
        params: Some(params),
        id: JsonRpcId::Number(1),
    }
}

fn initialize_params() -> Value {
    json!({
        "protocolVersion": "2024-11-05",
        "capabilities": {},
        "clientInfo": { "name": "test-client", "version": "0.0.1" }
    })
}

#[tokio::test]
async fn initialize_advertises_tools_capability() {
    let handler = handler_for("http://127.0.0.1:1/pokemon".to_string(), QueryDefaults::default());

    let response = handler
        .handle_request(request("initialize", initialize_params()))
        .await;

    let result = response.result.expect("initialize should succeed");
    assert!(result["capabilities"]["tools"].is_object());
    assert_eq!(result["serverInfo"]["name"], "pokerelay-mcp");
    assert_eq!(result["protocolVersion"], "2024-11-05");
}

#[tokio::test]
async fn tools_list_exposes_both_tools() {
    let handler = handler_for("http://127.0.0.1:1/pokemon".to_string(), QueryDefaults::default());

    let response = handler.handle_request(request("tools/list", json!({}))).await;

    let result = response.result.expect("tools/list should succeed");
    let names: Vec<&str> = result["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"get_pokemon"));
    assert!(names.contains(&"list_pokemon"));
}

#[tokio::test]
async fn get_pokemon_returns_raw_body() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/pokemon/pikachu")
        .with_status(200)
        .with_body(r#"{"name":"pikachu"}"#)
        .create_async()
        .await;

    let handler = handler_for(format!("{}/pokemon", server.url()), QueryDefaults::default());
    let response = handler
        .handle_request(request(
            "tools/call",
            json!({ "name": "get_pokemon", "arguments": { "name": "pikachu" } }),
        ))
        .await;

    let result = response.result.expect("tool call should succeed");
    assert_eq!(result["content"][0]["text"], r#"{"name":"pikachu"}"#);
    assert!(result.get("isError").is_none());
}

#[tokio::test]
async fn get_pokemon_pagination_args_build_list_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/pokemon")
        .match_query(Matcher::Exact("limit=3&offset=6".to_string()))
        .with_status(200)
        .with_body(r#"{"results":[]}"#)
        .create_async()
        .await;

    let handler = handler_for(format!("{}/pokemon", server.url()), QueryDefaults::default());
    let response = handler
        .handle_request(request(
            "tools/call",
            json!({
                "name": "get_pokemon",
                "arguments": { "limit": "3", "offset": "6" }
            }),
        ))
        .await;

    assert!(response.result.is_some());
    mock.assert_async().await;
}

#[tokio::test]
async fn get_pokemon_falls_back_to_configured_defaults() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/pokemon/ditto")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let defaults = QueryDefaults {
        name: Some("ditto".to_string()),
        limit: None,
        offset: None,
    };
    let handler = handler_for(format!("{}/pokemon", server.url()), defaults);
    let response = handler
        .handle_request(request(
            "tools/call",
            json!({ "name": "get_pokemon", "arguments": {} }),
        ))
        .await;

    assert!(response.result.is_some());
    mock.assert_async().await;
}

#[tokio::test]
async fn upstream_404_becomes_in_band_tool_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/pokemon/missingno")
        .with_status(404)
        .with_body("Not Found")
        .create_async()
        .await;

    let handler = handler_for(format!("{}/pokemon", server.url()), QueryDefaults::default());
    let response = handler
        .handle_request(request(
            "tools/call",
            json!({ "name": "get_pokemon", "arguments": { "name": "missingno" } }),
        ))
        .await;

    let result = response.result.expect("upstream failures stay in-band");
    assert_eq!(result["isError"], true);
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("PokeAPI error:"), "unexpected text: {}", text);
}

#[tokio::test]
async fn list_pokemon_defaults_limit_to_five() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/pokemon")
        .match_query(Matcher::Exact("limit=5".to_string()))
        .with_status(200)
        .with_body(r#"{"results":[]}"#)
        .create_async()
        .await;

    let handler = handler_for(format!("{}/pokemon", server.url()), QueryDefaults::default());
    let response = handler
        .handle_request(request(
            "tools/call",
            json!({ "name": "list_pokemon", "arguments": {} }),
        ))
        .await;

    assert!(response.result.is_some());
    mock.assert_async().await;
}

#[tokio::test]
async fn schema_violation_is_invalid_params() {
    let handler = handler_for("http://127.0.0.1:1/pokemon".to_string(), QueryDefaults::default());

    let response = handler
        .handle_request(request(
            "tools/call",
            json!({ "name": "get_pokemon", "arguments": { "limit": 42 } }),
        ))
        .await;

    let error = response.error.expect("schema violation should error");
    assert_eq!(error.code, -32602);
}

#[tokio::test]
async fn unknown_tool_is_method_not_found() {
    let handler = handler_for("http://127.0.0.1:1/pokemon".to_string(), QueryDefaults::default());

    let response = handler
        .handle_request(request(
            "tools/call",
            json!({ "name": "evolve_pokemon", "arguments": {} }),
        ))
        .await;

    let error = response.error.expect("unknown tool should error");
    assert_eq!(error.code, -32601);
}

#[tokio::test]
async fn unknown_method_is_method_not_found() {
    let handler = handler_for("http://127.0.0.1:1/pokemon".to_string(), QueryDefaults::default());

    let response = handler
        .handle_request(request("resources/list", json!({})))
        .await;

    let error = response.error.expect("unknown method should error");
    assert_eq!(error.code, -32601);
}

#[tokio::test]
async fn ping_returns_empty_object() {
    let handler = handler_for("http://127.0.0.1:1/pokemon".to_string(), QueryDefaults::default());

    let response = handler.handle_request(request("ping", json!({}))).await;

    assert_eq!(response.result, Some(json!({})));
}

#[tokio::test]
async fn serve_loop_skips_notification_responses() {
    let handler = handler_for("http://127.0.0.1:1/pokemon".to_string(), QueryDefaults::default());
    let server = MCPServer::new(handler);

    let (req_tx, req_rx) = mpsc::channel(8);
    let (resp_tx, mut resp_rx) = mpsc::channel(8);
    let transport = BufferTransport::new(req_rx, resp_tx);

    let serve = tokio::spawn(async move { server.serve(transport).await });

    req_tx
        .send(request("initialize", initialize_params()))
        .await
        .unwrap();
    req_tx
        .send(JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: "notifications/initialized".to_string(),
            params: None,
            id: JsonRpcId::Null,
        })
        .await
        .unwrap();
    req_tx
        .send(JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: "ping".to_string(),
            params: None,
            id: JsonRpcId::Number(2),
        })
        .await
        .unwrap();
    drop(req_tx);

    let first = resp_rx.recv().await.expect("initialize response");
    assert_eq!(first.id, JsonRpcId::Number(1));
    let second = resp_rx.recv().await.expect("ping response");
    assert_eq!(second.id, JsonRpcId::Number(2));
    assert!(resp_rx.recv().await.is_none(), "notification must not answer");

    serve.await.unwrap().unwrap();
}
