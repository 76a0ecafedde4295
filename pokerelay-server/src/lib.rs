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

pub mod config;
pub mod mcp;

use anyhow::Result;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{ServerConfig, Transport};
use mcp::{GetPokemonTool, ListPokemonTool, MCPHandler, MCPServer, StdioTransport, ToolRegistry};
use pokerelay_client::PokeApiClient;

/// Build the handler stack: upstream client, tool registry, dispatcher.
pub fn build_handler(config: &ServerConfig) -> Result<Arc<MCPHandler>> {
    let client = Arc::new(PokeApiClient::with_base_url(config.upstream.base_url.clone()));

    let registry = Arc::new(ToolRegistry::new());
    registry.register(Arc::new(GetPokemonTool::new(
        client.clone(),
        config.defaults.clone(),
    )))?;
    registry.register(Arc::new(ListPokemonTool::new(client)))?;

    Ok(Arc::new(MCPHandler::new(registry)))
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    // Initialize tracing. Logs go to stderr: stdout belongs to the stdio
    // transport.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pokerelay_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Pokerelay MCP server");

    config.validate()?;

    let handler = build_handler(&config)?;
    let server = MCPServer::new(handler);

    match config.server.transport {
        Transport::Stdio => {
            tracing::info!("Serving MCP over stdio");
            server.serve(StdioTransport::new()).await?;
        }
        Transport::Http => {
            let addr = config.socket_addr()?;
            let mut router = server.router().layer(TraceLayer::new_for_http());
            if config.server.enable_cors {
                router = router.layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                );
            }

            tracing::info!("Serving MCP over HTTP at {}", addr);
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, router).await?;
        }
    }

    Ok(())
}
