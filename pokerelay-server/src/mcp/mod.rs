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

//! Model Context Protocol (MCP) Server Implementation
//!
//! Exposes the PokeAPI proxy tools to MCP hosts like Claude Desktop and
//! Cursor. The protocol is JSON-RPC 2.0; the server speaks it over stdio
//! (newline-delimited) or as one-shot HTTP POST requests.
//!
//! The surface is tools-only: `initialize`, `ping`, `tools/list` and
//! `tools/call`. Tool inputs are validated against their JSON schemas
//! before execution.

pub mod handlers;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use handlers::{MCPHandler, MCP_SERVER_NAME};
pub use protocol::*;
pub use server::{MCPServer, MCPServerState};
pub use tools::{
    GetPokemonTool, ListPokemonTool, McpTool, RegistrationError, ToolError, ToolListEntry,
    ToolOutput, ToolRegistry,
};
pub use transport::{BufferTransport, McpTransport, StdioTransport, TransportError};
