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

//! MCP transport abstraction (stdio + in-process buffers).

use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse};
use std::io;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::mpsc;

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Channel closed")]
    ChannelClosed,
}

/// Transport abstraction for MCP JSON-RPC messages.
#[async_trait::async_trait]
pub trait McpTransport: Send + Sync {
    /// Receive a JSON-RPC request. `ChannelClosed` means the peer went away.
    async fn recv(&mut self) -> Result<JsonRpcRequest, TransportError>;
    /// Send a JSON-RPC response.
    async fn send(&mut self, response: JsonRpcResponse) -> Result<(), TransportError>;
}

/// Stdio transport with newline-delimited JSON framing.
///
/// One JSON-RPC message per line, the framing stdio MCP hosts speak.
/// Stdout carries protocol traffic only; logging goes to stderr.
pub struct StdioTransport {
    reader: BufReader<tokio::io::Stdin>,
    writer: BufWriter<tokio::io::Stdout>,
    line: String,
}

impl StdioTransport {
    /// Create a new stdio transport.
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
            writer: BufWriter::new(tokio::io::stdout()),
            line: String::new(),
        }
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl McpTransport for StdioTransport {
    async fn recv(&mut self) -> Result<JsonRpcRequest, TransportError> {
        loop {
            self.line.clear();
            let read = self.reader.read_line(&mut self.line).await?;
            if read == 0 {
                return Err(TransportError::ChannelClosed);
            }
            let line = self.line.trim();
            if line.is_empty() {
                continue;
            }
            return Ok(serde_json::from_str(line)?);
        }
    }

    async fn send(&mut self, response: JsonRpcResponse) -> Result<(), TransportError> {
        let payload = serde_json::to_string(&response)?;
        self.writer.write_all(payload.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}

/// Buffer-backed transport for tests and in-process use.
pub struct BufferTransport {
    input: mpsc::Receiver<JsonRpcRequest>,
    output: mpsc::Sender<JsonRpcResponse>,
}

impl BufferTransport {
    pub fn new(
        input: mpsc::Receiver<JsonRpcRequest>,
        output: mpsc::Sender<JsonRpcResponse>,
    ) -> Self {
        Self { input, output }
    }
}

#[async_trait::async_trait]
impl McpTransport for BufferTransport {
    async fn recv(&mut self) -> Result<JsonRpcRequest, TransportError> {
        self.input.recv().await.ok_or(TransportError::ChannelClosed)
    }

    async fn send(&mut self, response: JsonRpcResponse) -> Result<(), TransportError> {
        self.output
            .send(response)
            .await
            .map_err(|_| TransportError::ChannelClosed)
    }
}
