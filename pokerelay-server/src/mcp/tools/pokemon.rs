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

//! PokeAPI proxy tools.
//!
//! `get_pokemon` fetches one named resource or a paginated list depending
//! on which arguments are present; `list_pokemon` always lists. Both
//! return the upstream body text verbatim.

use crate::config::QueryDefaults;
use crate::mcp::tools::registry::{McpTool, ToolError, ToolOutput};
use async_trait::async_trait;
use pokerelay_client::{FetchError, FetchParams, PokeApiClient};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

/// Shared fetch-and-map step for both tools.
///
/// Upstream rejections become in-band tool errors so the calling agent
/// sees the failure text; transport failures bubble up as execution
/// errors.
async fn run_fetch(client: &PokeApiClient, params: &FetchParams) -> Result<ToolOutput, ToolError> {
    match client.fetch(params).await {
        Ok(body) => Ok(ToolOutput::text(body)),
        Err(err @ FetchError::UpstreamStatus { .. }) => {
            warn!(error = %err, "Upstream rejected request");
            Ok(ToolOutput::error(format!("PokeAPI error: {}", err)))
        }
        Err(FetchError::Transport(err)) => Err(ToolError::Execution(err.to_string())),
    }
}

fn or_default(arg: Option<String>, default: &Option<String>) -> Option<String> {
    arg.filter(|v| !v.is_empty()).or_else(|| default.clone())
}

// =============================================================================
// get_pokemon
// =============================================================================

#[derive(Debug, Deserialize)]
struct GetPokemonArgs {
    name: Option<String>,
    limit: Option<String>,
    offset: Option<String>,
}

/// Fetch one Pokemon by name, or list Pokemon when no name is given.
pub struct GetPokemonTool {
    client: Arc<PokeApiClient>,
    defaults: QueryDefaults,
    schema: Value,
}

impl GetPokemonTool {
    pub fn new(client: Arc<PokeApiClient>, defaults: QueryDefaults) -> Self {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Pokemon name or numeric id. When given, limit and offset are ignored."
                },
                "limit": {
                    "type": "string",
                    "description": "Maximum number of list entries to return."
                },
                "offset": {
                    "type": "string",
                    "description": "Number of list entries to skip before collecting the result set."
                }
            }
        });
        Self {
            client,
            defaults,
            schema,
        }
    }
}

#[async_trait]
impl McpTool for GetPokemonTool {
    fn name(&self) -> &str {
        "get_pokemon"
    }

    fn description(&self) -> &str {
        "Get information about a specific Pokemon by name, or list Pokemon with limit/offset."
    }

    fn input_schema(&self) -> &Value {
        &self.schema
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let args: GetPokemonArgs =
            serde_json::from_value(args).map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        let params = FetchParams {
            name: or_default(args.name, &self.defaults.name),
            limit: or_default(args.limit, &self.defaults.limit),
            offset: or_default(args.offset, &self.defaults.offset),
        };
        run_fetch(&self.client, &params).await
    }
}

// =============================================================================
// list_pokemon
// =============================================================================

fn default_list_limit() -> String {
    "5".to_string()
}

#[derive(Debug, Deserialize)]
struct ListPokemonArgs {
    #[serde(default = "default_list_limit")]
    limit: String,
    offset: Option<String>,
}

/// List Pokemon with a limit and optional offset.
pub struct ListPokemonTool {
    client: Arc<PokeApiClient>,
    schema: Value,
}

impl ListPokemonTool {
    pub fn new(client: Arc<PokeApiClient>) -> Self {
        let schema = json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "string",
                    "description": "The maximum number of Pokemon to retrieve (default: 5)."
                },
                "offset": {
                    "type": "string",
                    "description": "The number of Pokemon to skip before starting to collect the result set."
                }
            }
        });
        Self { client, schema }
    }
}

#[async_trait]
impl McpTool for ListPokemonTool {
    fn name(&self) -> &str {
        "list_pokemon"
    }

    fn description(&self) -> &str {
        "List multiple Pokemon using a limit and optional offset."
    }

    fn input_schema(&self) -> &Value {
        &self.schema
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let args: ListPokemonArgs =
            serde_json::from_value(args).map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        // An empty limit falls back to the default, like a missing one.
        let limit = if args.limit.is_empty() {
            default_list_limit()
        } else {
            args.limit
        };
        let params = FetchParams::list(Some(limit), args.offset);
        run_fetch(&self.client, &params).await
    }
}
