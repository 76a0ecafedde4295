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

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Pokerelay Server Configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub defaults: QueryDefaults,
}

/// Transport the server speaks on startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout.
    #[default]
    Stdio,
    /// One-shot JSON-RPC over HTTP POST.
    Http,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpServerConfig {
    /// Transport to serve on (default: stdio)
    #[serde(default)]
    pub transport: Transport,

    /// HTTP listen address, used when transport is "http"
    #[serde(default = "default_http_addr")]
    pub listen_addr: String,

    /// Enable CORS on the HTTP transport
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Base URL of the PokeAPI `/pokemon` resource
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Default query values applied when a tool call leaves them out.
///
/// Populated from the `POKEMON_NAME`, `LIMIT` and `OFFSET` environment
/// variables at load time. Empty values count as absent, never as errors.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QueryDefaults {
    pub name: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

// Default values
fn default_http_addr() -> String {
    "127.0.0.1:47110".to_string()
}

fn default_enable_cors() -> bool {
    true
}

fn default_base_url() -> String {
    pokerelay_client::POKEAPI_BASE_URL.to_string()
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            listen_addr: default_http_addr(),
            enable_cors: default_enable_cors(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

impl ServerConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - POKERELAY_HTTP_ADDR: HTTP listen address (default: 127.0.0.1:47110)
    /// - POKERELAY_ENABLE_CORS: Enable CORS on the HTTP transport (default: true)
    /// - POKERELAY_UPSTREAM_URL: Base URL of the upstream `/pokemon` resource
    /// - POKEMON_NAME: Default name for `get_pokemon` calls
    /// - LIMIT: Default list limit for `get_pokemon` calls
    /// - OFFSET: Default list offset for `get_pokemon` calls
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("POKERELAY_HTTP_ADDR") {
            config.server.listen_addr = addr;
        }

        if let Ok(cors) = std::env::var("POKERELAY_ENABLE_CORS") {
            config.server.enable_cors = cors.parse().unwrap_or(true);
        }

        if let Ok(url) = std::env::var("POKERELAY_UPSTREAM_URL") {
            config.upstream.base_url = url;
        }

        config.defaults.name = non_empty_var("POKEMON_NAME");
        config.defaults.limit = non_empty_var("LIMIT");
        config.defaults.offset = non_empty_var("OFFSET");

        config
    }

    /// Load configuration with priority: file > env > defaults
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = config_file {
            if path.exists() {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            } else {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
        } else {
            Self::default()
        };

        // Override with environment variables
        config = Self::merge_with_env(config);

        Ok(config)
    }

    /// Merge config with environment variables (env takes priority)
    fn merge_with_env(mut config: Self) -> Self {
        let env_config = Self::from_env();

        // Only override if env var was explicitly set
        if std::env::var("POKERELAY_HTTP_ADDR").is_ok() {
            config.server.listen_addr = env_config.server.listen_addr;
        }
        if std::env::var("POKERELAY_ENABLE_CORS").is_ok() {
            config.server.enable_cors = env_config.server.enable_cors;
        }
        if std::env::var("POKERELAY_UPSTREAM_URL").is_ok() {
            config.upstream.base_url = env_config.upstream.base_url;
        }
        if env_config.defaults.name.is_some() {
            config.defaults.name = env_config.defaults.name;
        }
        if env_config.defaults.limit.is_some() {
            config.defaults.limit = env_config.defaults.limit;
        }
        if env_config.defaults.offset.is_some() {
            config.defaults.offset = env_config.defaults.offset;
        }

        config
    }

    /// Parse listen address as SocketAddr
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(self.server.listen_addr.parse()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.transport == Transport::Http {
            self.socket_addr()?;
        }
        if self.upstream.base_url.is_empty() {
            anyhow::bail!("Upstream base URL must not be empty");
        }
        Ok(())
    }
}
