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

//! Upstream PokeAPI client.
//!
//! One outbound request per call: pick between fetch-by-name and
//! list-with-pagination from whichever parameters are present, issue a
//! single GET, and hand the body text back untouched. No retries, no
//! caching, no response parsing. The HTTP client is scoped to the call.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default upstream endpoint for the `/pokemon` resource.
pub const POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2/pokemon";

/// Errors from a single upstream fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream answered with a non-2xx status. No body is returned.
    #[error("upstream returned {status} for {url}")]
    UpstreamStatus { status: StatusCode, url: String },

    /// Network-level failure (DNS, connection refused, hangup).
    /// Surfaced as-is, without translation.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Request parameters for the `/pokemon` resource.
///
/// Missing or empty-string values count as "not provided". A present
/// `name` selects name-mode and `limit`/`offset` are ignored entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchParams {
    /// Pokemon name or numeric id as a string.
    pub name: Option<String>,
    /// Maximum number of list entries to return.
    pub limit: Option<String>,
    /// Pagination offset into the list.
    pub offset: Option<String>,
}

impl FetchParams {
    /// Parameters for fetching a single named resource.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Parameters for a paginated listing.
    pub fn list(limit: Option<String>, offset: Option<String>) -> Self {
        Self {
            name: None,
            limit,
            offset,
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Fixed header set attached to every outbound request.
fn fixed_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// Client for the PokeAPI `/pokemon` resource.
///
/// Each call builds its own HTTP client, so the connection is acquired
/// and released within the call. Every request carries
/// `Content-Type: application/json`, and `Accept-Encoding: gzip` via
/// reqwest's gzip support so the response body still comes back as plain
/// text. No timeout is configured beyond reqwest's defaults; callers
/// relying on bounded latency must impose their own.
pub struct PokeApiClient {
    base_url: String,
}

impl PokeApiClient {
    /// Create a client against the public PokeAPI.
    pub fn new() -> Self {
        Self::with_base_url(POKEAPI_BASE_URL)
    }

    /// Create a client against a different base URL (tests, mirrors).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the exact request URL for `params`.
    ///
    /// Name-mode: `{base}/{name}`, pagination ignored. List-mode:
    /// `{base}?{query}` where the query joins whichever of `limit` and
    /// `offset` are present, in that order. With neither present the
    /// query string is empty and the bare `?` suffix is kept.
    pub fn request_url(&self, params: &FetchParams) -> String {
        if let Some(name) = present(&params.name) {
            return format!("{}/{}", self.base_url, name);
        }

        let mut query = Vec::with_capacity(2);
        if let Some(limit) = present(&params.limit) {
            query.push(format!("limit={}", limit));
        }
        if let Some(offset) = present(&params.offset) {
            query.push(format!("offset={}", offset));
        }
        format!("{}?{}", self.base_url, query.join("&"))
    }

    /// Issue one GET and return the raw body text unmodified.
    pub async fn fetch(&self, params: &FetchParams) -> Result<String, FetchError> {
        let url = self.request_url(params);
        debug!(url = %url, "Fetching upstream");

        let client = reqwest::Client::builder()
            .default_headers(fixed_headers())
            .gzip(true)
            .build()?;

        let response = client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UpstreamStatus { status, url });
        }

        Ok(response.text().await?)
    }
}

impl Default for PokeApiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://pokeapi.test/api/v2/pokemon";

    fn client() -> PokeApiClient {
        PokeApiClient::with_base_url(BASE)
    }

    #[test]
    fn name_mode_ignores_pagination() {
        let params = FetchParams {
            name: Some("pikachu".to_string()),
            limit: Some("10".to_string()),
            offset: Some("20".to_string()),
        };
        assert_eq!(client().request_url(&params), format!("{}/pikachu", BASE));
    }

    #[test]
    fn name_mode_accepts_numeric_id() {
        let params = FetchParams::named("25");
        assert_eq!(client().request_url(&params), format!("{}/25", BASE));
    }

    #[test]
    fn list_mode_limit_only() {
        let params = FetchParams::list(Some("10".to_string()), None);
        assert_eq!(client().request_url(&params), format!("{}?limit=10", BASE));
    }

    #[test]
    fn list_mode_offset_only() {
        let params = FetchParams::list(None, Some("40".to_string()));
        assert_eq!(client().request_url(&params), format!("{}?offset=40", BASE));
    }

    #[test]
    fn list_mode_limit_then_offset() {
        let params = FetchParams::list(Some("10".to_string()), Some("40".to_string()));
        assert_eq!(
            client().request_url(&params),
            format!("{}?limit=10&offset=40", BASE)
        );
    }

    #[test]
    fn list_mode_without_params_keeps_bare_suffix() {
        let params = FetchParams::default();
        assert_eq!(client().request_url(&params), format!("{}?", BASE));
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let params = FetchParams {
            name: Some(String::new()),
            limit: Some(String::new()),
            offset: Some("7".to_string()),
        };
        assert_eq!(client().request_url(&params), format!("{}?offset=7", BASE));
    }
}
