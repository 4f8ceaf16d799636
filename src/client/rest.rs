// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! REST client implementation.
//!
//! This module implements the `InvenTreeClient` trait on top of the
//! InvenTree REST endpoints:
//!
//! | Call | Resource |
//! |------|----------|
//! | token exchange | `/api/user/token` |
//! | categories | `/api/part/category/` |
//! | parts of a category | `/api/part/?category=<id>` |
//! | single part | `/api/part/<pk>/` |
//! | part metadata | `/api/part/<pk>/metadata/` |
//! | part parameters | `/api/part/parameter/?part=<pk>` |

use crate::auth::ApiToken;
use crate::client::{InvenTreeClient, InvenTreeHttpClient};
use crate::error::{Error, Result};
use crate::types::{Category, JsonObject, PartParameter, TokenResponse};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// REST client for the InvenTree parts API.
#[derive(Debug)]
pub struct RestClient {
    http_client: Arc<InvenTreeHttpClient>,
    server: String,
    token: Arc<ApiToken>,
}

impl RestClient {
    /// Create a new REST client.
    ///
    /// `token` must be the same holder the HTTP client authenticates with, so
    /// that a token obtained by [`InvenTreeClient::authenticate`] is used by
    /// every later request.
    pub fn new(
        http_client: Arc<InvenTreeHttpClient>,
        server: impl Into<String>,
        token: Arc<ApiToken>,
    ) -> Self {
        Self {
            http_client,
            server: server.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Returns the server base URL.
    pub fn server(&self) -> &str {
        &self.server
    }

    fn url(&self, resource: &str) -> String {
        format!("{}{}", self.server, resource)
    }
}

#[async_trait]
impl InvenTreeClient for RestClient {
    async fn authenticate(&self, username: &str, password: &str) -> Result<()> {
        let url = self.url("/api/user/token");
        let response: TokenResponse = self
            .http_client
            .get_json_basic_auth(&url, username, password)
            .await
            .map_err(|e| {
                Error::authentication()
                    .message("Failed to fetch API Token")
                    .caused_by(e)
            })?;

        if response.token.is_empty() {
            return Err(Error::authentication().message("Server returned an empty API token"));
        }

        debug!("Obtained API token for user {}", username);
        self.token.set(response.token);
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.http_client
            .get_json(&self.url("/api/part/category/"), &[])
            .await
    }

    async fn list_parts(&self, category_id: i64) -> Result<Vec<JsonObject>> {
        self.http_client
            .get_json(
                &self.url("/api/part/"),
                &[("category", category_id.to_string())],
            )
            .await
    }

    async fn get_part(&self, pk: i64) -> Result<JsonObject> {
        self.http_client
            .get_json(&self.url(&format!("/api/part/{}/", pk)), &[])
            .await
    }

    async fn get_part_metadata(&self, pk: i64) -> Result<JsonObject> {
        self.http_client
            .get_json(&self.url(&format!("/api/part/{}/metadata/", pk)), &[])
            .await
    }

    async fn list_part_parameters(&self, pk: i64) -> Result<Vec<PartParameter>> {
        self.http_client
            .get_json(
                &self.url("/api/part/parameter/"),
                &[("part", pk.to_string())],
            )
            .await
    }
}
