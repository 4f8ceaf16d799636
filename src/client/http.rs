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

//! HTTP client implementation for the InvenTree REST API.
//!
//! This module provides a low-level HTTP client with:
//! - Connection pooling
//! - Token authentication
//! - A single configurable request timeout
//!
//! Requests are never retried: a transport error or non-2xx status fails the
//! call that issued it.

use crate::auth::AuthProvider;
use crate::error::{Error, Result};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Maximum number of body bytes quoted in error messages.
const ERROR_BODY_LIMIT: usize = 512;

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Upper bound for each request, connect through body.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client for communicating with the InvenTree server.
#[derive(Debug)]
pub struct InvenTreeHttpClient {
    client: Client,
    config: HttpClientConfig,
    auth_provider: Arc<dyn AuthProvider>,
}

impl InvenTreeHttpClient {
    /// Creates a new HTTP client with the given configuration and auth provider.
    pub fn new(config: HttpClientConfig, auth_provider: Arc<dyn AuthProvider>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                Error::transport()
                    .message("Failed to create HTTP client")
                    .caused_by(e)
            })?;

        Ok(Self {
            client,
            config,
            auth_provider,
        })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// GET `url` with token authentication and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        args: &[(&str, String)],
    ) -> Result<T> {
        let mut request = self
            .client
            .get(url)
            .header(AUTHORIZATION, self.auth_provider.get_auth_header()?);
        if !args.is_empty() {
            request = request.query(args);
        }
        let body = self.execute(url, request).await?;
        decode(url, &body)
    }

    /// GET `url` with HTTP basic authentication and decode the JSON body.
    pub async fn get_json_basic_auth<T: DeserializeOwned>(
        &self,
        url: &str,
        username: &str,
        password: &str,
    ) -> Result<T> {
        let request = self.client.get(url).basic_auth(username, Some(password));
        let body = self.execute(url, request).await?;
        decode(url, &body)
    }

    /// Send the request and return the body of a successful response.
    async fn execute(&self, url: &str, request: RequestBuilder) -> Result<String> {
        debug!("GET {}", url);

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::transport().message(format!(
                "GET {} returned HTTP {} - {}",
                url,
                status.as_u16(),
                truncate_body(&body)
            )));
        }

        response.text().await.map_err(|e| {
            Error::transport()
                .message(format!("Failed to read response from {}", url))
                .caused_by(e)
        })
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        Error::transport()
            .message(format!(
                "Failed to parse response from {} - body: {}",
                url,
                truncate_body(body)
            ))
            .caused_by(e)
    })
}

fn truncate_body(body: &str) -> &str {
    if body.len() <= ERROR_BODY_LIMIT {
        return body;
    }
    let mut end = ERROR_BODY_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
