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

//! Database implementation for the InvenTree driver.

use crate::auth::ApiToken;
use crate::client::{HttpClientConfig, InvenTreeClient, InvenTreeHttpClient, RestClient};
use crate::config::{resolve, ConnectParams, Credentials, MemoryProfileStore, ProfileStore, ResolvedConfig};
use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::logging::init_logging;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::debug;

/// Holds the profile store connections are configured from.
///
/// A Database is created from a Driver and is used to establish Connections.
#[derive(Debug, Clone)]
pub struct Database {
    profiles: Arc<dyn ProfileStore>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new(Arc::new(MemoryProfileStore::new()))
    }
}

impl Database {
    /// Creates a new Database reading DSN profiles from `profiles`.
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self { profiles }
    }

    pub fn profiles(&self) -> &dyn ProfileStore {
        self.profiles.as_ref()
    }

    /// Resolves configuration for a connect call without connecting.
    pub fn resolve(&self, params: &ConnectParams) -> Result<ResolvedConfig> {
        resolve(self.profiles.as_ref(), params)
    }

    /// Opens a connection to the server named by the resolved configuration.
    pub fn connect(&self, params: &ConnectParams) -> Result<Connection> {
        let resolved = self.resolve(params)?;
        init_logging(&resolved.log);

        let config = resolved.connection;
        debug!("Creating connection to {}", config.server);

        let token = Arc::new(match &config.credentials {
            Credentials::Token(token) => ApiToken::new(token.clone()),
            Credentials::Basic { .. } => ApiToken::pending(),
        });

        let http_config = HttpClientConfig {
            timeout: config.timeout,
            ..Default::default()
        };
        let http_client = Arc::new(InvenTreeHttpClient::new(http_config, token.clone())?);
        let client: Arc<dyn InvenTreeClient> =
            Arc::new(RestClient::new(http_client, config.server.clone(), token));

        Connection::new_with_runtime(resolved.dsn, config, client, new_runtime()?)
    }

    /// Like [`Database::connect`], but talks to the server through `client`.
    pub fn connect_with_client(
        &self,
        params: &ConnectParams,
        client: Arc<dyn InvenTreeClient>,
    ) -> Result<Connection> {
        let resolved = self.resolve(params)?;
        init_logging(&resolved.log);
        Connection::new_with_runtime(resolved.dsn, resolved.connection, client, new_runtime()?)
    }
}

fn new_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            Error::config()
                .sqlstate("HY000")
                .message("Failed to create async runtime")
                .caused_by(e)
        })
}
