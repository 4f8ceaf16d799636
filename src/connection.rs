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

//! Connection implementation for the InvenTree driver.

use crate::client::InvenTreeClient;
use crate::config::{ConnectionConfig, Credentials};
use crate::diagnostics::DiagContext;
use crate::error::{Error, Result};
use crate::fetcher::{FetchOptions, IdentifierCache, PartFetcher};
use crate::metadata::CategoryMap;
use crate::statement::Statement;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{debug, debug_span, info, info_span, Span};

/// Name reported by `get_info` and used as the default connection name in
/// diagnostics.
pub const DRIVER_NAME: &str = "inventree-odbc";

/// Information types answered by [`Connection::get_info`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoType {
    DriverName,
    DriverVer,
    DriverOdbcVer,
    IdentifierQuoteChar,
    GetDataExtensions,
    TxnCapable,
    Other(u16),
}

impl From<u16> for InfoType {
    fn from(code: u16) -> Self {
        match code {
            6 => InfoType::DriverName,
            7 => InfoType::DriverVer,
            29 => InfoType::IdentifierQuoteChar,
            46 => InfoType::TxnCapable,
            77 => InfoType::DriverOdbcVer,
            81 => InfoType::GetDataExtensions,
            other => InfoType::Other(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoValue {
    Text(String),
    Integer(u32),
}

const GD_ANY_COLUMN: u32 = 0x01;
const GD_ANY_ORDER: u32 = 0x02;
const GD_BOUND: u32 = 0x04;
const TC_NONE: u32 = 0;

/// An authenticated session against one InvenTree server.
///
/// Holds the category map loaded at connect time and the IPN cache shared
/// by all of its statements. Neither is refreshed for the life of the
/// connection; reconnect to see categories or parts created since.
#[derive(Debug)]
pub struct Connection {
    dsn: Option<String>,
    config: ConnectionConfig,
    fetcher: PartFetcher,

    // Shared with statements so an in-flight execute keeps its runtime
    runtime: Arc<Runtime>,

    span: Span,
}

impl Connection {
    /// Called by `Database::connect()`.
    ///
    /// Exchanges credentials for a token when needed, then loads the
    /// category map. Either failure fails the connection.
    pub(crate) fn new_with_runtime(
        dsn: Option<String>,
        config: ConnectionConfig,
        client: Arc<dyn InvenTreeClient>,
        runtime: Runtime,
    ) -> Result<Self> {
        let span = info_span!("connection", server = %config.server);
        let guard = span.enter();

        if let Credentials::Basic { username, password } = &config.credentials {
            debug!("Fetching API token for {}", username);
            runtime.block_on(client.authenticate(username, password))?;
        }

        let categories = runtime.block_on(client.list_categories()).map_err(|e| {
            Error::new(e.kind())
                .sqlstate("08001")
                .message("Error updating category list")
                .caused_by(e)
        })?;
        let categories = CategoryMap::from_categories(categories);
        info!("Connected, {} categories", categories.len());

        let fetcher = PartFetcher::new(
            client,
            Arc::new(categories),
            Arc::new(IdentifierCache::new()),
            FetchOptions {
                fetch_metadata: config.fetch_metadata,
                fetch_parameters: config.fetch_parameters,
            },
        );

        drop(guard);
        Ok(Self {
            dsn,
            config,
            fetcher,
            runtime: Arc::new(runtime),
            span,
        })
    }

    pub fn dsn(&self) -> Option<&str> {
        self.dsn.as_deref()
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Returns the server base URL.
    pub fn server(&self) -> &str {
        &self.config.server
    }

    pub fn categories(&self) -> &CategoryMap {
        self.fetcher.categories()
    }

    pub fn identifiers(&self) -> &IdentifierCache {
        self.fetcher.identifiers()
    }

    /// Creates a statement sharing this connection's caches and runtime.
    pub fn new_statement(&self) -> Statement {
        let span = debug_span!(parent: &self.span, "statement");
        Statement::new(self.fetcher.clone(), self.runtime.clone(), span)
    }

    pub fn get_info(&self, info: InfoType) -> Result<InfoValue> {
        let value = match info {
            InfoType::DriverName => InfoValue::Text(DRIVER_NAME.to_string()),
            InfoType::DriverVer => InfoValue::Text(env!("CARGO_PKG_VERSION").to_string()),
            InfoType::DriverOdbcVer => InfoValue::Text("03.00".to_string()),
            InfoType::IdentifierQuoteChar => InfoValue::Text("\"".to_string()),
            InfoType::GetDataExtensions => {
                InfoValue::Integer(GD_ANY_COLUMN | GD_ANY_ORDER | GD_BOUND)
            }
            InfoType::TxnCapable => InfoValue::Integer(TC_NONE),
            InfoType::Other(code) => {
                return Err(Error::not_implemented()
                    .message(format!("Information type {} is not supported", code)))
            }
        };
        Ok(value)
    }

    /// Connection attributes are accepted and ignored.
    pub fn set_connect_attr(&mut self, attribute: i32, value: isize) -> Result<()> {
        debug!("Ignoring connection attribute {} = {}", attribute, value);
        Ok(())
    }

    /// There are no transactions; commit and rollback succeed trivially.
    pub fn end_tran(&mut self, commit: bool) -> Result<()> {
        debug!("end_tran(commit: {}) ignored", commit);
        Ok(())
    }

    /// Names reported in diagnostic records of this connection.
    pub fn diag_context(&self) -> DiagContext {
        DiagContext {
            connection_name: self.dsn.clone().unwrap_or_else(|| DRIVER_NAME.to_string()),
            server_name: self.config.server.clone(),
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        let _guard = self.span.enter();
        debug!("Connection closed");
    }
}
