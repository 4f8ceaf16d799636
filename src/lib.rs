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

//! InvenTree driver for Rust
//!
//! This crate exposes the parts catalog of an InvenTree server as a
//! read-only tabular data source behind a call-level cursor protocol
//! (connect, prepare, execute, describe, fetch, get-data, free).
//!
//! ## Overview
//!
//! - [`Driver`] - Handle table and return-code facade for a call-level shim
//! - [`Database`] - Resolves configuration and opens connections
//! - [`Connection`] - Authenticated session holding the category map
//! - [`Statement`] - Query execution, cursor and value marshaling
//!
//! Every part category is a table named by its full path string, e.g.
//! `"Electronics/Passives/Resistors"`. The accepted SQL is
//!
//! ```text
//! SELECT * FROM <table> [WHERE <IPN|pk> = <literal|?>] [;]
//! ```
//!
//! An unfiltered select lists the parts of the category. A filtered select
//! fetches one part and, depending on configuration, joins its metadata and
//! parameters (`parameter.<name>` columns) into the row.
//!
//! ## Example
//!
//! ```ignore
//! use inventree_odbc::{ConnectParams, Database, FetchOutcome, MemoryProfileStore};
//! use inventree_odbc::result::CDataType;
//! use std::sync::Arc;
//!
//! let database = Database::new(Arc::new(MemoryProfileStore::new()));
//! let connection = database.connect(&ConnectParams::connection_string(
//!     "server=https://inventree.example.com;apitoken=inv-0123",
//! ))?;
//! let mut statement = connection.new_statement();
//! statement.exec_direct("SELECT * FROM \"Passives/Resistors\" WHERE IPN = 'R-001'")?;
//! while let FetchOutcome::Row { .. } = statement.fetch()? {
//!     let mut buf = [0u8; 64];
//!     statement.get_data(1, CDataType::Char, &mut buf)?;
//! }
//! ```
//!
//! ## Configuration Options
//!
//! Options are read from the profile section named by the DSN, then from the
//! connection string, then from explicit credentials.
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `server` | | InvenTree base URL |
//! | `apitoken` | | API token |
//! | `username` / `password` | | Exchanged for a token when no token is set |
//! | `fetchparameters` | `yes` | Join part parameters into filtered rows |
//! | `fetchmetadata` | `no` | Join part metadata into filtered rows |
//! | `httptimeout` | `30s` | Per-request timeout |
//! | `loglevel` | | `trace`, `debug`, `info`, `warn`, `error` or `off` |
//! | `logfile` | | Log to this file instead of stderr |
//! | `logformat` | | `pretty` for human-readable lines, else JSON |

pub mod auth;
pub mod client;
pub mod config;
pub mod connection;
pub mod database;
pub mod diagnostics;
pub mod driver;
pub mod error;
pub mod fetcher;
pub mod handles;
pub mod logging;
pub mod metadata;
pub mod query;
pub mod result;
pub mod statement;
pub mod types;

// Re-export main types
pub use connection::Connection;
pub use database::Database;
pub use driver::{Driver, ReturnCode};
pub use error::{Error, ErrorKind, Result};
pub use statement::{FetchOutcome, Statement};

// Re-export client types for advanced users
pub use client::{HttpClientConfig, InvenTreeClient, InvenTreeHttpClient, RestClient};

// Re-export configuration types
pub use config::{ConnectParams, ConnectionConfig, Credentials, MemoryProfileStore, ProfileStore};
