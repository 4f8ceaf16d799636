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

//! Connection configuration resolution.
//!
//! Settings come from three layers, lowest priority first:
//!
//! 1. the profile store section named by the data-source name (`dsn`)
//! 2. the raw connection string (`key=value;key=value`, keys case-insensitive)
//! 3. explicit username/password passed to the connect call
//!
//! ## Keys
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `dsn` | | Profile section to read; overrides the supplied name |
//! | `server` | | Base URL of the InvenTree server (required) |
//! | `username` / `password` | | Exchanged for an API token when no token is set |
//! | `apitoken` | | API token |
//! | `fetchparameters` | `yes` | Join part parameters into each filtered row |
//! | `fetchmetadata` | `no` | Join part metadata into each filtered row |
//! | `httptimeout` | `30s` | Per-request timeout, e.g. `500ms`, `1m30s` |
//! | `logfile` / `logformat` / `loglevel` | | See [`crate::logging`] |

use crate::error::{Error, Result};
use crate::logging::LogConfig;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Timeout used when `httptimeout` is absent or unparseable.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Read access to persisted per-DSN settings.
pub trait ProfileStore: Send + Sync + fmt::Debug {
    /// Value of `key` in `section`, or `default` when absent.
    fn get(&self, section: &str, key: &str, default: &str) -> String;
}

/// In-memory [`ProfileStore`]; section and key lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileStore {
    sections: HashMap<String, HashMap<String, String>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` in `section`, returning `self` for chaining.
    pub fn with(mut self, section: &str, key: &str, value: &str) -> Self {
        self.insert(section, key, value);
        self
    }

    pub fn insert(&mut self, section: &str, key: &str, value: &str) {
        self.sections
            .entry(section.to_lowercase())
            .or_default()
            .insert(key.to_lowercase(), value.to_string());
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get(&self, section: &str, key: &str, default: &str) -> String {
        self.sections
            .get(&section.to_lowercase())
            .and_then(|s| s.get(&key.to_lowercase()))
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }
}

/// Arguments of a connect call.
#[derive(Debug, Clone, Default)]
pub struct ConnectParams {
    pub dsn: Option<String>,
    pub connection_string: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ConnectParams {
    /// Connect by data-source name with optional explicit credentials.
    pub fn dsn(dsn: impl Into<String>) -> Self {
        Self {
            dsn: Some(dsn.into()),
            ..Default::default()
        }
    }

    /// Connect with a raw connection string.
    pub fn connection_string(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: Some(connection_string.into()),
            ..Default::default()
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

/// How the connection authenticates.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// A ready-to-use API token.
    Token(String),
    /// Username and password to exchange for a token on connect.
    Basic { username: String, password: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Token(<redacted>)"),
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Validated per-connection configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    /// Server base URL without trailing slash.
    pub server: String,
    pub credentials: Credentials,
    pub fetch_metadata: bool,
    pub fetch_parameters: bool,
    pub timeout: Duration,
}

/// Output of [`resolve`].
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Final data-source name, if any.
    pub dsn: Option<String>,
    pub connection: ConnectionConfig,
    pub log: LogConfig,
}

/// Parse `key=value;key=value` into a map with lower-cased keys.
///
/// Empty segments are skipped; a segment without `=` maps to an empty value.
pub fn parse_connection_string(connection_string: &str) -> HashMap<String, String> {
    connection_string
        .split(';')
        .filter(|segment| !segment.trim().is_empty())
        .map(|segment| match segment.split_once('=') {
            Some((key, value)) => (key.trim().to_lowercase(), value.to_string()),
            None => (segment.trim().to_lowercase(), String::new()),
        })
        .collect()
}

/// Merge the three configuration layers into one validated configuration.
pub fn resolve(profile: &dyn ProfileStore, params: &ConnectParams) -> Result<ResolvedConfig> {
    let args = params
        .connection_string
        .as_deref()
        .map(parse_connection_string)
        .unwrap_or_default();

    let dsn = args
        .get("dsn")
        .cloned()
        .or_else(|| params.dsn.clone())
        .filter(|d| !d.is_empty());

    let lookup = |key: &str| -> String {
        let stored = match &dsn {
            Some(section) => profile.get(section, key, ""),
            None => String::new(),
        };
        args.get(key).cloned().unwrap_or(stored)
    };

    let server = lookup("server");
    let mut username = lookup("username");
    let mut password = lookup("password");
    let api_token = lookup("apitoken");
    let fetch_parameters = lookup("fetchparameters");
    let fetch_metadata = lookup("fetchmetadata");
    let http_timeout = lookup("httptimeout");

    let log = LogConfig {
        file: Some(lookup("logfile")).filter(|s| !s.is_empty()),
        format: Some(lookup("logformat").to_lowercase()).filter(|s| !s.is_empty()),
        level: Some(lookup("loglevel").to_lowercase()).filter(|s| !s.is_empty()),
    };

    if let Some(u) = params.username.as_deref().filter(|u| !u.is_empty()) {
        username = u.to_string();
    }
    if let Some(p) = params.password.as_deref().filter(|p| !p.is_empty()) {
        password = p.to_string();
    }

    let fetch_parameters = parse_flag("fetchParameters", &fetch_parameters, true)?;
    let fetch_metadata = parse_flag("fetchMetadata", &fetch_metadata, false)?;

    let timeout = if http_timeout.trim().is_empty() {
        DEFAULT_HTTP_TIMEOUT
    } else {
        match parse_duration(&http_timeout) {
            Some(d) => d,
            None => {
                warn!(
                    "Error parsing httptimeout {:?}, default timeout used: {:?}",
                    http_timeout, DEFAULT_HTTP_TIMEOUT
                );
                DEFAULT_HTTP_TIMEOUT
            }
        }
    };

    let server = server.trim().trim_end_matches('/').to_string();
    if server.is_empty() {
        return Err(Error::config().message("No Server specified"));
    }

    let credentials = if !api_token.is_empty() {
        Credentials::Token(api_token)
    } else if !username.is_empty() && !password.is_empty() {
        Credentials::Basic { username, password }
    } else {
        return Err(Error::config().message("No APIToken or Username+Password specified"));
    };

    Ok(ResolvedConfig {
        dsn,
        connection: ConnectionConfig {
            server,
            credentials,
            fetch_metadata,
            fetch_parameters,
            timeout,
        },
        log,
    })
}

/// `yes`/`no` (any case), empty selects `default`.
fn parse_flag(name: &str, value: &str, default: bool) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "yes" => Ok(true),
        "no" => Ok(false),
        "" => Ok(default),
        _ => Err(Error::config().message(format!("{} accepts 'yes' or 'no'", name))),
    }
}

/// Parse a duration written as a sequence of `<number><unit>` terms, such as
/// `300ms`, `1.5h` or `2h45m`. Units: `ns`, `us`, `µs`, `ms`, `s`, `m`, `h`.
pub fn parse_duration(text: &str) -> Option<Duration> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if text == "0" {
        return Some(Duration::ZERO);
    }

    let mut total = 0f64;
    let mut rest = text;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return None;
        }
        let number: f64 = rest[..number_len].parse().ok()?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let seconds_per_unit = match &rest[..unit_len] {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return None,
        };
        rest = &rest[unit_len..];
        total += number * seconds_per_unit;
    }

    Duration::try_from_secs_f64(total).ok()
}
