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

//! Error type shared by every layer of the driver.
//!
//! Errors are built with kind-specific constructors and refined with the
//! builder methods, e.g.
//!
//! ```ignore
//! Error::catalog().message(format!("Category does not exist: {}", name))
//! Error::transport().message("Failed to fetch parts").caused_by(e)
//! ```
//!
//! Each kind carries a default SQLSTATE which the diagnostics layer exposes
//! to the caller.

use std::fmt;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Broad classification of a driver failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or malformed connection configuration.
    Config,
    /// Credential exchange with the server failed.
    Authentication,
    /// Statement text does not match the accepted grammar.
    Syntax,
    /// Unknown table or unsupported filter column.
    Catalog,
    /// Network failure, timeout, non-2xx response or undecodable body.
    Transport,
    /// Operation invoked in the wrong statement/cursor state.
    InvalidState,
    /// Bad column/parameter number, buffer or target type.
    InvalidArgument,
    /// Optional feature that the driver does not provide.
    NotImplemented,
    /// Handle does not resolve to a live object of the expected kind.
    InvalidHandle,
}

impl ErrorKind {
    /// SQLSTATE reported when the error does not override it.
    pub fn default_sqlstate(self) -> &'static str {
        match self {
            ErrorKind::Config | ErrorKind::Authentication => "08001",
            ErrorKind::Syntax => "42000",
            ErrorKind::Catalog => "42S02",
            ErrorKind::Transport => "08S01",
            ErrorKind::InvalidState => "HY010",
            ErrorKind::InvalidArgument => "07009",
            ErrorKind::NotImplemented => "HYC00",
            ErrorKind::InvalidHandle => "HY000",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Config => "configuration error",
            ErrorKind::Authentication => "authentication error",
            ErrorKind::Syntax => "syntax error",
            ErrorKind::Catalog => "catalog error",
            ErrorKind::Transport => "transport error",
            ErrorKind::InvalidState => "invalid state",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::NotImplemented => "not implemented",
            ErrorKind::InvalidHandle => "invalid handle",
        };
        f.write_str(name)
    }
}

/// Driver error: kind, SQLSTATE, human message and optional cause.
#[derive(Debug, thiserror::Error)]
#[error("{sqlstate}: {message}")]
pub struct Error {
    kind: ErrorKind,
    sqlstate: &'static str,
    message: String,
    #[source]
    cause: Option<BoxError>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates an error of the given kind with its default SQLSTATE.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            sqlstate: kind.default_sqlstate(),
            message: kind.to_string(),
            cause: None,
        }
    }

    pub fn config() -> Self {
        Self::new(ErrorKind::Config)
    }

    pub fn authentication() -> Self {
        Self::new(ErrorKind::Authentication)
    }

    pub fn syntax() -> Self {
        Self::new(ErrorKind::Syntax)
    }

    pub fn catalog() -> Self {
        Self::new(ErrorKind::Catalog)
    }

    pub fn transport() -> Self {
        Self::new(ErrorKind::Transport)
    }

    pub fn invalid_state() -> Self {
        Self::new(ErrorKind::InvalidState)
    }

    pub fn invalid_argument() -> Self {
        Self::new(ErrorKind::InvalidArgument)
    }

    pub fn not_implemented() -> Self {
        Self::new(ErrorKind::NotImplemented)
    }

    pub fn invalid_handle() -> Self {
        Self::new(ErrorKind::InvalidHandle)
    }

    /// Replaces the human-readable message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Overrides the kind's default SQLSTATE.
    pub fn sqlstate(mut self, sqlstate: &'static str) -> Self {
        self.sqlstate = sqlstate;
        self
    }

    /// Attaches the underlying cause.
    pub fn caused_by(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn sql_state(&self) -> &'static str {
        self.sqlstate
    }

    pub fn text(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Message as surfaced through diagnostics: `message: cause` when a
    /// cause is attached.
    pub fn diagnostic_message(&self) -> String {
        match &self.cause {
            Some(cause) => format!("{}: {}", self.message, cause),
            None => self.message.clone(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let message = if e.is_timeout() {
            "HTTP request timed out"
        } else if e.is_decode() {
            "Failed to decode HTTP response"
        } else {
            "HTTP request failed"
        };
        Error::transport().message(message).caused_by(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::transport()
            .message("Failed to parse JSON response")
            .caused_by(e)
    }
}
