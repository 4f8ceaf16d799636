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

//! Per-handle diagnostic records.
//!
//! Every connection and statement handle owns a [`DiagnosticArea`] holding
//! the record of its most recent failure (or warning). A new record replaces
//! the previous one; records are retrieved by number, and only record 1
//! ever exists.

use crate::error::{Error, ErrorKind, Result};
use crate::result::marshal::write_narrow;
use crate::result::Indicator;
use tracing::error;

/// SQLSTATE of a right-truncated string warning.
pub const SQLSTATE_TRUNCATED: &str = "01004";

/// One retained diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub sqlstate: String,
    pub native_error: i32,
    pub message: String,
}

impl DiagnosticRecord {
    pub fn new(sqlstate: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sqlstate: sqlstate.into(),
            native_error: 0,
            message: message.into(),
        }
    }

    /// Standard that defines the SQLSTATE class.
    pub fn class_origin(&self) -> &'static str {
        if self.sqlstate.starts_with("IM") {
            "ODBC 3.0"
        } else {
            "ISO 9075"
        }
    }

    /// Standard that defines the SQLSTATE subclass.
    pub fn subclass_origin(&self) -> &'static str {
        if self.sqlstate.starts_with("IM") || self.sqlstate.starts_with("HY") {
            "ODBC 3.0"
        } else {
            "ISO 9075"
        }
    }
}

impl From<&Error> for DiagnosticRecord {
    fn from(err: &Error) -> Self {
        Self::new(err.sql_state(), err.diagnostic_message())
    }
}

/// Diagnostic fields retrievable with [`DiagnosticArea::get_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagField {
    Number,
    Native,
    SqlState,
    MessageText,
    ClassOrigin,
    SubclassOrigin,
    ConnectionName,
    ServerName,
}

impl TryFrom<i16> for DiagField {
    type Error = Error;

    fn try_from(code: i16) -> Result<Self> {
        match code {
            2 => Ok(DiagField::Number),
            4 => Ok(DiagField::SqlState),
            5 => Ok(DiagField::Native),
            6 => Ok(DiagField::MessageText),
            8 => Ok(DiagField::ClassOrigin),
            9 => Ok(DiagField::SubclassOrigin),
            10 => Ok(DiagField::ConnectionName),
            11 => Ok(DiagField::ServerName),
            other => Err(Error::invalid_argument()
                .sqlstate("HY024")
                .message(format!("Unsupported diagnostic field: {}", other))),
        }
    }
}

/// Value of a diagnostic field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagValue {
    Integer(i32),
    Text(String),
}

/// Names reported for the connection-level fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagContext {
    pub connection_name: String,
    pub server_name: String,
}

/// Most recent diagnostic of one handle.
#[derive(Debug, Default)]
pub struct DiagnosticArea {
    latest: Option<DiagnosticRecord>,
}

impl DiagnosticArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the retained record with `err`. Invalid-handle errors are
    /// never recorded.
    pub fn record(&mut self, err: &Error) {
        if err.kind() == ErrorKind::InvalidHandle {
            return;
        }
        error!("{}: {}", err.sql_state(), err.diagnostic_message());
        self.latest = Some(DiagnosticRecord::from(err));
    }

    /// Replaces the retained record with a warning.
    pub fn warn(&mut self, sqlstate: &str, message: impl Into<String>) {
        self.latest = Some(DiagnosticRecord::new(sqlstate, message));
    }

    pub fn latest(&self) -> Option<&DiagnosticRecord> {
        self.latest.as_ref()
    }

    /// Record `number`. `Ok(None)` means no data.
    pub fn get_rec(&self, number: i16) -> Result<Option<&DiagnosticRecord>> {
        let Some(record) = &self.latest else {
            return Ok(None);
        };
        if number < 1 {
            return Err(Error::invalid_argument()
                .message(format!("Invalid record number: {}", number)));
        }
        if number > 1 {
            return Ok(None);
        }
        Ok(Some(record))
    }

    /// One field of record `number`. `Ok(None)` means no data.
    pub fn get_field(
        &self,
        number: i16,
        field: DiagField,
        context: &DiagContext,
    ) -> Result<Option<DiagValue>> {
        let Some(record) = self.get_rec(number)? else {
            return Ok(None);
        };
        let value = match field {
            DiagField::Number => DiagValue::Integer(1),
            DiagField::Native => DiagValue::Integer(record.native_error),
            DiagField::SqlState => DiagValue::Text(record.sqlstate.clone()),
            DiagField::MessageText => DiagValue::Text(record.message.clone()),
            DiagField::ClassOrigin => DiagValue::Text(record.class_origin().to_string()),
            DiagField::SubclassOrigin => DiagValue::Text(record.subclass_origin().to_string()),
            DiagField::ConnectionName => DiagValue::Text(context.connection_name.clone()),
            DiagField::ServerName => DiagValue::Text(context.server_name.clone()),
        };
        Ok(Some(value))
    }
}

/// Result of copying text into a caller buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopiedText {
    /// Bytes written, excluding the terminator.
    pub copied: usize,
    /// Length of the complete text in bytes.
    pub full: usize,
}

impl CopiedText {
    pub fn truncated(&self) -> bool {
        self.copied < self.full
    }
}

/// Copies `text` into `buf` as NUL-terminated UTF-8.
pub fn copy_text(text: &str, buf: &mut [u8]) -> CopiedText {
    let full = match write_narrow(text, buf) {
        Indicator::Length(n) => n,
        Indicator::Null => 0,
    };
    let copied = buf.iter().position(|b| *b == 0).unwrap_or(0).min(full);
    CopiedText { copied, full }
}
