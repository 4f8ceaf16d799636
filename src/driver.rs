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

//! Handle-based entry point for the InvenTree driver.
//!
//! The [`Driver`] owns every live connection and statement behind opaque
//! `u64` handles and translates the core's `Result`s into [`ReturnCode`]s,
//! recording failures in the diagnostic area of the handle the call was made
//! on. A call-level interface shim only has to forward its arguments.
//!
//! The table locks are held only long enough to resolve a handle; each
//! object sits behind its own `Arc<Mutex<_>>`, so freeing a statement while
//! another thread is executing it lets that execute finish on its own
//! reference.

use crate::config::{ConnectParams, ProfileStore};
use crate::client::InvenTreeClient;
use crate::connection::{Connection, InfoType, InfoValue, DRIVER_NAME};
use crate::database::Database;
use crate::diagnostics::{
    copy_text, DiagContext, DiagField, DiagValue, DiagnosticArea, SQLSTATE_TRUNCATED,
};
use crate::error::{Error, ErrorKind, Result};
use crate::handles::{Handle, HandleKind, HandleTable};
use crate::result::{CDataType, ColumnDescriptor};
use crate::statement::{FetchOutcome, ParameterDirection, Statement};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::debug;

static DRIVER: OnceLock<Driver> = OnceLock::new();

const TRUNCATED_MESSAGE: &str = "String data, right truncated";

/// Status of a driver call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnCode {
    Success,
    SuccessWithInfo,
    NoData,
    Error,
    InvalidHandle,
}

impl ReturnCode {
    /// Numeric value used by call-level interfaces.
    pub fn code(self) -> i16 {
        match self {
            ReturnCode::Success => 0,
            ReturnCode::SuccessWithInfo => 1,
            ReturnCode::NoData => 100,
            ReturnCode::Error => -1,
            ReturnCode::InvalidHandle => -2,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ReturnCode::Success | ReturnCode::SuccessWithInfo)
    }
}

/// Output of [`Driver::get_diag_rec`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagRec {
    pub sqlstate: String,
    pub native_error: i32,
    /// Full length of the message text in bytes.
    pub text_length: usize,
}

#[derive(Debug, Default)]
struct ConnectionSlot {
    connection: Option<Connection>,
    diagnostics: DiagnosticArea,
}

impl ConnectionSlot {
    fn context(&self) -> DiagContext {
        match &self.connection {
            Some(connection) => connection.diag_context(),
            None => DiagContext {
                connection_name: DRIVER_NAME.to_string(),
                server_name: String::new(),
            },
        }
    }
}

#[derive(Debug)]
struct StatementSlot {
    statement: Statement,
    diagnostics: DiagnosticArea,
    context: DiagContext,
}

type Shared<T> = Arc<Mutex<T>>;

#[derive(Debug, Clone)]
struct StatementEntry {
    owner: Handle,
    slot: Shared<StatementSlot>,
}

/// Process-wide registry of connections and statements.
#[derive(Debug)]
pub struct Driver {
    database: Database,
    connections: Mutex<HandleTable<Shared<ConnectionSlot>>>,
    statements: Mutex<HandleTable<StatementEntry>>,
}

impl Default for Driver {
    fn default() -> Self {
        Self::new(Database::default())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Driver {
    /// Creates a driver whose connections are configured by `database`.
    pub fn new(database: Database) -> Self {
        Self {
            database,
            connections: Mutex::new(HandleTable::new(HandleKind::Connection)),
            statements: Mutex::new(HandleTable::new(HandleKind::Statement)),
        }
    }

    /// Initializes the process-wide driver. The first call wins; later calls
    /// return the existing instance.
    pub fn init(profiles: Arc<dyn ProfileStore>) -> &'static Driver {
        DRIVER.get_or_init(|| Driver::new(Database::new(profiles)))
    }

    /// The process-wide driver, if [`Driver::init`] has run.
    pub fn global() -> Option<&'static Driver> {
        DRIVER.get()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Frees every statement and connection. Handles issued earlier become
    /// invalid.
    pub fn shutdown(&self) {
        lock(&self.statements).clear();
        lock(&self.connections).clear();
        debug!("Driver shut down");
    }

    pub fn connection_count(&self) -> usize {
        lock(&self.connections).len()
    }

    pub fn statement_count(&self) -> usize {
        lock(&self.statements).len()
    }

    fn connection_slot(&self, raw: u64) -> Option<Shared<ConnectionSlot>> {
        let handle = Handle::from_raw(raw)?;
        lock(&self.connections).get(handle).ok().cloned()
    }

    fn statement_slot(&self, raw: u64) -> Option<Shared<StatementSlot>> {
        let handle = Handle::from_raw(raw)?;
        lock(&self.statements)
            .get(handle)
            .ok()
            .map(|entry| entry.slot.clone())
    }

    fn with_connection<F>(&self, raw: u64, f: F) -> ReturnCode
    where
        F: FnOnce(&mut Option<Connection>) -> Result<ReturnCode>,
    {
        let Some(slot) = self.connection_slot(raw) else {
            return ReturnCode::InvalidHandle;
        };
        let mut guard = lock(&slot);
        let slot = &mut *guard;
        finish(f(&mut slot.connection), &mut slot.diagnostics)
    }

    /// Runs `f` against a connected connection; 08003 otherwise.
    fn with_open_connection<F>(&self, raw: u64, f: F) -> ReturnCode
    where
        F: FnOnce(&mut Connection) -> Result<ReturnCode>,
    {
        self.with_connection(raw, |connection| match connection {
            Some(connection) => f(connection),
            None => Err(not_connected()),
        })
    }

    fn with_statement<F>(&self, raw: u64, f: F) -> ReturnCode
    where
        F: FnOnce(&mut Statement, &mut DiagnosticArea) -> Result<ReturnCode>,
    {
        let Some(slot) = self.statement_slot(raw) else {
            return ReturnCode::InvalidHandle;
        };
        let mut guard = lock(&slot);
        let slot = &mut *guard;
        let result = f(&mut slot.statement, &mut slot.diagnostics);
        finish(result, &mut slot.diagnostics)
    }

    // Connection handles

    /// Allocates an unconnected connection handle.
    pub fn alloc_connection(&self) -> u64 {
        let slot = Arc::new(Mutex::new(ConnectionSlot::default()));
        lock(&self.connections).insert(slot).as_raw()
    }

    /// Connects using the driver's database configuration.
    pub fn connect(&self, connection: u64, params: &ConnectParams) -> ReturnCode {
        self.open(connection, |database| database.connect(params))
    }

    /// Like [`Driver::connect`], but talks to the server through `client`.
    pub fn connect_with_client(
        &self,
        connection: u64,
        params: &ConnectParams,
        client: Arc<dyn InvenTreeClient>,
    ) -> ReturnCode {
        self.open(connection, |database| {
            database.connect_with_client(params, client)
        })
    }

    fn open<F>(&self, raw: u64, connect: F) -> ReturnCode
    where
        F: FnOnce(&Database) -> Result<Connection>,
    {
        self.with_connection(raw, |connection| {
            if connection.is_some() {
                return Err(Error::invalid_state()
                    .sqlstate("08002")
                    .message("Connection name in use"));
            }
            *connection = Some(connect(&self.database)?);
            Ok(ReturnCode::Success)
        })
    }

    /// Closes the connection and frees the statements allocated on it. The
    /// handle stays allocated and may connect again.
    pub fn disconnect(&self, connection: u64) -> ReturnCode {
        let Some(owner) = Handle::from_raw(connection) else {
            return ReturnCode::InvalidHandle;
        };
        self.with_connection(connection, |connection| {
            if connection.take().is_none() {
                return Err(not_connected());
            }
            let mut statements = lock(&self.statements);
            let owned: Vec<Handle> = statements
                .iter()
                .filter(|(_, entry)| entry.owner == owner)
                .map(|(handle, _)| handle)
                .collect();
            for handle in owned {
                statements.remove(handle)?;
            }
            Ok(ReturnCode::Success)
        })
    }

    pub fn get_info(
        &self,
        connection: u64,
        info_type: u16,
        buf: &mut [u8],
        length: &mut usize,
    ) -> ReturnCode {
        self.with_open_connection(connection, |connection| {
            match connection.get_info(InfoType::from(info_type))? {
                InfoValue::Text(text) => {
                    let copied = copy_text(&text, buf);
                    *length = copied.full;
                    Ok(truncation_code(copied.truncated()))
                }
                InfoValue::Integer(value) => {
                    write_integer(buf, &value.to_ne_bytes())?;
                    *length = 4;
                    Ok(ReturnCode::Success)
                }
            }
        })
    }

    pub fn set_connect_attr(&self, connection: u64, attribute: i32, value: isize) -> ReturnCode {
        self.with_open_connection(connection, |connection| {
            connection.set_connect_attr(attribute, value)?;
            Ok(ReturnCode::Success)
        })
    }

    pub fn end_tran(&self, connection: u64, commit: bool) -> ReturnCode {
        self.with_open_connection(connection, |connection| {
            connection.end_tran(commit)?;
            Ok(ReturnCode::Success)
        })
    }

    // Statement handles

    /// Allocates a statement on a connected connection.
    pub fn alloc_statement(&self, connection: u64, statement: &mut u64) -> ReturnCode {
        let Some(owner) = Handle::from_raw(connection) else {
            return ReturnCode::InvalidHandle;
        };
        self.with_open_connection(connection, |connection| {
            let slot = StatementSlot {
                statement: connection.new_statement(),
                diagnostics: DiagnosticArea::new(),
                context: connection.diag_context(),
            };
            let entry = StatementEntry {
                owner,
                slot: Arc::new(Mutex::new(slot)),
            };
            *statement = lock(&self.statements).insert(entry).as_raw();
            Ok(ReturnCode::Success)
        })
    }

    /// Frees a connection or statement handle. A connection must be
    /// disconnected first.
    pub fn free_handle(&self, raw: u64) -> ReturnCode {
        let Some(handle) = Handle::from_raw(raw) else {
            return ReturnCode::InvalidHandle;
        };
        match handle.kind() {
            HandleKind::Statement => match lock(&self.statements).remove(handle) {
                Ok(_) => ReturnCode::Success,
                Err(_) => ReturnCode::InvalidHandle,
            },
            HandleKind::Connection => {
                let code = self.with_connection(raw, |connection| {
                    if connection.is_some() {
                        return Err(Error::invalid_state()
                            .message("Function sequence error: connection is still open"));
                    }
                    Ok(ReturnCode::Success)
                });
                if code != ReturnCode::Success {
                    return code;
                }
                match lock(&self.connections).remove(handle) {
                    Ok(_) => ReturnCode::Success,
                    Err(_) => ReturnCode::InvalidHandle,
                }
            }
        }
    }

    pub fn prepare(&self, statement: u64, sql: &str) -> ReturnCode {
        self.with_statement(statement, |statement, _| {
            statement.prepare(sql)?;
            Ok(ReturnCode::Success)
        })
    }

    pub fn execute(&self, statement: u64) -> ReturnCode {
        self.with_statement(statement, |statement, _| {
            statement.execute()?;
            Ok(ReturnCode::Success)
        })
    }

    pub fn exec_direct(&self, statement: u64, sql: &str) -> ReturnCode {
        self.with_statement(statement, |statement, _| {
            statement.exec_direct(sql)?;
            Ok(ReturnCode::Success)
        })
    }

    pub fn tables(&self, statement: u64) -> ReturnCode {
        self.with_statement(statement, |statement, _| {
            statement.tables()?;
            Ok(ReturnCode::Success)
        })
    }

    pub fn columns(&self, statement: u64, table: &str) -> ReturnCode {
        self.with_statement(statement, |statement, _| {
            statement.columns(table)?;
            Ok(ReturnCode::Success)
        })
    }

    pub fn num_result_cols(&self, statement: u64, count: &mut usize) -> ReturnCode {
        self.with_statement(statement, |statement, _| {
            *count = statement.num_result_cols();
            Ok(ReturnCode::Success)
        })
    }

    pub fn describe_col(
        &self,
        statement: u64,
        number: u16,
        column: &mut Option<ColumnDescriptor>,
    ) -> ReturnCode {
        self.with_statement(statement, |statement, _| {
            *column = Some(statement.describe_col(number)?);
            Ok(ReturnCode::Success)
        })
    }

    pub fn row_count(&self, statement: u64, count: &mut usize) -> ReturnCode {
        self.with_statement(statement, |statement, _| {
            *count = statement.row_count()?;
            Ok(ReturnCode::Success)
        })
    }

    pub fn bind_col(&self, statement: u64, number: u16, target: i16, buffer_len: usize) -> ReturnCode {
        self.with_statement(statement, |statement, _| {
            statement.bind_col(number, CDataType::try_from(target)?, buffer_len)?;
            Ok(ReturnCode::Success)
        })
    }

    /// Copies the bound buffer of column `number` as written by the last
    /// fetch, along with its length/indicator value.
    pub fn bound_data(
        &self,
        statement: u64,
        number: u16,
        data: &mut Vec<u8>,
        indicator: &mut isize,
    ) -> ReturnCode {
        self.with_statement(statement, |statement, _| {
            let binding = statement.bound_column(number).ok_or_else(|| {
                Error::invalid_argument()
                    .message(format!("Invalid descriptor index: column {} is not bound", number))
            })?;
            let Some(value) = binding.indicator else {
                return Ok(ReturnCode::NoData);
            };
            data.clear();
            data.extend_from_slice(&binding.buffer);
            *indicator = value.as_sqllen();
            Ok(ReturnCode::Success)
        })
    }

    pub fn bind_parameter(&self, statement: u64, number: u16, value: &str) -> ReturnCode {
        self.with_statement(statement, |statement, _| {
            statement.bind_parameter(number, ParameterDirection::Input, CDataType::Char, value)?;
            Ok(ReturnCode::Success)
        })
    }

    /// Advances the cursor. Truncated bound columns post 01004 and yield
    /// `SuccessWithInfo`.
    pub fn fetch(&self, statement: u64) -> ReturnCode {
        self.with_statement(statement, |statement, diagnostics| {
            match statement.fetch()? {
                FetchOutcome::NoData => Ok(ReturnCode::NoData),
                FetchOutcome::Row { truncated } => {
                    if truncated {
                        diagnostics.warn(SQLSTATE_TRUNCATED, TRUNCATED_MESSAGE);
                    }
                    Ok(truncation_code(truncated))
                }
            }
        })
    }

    /// Reads column `number` of the current row into `buf`.
    pub fn get_data(
        &self,
        statement: u64,
        number: u16,
        target: i16,
        buf: &mut [u8],
        indicator: &mut isize,
    ) -> ReturnCode {
        self.with_statement(statement, |statement, diagnostics| {
            let target = CDataType::try_from(target)?;
            let value = statement.get_data(number, target, buf)?;
            *indicator = value.as_sqllen();
            let truncated = value.is_truncated(target, buf.len());
            if truncated {
                diagnostics.warn(SQLSTATE_TRUNCATED, TRUNCATED_MESSAGE);
            }
            Ok(truncation_code(truncated))
        })
    }

    pub fn close_cursor(&self, statement: u64) -> ReturnCode {
        self.with_statement(statement, |statement, _| {
            statement.close_cursor();
            Ok(ReturnCode::Success)
        })
    }

    pub fn unbind(&self, statement: u64) -> ReturnCode {
        self.with_statement(statement, |statement, _| {
            statement.unbind();
            Ok(ReturnCode::Success)
        })
    }

    // Diagnostics

    fn diagnostics<F, T>(&self, raw: u64, f: F) -> Option<T>
    where
        F: FnOnce(&DiagnosticArea, &DiagContext) -> T,
    {
        match Handle::from_raw(raw)?.kind() {
            HandleKind::Connection => {
                let slot = self.connection_slot(raw)?;
                let slot = lock(&slot);
                Some(f(&slot.diagnostics, &slot.context()))
            }
            HandleKind::Statement => {
                let slot = self.statement_slot(raw)?;
                let slot = lock(&slot);
                Some(f(&slot.diagnostics, &slot.context))
            }
        }
    }

    /// Retrieves diagnostic record `number` of any handle. The message is
    /// copied into `message` with truncation.
    pub fn get_diag_rec(
        &self,
        raw: u64,
        number: i16,
        message: &mut [u8],
        record: &mut DiagRec,
    ) -> ReturnCode {
        self.diagnostics(raw, |diagnostics, _| match diagnostics.get_rec(number) {
            Err(_) => ReturnCode::Error,
            Ok(None) => ReturnCode::NoData,
            Ok(Some(rec)) => {
                let copied = copy_text(&rec.message, message);
                *record = DiagRec {
                    sqlstate: rec.sqlstate.clone(),
                    native_error: rec.native_error,
                    text_length: copied.full,
                };
                truncation_code(copied.truncated())
            }
        })
        .unwrap_or(ReturnCode::InvalidHandle)
    }

    /// Retrieves one field of diagnostic record `number`. Text fields are
    /// copied into `buf`; integer fields are written as a native-endian
    /// `i32`.
    pub fn get_diag_field(
        &self,
        raw: u64,
        number: i16,
        field: i16,
        buf: &mut [u8],
        length: &mut usize,
    ) -> ReturnCode {
        self.diagnostics(raw, |diagnostics, context| {
            let value = DiagField::try_from(field)
                .and_then(|field| diagnostics.get_field(number, field, context));
            match value {
                Err(_) => ReturnCode::Error,
                Ok(None) => ReturnCode::NoData,
                Ok(Some(DiagValue::Text(text))) => {
                    let copied = copy_text(&text, buf);
                    *length = copied.full;
                    truncation_code(copied.truncated())
                }
                Ok(Some(DiagValue::Integer(value))) => {
                    if write_integer(buf, &value.to_ne_bytes()).is_err() {
                        return ReturnCode::Error;
                    }
                    *length = 4;
                    ReturnCode::Success
                }
            }
        })
        .unwrap_or(ReturnCode::InvalidHandle)
    }
}

fn finish(result: Result<ReturnCode>, diagnostics: &mut DiagnosticArea) -> ReturnCode {
    match result {
        Ok(code) => code,
        Err(e) if e.kind() == ErrorKind::InvalidHandle => ReturnCode::InvalidHandle,
        Err(e) => {
            diagnostics.record(&e);
            ReturnCode::Error
        }
    }
}

fn truncation_code(truncated: bool) -> ReturnCode {
    if truncated {
        ReturnCode::SuccessWithInfo
    } else {
        ReturnCode::Success
    }
}

fn write_integer(buf: &mut [u8], bytes: &[u8]) -> Result<()> {
    let target = buf.get_mut(..bytes.len()).ok_or_else(|| {
        Error::invalid_argument()
            .sqlstate("HY090")
            .message("Invalid string or buffer length")
    })?;
    target.copy_from_slice(bytes);
    Ok(())
}

fn not_connected() -> Error {
    Error::invalid_state()
        .sqlstate("08003")
        .message("Connection not open")
}
