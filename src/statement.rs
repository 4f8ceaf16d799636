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

//! Statement implementation for the InvenTree driver.
//!
//! A statement moves through
//!
//! ```text
//! Unprepared --prepare--> Prepared --execute--> Executed --fetch past end--> Exhausted
//!      ^                     ^  |                  |  ^                         |
//!      |                     |  +----(failure)-----+  +-------re-execute--------+
//!      +--(parse failure)----+
//! ```
//!
//! Rows are fetched one at a time. Each fetch marshals the new current row
//! into the bound column buffers; `get_data` reads any column of the current
//! row independently of the bindings.

use crate::error::{Error, Result};
use crate::fetcher::PartFetcher;
use crate::metadata::{build_columns, build_tables, SqlType};
use crate::query::{self, PredicateValue, QueryPlan};
use crate::result::{marshal, CDataType, ColumnDescriptor, Indicator, Nullability, ResultSet};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{debug, Span};

/// Lifecycle state of a [`Statement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementState {
    Unprepared,
    Prepared,
    Executed,
    Exhausted,
}

/// Result of a fetch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The cursor moved to a new row. `truncated` is set when a bound text
    /// column did not fit its buffer.
    Row { truncated: bool },
    NoData,
}

/// Scroll direction for [`Statement::fetch_scroll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrientation {
    Next,
    Prior,
    First,
    Last,
    Absolute(isize),
    Relative(isize),
}

/// Column attribute selectors for [`Statement::col_attribute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAttribute {
    Label,
    Name,
    Type,
    TypeName,
    DisplaySize,
    Nullable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Text(String),
    Integer(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorType {
    ForwardOnly,
    Static,
    KeysetDriven,
    Dynamic,
}

/// Settable statement attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementAttribute {
    RowArraySize(usize),
    ParamsetSize(usize),
    CursorType(CursorType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterDirection {
    Input,
    InputOutput,
    Output,
}

/// Shape reported by [`Statement::describe_param`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterDescription {
    pub sql_type: SqlType,
    /// Column size; 0 when unknown.
    pub size: usize,
    pub decimal_digits: i16,
    pub nullable: Nullability,
}

/// Output buffer bound to a result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    pub target: CDataType,
    pub buffer: Vec<u8>,
    /// Indicator written by the last fetch, `None` before the first.
    pub indicator: Option<Indicator>,
}

/// A statement on an InvenTree connection.
#[derive(Debug)]
pub struct Statement {
    fetcher: PartFetcher,
    runtime: Arc<Runtime>,
    state: StatementState,
    plan: Option<QueryPlan>,
    result: Option<ResultSet>,
    /// Current row index; -1 before the first fetch.
    cursor: isize,
    bindings: BTreeMap<u16, ColumnBinding>,
    parameter: Option<String>,
    rows_fetched: usize,
    span: Span,
}

impl Statement {
    pub(crate) fn new(fetcher: PartFetcher, runtime: Arc<Runtime>, span: Span) -> Self {
        Self {
            fetcher,
            runtime,
            state: StatementState::Unprepared,
            plan: None,
            result: None,
            cursor: -1,
            bindings: BTreeMap::new(),
            parameter: None,
            rows_fetched: 0,
            span,
        }
    }

    pub fn state(&self) -> StatementState {
        self.state
    }

    pub fn plan(&self) -> Option<&QueryPlan> {
        self.plan.as_ref()
    }

    pub fn result_set(&self) -> Option<&ResultSet> {
        self.result.as_ref()
    }

    /// Current row index; -1 before the first fetch.
    pub fn cursor(&self) -> isize {
        self.cursor
    }

    /// Parses `sql` and discards any previous result set.
    pub fn prepare(&mut self, sql: &str) -> Result<()> {
        let span = self.span.clone();
        let _guard = span.enter();
        debug!("Preparing: {}", sql);

        self.result = None;
        self.cursor = -1;
        self.rows_fetched = 0;
        match query::parse(sql) {
            Ok(plan) => {
                self.plan = Some(plan);
                self.state = StatementState::Prepared;
                Ok(())
            }
            Err(e) => {
                self.plan = None;
                self.state = StatementState::Unprepared;
                Err(e)
            }
        }
    }

    /// Runs the prepared plan and replaces the result set.
    pub fn execute(&mut self) -> Result<()> {
        let span = self.span.clone();
        let _guard = span.enter();

        let plan = match (&self.plan, self.state) {
            (Some(plan), StatementState::Prepared)
            | (Some(plan), StatementState::Executed)
            | (Some(plan), StatementState::Exhausted) => plan.clone(),
            _ => {
                return Err(Error::invalid_state()
                    .message("Function sequence error: statement is not prepared"));
            }
        };

        self.result = None;
        self.cursor = -1;
        self.rows_fetched = 0;
        self.state = StatementState::Prepared;

        let filter = match &plan.predicate {
            None => None,
            Some(predicate) => {
                let column = predicate.filter_column()?;
                let value = match &predicate.value {
                    PredicateValue::Literal(value) => value.clone(),
                    PredicateValue::Parameter => self.parameter.clone().ok_or_else(|| {
                        Error::invalid_state()
                            .sqlstate("07002")
                            .message("COUNT field incorrect: parameter 1 is not bound")
                    })?,
                };
                Some((column, value))
            }
        };

        debug!("Executing: table={:?} filter={:?}", plan.table, filter);
        let records = self.runtime.block_on(
            self.fetcher
                .fetch(&plan.table, filter.as_ref().map(|(c, v)| (*c, v.as_str()))),
        )?;

        let result = ResultSet::infer(&records);
        debug!(
            "Result set: {} columns, {} rows",
            result.num_columns(),
            result.num_rows()
        );
        self.install(result);
        Ok(())
    }

    /// `prepare` followed by `execute`.
    pub fn exec_direct(&mut self, sql: &str) -> Result<()> {
        self.prepare(sql)?;
        self.execute()
    }

    /// Replaces the result set with the table listing.
    pub fn tables(&mut self) -> Result<()> {
        let span = self.span.clone();
        let _guard = span.enter();
        let result = build_tables(self.fetcher.categories());
        debug!("Listing {} tables", result.num_rows());
        self.install(result);
        Ok(())
    }

    /// Replaces the result set with the filterable columns of `table`.
    pub fn columns(&mut self, table: &str) -> Result<()> {
        let span = self.span.clone();
        let _guard = span.enter();
        debug!("Listing columns of {}", table);
        self.install(build_columns(table));
        Ok(())
    }

    fn install(&mut self, result: ResultSet) {
        self.result = Some(result);
        self.cursor = -1;
        self.rows_fetched = 0;
        self.state = StatementState::Executed;
    }

    fn require_result(&self) -> Result<&ResultSet> {
        self.result.as_ref().ok_or_else(|| {
            Error::invalid_state().message("Function sequence error: no result set")
        })
    }

    fn require_column(&self, number: u16) -> Result<&ColumnDescriptor> {
        self.require_result()?
            .column(number)
            .ok_or_else(|| invalid_column(number))
    }

    /// Number of result columns; 0 without a result set.
    pub fn num_result_cols(&self) -> usize {
        self.result.as_ref().map_or(0, ResultSet::num_columns)
    }

    pub fn describe_col(&self, number: u16) -> Result<ColumnDescriptor> {
        self.require_column(number).cloned()
    }

    pub fn col_attribute(&self, number: u16, attribute: ColumnAttribute) -> Result<AttributeValue> {
        let column = self.require_column(number)?;
        Ok(match attribute {
            ColumnAttribute::Label | ColumnAttribute::Name => {
                AttributeValue::Text(column.name.clone())
            }
            ColumnAttribute::Type => AttributeValue::Integer(column.sql_type.code().into()),
            ColumnAttribute::TypeName => {
                AttributeValue::Text(column.sql_type.type_name().to_string())
            }
            ColumnAttribute::DisplaySize => AttributeValue::Integer(column.display_size as i64),
            ColumnAttribute::Nullable => AttributeValue::Integer(column.nullable.code().into()),
        })
    }

    /// Rows in the current result set.
    pub fn row_count(&self) -> Result<usize> {
        Ok(self.require_result()?.num_rows())
    }

    /// Rows moved by the last fetch: 1 or 0.
    pub fn rows_fetched(&self) -> usize {
        self.rows_fetched
    }

    /// Advances to the next row and fills the bound columns.
    pub fn fetch(&mut self) -> Result<FetchOutcome> {
        let span = self.span.clone();
        let _guard = span.enter();

        let num_rows = match self.state {
            StatementState::Executed => self.require_result()?.num_rows(),
            StatementState::Exhausted => {
                self.rows_fetched = 0;
                return Ok(FetchOutcome::NoData);
            }
            _ => {
                return Err(Error::invalid_state()
                    .message("Function sequence error: statement is not executed"))
            }
        };

        let next = self.cursor + 1;
        if next as usize >= num_rows {
            debug!("Fetch past last row ({})", num_rows);
            self.cursor = num_rows as isize;
            self.rows_fetched = 0;
            self.state = StatementState::Exhausted;
            return Ok(FetchOutcome::NoData);
        }

        // A failed fetch leaves the cursor on the previous row.
        self.check_bindings()?;
        let previous = std::mem::replace(&mut self.cursor, next);
        match self.populate_bindings() {
            Ok(truncated) => {
                self.rows_fetched = 1;
                Ok(FetchOutcome::Row { truncated })
            }
            Err(e) => {
                self.cursor = previous;
                self.rows_fetched = 0;
                Err(e)
            }
        }
    }

    /// Bindings may predate the current result set; every bound column must
    /// exist in it.
    fn check_bindings(&self) -> Result<()> {
        let num_columns = self.num_result_cols();
        match self
            .bindings
            .keys()
            .find(|number| **number as usize > num_columns)
        {
            Some(number) => Err(invalid_column(*number)),
            None => Ok(()),
        }
    }

    /// Only [`FetchOrientation::Next`] is supported.
    pub fn fetch_scroll(&mut self, orientation: FetchOrientation) -> Result<FetchOutcome> {
        match orientation {
            FetchOrientation::Next => self.fetch(),
            other => Err(Error::not_implemented()
                .message(format!("Fetch orientation {:?} is not supported", other))),
        }
    }

    fn populate_bindings(&mut self) -> Result<bool> {
        let Some(row) = self
            .result
            .as_ref()
            .and_then(|r| r.row(self.cursor as usize))
        else {
            return Ok(false);
        };

        let mut truncated = false;
        for (number, binding) in self.bindings.iter_mut() {
            let value = row
                .get(*number as usize - 1)
                .ok_or_else(|| invalid_column(*number))?;
            let indicator = marshal(value, binding.target, &mut binding.buffer)?;
            truncated |= indicator.is_truncated(binding.target, binding.buffer.len());
            binding.indicator = Some(indicator);
        }
        Ok(truncated)
    }

    /// Converts column `number` of the current row into `buf`.
    pub fn get_data(&self, number: u16, target: CDataType, buf: &mut [u8]) -> Result<Indicator> {
        let result = self.require_result()?;
        let row = usize::try_from(self.cursor)
            .ok()
            .and_then(|i| result.row(i))
            .ok_or_else(|| Error::invalid_state().sqlstate("24000").message("Invalid cursor state"))?;
        let value = number
            .checked_sub(1)
            .and_then(|i| row.get(i as usize))
            .ok_or_else(|| invalid_column(number))?;
        marshal(value, target, buf)
    }

    /// Binds column `number` to a new buffer of `buffer_len` bytes. A later
    /// bind of the same column replaces it.
    pub fn bind_col(&mut self, number: u16, target: CDataType, buffer_len: usize) -> Result<()> {
        if number == 0 {
            return Err(invalid_column(number));
        }
        if let Some(result) = &self.result {
            if result.column(number).is_none() {
                return Err(invalid_column(number));
            }
        }
        if let Some(width) = target.fixed_width() {
            if buffer_len < width {
                return Err(Error::invalid_argument()
                    .sqlstate("HY090")
                    .message(format!(
                        "Invalid buffer length: {:?} needs {} bytes, got {}",
                        target, width, buffer_len
                    )));
            }
        }
        self.bindings.insert(
            number,
            ColumnBinding {
                target,
                buffer: vec![0; buffer_len],
                indicator: None,
            },
        );
        Ok(())
    }

    pub fn bound_column(&self, number: u16) -> Option<&ColumnBinding> {
        self.bindings.get(&number)
    }

    /// Drops every column binding.
    pub fn unbind(&mut self) {
        self.bindings.clear();
    }

    /// Discards the result set; the prepared plan is kept.
    pub fn close_cursor(&mut self) {
        self.result = None;
        self.cursor = -1;
        self.rows_fetched = 0;
        self.state = if self.plan.is_some() {
            StatementState::Prepared
        } else {
            StatementState::Unprepared
        };
    }

    pub fn set_attribute(&mut self, attribute: StatementAttribute) -> Result<()> {
        match attribute {
            StatementAttribute::RowArraySize(1)
            | StatementAttribute::ParamsetSize(1)
            | StatementAttribute::CursorType(CursorType::ForwardOnly) => Ok(()),
            other => Err(Error::not_implemented()
                .message(format!("Optional feature not implemented: {:?}", other))),
        }
    }

    /// Number of `?` markers in the prepared statement.
    pub fn num_params(&self) -> usize {
        self.plan.as_ref().map_or(0, QueryPlan::parameter_count)
    }

    /// Binds the value of input parameter `number`.
    pub fn bind_parameter(
        &mut self,
        number: u16,
        direction: ParameterDirection,
        value_type: CDataType,
        value: impl Into<String>,
    ) -> Result<()> {
        if number != 1 {
            return Err(invalid_parameter(number));
        }
        if direction != ParameterDirection::Input || value_type != CDataType::Char {
            return Err(Error::not_implemented()
                .message("Only character input parameters are supported"));
        }
        self.parameter = Some(value.into());
        Ok(())
    }

    pub fn describe_param(&self, number: u16) -> Result<ParameterDescription> {
        if number != 1 {
            return Err(invalid_parameter(number));
        }
        Ok(ParameterDescription {
            sql_type: SqlType::Varchar,
            size: 0,
            decimal_digits: 0,
            nullable: Nullability::NoNulls,
        })
    }
}

fn invalid_column(number: u16) -> Error {
    Error::invalid_argument().message(format!("Invalid descriptor index: column {}", number))
}

fn invalid_parameter(number: u16) -> Error {
    Error::invalid_argument().message(format!("Invalid descriptor index: parameter {}", number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockClient;
    use crate::error::ErrorKind;
    use crate::fetcher::{FetchOptions, IdentifierCache};
    use crate::metadata::CategoryMap;
    use crate::types::{Category, FieldValue};
    use serde_json::json;

    fn statement_with(client: MockClient, options: FetchOptions) -> (Statement, Arc<MockClient>) {
        statement_over(client, options, &[(7, "Resistors"), (8, "Capacitors")])
    }

    fn statement_over(
        client: MockClient,
        options: FetchOptions,
        categories: &[(i64, &str)],
    ) -> (Statement, Arc<MockClient>) {
        let client = Arc::new(client);
        let categories = CategoryMap::from_categories(
            categories
                .iter()
                .map(|(pk, path)| Category {
                    pk: *pk,
                    pathstring: path.to_string(),
                })
                .collect::<Vec<_>>(),
        );
        let fetcher = PartFetcher::new(
            client.clone(),
            Arc::new(categories),
            Arc::new(IdentifierCache::new()),
            options,
        );
        let runtime = Arc::new(
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap(),
        );
        (Statement::new(fetcher, runtime, Span::none()), client)
    }

    fn resistors() -> MockClient {
        MockClient::new()
            .category(7, "Resistors")
            .part(7, json!({"pk": 1, "IPN": "R-001", "name": "10k", "active": true}))
            .part(7, json!({"pk": 2, "IPN": "R-002", "name": "22k", "active": false}))
            .parameter(1, "Resistance", "10000")
    }

    fn statement() -> Statement {
        statement_with(resistors(), FetchOptions::default()).0
    }

    fn text(stmt: &Statement, column: u16) -> String {
        let mut buf = [0u8; 64];
        match stmt.get_data(column, CDataType::Char, &mut buf).unwrap() {
            Indicator::Length(n) => String::from_utf8(buf[..n].to_vec()).unwrap(),
            Indicator::Null => "NULL".to_string(),
        }
    }

    #[test]
    fn test_prepare_execute_fetch() {
        let mut stmt = statement();
        stmt.prepare("SELECT * FROM Resistors").unwrap();
        assert_eq!(stmt.state(), StatementState::Prepared);
        stmt.execute().unwrap();
        assert_eq!(stmt.state(), StatementState::Executed);
        assert_eq!(stmt.cursor(), -1);

        let names: Vec<_> = (1..=stmt.num_result_cols() as u16)
            .map(|n| stmt.describe_col(n).unwrap().name)
            .collect();
        assert_eq!(names, vec!["IPN", "active", "name", "pk"]);
        assert_eq!(stmt.row_count().unwrap(), 2);

        assert_eq!(stmt.fetch().unwrap(), FetchOutcome::Row { truncated: false });
        assert_eq!(stmt.rows_fetched(), 1);
        assert_eq!(text(&stmt, 1), "R-001");
        assert_eq!(text(&stmt, 2), "1");
        assert_eq!(stmt.fetch().unwrap(), FetchOutcome::Row { truncated: false });
        assert_eq!(text(&stmt, 3), "22k");
        assert_eq!(stmt.fetch().unwrap(), FetchOutcome::NoData);
        assert_eq!(stmt.state(), StatementState::Exhausted);
        assert_eq!(stmt.rows_fetched(), 0);
        assert_eq!(stmt.fetch().unwrap(), FetchOutcome::NoData);
    }

    #[test]
    fn test_get_data_after_exhaustion_is_rejected() {
        let mut stmt = statement();
        stmt.exec_direct("SELECT * FROM Resistors").unwrap();
        let mut buf = [0u8; 16];
        let err = stmt.get_data(1, CDataType::Char, &mut buf).unwrap_err();
        assert_eq!(err.sql_state(), "24000");

        while stmt.fetch().unwrap() != FetchOutcome::NoData {}
        let err = stmt.get_data(1, CDataType::Char, &mut buf).unwrap_err();
        assert_eq!(err.sql_state(), "24000");
    }

    #[test]
    fn test_reexecute_resets_cursor() {
        let mut stmt = statement();
        stmt.exec_direct("SELECT * FROM Resistors").unwrap();
        while stmt.fetch().unwrap() != FetchOutcome::NoData {}

        stmt.execute().unwrap();
        assert_eq!(stmt.cursor(), -1);
        assert_eq!(stmt.state(), StatementState::Executed);
        stmt.fetch().unwrap();
        assert_eq!(text(&stmt, 1), "R-001");
    }

    #[test]
    fn test_syntax_error_leaves_statement_unprepared() {
        let mut stmt = statement();
        stmt.exec_direct("SELECT * FROM Resistors").unwrap();
        let err = stmt.prepare("SELECT name FROM Resistors").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(stmt.state(), StatementState::Unprepared);
        assert!(stmt.result_set().is_none());
        assert_eq!(stmt.execute().unwrap_err().sql_state(), "HY010");
    }

    #[test]
    fn test_unknown_table_clears_result() {
        let mut stmt = statement();
        let err = stmt.exec_direct("SELECT * FROM Inductors").unwrap_err();
        assert_eq!(err.sql_state(), "42S02");
        assert_eq!(stmt.state(), StatementState::Prepared);
        assert_eq!(stmt.num_result_cols(), 0);
        assert_eq!(stmt.fetch().unwrap_err().sql_state(), "HY010");
    }

    #[test]
    fn test_unsupported_filter_column_fails_at_execute() {
        let mut stmt = statement();
        stmt.prepare("SELECT * FROM Resistors WHERE name = '10k'").unwrap();
        let err = stmt.execute().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Catalog);
        assert_eq!(err.sql_state(), "42S22");
    }

    #[test]
    fn test_bound_columns_filled_on_fetch() {
        let mut stmt = statement();
        stmt.exec_direct("SELECT * FROM Resistors").unwrap();
        stmt.bind_col(4, CDataType::SBigInt, 8).unwrap();
        stmt.bind_col(3, CDataType::Char, 3).unwrap();

        assert_eq!(stmt.fetch().unwrap(), FetchOutcome::Row { truncated: true });
        let pk = stmt.bound_column(4).unwrap();
        assert_eq!(pk.indicator, Some(Indicator::Length(8)));
        assert_eq!(i64::from_ne_bytes(pk.buffer[..8].try_into().unwrap()), 1);
        let name = stmt.bound_column(3).unwrap();
        assert_eq!(name.indicator, Some(Indicator::Length(3)));
        assert_eq!(name.buffer, b"10\0");

        stmt.unbind();
        assert!(stmt.bound_column(4).is_none());
    }

    #[test]
    fn test_bind_col_validates_number() {
        let mut stmt = statement();
        assert_eq!(
            stmt.bind_col(0, CDataType::Char, 8).unwrap_err().sql_state(),
            "07009"
        );
        stmt.exec_direct("SELECT * FROM Resistors").unwrap();
        assert_eq!(
            stmt.bind_col(5, CDataType::Char, 8).unwrap_err().sql_state(),
            "07009"
        );
        assert_eq!(stmt.describe_col(0).unwrap_err().sql_state(), "07009");
    }

    #[test]
    fn test_bind_col_rejects_short_fixed_buffers() {
        let mut stmt = statement();
        stmt.exec_direct("SELECT * FROM Resistors").unwrap();
        let err = stmt.bind_col(4, CDataType::SBigInt, 4).unwrap_err();
        assert_eq!(err.sql_state(), "HY090");
        assert_eq!(
            stmt.bind_col(2, CDataType::SLong, 2).unwrap_err().sql_state(),
            "HY090"
        );
        assert_eq!(
            stmt.bind_col(4, CDataType::Double, 7).unwrap_err().sql_state(),
            "HY090"
        );
        assert!(stmt.bound_column(4).is_none());

        // Text targets accept any length; truncation is reported on fetch.
        stmt.bind_col(3, CDataType::Char, 1).unwrap();
        stmt.bind_col(2, CDataType::SLong, 4).unwrap();
        assert_eq!(stmt.fetch().unwrap(), FetchOutcome::Row { truncated: true });
    }

    #[test]
    fn test_stale_binding_does_not_consume_rows() {
        let client = resistors()
            .category(8, "Capacitors")
            .part(8, json!({"pk": 30}))
            .part(8, json!({"pk": 31}));
        let (mut stmt, _) = statement_with(client, FetchOptions::default());
        stmt.exec_direct("SELECT * FROM Resistors").unwrap();
        stmt.bind_col(4, CDataType::SBigInt, 8).unwrap();

        stmt.exec_direct("SELECT * FROM Capacitors").unwrap();
        assert_eq!(stmt.num_result_cols(), 1);
        for _ in 0..2 {
            let err = stmt.fetch().unwrap_err();
            assert_eq!(err.sql_state(), "07009");
            assert_eq!(stmt.cursor(), -1);
            assert_eq!(stmt.rows_fetched(), 0);
        }

        stmt.unbind();
        stmt.bind_col(1, CDataType::SBigInt, 8).unwrap();
        for pk in [30i64, 31] {
            assert_eq!(stmt.fetch().unwrap(), FetchOutcome::Row { truncated: false });
            let binding = stmt.bound_column(1).unwrap();
            assert_eq!(i64::from_ne_bytes(binding.buffer[..8].try_into().unwrap()), pk);
        }
        assert_eq!(stmt.fetch().unwrap(), FetchOutcome::NoData);
    }

    #[test]
    fn test_parameter_marker() {
        let (mut stmt, client) = statement_with(resistors(), FetchOptions::default());
        stmt.prepare("SELECT * FROM Resistors WHERE IPN = ?").unwrap();
        assert_eq!(stmt.num_params(), 1);
        assert_eq!(stmt.execute().unwrap_err().sql_state(), "07002");

        stmt.bind_parameter(1, ParameterDirection::Input, CDataType::Char, "R-001")
            .unwrap();
        stmt.execute().unwrap();
        assert_eq!(stmt.row_count().unwrap(), 1);
        stmt.fetch().unwrap();
        let column = (1..=stmt.num_result_cols() as u16)
            .find(|n| stmt.describe_col(*n).unwrap().name == "parameter.Resistance")
            .unwrap();
        assert_eq!(text(&stmt, column), "10000");
        assert_eq!(client.call_count("list_parts"), 1);
    }

    #[test]
    fn test_bind_parameter_restrictions() {
        let mut stmt = statement();
        let err = stmt
            .bind_parameter(1, ParameterDirection::Output, CDataType::Char, "x")
            .unwrap_err();
        assert_eq!(err.sql_state(), "HYC00");
        let err = stmt
            .bind_parameter(1, ParameterDirection::Input, CDataType::SLong, "1")
            .unwrap_err();
        assert_eq!(err.sql_state(), "HYC00");
        let err = stmt
            .bind_parameter(2, ParameterDirection::Input, CDataType::Char, "x")
            .unwrap_err();
        assert_eq!(err.sql_state(), "07009");

        let desc = stmt.describe_param(1).unwrap();
        assert_eq!(desc.sql_type, SqlType::Varchar);
        assert_eq!(desc.nullable, Nullability::NoNulls);
        assert_eq!(stmt.describe_param(2).unwrap_err().sql_state(), "07009");
    }

    #[test]
    fn test_failed_sub_fetch_adds_no_row() {
        let options = FetchOptions {
            fetch_metadata: true,
            fetch_parameters: true,
        };
        let (mut stmt, _client) =
            statement_with(resistors().fail("list_part_parameters"), options);
        let err = stmt
            .exec_direct("SELECT * FROM Resistors WHERE pk = 1")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(stmt.result_set().is_none());
        assert!(stmt.row_count().is_err());
    }

    #[test]
    fn test_catalog_functions() {
        let mut stmt = statement();
        stmt.tables().unwrap();
        assert_eq!(stmt.num_result_cols(), 5);
        assert_eq!(stmt.fetch().unwrap(), FetchOutcome::Row { truncated: false });
        assert_eq!(text(&stmt, 3), "Resistors");
        assert_eq!(text(&stmt, 4), "TABLE");
        assert_eq!(stmt.fetch().unwrap(), FetchOutcome::NoData);

        stmt.columns("Resistors").unwrap();
        assert_eq!(stmt.num_result_cols(), 18);
        assert_eq!(stmt.row_count().unwrap(), 2);
        stmt.fetch().unwrap();
        assert_eq!(text(&stmt, 4), "IPN");
    }

    #[test]
    fn test_col_attribute() {
        let mut stmt = statement();
        stmt.exec_direct("SELECT * FROM Resistors").unwrap();
        assert_eq!(
            stmt.col_attribute(4, ColumnAttribute::Name).unwrap(),
            AttributeValue::Text("pk".to_string())
        );
        assert_eq!(
            stmt.col_attribute(4, ColumnAttribute::Type).unwrap(),
            AttributeValue::Integer(-5)
        );
        assert_eq!(
            stmt.col_attribute(4, ColumnAttribute::DisplaySize).unwrap(),
            AttributeValue::Integer(20)
        );
        assert_eq!(
            stmt.col_attribute(2, ColumnAttribute::TypeName).unwrap(),
            AttributeValue::Text("INTEGER".to_string())
        );
        assert_eq!(
            stmt.col_attribute(1, ColumnAttribute::Nullable).unwrap(),
            AttributeValue::Integer(1)
        );
    }

    #[test]
    fn test_close_cursor_keeps_plan() {
        let mut stmt = statement();
        stmt.exec_direct("SELECT * FROM Resistors").unwrap();
        stmt.fetch().unwrap();
        stmt.close_cursor();
        assert_eq!(stmt.state(), StatementState::Prepared);
        assert!(stmt.result_set().is_none());
        stmt.execute().unwrap();
        assert_eq!(stmt.row_count().unwrap(), 2);
    }

    #[test]
    fn test_attributes_and_scroll() {
        let mut stmt = statement();
        stmt.set_attribute(StatementAttribute::RowArraySize(1)).unwrap();
        stmt.set_attribute(StatementAttribute::ParamsetSize(1)).unwrap();
        stmt.set_attribute(StatementAttribute::CursorType(CursorType::ForwardOnly))
            .unwrap();
        assert_eq!(
            stmt.set_attribute(StatementAttribute::RowArraySize(10))
                .unwrap_err()
                .sql_state(),
            "HYC00"
        );
        assert!(stmt
            .set_attribute(StatementAttribute::CursorType(CursorType::Static))
            .is_err());

        stmt.exec_direct("SELECT * FROM Resistors").unwrap();
        assert!(stmt.fetch_scroll(FetchOrientation::First).is_err());
        assert_eq!(
            stmt.fetch_scroll(FetchOrientation::Next).unwrap(),
            FetchOutcome::Row { truncated: false }
        );
    }

    #[test]
    fn test_null_marshals_to_null_indicator() {
        let client = MockClient::new()
            .category(7, "Resistors")
            .part(7, json!({"pk": 1, "note": "x"}))
            .part(7, json!({"pk": 2}));
        let (mut stmt, _) = statement_with(client, FetchOptions::default());
        stmt.exec_direct("SELECT * FROM Resistors").unwrap();
        stmt.fetch().unwrap();
        stmt.fetch().unwrap();
        let mut buf = [0u8; 8];
        for target in [
            CDataType::Char,
            CDataType::WChar,
            CDataType::SLong,
            CDataType::SBigInt,
            CDataType::Double,
        ] {
            assert_eq!(stmt.get_data(1, target, &mut buf).unwrap(), Indicator::Null);
        }
        assert_eq!(
            stmt.result_set().unwrap().row(1).unwrap()[0],
            FieldValue::Null
        );
    }
}
