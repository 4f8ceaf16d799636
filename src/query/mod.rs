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

//! Query plans for the supported SQL subset.
//!
//! Only two statement shapes are accepted:
//!
//! ```sql
//! SELECT * FROM <table>
//! SELECT * FROM <table> WHERE <column> = <literal>
//! ```
//!
//! `<table>` is a category path string. `<column>` must be `pk` or `IPN`;
//! that check is deferred to execute so that a statement can be prepared
//! against any column name.

pub mod parser;

pub use parser::parse;

use crate::error::{Error, Result};

/// Parsed form of one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub table: String,
    pub predicate: Option<Predicate>,
}

/// Single equality filter `column = value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: String,
    pub value: PredicateValue,
}

/// Right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateValue {
    Literal(String),
    /// `?` marker, filled from input parameter 1 at execute.
    Parameter,
}

/// Columns a predicate may filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterColumn {
    /// Numeric primary key.
    Pk,
    /// User-assigned internal part number.
    Ipn,
}

impl QueryPlan {
    /// Number of `?` markers in the statement.
    pub fn parameter_count(&self) -> usize {
        match &self.predicate {
            Some(Predicate {
                value: PredicateValue::Parameter,
                ..
            }) => 1,
            _ => 0,
        }
    }
}

impl Predicate {
    /// Resolves the column name, case-insensitively.
    pub fn filter_column(&self) -> Result<FilterColumn> {
        if self.column.eq_ignore_ascii_case("pk") {
            Ok(FilterColumn::Pk)
        } else if self.column.eq_ignore_ascii_case("ipn") {
            Ok(FilterColumn::Ipn)
        } else {
            Err(Error::catalog()
                .sqlstate("42S22")
                .message(format!("invalid filter column: {}", self.column)))
        }
    }
}
