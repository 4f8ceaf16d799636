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

//! Result set construction.
//!
//! The parts API declares no schema, so one is inferred from the flattened
//! records of each execute:
//!
//! - the columns are the union of all field names, sorted lexicographically
//! - a column's type comes from the first non-null value seen for it, in
//!   record order
//! - every column is reported nullable
//!
//! Rows are materialized against that column list; fields a record lacks
//! become [`FieldValue::Null`].

pub mod marshal;

pub use marshal::{marshal, CDataType, Indicator};

use crate::metadata::type_mapping::SqlType;
use crate::types::{FieldMap, FieldValue};
use std::collections::BTreeMap;

/// Whether a column may contain nulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nullability {
    NoNulls,
    Nullable,
}

impl Nullability {
    /// SQL_NO_NULLS (0) / SQL_NULLABLE (1).
    pub fn code(self) -> i16 {
        match self {
            Nullability::NoNulls => 0,
            Nullability::Nullable => 1,
        }
    }
}

/// Shape of one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub sql_type: SqlType,
    pub display_size: usize,
    pub nullable: Nullability,
    /// 1-based position in the result set.
    pub ordinal: u16,
}

impl ColumnDescriptor {
    /// Descriptor with the type's default display size. The ordinal is
    /// assigned when the descriptor is placed in a [`ResultSet`].
    pub fn new(name: impl Into<String>, sql_type: SqlType, nullable: Nullability) -> Self {
        Self {
            name: name.into(),
            sql_type,
            display_size: sql_type.display_size(),
            nullable,
            ordinal: 0,
        }
    }
}

/// One materialized row, aligned with [`ResultSet::columns`].
pub type Row = Vec<FieldValue>;

/// Columns plus rows produced by one execute or catalog call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Row>,
}

impl ResultSet {
    /// Infers the schema from flattened records and materializes them.
    pub fn infer(records: &[FieldMap]) -> Self {
        let mut types: BTreeMap<&str, Option<SqlType>> = BTreeMap::new();
        for record in records {
            for (name, value) in record {
                let slot = types.entry(name.as_str()).or_insert(None);
                if slot.is_none() && !value.is_null() {
                    *slot = Some(SqlType::infer(value));
                }
            }
        }

        let columns: Vec<ColumnDescriptor> = types
            .into_iter()
            .map(|(name, sql_type)| {
                ColumnDescriptor::new(
                    name,
                    sql_type.unwrap_or(SqlType::Varchar),
                    Nullability::Nullable,
                )
            })
            .collect();

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(&c.name).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Self::from_parts(columns, rows)
    }

    /// Result set with a fixed column list. Ordinals are assigned from the
    /// column order; rows shorter than the column list are padded with nulls.
    pub fn from_parts(mut columns: Vec<ColumnDescriptor>, mut rows: Vec<Row>) -> Self {
        for (i, column) in columns.iter_mut().enumerate() {
            column.ordinal = (i + 1) as u16;
        }
        for row in &mut rows {
            row.resize(columns.len(), FieldValue::Null);
        }
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Column by 1-based number.
    pub fn column(&self, number: u16) -> Option<&ColumnDescriptor> {
        (number as usize)
            .checked_sub(1)
            .and_then(|i| self.columns.get(i))
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
