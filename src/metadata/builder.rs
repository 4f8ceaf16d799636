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

//! Builders for the catalog function result sets.
//!
//! `tables` lists one row per category path string; `columns` reports the
//! two columns a WHERE clause may filter on. Both follow the standard
//! catalog result layouts so generic tooling can consume them.

use crate::metadata::catalog::CategoryMap;
use crate::metadata::type_mapping::SqlType;
use crate::result::{ColumnDescriptor, Nullability, ResultSet, Row};
use crate::types::FieldValue;

/// Columns a WHERE clause may name, in the order `columns` reports them.
pub const FILTER_COLUMNS: [&str; 2] = ["IPN", "pk"];

fn column(name: &str, sql_type: SqlType, nullable: Nullability) -> ColumnDescriptor {
    ColumnDescriptor::new(name, sql_type, nullable)
}

/// Result set for the `tables` catalog function.
pub fn build_tables(categories: &CategoryMap) -> ResultSet {
    use Nullability::Nullable;

    let columns = vec![
        column("TABLE_CAT", SqlType::Varchar, Nullable),
        column("TABLE_SCHEM", SqlType::Varchar, Nullable),
        column("TABLE_NAME", SqlType::Varchar, Nullable),
        column("TABLE_TYPE", SqlType::Varchar, Nullable),
        column("REMARKS", SqlType::Varchar, Nullable),
    ];

    let rows = categories
        .all_path_strings()
        .into_iter()
        .map(|name| {
            vec![
                FieldValue::Null,
                FieldValue::Null,
                FieldValue::Text(name),
                FieldValue::from("TABLE"),
                FieldValue::Null,
            ]
        })
        .collect();

    ResultSet::from_parts(columns, rows)
}

/// Result set for the `columns` catalog function on `table`.
pub fn build_columns(table: &str) -> ResultSet {
    use Nullability::{NoNulls, Nullable};

    let columns = vec![
        column("TABLE_CAT", SqlType::Varchar, Nullable),
        column("TABLE_SCHEM", SqlType::Varchar, Nullable),
        column("TABLE_NAME", SqlType::Varchar, NoNulls),
        column("COLUMN_NAME", SqlType::Varchar, NoNulls),
        column("DATA_TYPE", SqlType::SmallInt, NoNulls),
        column("TYPE_NAME", SqlType::Varchar, NoNulls),
        column("COLUMN_SIZE", SqlType::Integer, Nullable),
        column("BUFFER_LENGTH", SqlType::Integer, Nullable),
        column("DECIMAL_DIGITS", SqlType::SmallInt, Nullable),
        column("NUM_PREC_RADIX", SqlType::SmallInt, Nullable),
        column("NULLABLE", SqlType::SmallInt, NoNulls),
        column("REMARKS", SqlType::Varchar, Nullable),
        column("COLUMN_DEF", SqlType::Varchar, Nullable),
        column("SQL_DATA_TYPE", SqlType::SmallInt, NoNulls),
        column("SQL_DATETIME_SUB", SqlType::SmallInt, Nullable),
        column("CHAR_OCTET_LENGTH", SqlType::Integer, Nullable),
        column("ORDINAL_POSITION", SqlType::Integer, NoNulls),
        column("IS_NULLABLE", SqlType::Varchar, NoNulls),
    ];

    let rows = FILTER_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, name)| filter_column_row(table, name, i as i64 + 1))
        .collect();

    ResultSet::from_parts(columns, rows)
}

fn filter_column_row(table: &str, name: &str, ordinal: i64) -> Row {
    let varchar = SqlType::Varchar;
    let size = varchar.display_size() as i64;
    vec![
        FieldValue::Null,
        FieldValue::Null,
        FieldValue::from(table),
        FieldValue::from(name),
        FieldValue::Int(varchar.code().into()),
        FieldValue::from(varchar.type_name()),
        FieldValue::Int(size),
        FieldValue::Int(size),
        FieldValue::Null,
        FieldValue::Null,
        FieldValue::Int(Nullability::NoNulls.code().into()),
        FieldValue::Null,
        FieldValue::Null,
        FieldValue::Int(varchar.code().into()),
        FieldValue::Null,
        FieldValue::Int(size),
        FieldValue::Int(ordinal),
        FieldValue::from("NO"),
    ]
}
