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

//! FieldValue → SQL type mapping.
//!
//! Maps the dynamically-typed values decoded from the parts API to SQL type
//! codes and display sizes reported by `describe_col`.

use crate::types::FieldValue;

/// SQL data types a result column can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    BigInt,
    Double,
    Integer,
    SmallInt,
    Varchar,
}

impl SqlType {
    /// Numeric SQL type code.
    pub fn code(self) -> i16 {
        match self {
            SqlType::BigInt => -5,  // SQL_BIGINT
            SqlType::Double => 8,   // SQL_DOUBLE
            SqlType::Integer => 4,  // SQL_INTEGER
            SqlType::SmallInt => 5, // SQL_SMALLINT
            SqlType::Varchar => 12, // SQL_VARCHAR
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            SqlType::BigInt => "BIGINT",
            SqlType::Double => "DOUBLE",
            SqlType::Integer => "INTEGER",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Varchar => "VARCHAR",
        }
    }

    /// Column size reported for inferred columns.
    pub fn display_size(self) -> usize {
        match self {
            SqlType::BigInt => 20,
            SqlType::Double => 54,
            SqlType::Integer => 10,
            SqlType::SmallInt => 5,
            SqlType::Varchar => 255,
        }
    }

    /// Type of a column whose first non-null value is `value`.
    ///
    /// Booleans surface as INTEGER (1/0); nulls carry no type information
    /// and map to VARCHAR.
    pub fn infer(value: &FieldValue) -> SqlType {
        match value {
            FieldValue::Int(_) => SqlType::BigInt,
            FieldValue::Float(_) => SqlType::Double,
            FieldValue::Bool(_) => SqlType::Integer,
            FieldValue::Text(_) | FieldValue::Null => SqlType::Varchar,
        }
    }
}
