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

//! Catalog metadata.
//!
//! ## Module Structure
//!
//! - `catalog`: category path string → id cache loaded on connect
//! - `builder`: result sets for the `tables` and `columns` catalog functions
//! - `type_mapping`: SQL type codes and sizes inferred from field values

pub mod builder;
pub mod catalog;
pub mod type_mapping;

// Re-export commonly used types
pub use builder::{build_columns, build_tables, FILTER_COLUMNS};
pub use catalog::CategoryMap;
pub use type_mapping::SqlType;
