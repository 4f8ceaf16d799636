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

//! REST payload types.
//!
//! These types map directly to the JSON structures returned by the InvenTree
//! parts API. Item records are kept as untyped JSON objects because the
//! server does not declare a schema; they are flattened into
//! [`FieldMap`](crate::types::FieldMap)s by the fetcher.

use serde::Deserialize;

/// A decoded JSON object.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Response from `/api/user/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Entry of `/api/part/category/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub pk: i64,
    pub pathstring: String,
}

/// Entry of `/api/part/parameter/?part=<pk>`.
#[derive(Debug, Clone, Deserialize)]
pub struct PartParameter {
    pub template_detail: ParameterTemplate,
    #[serde(default)]
    pub data: Option<String>,
}

/// Template block nested in a [`PartParameter`].
#[derive(Debug, Clone, Deserialize)]
pub struct ParameterTemplate {
    pub name: String,
}
