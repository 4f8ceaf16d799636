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

//! Client implementations for communicating with the InvenTree server.
//!
//! This module provides:
//! - `InvenTreeClient` trait: Abstract interface for the parts catalog backend
//! - `InvenTreeHttpClient`: Low-level authenticated HTTP client
//! - `RestClient`: Implementation using the InvenTree REST API

pub mod http;
#[cfg(test)]
pub(crate) mod mock;
pub mod rest;

use crate::error::Result;
use crate::types::{Category, JsonObject, PartParameter};
use async_trait::async_trait;

pub use http::{HttpClientConfig, InvenTreeHttpClient};
pub use rest::RestClient;

/// Abstract interface for the remote parts catalog.
///
/// Every method issues exactly one request; none of them retry. Any non-2xx
/// response or transport failure is returned as an error.
#[async_trait]
pub trait InvenTreeClient: Send + Sync + std::fmt::Debug {
    // --- Authentication ---

    /// Exchange username and password for an API token and keep it for
    /// subsequent requests.
    async fn authenticate(&self, username: &str, password: &str) -> Result<()>;

    // --- Categories ---

    /// Full category listing.
    async fn list_categories(&self) -> Result<Vec<Category>>;

    // --- Parts ---

    /// All parts in one category.
    async fn list_parts(&self, category_id: i64) -> Result<Vec<JsonObject>>;

    /// A single part by primary key.
    async fn get_part(&self, pk: i64) -> Result<JsonObject>;

    /// The metadata document attached to a part.
    async fn get_part_metadata(&self, pk: i64) -> Result<JsonObject>;

    /// Parameter values attached to a part.
    async fn list_part_parameters(&self, pk: i64) -> Result<Vec<PartParameter>>;
}
