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

//! Part fetcher: turns a resolved filter into flattened part records.
//!
//! | Filter | Requests |
//! |--------|----------|
//! | none | parts of the table's category |
//! | `pk = n` | part `n`, plus its metadata and parameters when enabled |
//! | `IPN = s` | parts of the category on first use (fills the IPN cache), then as `pk` |
//!
//! The per-part sub-requests run concurrently and fail together: if any of
//! them fails no record is returned.

pub mod flatten;

pub use flatten::{flatten, flatten_into, merge_parameters, PARAMETER_PREFIX};

use crate::client::InvenTreeClient;
use crate::error::{Error, Result};
use crate::metadata::CategoryMap;
use crate::query::FilterColumn;
use crate::types::{FieldMap, JsonObject};
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Sub-resources joined into a single-part fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub fetch_metadata: bool,
    pub fetch_parameters: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            fetch_metadata: false,
            fetch_parameters: true,
        }
    }
}

/// IPN → pk cache shared by the statements of one connection.
///
/// Filled from category listings and never evicted or refreshed.
#[derive(Debug, Default)]
pub struct IdentifierCache {
    pks: DashMap<String, i64>,
    populated: AtomicBool,
}

impl IdentifierCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once any listing has been absorbed.
    pub fn is_populated(&self) -> bool {
        self.populated.load(Ordering::Acquire)
    }

    pub fn lookup(&self, ipn: &str) -> Option<i64> {
        self.pks.get(ipn).map(|pk| *pk)
    }

    pub fn len(&self) -> usize {
        self.pks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pks.is_empty()
    }

    /// Records the IPN of every part in a listing. Parts without an IPN
    /// (absent, null, empty or not text) are skipped.
    pub fn absorb(&self, parts: &[JsonObject]) -> Result<()> {
        for part in parts {
            let ipn = match part.get("IPN") {
                Some(Value::String(ipn)) if !ipn.is_empty() => ipn,
                _ => continue,
            };
            let pk = part.get("pk").and_then(Value::as_i64).ok_or_else(|| {
                Error::catalog().sqlstate("HY000").message(format!(
                    "'pk' is not an integer: {}",
                    part.get("pk").unwrap_or(&Value::Null)
                ))
            })?;
            self.pks.insert(ipn.clone(), pk);
        }
        self.populated.store(true, Ordering::Release);
        Ok(())
    }
}

/// Executes query filters against the parts API.
#[derive(Debug, Clone)]
pub struct PartFetcher {
    client: Arc<dyn InvenTreeClient>,
    categories: Arc<CategoryMap>,
    identifiers: Arc<IdentifierCache>,
    options: FetchOptions,
}

impl PartFetcher {
    pub fn new(
        client: Arc<dyn InvenTreeClient>,
        categories: Arc<CategoryMap>,
        identifiers: Arc<IdentifierCache>,
        options: FetchOptions,
    ) -> Self {
        Self {
            client,
            categories,
            identifiers,
            options,
        }
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    pub fn identifiers(&self) -> &IdentifierCache {
        &self.identifiers
    }

    pub fn options(&self) -> FetchOptions {
        self.options
    }

    /// Fetches the records of `table`, optionally filtered by
    /// `column = value`.
    pub async fn fetch(
        &self,
        table: &str,
        filter: Option<(FilterColumn, &str)>,
    ) -> Result<Vec<FieldMap>> {
        match filter {
            None => {
                let parts = self.list_table(table).await?;
                Ok(parts.iter().map(flatten).collect())
            }
            Some((FilterColumn::Pk, value)) => {
                let pk = parse_pk(value)?;
                Ok(vec![self.fetch_one(pk).await?])
            }
            Some((FilterColumn::Ipn, ipn)) => {
                if !self.identifiers.is_populated() {
                    self.list_table(table).await?;
                }
                match self.identifiers.lookup(ipn) {
                    Some(pk) => Ok(vec![self.fetch_one(pk).await?]),
                    None => {
                        debug!("IPN {:?} not found, returning no rows", ipn);
                        Ok(Vec::new())
                    }
                }
            }
        }
    }

    /// Lists the parts of a category and feeds them to the IPN cache.
    async fn list_table(&self, table: &str) -> Result<Vec<JsonObject>> {
        let category = self.categories.resolve(table).ok_or_else(|| {
            Error::catalog().message(format!("Category does not exist in InvenTree: {}", table))
        })?;
        debug!("Listing parts of category {} ({})", table, category);
        let parts = self.client.list_parts(category).await?;
        self.identifiers.absorb(&parts)?;
        debug!("Fetched {} parts", parts.len());
        Ok(parts)
    }

    /// Fetches one part with its enabled sub-resources concurrently.
    async fn fetch_one(&self, pk: i64) -> Result<FieldMap> {
        let client = self.client.as_ref();
        let options = self.options;
        debug!(
            "Fetching part {} (metadata: {}, parameters: {})",
            pk, options.fetch_metadata, options.fetch_parameters
        );

        let (part, metadata, parameters) = tokio::try_join!(
            client.get_part(pk),
            async {
                if options.fetch_metadata {
                    client.get_part_metadata(pk).await.map(Some)
                } else {
                    Ok(None)
                }
            },
            async {
                if options.fetch_parameters {
                    client.list_part_parameters(pk).await.map(Some)
                } else {
                    Ok(None)
                }
            },
        )?;

        let mut fields = flatten(&part);
        if let Some(metadata) = metadata {
            flatten_into(&mut fields, "", &metadata);
        }
        if let Some(parameters) = parameters {
            merge_parameters(&mut fields, parameters);
        }
        Ok(fields)
    }
}

fn parse_pk(value: &str) -> Result<i64> {
    value.trim().parse().map_err(|_| {
        Error::invalid_argument()
            .sqlstate("22018")
            .message(format!("invalid value for pk: {}", value))
    })
}
