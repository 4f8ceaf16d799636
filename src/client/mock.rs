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

//! In-memory `InvenTreeClient` used by unit tests.

use crate::client::InvenTreeClient;
use crate::error::{Error, Result};
use crate::types::{Category, JsonObject, ParameterTemplate, PartParameter};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Serves a fixed catalog and records every call by name
/// (`authenticate`, `list_categories`, `list_parts`, `get_part`,
/// `get_part_metadata`, `list_part_parameters`).
#[derive(Debug, Default)]
pub(crate) struct MockClient {
    categories: Vec<Category>,
    parts: Vec<(i64, JsonObject)>,
    metadata: HashMap<i64, JsonObject>,
    parameters: HashMap<i64, Vec<PartParameter>>,
    credentials: Option<(String, String)>,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<Vec<String>>,
}

impl MockClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn category(mut self, pk: i64, pathstring: &str) -> Self {
        self.categories.push(Category {
            pk,
            pathstring: pathstring.to_string(),
        });
        self
    }

    /// Adds a part to `category`; `body` must be a JSON object.
    pub(crate) fn part(mut self, category: i64, body: Value) -> Self {
        if let Value::Object(map) = body {
            self.parts.push((category, map));
        }
        self
    }

    pub(crate) fn metadata(mut self, pk: i64, body: Value) -> Self {
        if let Value::Object(map) = body {
            self.metadata.insert(pk, map);
        }
        self
    }

    pub(crate) fn parameter(mut self, pk: i64, name: &str, data: &str) -> Self {
        self.parameters.entry(pk).or_default().push(PartParameter {
            template_detail: ParameterTemplate {
                name: name.to_string(),
            },
            data: Some(data.to_string()),
        });
        self
    }

    /// Username and password accepted by `authenticate`.
    pub(crate) fn credentials(mut self, username: &str, password: &str) -> Self {
        self.credentials = Some((username.to_string(), password.to_string()));
        self
    }

    /// Makes every later call named `call` fail with a transport error.
    pub(crate) fn fail(self, call: &'static str) -> Self {
        self.set_failing(call);
        self
    }

    pub(crate) fn set_failing(&self, call: &'static str) {
        self.failing.lock().unwrap().insert(call);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self, call: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == call)
            .count()
    }

    fn record(&self, call: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(call.to_string());
        if self.failing.lock().unwrap().contains(call) {
            return Err(Error::transport().message(format!("{} returned HTTP 500", call)));
        }
        Ok(())
    }

    fn not_found(what: &str) -> Error {
        Error::transport().message(format!("{} returned HTTP 404", what))
    }
}

#[async_trait]
impl InvenTreeClient for MockClient {
    async fn authenticate(&self, username: &str, password: &str) -> Result<()> {
        self.record("authenticate")?;
        match &self.credentials {
            Some((u, p)) if u == username && p == password => Ok(()),
            _ => Err(Error::authentication().message("Failed to fetch API Token")),
        }
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.record("list_categories")?;
        Ok(self.categories.clone())
    }

    async fn list_parts(&self, category_id: i64) -> Result<Vec<JsonObject>> {
        self.record("list_parts")?;
        Ok(self
            .parts
            .iter()
            .filter(|(c, _)| *c == category_id)
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn get_part(&self, pk: i64) -> Result<JsonObject> {
        self.record("get_part")?;
        self.parts
            .iter()
            .map(|(_, p)| p)
            .find(|p| p.get("pk").and_then(Value::as_i64) == Some(pk))
            .cloned()
            .ok_or_else(|| Self::not_found(&format!("/api/part/{}/", pk)))
    }

    async fn get_part_metadata(&self, pk: i64) -> Result<JsonObject> {
        self.record("get_part_metadata")?;
        Ok(self.metadata.get(&pk).cloned().unwrap_or_default())
    }

    async fn list_part_parameters(&self, pk: i64) -> Result<Vec<PartParameter>> {
        self.record("list_part_parameters")?;
        Ok(self.parameters.get(&pk).cloned().unwrap_or_default())
    }
}
