// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use inventree_odbc::error::{Error, Result};
use inventree_odbc::types::{Category, JsonObject, ParameterTemplate, PartParameter};
use inventree_odbc::{ConnectParams, Database, MemoryProfileStore};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// In-memory parts catalog that records the calls made against it.
#[derive(Debug, Default)]
pub struct FakeInvenTree {
    categories: Vec<Category>,
    parts: Vec<(i64, JsonObject)>,
    metadata: HashMap<i64, JsonObject>,
    parameters: HashMap<i64, Vec<PartParameter>>,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeInvenTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, pk: i64, pathstring: &str) -> Self {
        self.categories.push(Category {
            pk,
            pathstring: pathstring.to_string(),
        });
        self
    }

    pub fn part(mut self, category: i64, body: Value) -> Self {
        if let Value::Object(map) = body {
            self.parts.push((category, map));
        }
        self
    }

    pub fn metadata(mut self, pk: i64, body: Value) -> Self {
        if let Value::Object(map) = body {
            self.metadata.insert(pk, map);
        }
        self
    }

    pub fn parameter(mut self, pk: i64, name: &str, data: &str) -> Self {
        self.parameters.entry(pk).or_default().push(PartParameter {
            template_detail: ParameterTemplate {
                name: name.to_string(),
            },
            data: Some(data.to_string()),
        });
        self
    }

    pub fn fail(&self, call: &'static str) {
        self.failing.lock().unwrap().insert(call);
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == call)
            .count()
    }

    fn record(&self, call: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(call) {
            return Err(Error::transport().message(format!("{} returned HTTP 503", call)));
        }
        Ok(())
    }
}

#[async_trait]
impl inventree_odbc::InvenTreeClient for FakeInvenTree {
    async fn authenticate(&self, _username: &str, _password: &str) -> Result<()> {
        self.record("authenticate")
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
            .ok_or_else(|| Error::transport().message("/api/part/ returned HTTP 404"))
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

/// A small electronics catalog: two categories, four parts.
pub fn catalog() -> FakeInvenTree {
    use serde_json::json;
    FakeInvenTree::new()
        .category(1, "Electronics")
        .category(7, "Electronics/Resistors")
        .part(7, json!({"pk": 10, "IPN": "R-001", "name": "10k", "b": 1, "a": "x"}))
        .part(7, json!({"pk": 11, "IPN": "R-002", "name": "22k", "a": "y", "c": true}))
        .part(7, json!({"pk": 12, "IPN": null, "name": "a\u{1F600}b"}))
        .part(1, json!({"pk": 20, "IPN": "E-001", "name": "Kit"}))
        .metadata(10, json!({"metadata": {"kicad": "Device:R"}}))
        .parameter(10, "Resistance", "10k")
        .parameter(10, "Tolerance", "1%")
}

/// Database with a `parts` DSN pointing at the fake server.
pub fn database(extra: &[(&str, &str)]) -> Database {
    let mut profiles = MemoryProfileStore::new()
        .with("parts", "server", "https://inventree.example.com")
        .with("parts", "apitoken", "inv-token");
    for (key, value) in extra {
        profiles.insert("parts", key, value);
    }
    Database::new(Arc::new(profiles))
}

pub fn params() -> ConnectParams {
    ConnectParams::dsn("parts")
}
