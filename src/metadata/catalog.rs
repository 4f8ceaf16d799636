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

//! Category cache.
//!
//! Categories are exposed as tables named by their full path string. The
//! map is loaded once per connection and never refreshed; callers that need
//! newly created categories must reconnect.

use crate::types::Category;
use std::collections::{BTreeSet, HashMap};

/// Path string → category id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap {
    ids: HashMap<String, i64>,
}

impl CategoryMap {
    /// Builds the map from a category listing. A repeated path string keeps
    /// the last id seen.
    pub fn from_categories(categories: impl IntoIterator<Item = Category>) -> Self {
        Self {
            ids: categories
                .into_iter()
                .map(|c| (c.pathstring, c.pk))
                .collect(),
        }
    }

    /// Category id for a table name, matched exactly.
    pub fn resolve(&self, path: &str) -> Option<i64> {
        self.ids.get(path).copied()
    }

    /// All table names in sorted order.
    pub fn all_path_strings(&self) -> BTreeSet<String> {
        self.ids.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(pk: i64, path: &str) -> Category {
        Category {
            pk,
            pathstring: path.to_string(),
        }
    }

    #[test]
    fn test_resolve() {
        let map = CategoryMap::from_categories(vec![
            category(1, "Electronics"),
            category(2, "Electronics/Resistors"),
        ]);
        assert_eq!(map.resolve("Electronics/Resistors"), Some(2));
        assert_eq!(map.resolve("electronics/resistors"), None);
        assert_eq!(map.resolve("Capacitors"), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_all_path_strings_sorted() {
        let map = CategoryMap::from_categories(vec![
            category(3, "Mechanical"),
            category(1, "Electronics"),
            category(2, "Electronics/Resistors"),
        ]);
        let paths: Vec<_> = map.all_path_strings().into_iter().collect();
        assert_eq!(
            paths,
            vec!["Electronics", "Electronics/Resistors", "Mechanical"]
        );
    }

    #[test]
    fn test_empty() {
        let map = CategoryMap::default();
        assert!(map.is_empty());
        assert!(map.all_path_strings().is_empty());
    }
}
