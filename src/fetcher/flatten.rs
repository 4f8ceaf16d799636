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

//! Flattening of nested JSON records into [`FieldMap`]s.
//!
//! Nested objects contribute dotted keys (`supplier.address.city`), arrays
//! are dropped and nulls are kept as [`FieldValue::Null`].

use crate::types::{FieldMap, FieldValue, JsonObject, PartParameter};
use serde_json::Value;

/// Prefix of the columns built from part parameters.
pub const PARAMETER_PREFIX: &str = "parameter.";

/// Flattens `object` into a new map.
pub fn flatten(object: &JsonObject) -> FieldMap {
    let mut fields = FieldMap::new();
    flatten_into(&mut fields, "", object);
    fields
}

/// Flattens `object` into `fields`, prefixing every key with `path.` when
/// `path` is non-empty. Existing keys are overwritten.
pub fn flatten_into(fields: &mut FieldMap, path: &str, object: &JsonObject) {
    for (key, value) in object {
        let key = if path.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", path, key)
        };

        match value {
            Value::Array(_) => {}
            Value::Object(nested) => flatten_into(fields, &key, nested),
            scalar => {
                if let Some(v) = FieldValue::from_json(scalar) {
                    fields.insert(key, v);
                }
            }
        }
    }
}

/// Adds one `parameter.<template name>` field per parameter. A repeated
/// template name keeps the last value.
pub fn merge_parameters(fields: &mut FieldMap, parameters: Vec<PartParameter>) {
    for parameter in parameters {
        fields.insert(
            format!("{}{}", PARAMETER_PREFIX, parameter.template_detail.name),
            FieldValue::from(parameter.data),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParameterTemplate;
    use serde_json::json;

    fn object(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_flatten_nested_objects() {
        let fields = flatten(&object(json!({
            "pk": 5,
            "name": "R 10k",
            "active": true,
            "category_detail": {"pk": 2, "path": {"root": "Passives"}},
        })));
        assert_eq!(fields.get("pk"), Some(&FieldValue::Int(5)));
        assert_eq!(fields.get("name"), Some(&FieldValue::from("R 10k")));
        assert_eq!(fields.get("active"), Some(&FieldValue::Bool(true)));
        assert_eq!(fields.get("category_detail.pk"), Some(&FieldValue::Int(2)));
        assert_eq!(
            fields.get("category_detail.path.root"),
            Some(&FieldValue::from("Passives"))
        );
        assert!(!fields.contains_key("category_detail"));
    }

    #[test]
    fn test_flatten_drops_arrays_keeps_nulls() {
        let fields = flatten(&object(json!({
            "tags": ["smd", "0603"],
            "notes": null,
            "nested": {"list": [1, 2], "value": 1.5},
        })));
        assert!(!fields.contains_key("tags"));
        assert!(!fields.contains_key("nested.list"));
        assert_eq!(fields.get("notes"), Some(&FieldValue::Null));
        assert_eq!(fields.get("nested.value"), Some(&FieldValue::Float(1.5)));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_flatten_into_with_prefix_overwrites() {
        let mut fields = FieldMap::new();
        fields.insert("meta.kicad".to_string(), FieldValue::from("old"));
        flatten_into(&mut fields, "meta", &object(json!({"kicad": "new"})));
        assert_eq!(fields.get("meta.kicad"), Some(&FieldValue::from("new")));
    }

    #[test]
    fn test_merge_parameters() {
        let mut fields = FieldMap::new();
        merge_parameters(
            &mut fields,
            vec![
                PartParameter {
                    template_detail: ParameterTemplate {
                        name: "Resistance".to_string(),
                    },
                    data: Some("10k".to_string()),
                },
                PartParameter {
                    template_detail: ParameterTemplate {
                        name: "Tolerance".to_string(),
                    },
                    data: None,
                },
            ],
        );
        assert_eq!(
            fields.get("parameter.Resistance"),
            Some(&FieldValue::from("10k"))
        );
        assert_eq!(fields.get("parameter.Tolerance"), Some(&FieldValue::Null));
    }
}
