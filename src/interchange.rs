//! Conversion between interchange (OpenAPI / JSON Schema) descriptions and [`Schema`].
//!
//! Only the structural keywords are understood: `type`, `format: email`,
//! `items`, `properties`, and `required`. Constraints such as `minLength`,
//! `pattern`, or `enum` are dropped.

use serde_json::{json, Map, Value};

use crate::types::{Fields, Schema, SchemaNode, StringFormat};

/// Convert an interchange node into a schema.
///
/// `property_key` is the name the node is stored under in its parent and
/// `required` is the parent's `required` list. A leaf whose key is not listed
/// comes back optional; an array whose key is not listed gets an optional
/// element instead. Object properties missing from the object's own
/// `required` list are wrapped optional. Unknown or missing `type` keywords
/// convert to [`Schema::Any`], including a `$ref` that was never inlined.
///
/// For a top-level document pass `""` and an empty list.
pub fn from_interchange(node: &Value, property_key: &str, required: &[String]) -> Schema {
    let is_required = required.iter().any(|name| name == property_key);
    let leaf = |schema: Schema| {
        if is_required {
            schema
        } else {
            schema.optional()
        }
    };

    match node.get("type").and_then(Value::as_str) {
        Some("string") => {
            let format = node
                .get("format")
                .and_then(Value::as_str)
                .and_then(StringFormat::parse);
            leaf(Schema::String { format })
        }
        Some("number") => leaf(Schema::Number),
        Some("integer") => leaf(Schema::Integer),
        Some("boolean") => leaf(Schema::Boolean),
        Some("array") => {
            let items = node
                .get("items")
                .map(|items| from_interchange(items, property_key, required))
                .unwrap_or(Schema::Any);
            if is_required {
                Schema::array(items)
            } else {
                Schema::array(items.optional())
            }
        }
        Some("object") => {
            let object_required = required_list(node);
            let fields: Fields<Schema> = node
                .get("properties")
                .and_then(Value::as_object)
                .map(|properties| {
                    properties
                        .iter()
                        .map(|(key, value)| {
                            let field = from_interchange(value, key, &object_required);
                            if object_required.contains(key) {
                                (key.as_str(), field)
                            } else {
                                (key.as_str(), field.optional())
                            }
                        })
                        .collect()
                })
                .unwrap_or_default();
            Schema::Object(fields)
        }
        _ => {
            if let Some(reference) = node.get("$ref").and_then(Value::as_str) {
                tracing::warn!(
                    reference,
                    field = property_key,
                    "$ref left in place converts to any"
                );
            }
            Schema::Any
        }
    }
}

/// Convert a schema into its interchange description.
///
/// Lossy: requiredness is not represented, and optional or `Any` nodes
/// convert to `{}`. Use [`to_json_schema`] when the result must validate the
/// same data.
pub fn to_interchange(schema: &Schema) -> Value {
    match schema {
        Schema::String { format: None } => json!({ "type": "string" }),
        Schema::String {
            format: Some(format),
        } => json!({ "type": "string", "format": format.as_str() }),
        Schema::Number => json!({ "type": "number" }),
        Schema::Integer => json!({ "type": "integer" }),
        Schema::Boolean => json!({ "type": "boolean" }),
        Schema::Array(element) => json!({ "type": "array", "items": to_interchange(element) }),
        Schema::Object(fields) => {
            let properties: Map<String, Value> = fields
                .iter()
                .map(|(key, field)| (key.to_string(), to_interchange(field)))
                .collect();
            json!({ "type": "object", "properties": properties })
        }
        Schema::Optional(_) | Schema::Any => json!({}),
    }
}

/// Convert a schema into a JSON Schema that accepts exactly what it accepts.
///
/// Objects list their non-optional fields under `required`.
pub fn to_json_schema(schema: &Schema) -> Value {
    match schema {
        Schema::Optional(inner) => to_json_schema(inner),
        Schema::Any => json!({}),
        Schema::Array(element) => json!({ "type": "array", "items": to_json_schema(element) }),
        Schema::Object(fields) => {
            let mut properties = Map::new();
            let mut required = Vec::new();
            for (key, field) in fields.iter() {
                if !field.is_optional() {
                    required.push(Value::String(key.to_string()));
                }
                properties.insert(key.to_string(), to_json_schema(field));
            }

            let mut result = Map::new();
            result.insert("type".to_string(), json!("object"));
            result.insert("properties".to_string(), Value::Object(properties));
            if !required.is_empty() {
                result.insert("required".to_string(), Value::Array(required));
            }
            Value::Object(result)
        }
        leaf => to_interchange(leaf),
    }
}

fn required_list(node: &Value) -> Vec<String> {
    node.get("required")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
