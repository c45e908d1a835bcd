//! In-place requirement by dotted path.
//!
//! Unlike [`overlay`](crate::overlay), this edits the caller's schema and
//! cannot be re-applied in layers with nested configs; paths are flat strings
//! such as `"address.city"`. Array elements share the path of their array.

use crate::config::PathRequirements;
use crate::types::{Fields, Schema, SchemaNode};

/// Unwrap every field of `schema` whose dotted path is marked required.
///
/// Descends into nested objects (through optional wrappers) and into arrays
/// whose element is an object. A non-object top-level schema is logged and
/// left untouched.
pub fn mutate_required(schema: &mut Schema, requirements: &PathRequirements) {
    match schema {
        Schema::Object(fields) => require_paths(fields, requirements, ""),
        other => {
            tracing::error!(
                kind = other.kind_name(),
                "the given schema must be an object schema"
            );
        }
    }
}

fn require_paths(fields: &mut Fields<Schema>, requirements: &PathRequirements, prefix: &str) {
    for (key, field) in fields.iter_mut() {
        let path = if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", prefix, key)
        };

        if requirements.is_required(&path) {
            field.make_required();
        }

        match field.unwrap_optional_mut() {
            Schema::Object(nested) => require_paths(nested, requirements, &path),
            Schema::Array(element) => {
                if let Schema::Object(nested) = element.as_mut() {
                    require_paths(nested, requirements, &path);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::validate;
    use serde_json::json;

    fn person() -> Schema {
        Schema::object([
            ("name", Schema::string().optional()),
            ("age", Schema::Number.optional()),
            (
                "address",
                Schema::object([
                    ("street", Schema::string().optional()),
                    ("city", Schema::string().optional()),
                ])
                .optional(),
            ),
        ])
    }

    #[test]
    fn mutates_the_given_schema() {
        let mut schema = person();
        let requirements = PathRequirements::new()
            .require("name")
            .require("address.city");

        mutate_required(&mut schema, &requirements);

        assert_eq!(schema.at_path("name"), Some(&Schema::string()));
        assert_eq!(schema.at_path("address.city"), Some(&Schema::string()));
        // parent of a required path is not itself required
        assert!(schema.at_path("address").unwrap().is_optional());

        let complete = json!({ "name": "John Doe", "address": { "city": "New York" } });
        assert!(validate(&schema, &complete).is_ok());
        assert!(validate(&schema, &json!({ "address": { "city": "New York" } })).is_err());
        assert!(validate(&schema, &json!({ "name": "John Doe", "address": {} })).is_err());
    }

    #[test]
    fn array_elements_share_the_array_path() {
        let mut schema = Schema::object([(
            "items",
            Schema::array(Schema::object([("sku", Schema::string().optional())])).optional(),
        )]);

        mutate_required(&mut schema, &["items.sku"].into_iter().collect());

        assert_eq!(schema.at_path("items.sku"), Some(&Schema::string()));
        assert!(schema.at_path("items").unwrap().is_optional());
    }

    #[test]
    fn optional_array_elements_are_not_entered() {
        let element = Schema::object([("sku", Schema::string().optional())]).optional();
        let mut schema = Schema::object([("items", Schema::array(element))]);
        let before = schema.clone();

        mutate_required(&mut schema, &["items.sku"].into_iter().collect());
        assert_eq!(schema, before);
    }

    #[test]
    fn false_entries_do_nothing() {
        let mut schema = person();
        let requirements: PathRequirements =
            serde_json::from_value(json!({ "requiredProperties": { "name": false } })).unwrap();

        mutate_required(&mut schema, &requirements);
        assert_eq!(schema, person());
    }

    #[test]
    fn non_object_schema_is_untouched() {
        let mut schema = Schema::array(person());
        mutate_required(&mut schema, &["name"].into_iter().collect());
        assert_eq!(schema, Schema::array(person()));
    }
}
