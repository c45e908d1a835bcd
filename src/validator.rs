//! Data validation against overlaid schemas.
//!
//! The schema is exported with [`to_json_schema`] and checked by the
//! `jsonschema` validator, so every failure comes back as a path plus message.

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, ValidationError};
use serde_json::Value;

use crate::error::{SchemaError, ValidateError};
use crate::interchange::to_json_schema;
use crate::types::Schema;

/// Validate `data` against a schema.
///
/// # Errors
///
/// Returns `ValidateError::Invalid` listing every failure if `data` does not
/// match, or `ValidateError::InvalidSchema` if the exported schema does not
/// compile.
pub fn validate(schema: &Schema, data: &Value) -> Result<(), ValidateError> {
    validate_against_json_schema(&to_json_schema(schema), data)
}

/// Validate `data` against a JSON Schema document.
///
/// Use this with a schema exported once through [`to_json_schema`] when the
/// same schema checks many payloads.
pub fn validate_against_json_schema(schema: &Value, data: &Value) -> Result<(), ValidateError> {
    let validator = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .should_validate_formats(true)
        .build(schema)
        .map_err(|e| ValidateError::InvalidSchema {
            message: e.to_string(),
        })?;

    let errors: Vec<SchemaError> = validator
        .iter_errors(data)
        .map(|e| SchemaError {
            path: error_path(&e),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}

/// JSON Pointer for an error; missing properties point at the property itself.
fn error_path(error: &ValidationError<'_>) -> String {
    let base = error.instance_path.to_string();
    match &error.kind {
        ValidationErrorKind::Required { property } => match property.as_str() {
            Some(name) => format!("{}/{}", base, name.replace('~', "~0").replace('/', "~1")),
            None => base,
        },
        _ => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SchemaNode;
    use serde_json::json;

    fn contact() -> Schema {
        Schema::object([
            ("name", Schema::string()),
            ("email", Schema::email().optional()),
            ("age", Schema::Integer.optional()),
        ])
    }

    #[test]
    fn validate_valid_payload() {
        let data = json!({ "name": "Ada", "age": 36 });
        assert!(validate(&contact(), &data).is_ok());
    }

    #[test]
    fn validate_missing_required_field() {
        let result = validate(&contact(), &json!({}));
        match result {
            Err(err @ ValidateError::Invalid { .. }) => assert_eq!(err.paths(), ["/name"]),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn validate_wrong_type() {
        let result = validate(&contact(), &json!({ "name": 42 }));
        match result {
            Err(err @ ValidateError::Invalid { .. }) => assert_eq!(err.paths(), ["/name"]),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn validate_integer_rejects_fraction() {
        let result = validate(&contact(), &json!({ "name": "Ada", "age": 1.5 }));
        assert!(matches!(result, Err(ValidateError::Invalid { .. })));
    }

    #[test]
    fn validate_email_format() {
        let bad = json!({ "name": "Ada", "email": "not-an-email" });
        assert!(matches!(
            validate(&contact(), &bad),
            Err(ValidateError::Invalid { .. })
        ));

        let good = json!({ "name": "Ada", "email": "ada@example.com" });
        assert!(validate(&contact(), &good).is_ok());
    }

    #[test]
    fn validate_collects_multiple_errors() {
        let schema = Schema::object([("a", Schema::Boolean), ("b", Schema::Number)]);
        match validate(&schema, &json!({})) {
            Err(ValidateError::Invalid { errors }) => assert_eq!(errors.len(), 2),
            other => panic!("expected 2 errors, got {other:?}"),
        }
    }

    #[test]
    fn validate_array_element_paths() {
        let schema = Schema::array(Schema::object([("name", Schema::string())]));
        let result = validate(&schema, &json!([{ "name": "x" }, {}]));
        match result {
            Err(err @ ValidateError::Invalid { .. }) => assert_eq!(err.paths(), ["/1/name"]),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn optional_fields_accept_absence() {
        let schema = Schema::object([("note", Schema::string().optional())]);
        assert!(schema.fields().unwrap().get("note").unwrap().is_optional());
        assert!(validate(&schema, &json!({})).is_ok());
    }

    #[test]
    fn any_accepts_everything() {
        let schema = Schema::object([("extra", Schema::Any)]);
        assert!(validate(&schema, &json!({ "extra": [1, "two", null] })).is_ok());
    }

    #[test]
    fn invalid_json_schema_is_reported() {
        let result = validate_against_json_schema(&json!({ "type": 12 }), &json!({}));
        assert!(matches!(result, Err(ValidateError::InvalidSchema { .. })));
    }
}
