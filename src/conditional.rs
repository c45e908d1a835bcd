//! Conditional requirements evaluated against the data being validated.
//!
//! Config entries written as predicates (`Config::when`) or `requiredIf`
//! wrappers (`Config::required_if`) are evaluated against a data value, and
//! fields whose condition holds become required. Only the top level of an
//! object schema is considered.

use serde_json::Value;

use crate::config::Config;
use crate::error::{OverlayError, ValidateError};
use crate::overlay::overlay;
use crate::types::{Fields, Schema, SchemaNode};
use crate::validator::validate;

/// Unwrap every top-level field whose condition holds for `data`.
///
/// A schema that is not an object, or a config that is not a mapping, is
/// returned unchanged. Static `true` entries and nested mappings are ignored
/// here; see [`overlay`] for those.
pub fn apply_conditional<S: SchemaNode>(schema: &S, config: &Config, data: &Value) -> S {
    let (Some(fields), Some(entries)) = (schema.fields(), config.as_nested()) else {
        return schema.clone();
    };

    let updated: Fields<S> = fields
        .iter()
        .map(|(key, field)| match entries.get(key).and_then(Config::predicate) {
            Some(condition) if condition(data) => {
                tracing::debug!(field = key, "conditional requirement holds");
                (key, field.unwrap_optional().clone())
            }
            _ => (key, field.clone()),
        })
        .collect();
    S::make_object(updated)
}

/// Deferred conditional overlay bound to one data value.
///
/// ```
/// use schema_overlay::{Config, ConditionalTransformer, Schema};
/// use serde_json::json;
///
/// let schema = Schema::object([
///     ("email", Schema::email().optional()),
///     ("age", Schema::Integer),
///     ("parentContactNumber", Schema::string().optional()),
/// ]);
/// let config = Config::new().require("email").field(
///     "parentContactNumber",
///     Config::required_if(|d| d["age"].as_i64().is_some_and(|age| age < 18)),
/// );
///
/// let data = json!({ "email": "kid@example.com", "age": 17 });
/// let outcome = ConditionalTransformer::new(data).apply(&schema, &config).unwrap();
///
/// assert!(outcome.static_config.get("email").is_some());
/// assert!(outcome.run().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ConditionalTransformer {
    data: Value,
}

impl ConditionalTransformer {
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Overlay the static `true` entries of `config`, then apply its
    /// conditional entries against the bound data.
    ///
    /// # Errors
    ///
    /// Returns `OverlayError::InvalidSchemaKind` under the same conditions as
    /// [`overlay`].
    pub fn apply(
        &self,
        schema: &Schema,
        config: &Config,
    ) -> Result<ConditionalOverlay, OverlayError> {
        let static_config = config.static_subset();
        let overlaid = overlay(schema, &static_config)?;
        let schema = apply_conditional(&overlaid, config, &self.data);

        Ok(ConditionalOverlay {
            schema,
            static_config,
            data: self.data.clone(),
        })
    }
}

/// Result of [`ConditionalTransformer::apply`].
#[derive(Debug, Clone)]
pub struct ConditionalOverlay {
    /// Schema with static and satisfied conditional requirements applied.
    pub schema: Schema,
    /// The entries of the config that were exactly `true`.
    pub static_config: Config,
    data: Value,
}

impl ConditionalOverlay {
    /// Validate the bound data against [`ConditionalOverlay::schema`].
    ///
    /// # Errors
    ///
    /// Returns the validator's `ValidateError` on mismatch.
    pub fn run(&self) -> Result<(), ValidateError> {
        validate(&self.schema, &self.data)
    }

    pub fn data(&self) -> &Value {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn student() -> Schema {
        Schema::object([
            ("name", Schema::string().optional()),
            ("age", Schema::Integer),
            ("parentContactNumber", Schema::string().optional()),
        ])
    }

    fn minor_config() -> Config {
        Config::new().field(
            "parentContactNumber",
            Config::required_if(|d| d["age"].as_i64().is_some_and(|age| age < 18)),
        )
    }

    #[test]
    fn condition_true_requires_field() {
        let schema = apply_conditional(&student(), &minor_config(), &json!({ "age": 17 }));
        assert_eq!(
            schema.at_path("parentContactNumber"),
            Some(&Schema::string())
        );
        assert!(schema.at_path("name").unwrap().is_optional());
    }

    #[test]
    fn condition_false_leaves_field() {
        let schema = apply_conditional(&student(), &minor_config(), &json!({ "age": 24 }));
        assert_eq!(schema, student());
    }

    #[test]
    fn bare_predicate_form() {
        let config = Config::new().field("name", Config::when(|d| d.get("nickname").is_none()));
        let schema = apply_conditional(&student(), &config, &json!({}));
        assert_eq!(schema.at_path("name"), Some(&Schema::string()));
    }

    #[test]
    fn static_entries_are_ignored() {
        let config = Config::new().require("name");
        assert_eq!(apply_conditional(&student(), &config, &json!({})), student());
    }

    #[test]
    fn does_not_recurse() {
        let schema = Schema::object([(
            "guardian",
            Schema::object([("phone", Schema::string().optional())]).optional(),
        )]);
        let config = Config::new().field(
            "guardian",
            Config::new().field("phone", Config::when(|_| true)),
        );

        assert_eq!(apply_conditional(&schema, &config, &json!({})), schema);
    }

    #[test]
    fn non_object_or_non_mapping_is_unchanged() {
        let array = Schema::array(student());
        assert_eq!(apply_conditional(&array, &minor_config(), &json!({})), array);

        let unsupported = Config::Unsupported(json!([]));
        assert_eq!(
            apply_conditional(&student(), &unsupported, &json!({ "age": 1 })),
            student()
        );
    }

    #[test]
    fn transformer_combines_static_and_conditional() {
        let config = minor_config().require("name");
        let outcome = ConditionalTransformer::new(json!({ "name": "Sam", "age": 17 }))
            .apply(&student(), &config)
            .unwrap();

        assert_eq!(outcome.schema.at_path("name"), Some(&Schema::string()));
        assert_eq!(
            outcome.schema.at_path("parentContactNumber"),
            Some(&Schema::string())
        );
        let keys: Vec<&str> = outcome.static_config.as_nested().unwrap().keys().collect();
        assert_eq!(keys, ["name"]);
    }

    #[test]
    fn run_rejects_missing_conditional_field() {
        let outcome = ConditionalTransformer::new(json!({ "age": 17 }))
            .apply(&student(), &minor_config())
            .unwrap();

        match outcome.run() {
            Err(err @ ValidateError::Invalid { .. }) => {
                assert_eq!(err.paths(), ["/parentContactNumber"])
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn run_accepts_adult_without_contact() {
        let outcome = ConditionalTransformer::new(json!({ "age": 24 }))
            .apply(&student(), &minor_config())
            .unwrap();
        assert!(outcome.run().is_ok());
    }

    #[test]
    fn run_accepts_minor_with_contact() {
        let outcome = ConditionalTransformer::new(json!({
            "age": 16,
            "parentContactNumber": "555-0100"
        }))
        .apply(&student(), &minor_config())
        .unwrap();
        assert!(outcome.run().is_ok());
    }

    #[test]
    fn transformer_rejects_leaf_schema() {
        let result =
            ConditionalTransformer::new(json!({})).apply(&Schema::Boolean, &minor_config());
        assert!(matches!(
            result,
            Err(OverlayError::InvalidSchemaKind { kind: "boolean" })
        ));
    }
}
