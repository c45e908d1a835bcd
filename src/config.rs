//! Requirement configuration trees.
//!
//! A [`Config`] mirrors the shape of the schema it targets:
//!
//! | Entry | Effect |
//! |-------|--------|
//! | `true` | field becomes required |
//! | `false` / absent | no change (never "make optional") |
//! | nested mapping | recurse into the field |
//! | `"*"` on an array | apply to the element type |
//! | predicate / `requiredIf` | conditional engine only |
//! | anything else | ignored |

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{json_type_name, Fields};

/// Key that applies a nested config to every element of an array.
pub const WILDCARD: &str = "*";

/// A runtime condition evaluated against the data being validated.
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// One node of a requirement configuration.
#[derive(Clone)]
pub enum Config {
    /// `true` requires the field; `false` leaves it as it is.
    Unconditional(bool),
    /// Field name (or [`WILDCARD`]) to nested entry.
    Nested(Fields<Config>),
    /// Bare predicate form.
    Predicate(Predicate),
    /// `{ requiredIf: predicate }` form.
    RequiredIf(Predicate),
    /// Any other value found in a configuration document. Always a no-op.
    Unsupported(Value),
}

impl Config {
    /// An empty mapping.
    pub fn new() -> Self {
        Config::Nested(Fields::new())
    }

    /// A bare predicate entry.
    pub fn when(predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Config::Predicate(Arc::new(predicate))
    }

    /// A `requiredIf` entry.
    pub fn required_if(predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Config::RequiredIf(Arc::new(predicate))
    }

    /// Set `key` to `entry`. A non-mapping config is replaced by a mapping first.
    pub fn field(mut self, key: impl Into<String>, entry: impl Into<Config>) -> Self {
        if !matches!(self, Config::Nested(_)) {
            self = Config::new();
        }
        if let Config::Nested(entries) = &mut self {
            entries.insert(key, entry.into());
        }
        self
    }

    /// Set `key` to `true`.
    pub fn require(self, key: impl Into<String>) -> Self {
        self.field(key, Config::Unconditional(true))
    }

    /// Set the array wildcard entry.
    pub fn wildcard(self, entry: impl Into<Config>) -> Self {
        self.field(WILDCARD, entry)
    }

    pub fn as_nested(&self) -> Option<&Fields<Config>> {
        match self {
            Config::Nested(entries) => Some(entries),
            _ => None,
        }
    }

    /// Entry for `key` when this config is a mapping.
    pub fn get(&self, key: &str) -> Option<&Config> {
        self.as_nested().and_then(|entries| entries.get(key))
    }

    /// True only for the literal `true` entry.
    pub fn is_required(&self) -> bool {
        matches!(self, Config::Unconditional(true))
    }

    /// The condition of a predicate or `requiredIf` entry.
    pub fn predicate(&self) -> Option<&Predicate> {
        match self {
            Config::Predicate(predicate) | Config::RequiredIf(predicate) => Some(predicate),
            _ => None,
        }
    }

    /// The top-level entries that are exactly `true`.
    ///
    /// Non-mapping configs yield an empty mapping.
    pub fn static_subset(&self) -> Config {
        let entries: Fields<Config> = self
            .as_nested()
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(_, entry)| entry.is_required())
                    .map(|(key, entry)| (key, entry.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Config::Nested(entries)
    }

    /// Names of the top-level entries that carry a condition.
    pub fn conditional_keys(&self) -> Vec<&str> {
        self.as_nested()
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(_, entry)| entry.predicate().is_some())
                    .map(|(key, _)| key)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Config::Unconditional(value) => write!(f, "{value}"),
            Config::Nested(entries) => f.debug_map().entries(entries.iter()).finish(),
            Config::Predicate(_) => f.write_str("<predicate>"),
            Config::RequiredIf(_) => f.write_str("{ requiredIf: <predicate> }"),
            Config::Unsupported(value) => write!(f, "<unsupported {}>", json_type_name(value)),
        }
    }
}

impl From<bool> for Config {
    fn from(value: bool) -> Self {
        Config::Unconditional(value)
    }
}

impl From<Value> for Config {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(b) => Config::Unconditional(b),
            Value::Object(map) => Config::Nested(
                map.into_iter()
                    .map(|(key, entry)| (key, Config::from(entry)))
                    .collect(),
            ),
            other => Config::Unsupported(other),
        }
    }
}

impl From<&Value> for Config {
    fn from(value: &Value) -> Self {
        Config::from(value.clone())
    }
}

/// Dotted-path requirements for [`mutate_required`](crate::mutate_required).
///
/// Deserializes from `{ "requiredProperties": { "address.city": true } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathRequirements {
    #[serde(default)]
    pub required_properties: BTreeMap<String, bool>,
}

impl PathRequirements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a dotted path as required.
    pub fn require(mut self, path: impl Into<String>) -> Self {
        self.required_properties.insert(path.into(), true);
        self
    }

    pub fn is_required(&self, path: &str) -> bool {
        self.required_properties.get(path).copied().unwrap_or(false)
    }
}

impl<S: Into<String>> FromIterator<S> for PathRequirements {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), |acc, path| acc.require(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_maps_each_shape() {
        let config = Config::from(json!({
            "name": true,
            "age": false,
            "address": { "city": true },
            "tags": [],
            "count": 3
        }));

        assert!(config.get("name").unwrap().is_required());
        assert!(matches!(config.get("age"), Some(Config::Unconditional(false))));
        assert!(config.get("address").unwrap().get("city").unwrap().is_required());
        assert!(matches!(config.get("tags"), Some(Config::Unsupported(_))));
        assert!(matches!(config.get("count"), Some(Config::Unsupported(_))));
    }

    #[test]
    fn non_mapping_json_is_unsupported() {
        assert!(matches!(Config::from(json!([])), Config::Unsupported(_)));
        assert!(Config::from(json!("name")).as_nested().is_none());
    }

    #[test]
    fn builder_nests_and_wildcards() {
        let config = Config::new()
            .require("type")
            .field(
                "subcategories",
                Config::new().wildcard(Config::new().require("name")),
            );

        let element = config
            .get("subcategories")
            .and_then(|c| c.get(WILDCARD))
            .unwrap();
        assert!(element.get("name").unwrap().is_required());
    }

    #[test]
    fn field_on_non_mapping_starts_fresh() {
        let config = Config::Unconditional(true).require("a");
        assert_eq!(config.as_nested().map(Fields::len), Some(1));
    }

    #[test]
    fn static_subset_keeps_only_true() {
        let config = Config::new()
            .require("email")
            .field("nickname", false)
            .field("guardian", Config::required_if(|_| true))
            .field("phone", Config::when(|_| false))
            .field("address", Config::new().require("city"));

        let subset = config.static_subset();
        let keys: Vec<&str> = subset.as_nested().unwrap().keys().collect();
        assert_eq!(keys, ["email"]);
        assert_eq!(config.conditional_keys(), ["guardian", "phone"]);
    }

    #[test]
    fn static_subset_of_non_mapping_is_empty() {
        let subset = Config::Unsupported(json!([1, 2])).static_subset();
        assert!(subset.as_nested().unwrap().is_empty());
    }

    #[test]
    fn predicate_reads_both_forms() {
        let data = json!({ "age": 17 });
        let minor = |d: &Value| d["age"].as_i64().is_some_and(|age| age < 18);

        assert!(Config::when(minor).predicate().unwrap()(&data));
        assert!(Config::required_if(minor).predicate().unwrap()(&data));
        assert!(Config::Unconditional(true).predicate().is_none());
    }

    #[test]
    fn debug_hides_predicates() {
        let config = Config::new().field("a", Config::when(|_| true));
        assert_eq!(format!("{config:?}"), r#"{"a": <predicate>}"#);
    }

    #[test]
    fn path_requirements_deserialize_camel_case() {
        let requirements: PathRequirements = serde_json::from_value(json!({
            "requiredProperties": { "name": true, "address.city": true, "age": false }
        }))
        .unwrap();

        assert!(requirements.is_required("address.city"));
        assert!(!requirements.is_required("age"));
        assert!(!requirements.is_required("missing"));
    }
}
