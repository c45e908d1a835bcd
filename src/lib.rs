//! Schema Overlay
//!
//! Declarative requirement overlays for structural validation schemas.
//!
//! Given a [`Schema`] whose fields may be optional and a [`Config`] naming the
//! fields that must be present, [`overlay`] returns a new schema in which those
//! fields are required. The input is never modified, and overlays compose:
//! applying a second config to an overlaid schema keeps the first config's
//! requirements.
//!
//! # Example
//!
//! ```
//! use schema_overlay::{overlay, validate, Config, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::object([
//!     ("name", Schema::string().optional()),
//!     ("address", Schema::object([
//!         ("street", Schema::string().optional()),
//!         ("city", Schema::string().optional()),
//!     ]).optional()),
//! ]);
//!
//! let config = Config::new()
//!     .require("name")
//!     .field("address", Config::new().require("city"));
//!
//! let required = overlay(&schema, &config).unwrap();
//!
//! let ada = json!({ "name": "Ada", "address": { "city": "London" } });
//! assert!(validate(&required, &ada).is_ok());
//! assert!(validate(&required, &json!({ "name": "Ada", "address": {} })).is_err());
//!
//! // The original schema still accepts an empty object
//! assert!(validate(&schema, &json!({})).is_ok());
//! ```
//!
//! # Config Entries
//!
//! | Entry | Effect |
//! |-------|--------|
//! | `true` | Field becomes required |
//! | `false` | No change (does NOT make a field optional) |
//! | mapping | Recurse into the field (the field itself becomes required) |
//! | `"*"` | Applies to every element of an array |
//! | predicate / `requiredIf` | Evaluated by [`apply_conditional`] only |
//!
//! # Interchange Documents
//!
//! OpenAPI documents (YAML or JSON) are loaded with [`load_component`], which
//! inlines `$ref` pointers and converts one `components.schemas` entry with
//! [`from_interchange`].

mod conditional;
mod config;
mod error;
mod interchange;
mod loader;
mod mutator;
mod overlay;
mod types;
mod validator;

pub use conditional::{apply_conditional, ConditionalOverlay, ConditionalTransformer};
pub use config::{Config, PathRequirements, Predicate, WILDCARD};
pub use error::{DocumentError, OverlayError, SchemaError, ValidateError};
pub use interchange::{from_interchange, to_interchange, to_json_schema};
pub use loader::{
    component_schema, dereference, is_url, load_component, load_config, load_document,
    load_document_auto, load_document_relative, load_document_str, load_path_requirements,
    navigate_fragment, LoadOptions, DEFAULT_HTTP_TIMEOUT,
};
pub use mutator::mutate_required;
pub use overlay::overlay;
pub use types::{json_type_name, Fields, Schema, SchemaNode, StringFormat};
pub use validator::{validate, validate_against_json_schema};

#[cfg(feature = "remote")]
pub use loader::load_document_url;
