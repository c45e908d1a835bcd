//! Requirement overlay - turns optional fields into required ones.
//!
//! The overlay walks the schema and the configuration together. A `true`
//! entry unwraps the field's optional marker, a nested mapping recurses into
//! the field, and a `"*"` entry on an array recurses into its element type.
//! Everything the config does not mention keeps its current optionality, so
//! overlays compose: applying a second config to an overlaid schema adds its
//! requirements to the ones already there.
//!
//! `false` is a no-op. It never makes a required field optional.

use crate::config::{Config, WILDCARD};
use crate::error::OverlayError;
use crate::types::{json_type_name, Fields, SchemaNode};

/// Overlay `config` onto `schema`, returning a new schema.
///
/// - An object schema (optionally wrapped) is extended and the result merged
///   onto the original, so untouched fields keep their prior state.
/// - An array schema requires a `"*"` entry; the element is overlaid and
///   merged with the original element.
/// - A config that is not a mapping returns `schema` unchanged.
///
/// # Errors
///
/// Returns `OverlayError::InvalidSchemaKind` if the top-level schema is not an
/// object, or is an array without a `"*"` entry.
pub fn overlay<S: SchemaNode>(schema: &S, config: &Config) -> Result<S, OverlayError> {
    let top = schema.unwrap_optional();

    if let Some(element) = top.element() {
        let Some(element_config) = config.get(WILDCARD).filter(|c| applies_to_element(c)) else {
            return Err(OverlayError::InvalidSchemaKind {
                kind: top.kind_name(),
            });
        };
        let transformed = overlay(element, element_config)?;
        return Ok(S::make_array(element.merge(&transformed)));
    }

    if top.fields().is_none() {
        return Err(OverlayError::InvalidSchemaKind {
            kind: top.kind_name(),
        });
    }

    if config.as_nested().is_none() {
        tracing::debug!(config = ?config, "ignoring non-mapping requirement config");
        return Ok(schema.clone());
    }

    let extended = extend(top, config);
    Ok(top.merge(&extended))
}

fn extend<S: SchemaNode>(partial: &S, config: &Config) -> S {
    let unwrapped = partial.unwrap_optional();

    if let (Some(fields), Some(entries)) = (unwrapped.fields(), config.as_nested()) {
        let updated: Fields<S> = fields
            .iter()
            .map(|(key, field)| {
                let next = match entries.get(key) {
                    Some(Config::Unconditional(true)) => field.unwrap_optional().clone(),
                    Some(nested @ Config::Nested(_)) => extend(field, nested),
                    Some(Config::Unsupported(value)) => {
                        tracing::debug!(
                            field = key,
                            kind = json_type_name(value),
                            "ignoring unsupported requirement entry"
                        );
                        field.clone()
                    }
                    _ => field.clone(),
                };
                (key, next)
            })
            .collect();
        return unwrapped.merge(&S::make_object(updated));
    }

    if let Some(element) = unwrapped.element() {
        // The element is replaced outright rather than merged with the
        // original element, unlike object fields above.
        if let Some(element_config) = config.get(WILDCARD).filter(|c| applies_to_element(c)) {
            return S::make_array(extend(element, element_config));
        }
    }

    unwrapped.clone()
}

/// Only `true` and nested mappings descend into an array element.
fn applies_to_element(config: &Config) -> bool {
    matches!(config, Config::Unconditional(true) | Config::Nested(_))
}
