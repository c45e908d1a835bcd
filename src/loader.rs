//! Interchange document loading from files, strings, and HTTP URLs.
//!
//! Documents may be YAML or JSON. After loading, `$ref` pointers are inlined
//! so the overlay engine only ever sees a self-contained tree.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;

use crate::config::{Config, PathRequirements};
use crate::error::DocumentError;
use crate::interchange::from_interchange;
use crate::types::{json_type_name, Schema};

/// Default timeout for HTTP requests (10 seconds).
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Options for document loading.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Timeout for remote fetches.
    pub http_timeout: Duration,
    /// When false, `$ref` pointers are left in place and convert to
    /// [`Schema::Any`], so a referenced field accepts any value.
    pub dereference: bool,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self {
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            dereference: true,
        }
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn dereference(mut self, dereference: bool) -> Self {
        self.dereference = dereference;
        self
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a YAML or JSON document from a file path.
///
/// # Errors
///
/// Returns `DocumentError::FileNotFound` if the file doesn't exist,
/// or `DocumentError::InvalidDocument` if it isn't valid YAML/JSON.
pub fn load_document(path: &Path) -> Result<Value, DocumentError> {
    if !path.exists() {
        return Err(DocumentError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| DocumentError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_document_str(&content)
}

/// Load a document from a YAML or JSON string.
///
/// # Errors
///
/// Returns `DocumentError::InvalidDocument` if the string isn't valid YAML/JSON.
pub fn load_document_str(content: &str) -> Result<Value, DocumentError> {
    // Through serde_yaml::Value so that non-string keys (`200:`) become strings
    let document: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|source| DocumentError::InvalidDocument { source })?;
    serde_json::to_value(document).map_err(|source| DocumentError::InvalidShape { source })
}

/// Load a document relative to a caller-supplied location.
///
/// `base` may be a directory or a file; for a file, `relative` is resolved
/// against the file's parent directory.
pub fn load_document_relative(base: &Path, relative: &str) -> Result<Value, DocumentError> {
    load_document(&base_dir_of(base).join(relative))
}

/// Load a document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `DocumentError::NetworkError` if the request fails or returns an
/// error status, or `DocumentError::InvalidDocument` if the body isn't valid
/// YAML/JSON.
#[cfg(feature = "remote")]
pub fn load_document_url(url: &str, options: &LoadOptions) -> Result<Value, DocumentError> {
    let network_error = |source| DocumentError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(options.http_timeout)
        .build()
        .map_err(network_error)?;

    tracing::debug!(url, "fetching document");
    let response = client
        .get(url)
        .send()
        .map_err(network_error)?
        // Check for HTTP errors before parsing
        .error_for_status()
        .map_err(network_error)?;

    let body = response.text().map_err(network_error)?;
    load_document_str(&body)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a document from a file path or URL.
///
/// URL loading requires the `remote` feature.
pub fn load_document_auto(source: &str, options: &LoadOptions) -> Result<Value, DocumentError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_document_url(source, options)
        }
        #[cfg(not(feature = "remote"))]
        {
            let _ = options;
            Err(DocumentError::RemoteDisabled {
                url: source.to_string(),
            })
        }
    } else {
        load_document(Path::new(source))
    }
}

/// Navigate a JSON Pointer fragment (e.g., "#/components/schemas/Category").
pub fn navigate_fragment<'a>(document: &'a Value, fragment: &str) -> Option<&'a Value> {
    let path = fragment.trim_start_matches('#');
    if path.is_empty() {
        return Some(document);
    }
    document.pointer(path)
}

/// Inline every `$ref` pointer in `document`.
///
/// Internal refs (`#/...`) resolve against the document they appear in.
/// External refs (`other.yml`, `other.yml#/components/schemas/X`) are loaded
/// relative to `base_dir`, and their own refs resolve against that file.
/// Sibling keys next to a `$ref` are kept and win over the target's keys.
///
/// # Errors
///
/// Returns `DocumentError::UnresolvedRef` for a pointer with no target and
/// `DocumentError::CircularRef` for a reference cycle.
pub fn dereference(document: &mut Value, base_dir: &Path) -> Result<(), DocumentError> {
    let root = document.clone();
    let root_key = base_dir.display().to_string();
    dereference_inner(document, base_dir, &root, &root_key, &mut HashSet::new())
}

fn dereference_inner(
    value: &mut Value,
    base_dir: &Path,
    file_root: &Value, // Document that internal refs resolve against
    file_key: &str,
    visited: &mut HashSet<String>,
) -> Result<(), DocumentError> {
    let replacement = match value {
        Value::Object(obj) => {
            let Some(ref_val) = obj.get("$ref").and_then(|v| v.as_str()).map(String::from) else {
                for child in obj.values_mut() {
                    dereference_inner(child, base_dir, file_root, file_key, visited)?;
                }
                return Ok(());
            };

            let (file_part, fragment) = match ref_val.find('#') {
                Some(idx) => (&ref_val[..idx], &ref_val[idx..]),
                None => (ref_val.as_str(), ""),
            };
            let unresolved = || DocumentError::UnresolvedRef {
                reference: ref_val.clone(),
            };

            // External refs bring their own root, directory, and identity
            let (mut target, loaded, target_dir, target_key) = if file_part.is_empty() {
                let target = navigate_fragment(file_root, fragment)
                    .cloned()
                    .ok_or_else(unresolved)?;
                (target, None, base_dir.to_path_buf(), file_key.to_string())
            } else {
                let ref_path = base_dir.join(file_part);
                let loaded = load_document(&ref_path)?;
                let target = navigate_fragment(&loaded, fragment)
                    .cloned()
                    .ok_or_else(unresolved)?;
                let canonical = ref_path.canonicalize().unwrap_or_else(|_| ref_path.clone());
                let dir = base_dir_of(&ref_path).to_path_buf();
                (target, Some(loaded), dir, canonical.display().to_string())
            };

            let visit_key = format!("{}|{}", target_key, fragment);
            if !visited.insert(visit_key.clone()) {
                return Err(DocumentError::CircularRef { reference: ref_val });
            }
            tracing::debug!(reference = %ref_val, "inlining $ref");
            let target_root = loaded.as_ref().unwrap_or(file_root);
            dereference_inner(&mut target, &target_dir, target_root, &target_key, visited)?;
            visited.remove(&visit_key);

            obj.remove("$ref");
            for sibling in obj.values_mut() {
                dereference_inner(sibling, base_dir, file_root, file_key, visited)?;
            }
            match target {
                Value::Object(target_obj) => {
                    for (k, v) in target_obj {
                        obj.entry(k).or_insert(v);
                    }
                    None
                }
                // Siblings cannot be merged into a non-object target
                other => {
                    if !obj.is_empty() {
                        tracing::warn!(
                            reference = %ref_val,
                            kind = json_type_name(&other),
                            "dropping sibling keys of $ref to a non-object target"
                        );
                    }
                    Some(other)
                }
            }
        }
        Value::Array(arr) => {
            for item in arr {
                dereference_inner(item, base_dir, file_root, file_key, visited)?;
            }
            None
        }
        _ => None,
    };

    if let Some(target) = replacement {
        *value = target;
    }
    Ok(())
}

/// Select `components.schemas.<name>` from an OpenAPI document.
pub fn component_schema<'a>(document: &'a Value, name: &str) -> Result<&'a Value, DocumentError> {
    document
        .get("components")
        .and_then(|c| c.get("schemas"))
        .and_then(|s| s.get(name))
        .ok_or_else(|| DocumentError::MissingComponent {
            name: name.to_string(),
        })
}

/// Load a document, inline its refs, and convert one component schema.
///
/// The component is converted as a top-level node, so its properties are
/// optional unless listed in its `required` keyword.
pub fn load_component(
    source: &str,
    name: &str,
    options: &LoadOptions,
) -> Result<Schema, DocumentError> {
    let mut document = load_document_auto(source, options)?;
    if options.dereference {
        let base_dir = if is_url(source) {
            PathBuf::from(".")
        } else {
            base_dir_of(Path::new(source)).to_path_buf()
        };
        dereference(&mut document, &base_dir)?;
    }
    let component = component_schema(&document, name)?;
    Ok(from_interchange(component, "", &[]))
}

/// Load a requirement config document (YAML or JSON).
pub fn load_config(path: &Path) -> Result<Config, DocumentError> {
    load_document(path).map(Config::from)
}

/// Load a `{ requiredProperties: {...} }` document.
pub fn load_path_requirements(path: &Path) -> Result<PathRequirements, DocumentError> {
    let document = load_document(path)?;
    serde_json::from_value(document).map_err(|source| DocumentError::InvalidShape { source })
}

/// Directory a relative reference from `path` resolves against.
fn base_dir_of(path: &Path) -> &Path {
    if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(Path::new("."))
    }
}
