//! Core schema types and the capability interface the engines are written against.

use serde_json::Value;

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Capabilities a schema node must expose for the overlay engines.
///
/// The engines never inspect a node's concrete type; they only ask whether it
/// is optional, an object, or an array, and build new nodes through the
/// constructors below.
pub trait SchemaNode: Clone + Sized {
    /// Short name of the node kind, used in diagnostics.
    fn kind_name(&self) -> &'static str;

    /// Whether the node carries an optional wrapper.
    fn is_optional(&self) -> bool;

    /// The inner node of an optional wrapper, or the node itself.
    fn unwrap_optional(&self) -> &Self;

    /// Field map of an object node. Does not look through optional wrappers.
    fn fields(&self) -> Option<&Fields<Self>>;

    /// Element node of an array node. Does not look through optional wrappers.
    fn element(&self) -> Option<&Self>;

    fn make_object(fields: Fields<Self>) -> Self;

    fn make_array(element: Self) -> Self;

    /// Field-wise union of two object nodes where `other` wins on conflicts.
    ///
    /// Optional wrappers on either side are looked through and the result is a
    /// required object. If either side is not an object, `other` is returned.
    fn merge(&self, other: &Self) -> Self;
}

/// Insertion-ordered map from field name to node.
///
/// Order is kept for stable output and error reporting; lookups are by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Fields<T> {
    entries: Vec<(String, T)>,
}

impl<T> Fields<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Insert a field, replacing an existing one in place.
    ///
    /// Returns the previous value if the key was already present. A replaced
    /// field keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: T) -> Option<T> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut T)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<T: Clone> Fields<T> {
    /// Union of both maps; fields from `other` override same-named fields.
    pub fn merged(&self, other: &Fields<T>) -> Fields<T> {
        let mut result = self.clone();
        for (key, value) in other.iter() {
            result.insert(key, value.clone());
        }
        result
    }
}

impl<T> Default for Fields<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for Fields<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (key, value) in iter {
            fields.insert(key, value);
        }
        fields
    }
}

impl<T> IntoIterator for Fields<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// String formats checked by the validation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringFormat {
    Email,
}

impl StringFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            StringFormat::Email => "email",
        }
    }

    /// Parse an interchange `format` keyword. Unknown formats are ignored.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(StringFormat::Email),
            _ => None,
        }
    }
}

/// A structural schema node.
///
/// "Required" means not wrapped in [`Schema::Optional`]. Use
/// [`Schema::optional`] rather than constructing the variant directly so that
/// a node is never wrapped twice.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    String { format: Option<StringFormat> },
    Number,
    Integer,
    Boolean,
    Any,
    Optional(Box<Schema>),
    Object(Fields<Schema>),
    Array(Box<Schema>),
}

impl Schema {
    pub fn string() -> Self {
        Schema::String { format: None }
    }

    pub fn email() -> Self {
        Schema::String {
            format: Some(StringFormat::Email),
        }
    }

    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Schema)>) -> Self {
        Schema::Object(fields.into_iter().collect())
    }

    pub fn array(element: Schema) -> Self {
        Schema::Array(Box::new(element))
    }

    /// Wrap as optional. Already optional nodes are returned unchanged.
    pub fn optional(self) -> Self {
        match self {
            Schema::Optional(_) => self,
            other => Schema::Optional(Box::new(other)),
        }
    }

    /// Drop the optional wrapper, if any.
    pub fn into_required(self) -> Self {
        match self {
            Schema::Optional(inner) => *inner,
            other => other,
        }
    }

    /// Drop the optional wrapper in place.
    pub fn make_required(&mut self) {
        let current = std::mem::replace(self, Schema::Any);
        *self = current.into_required();
    }

    pub fn unwrap_optional_mut(&mut self) -> &mut Schema {
        match self {
            Schema::Optional(inner) => inner.as_mut(),
            other => other,
        }
    }

    /// Look up a field by dotted path, descending through optional wrappers
    /// and array elements.
    ///
    /// `"category.subcategories.name"` addresses `name` inside the element of
    /// the `subcategories` array.
    pub fn at_path(&self, path: &str) -> Option<&Schema> {
        let mut current = self;
        for segment in path.split('.') {
            let mut container = current.unwrap_optional();
            while let Schema::Array(element) = container {
                container = element.unwrap_optional();
            }
            current = match container {
                Schema::Object(fields) => fields.get(segment)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl SchemaNode for Schema {
    fn kind_name(&self) -> &'static str {
        match self {
            Schema::String { .. } => "string",
            Schema::Number => "number",
            Schema::Integer => "integer",
            Schema::Boolean => "boolean",
            Schema::Any => "any",
            Schema::Optional(_) => "optional",
            Schema::Object(_) => "object",
            Schema::Array(_) => "array",
        }
    }

    fn is_optional(&self) -> bool {
        matches!(self, Schema::Optional(_))
    }

    fn unwrap_optional(&self) -> &Self {
        match self {
            Schema::Optional(inner) => inner.as_ref(),
            other => other,
        }
    }

    fn fields(&self) -> Option<&Fields<Self>> {
        match self {
            Schema::Object(fields) => Some(fields),
            _ => None,
        }
    }

    fn element(&self) -> Option<&Self> {
        match self {
            Schema::Array(element) => Some(element.as_ref()),
            _ => None,
        }
    }

    fn make_object(fields: Fields<Self>) -> Self {
        Schema::Object(fields)
    }

    fn make_array(element: Self) -> Self {
        Schema::array(element)
    }

    fn merge(&self, other: &Self) -> Self {
        match (self.unwrap_optional(), other.unwrap_optional()) {
            (Schema::Object(base), Schema::Object(overlay)) => Schema::Object(base.merged(overlay)),
            _ => other.clone(),
        }
    }
}
