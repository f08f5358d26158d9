//! Document payloads
//!
//! A document is an ordered mapping from field name to [`Value`]. The
//! identifier is not part of the payload.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::path::FieldRef;
use super::value::Value;

/// Data payload of one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: BTreeMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Top-level field lookup
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field-by-field [`Value::is_identical`]
    pub fn is_identical(&self, other: &Document) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|((ka, va), (kb, vb))| ka == kb && va.is_identical(vb))
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> BTreeMap<String, Value> {
        self.fields
    }

    /// Resolves a possibly nested field reference.
    ///
    /// The document identifier is not part of the payload, so
    /// [`FieldRef::DocumentId`] always resolves to `None` here.
    pub fn resolve(&self, field: &FieldRef) -> Option<&Value> {
        if field.is_document_id() {
            return None;
        }
        let segments = field.segments();
        let (first, rest) = segments.split_first()?;
        let mut current = self.fields.get(*first)?;
        for segment in rest {
            current = current.as_map()?.get(*segment)?;
        }
        Some(current)
    }

    /// Merges `partial` into this document.
    ///
    /// Fields absent from `partial` are untouched. Nested maps are merged
    /// recursively; any other value replaces the existing one.
    pub fn merge(&mut self, partial: Document) {
        merge_maps(&mut self.fields, partial.fields);
    }

    /// Builds a document from a JSON object. Returns `None` for non-objects.
    pub fn from_json(json: JsonValue) -> Option<Self> {
        match Value::from_json(json) {
            Value::Map(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

fn merge_maps(target: &mut BTreeMap<String, Value>, incoming: BTreeMap<String, Value>) {
    for (key, value) in incoming {
        match (target.get_mut(&key), value) {
            (Some(Value::Map(existing)), Value::Map(nested)) => merge_maps(existing, nested),
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

impl From<BTreeMap<String, Value>> for Document {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_nested() {
        let doc = Document::from_json(json!({"stats": {"daily": {"count": 3}}})).unwrap();
        assert_eq!(
            doc.resolve(&FieldRef::from("stats.daily.count")),
            Some(&Value::Integer(3))
        );
        assert_eq!(doc.resolve(&FieldRef::from("stats.weekly")), None);
        assert_eq!(doc.resolve(&FieldRef::document_id()), None);
    }

    #[test]
    fn test_merge_leaves_untouched_fields() {
        let mut doc = Document::new().with("value", 5).with("label", "a");
        doc.merge(Document::new().with("value", 10));
        assert_eq!(doc.get("value"), Some(&Value::Integer(10)));
        assert_eq!(doc.get("label"), Some(&Value::from("a")));
    }

    #[test]
    fn test_merge_is_deep_for_maps() {
        let mut doc = Document::from_json(json!({"meta": {"a": 1, "b": 2}})).unwrap();
        doc.merge(Document::from_json(json!({"meta": {"b": 3}})).unwrap());
        assert_eq!(doc.to_json(), json!({"meta": {"a": 1, "b": 3}}));
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(Document::from_json(json!([1, 2])).is_none());
    }

    #[test]
    fn test_serde_transparent() {
        let doc = Document::new().with("value", 5);
        let text = serde_json::to_string(&doc).unwrap();
        assert_eq!(text, r#"{"value":5}"#);
        let back: Document = serde_json::from_str(&text).unwrap();
        assert_eq!(back, doc);
    }
}
