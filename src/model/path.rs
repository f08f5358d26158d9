//! Collection, document and field addressing

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved field name that addresses the document identifier
pub const DOCUMENT_ID_FIELD: &str = "__name__";

/// Name of a collection within a tenant store.
///
/// Not validated here; the store rejects paths it cannot serve.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionPath(String);

impl CollectionPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CollectionPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for CollectionPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl From<&CollectionPath> for CollectionPath {
    fn from(path: &CollectionPath) -> Self {
        path.clone()
    }
}

impl AsRef<str> for CollectionPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a document within a collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&DocumentId> for DocumentId {
    fn from(id: &DocumentId) -> Self {
        id.clone()
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reference to a field used by predicates, ranges and ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldRef {
    /// Plain field name; dots address nested maps
    Name(String),
    /// Structured path; segments are taken literally
    Path(Vec<String>),
    /// The document identifier
    DocumentId,
}

impl FieldRef {
    pub fn name(name: impl Into<String>) -> Self {
        let name = name.into();
        if name == DOCUMENT_ID_FIELD {
            FieldRef::DocumentId
        } else {
            FieldRef::Name(name)
        }
    }

    pub fn path<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldRef::Path(segments.into_iter().map(Into::into).collect())
    }

    pub fn document_id() -> Self {
        FieldRef::DocumentId
    }

    pub fn is_document_id(&self) -> bool {
        matches!(self, FieldRef::DocumentId)
    }

    /// Path segments from the document root
    pub fn segments(&self) -> Vec<&str> {
        match self {
            FieldRef::Name(name) => name.split('.').collect(),
            FieldRef::Path(segments) => segments.iter().map(String::as_str).collect(),
            FieldRef::DocumentId => vec![DOCUMENT_ID_FIELD],
        }
    }

    /// True when both references address the same field
    pub fn same_field(&self, other: &FieldRef) -> bool {
        self.segments() == other.segments()
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRef::Name(name) => f.write_str(name),
            FieldRef::Path(segments) => {
                for (i, segment) in segments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    if segment.contains('.') {
                        write!(f, "`{}`", segment)?;
                    } else {
                        f.write_str(segment)?;
                    }
                }
                Ok(())
            }
            FieldRef::DocumentId => f.write_str(DOCUMENT_ID_FIELD),
        }
    }
}

impl From<&str> for FieldRef {
    fn from(name: &str) -> Self {
        FieldRef::name(name)
    }
}

impl From<String> for FieldRef {
    fn from(name: String) -> Self {
        FieldRef::name(name)
    }
}
