//! Data model: values, documents and addressing

mod document;
mod path;
mod value;

pub use document::Document;
pub use path::{CollectionPath, DocumentId, FieldRef, DOCUMENT_ID_FIELD};
pub use value::{Timestamp, Value, TIMESTAMP_KEY};
