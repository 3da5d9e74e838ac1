//! Core traits for record representation and serialization.
//!
//! This module provides the trait every stored record implements, plus the
//! conversions between records and their wire shapes (BSON documents, JSON).

use bson::{
    Document,
    de::deserialize_from_document,
    ser::serialize_to_document,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, to_value};

use crate::error::DocumentStoreResult;

/// Name of the identifier field the store attaches to every stored record.
pub const ID_FIELD: &str = "_id";

/// Core trait that all records stored in a document store must implement.
///
/// Records do not carry their own identifier. The store assigns one on insertion
/// and reports it through the insert results. Optional fields that should be
/// omitted from the stored document when unset must say so with
/// `#[serde(skip_serializing_if = "Option::is_none")]`.
///
/// # Example
///
/// ```ignore
/// use unistore_core::record::Record;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Course {
///     pub code: String,
///     #[serde(skip_serializing_if = "Option::is_none")]
///     pub room: Option<String>,
/// }
///
/// impl Record for Course {
///     fn collection_name() -> &'static str {
///         "courses"
///     }
/// }
/// ```
pub trait Record: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns the name of the collection this record belongs to.
    fn collection_name() -> &'static str;
}

/// Extension trait providing serialization utilities for records.
///
/// Automatically implemented for all types that implement [`Record`].
pub trait RecordExt: Record {
    /// Converts this record into the document sent to the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the record does not serialize to a BSON document.
    fn to_document(&self) -> DocumentStoreResult<Document>;

    /// Decodes a stored document, ignoring the store-assigned `_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not match the record's shape.
    fn from_document(document: Document) -> DocumentStoreResult<Self>;

    /// Converts this record to a JSON value, mostly for display.
    fn to_json(&self) -> DocumentStoreResult<Value>;
}

impl<R: Record> RecordExt for R {
    fn to_document(&self) -> DocumentStoreResult<Document> {
        Ok(serialize_to_document(self)?)
    }

    fn from_document(mut document: Document) -> DocumentStoreResult<Self> {
        document.remove(ID_FIELD);

        Ok(deserialize_from_document(document)?)
    }

    fn to_json(&self) -> DocumentStoreResult<Value> {
        Ok(to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Course {
        code: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        room: Option<String>,
    }

    impl Record for Course {
        fn collection_name() -> &'static str {
            "courses"
        }
    }

    #[test]
    fn unset_optional_field_is_omitted() {
        let document = Course { code: "CS101".into(), room: None }
            .to_document()
            .unwrap();

        assert_eq!(document, doc! { "code": "CS101" });
        assert!(!document.contains_key("room"));
    }

    #[test]
    fn decoding_ignores_store_identifier() {
        let course = Course::from_document(doc! {
            "_id": ObjectId::new(),
            "code": "CS101",
            "room": "B12",
        })
        .unwrap();

        assert_eq!(course, Course { code: "CS101".into(), room: Some("B12".into()) });
    }

    #[test]
    fn decoding_missing_field_fails() {
        let err = Course::from_document(doc! { "room": "B12" }).unwrap_err();

        assert!(matches!(err, crate::error::DocumentStoreError::Serialization(_)));
    }
}
