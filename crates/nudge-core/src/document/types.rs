//! Document addressing and query types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{FieldValue, Fields};
use crate::types::{Collection, RecordId};

/// The address of one document: its collection and key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    /// The collection holding the document.
    pub collection: Collection,
    /// The document key.
    pub id: RecordId,
}

impl DocumentRef {
    /// Create a reference from its parts.
    pub fn new(collection: Collection, id: RecordId) -> Self {
        Self { collection, id }
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A document read from the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Where the document lives.
    pub reference: DocumentRef,
    /// The document's fields.
    pub fields: Fields,
}

/// An equality filter on one field, used to scope queries.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    /// The field to compare.
    pub field: String,
    /// The value the field must equal.
    pub value: FieldValue,
}

impl Filter {
    /// Match documents whose `field` equals `value`.
    pub fn eq(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns true if the fields satisfy this filter.
    pub fn matches(&self, fields: &Fields) -> bool {
        fields.get(&self.field) == Some(&self.value)
    }
}
