//! Outcomes reported by write operations.

use std::fmt;

use bson::{Bson, oid::ObjectId};

/// Opaque identifier the store assigned to an inserted record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordId(Bson);

impl RecordId {
    pub fn new(id: impl Into<Bson>) -> Self {
        Self(id.into())
    }

    pub fn as_bson(&self) -> &Bson {
        &self.0
    }

    pub fn as_object_id(&self) -> Option<ObjectId> {
        self.0.as_object_id()
    }

    pub fn into_bson(self) -> Bson {
        self.0
    }
}

impl From<ObjectId> for RecordId {
    fn from(id: ObjectId) -> Self {
        Self(Bson::ObjectId(id))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Bson::ObjectId(id) => write!(f, "{}", id.to_hex()),
            Bson::String(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertOneResult {
    pub inserted_id: RecordId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertManyResult {
    /// Identifiers in the order the records were submitted.
    pub inserted_ids: Vec<RecordId>,
}

/// Outcome of an update. `matched_count` can exceed `modified_count` when a
/// matched record already held the target values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted_count: u64,
}

/// Aggregate counts for a bulk write, per operation kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkWriteResult {
    pub inserted_count: u64,
    pub matched_count: u64,
    pub modified_count: u64,
    pub deleted_count: u64,
}

impl BulkWriteResult {
    pub fn absorb_update(&mut self, result: UpdateResult) {
        self.matched_count += result.matched_count;
        self.modified_count += result.modified_count;
    }
}
