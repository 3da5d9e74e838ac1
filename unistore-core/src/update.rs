//! Field-level changes applied by update operations.
//!
//! An [`Update`] is an ordered list of [`FieldChange`]s. Backends translate it into
//! their native form (`$set`/`$unset`/`$inc` for MongoDB) or apply it directly.

use bson::Bson;

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// A single change to one field of a stored record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    /// Sets the field to the value, adding it when absent.
    Set(String, Bson),
    /// Removes the field.
    Unset(String),
    /// Adds a number to a numeric field, treating an absent field as zero.
    Inc(String, Bson),
}

impl FieldChange {
    pub fn field(&self) -> &str {
        match self {
            FieldChange::Set(field, _) | FieldChange::Unset(field) | FieldChange::Inc(field, _) => field,
        }
    }
}

/// An ordered set of field changes.
///
/// ```ignore
/// let update = Update::new().set("age", 22).unset("status");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    changes: Vec<FieldChange>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.changes.push(FieldChange::Set(field.into(), value.into()));
        self
    }

    pub fn unset(mut self, field: impl Into<String>) -> Self {
        self.changes.push(FieldChange::Unset(field.into()));
        self
    }

    pub fn inc(mut self, field: impl Into<String>, by: impl Into<Bson>) -> Self {
        self.changes.push(FieldChange::Inc(field.into(), by.into()));
        self
    }

    pub fn changes(&self) -> &[FieldChange] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Rejects updates the store would refuse: no changes, touching `_id`,
    /// the same field changed twice, or a non-numeric increment.
    pub fn validate(&self) -> DocumentStoreResult<()> {
        if self.changes.is_empty() {
            return Err(DocumentStoreError::InvalidUpdate("update has no field changes".into()));
        }

        let mut seen = Vec::with_capacity(self.changes.len());

        for change in &self.changes {
            let field = change.field();

            if field.is_empty() || field == crate::record::ID_FIELD {
                return Err(DocumentStoreError::InvalidUpdate(format!("cannot change field '{field}'")));
            }
            if seen.contains(&field) {
                return Err(DocumentStoreError::InvalidUpdate(format!("field '{field}' changed twice")));
            }
            if let FieldChange::Inc(_, by) = change {
                if !matches!(by, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_)) {
                    return Err(DocumentStoreError::InvalidUpdate(format!("increment of '{field}' is not numeric")));
                }
            }

            seen.push(field);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_changes_in_order() {
        let update = Update::new().set("age", 22).unset("status").inc("age_next", 1);

        assert_eq!(
            update.changes(),
            &[
                FieldChange::Set("age".into(), Bson::Int32(22)),
                FieldChange::Unset("status".into()),
                FieldChange::Inc("age_next".into(), Bson::Int32(1)),
            ]
        );
        assert!(update.validate().is_ok());
    }

    #[test]
    fn rejects_empty_update() {
        assert!(matches!(Update::new().validate(), Err(DocumentStoreError::InvalidUpdate(_))));
    }

    #[test]
    fn rejects_id_and_duplicate_fields() {
        assert!(Update::new().set("_id", 1).validate().is_err());
        assert!(Update::new().set("age", 1).unset("age").validate().is_err());
    }

    #[test]
    fn rejects_non_numeric_increment() {
        assert!(Update::new().inc("age", "one").validate().is_err());
    }
}
