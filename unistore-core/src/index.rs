//! Index descriptions for collections.

use crate::{
    error::{DocumentStoreError, DocumentStoreResult},
    query::SortDirection,
};

/// A single or compound index over one collection.
///
/// ```ignore
/// let by_college_then_age = IndexSpec::new()
///     .key("college", SortDirection::Asc)
///     .key("age", SortDirection::Desc);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexSpec {
    pub keys: Vec<(String, SortDirection)>,
    pub unique: bool,
    pub name: Option<String>,
}

impl IndexSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for an ascending single-field index.
    pub fn ascending(field: impl Into<String>) -> Self {
        Self::new().key(field, SortDirection::Asc)
    }

    pub fn key(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.keys.push((field.into(), direction));
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The explicit name, or the conventional `field_1_other_-1` form.
    pub fn resolved_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self
                .keys
                .iter()
                .map(|(field, direction)| format!("{}_{}", field, direction.as_i32()))
                .collect::<Vec<_>>()
                .join("_"),
        }
    }

    pub fn validate(&self) -> DocumentStoreResult<()> {
        if self.keys.is_empty() {
            return Err(DocumentStoreError::InvalidDocument("index has no keys".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_name_follows_key_order() {
        let spec = IndexSpec::new()
            .key("college", SortDirection::Asc)
            .key("age", SortDirection::Desc);

        assert_eq!(spec.resolved_name(), "college_1_age_-1");
        assert_eq!(spec.named("by_college").resolved_name(), "by_college");
    }

    #[test]
    fn empty_index_is_rejected() {
        assert!(matches!(IndexSpec::new().validate(), Err(DocumentStoreError::InvalidDocument(_))));
        assert!(IndexSpec::ascending("age").validate().is_ok());
    }
}
