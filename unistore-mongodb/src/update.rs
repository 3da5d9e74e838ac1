//! Translation of field changes into MongoDB update operators.

use bson::Document;

use unistore_core::update::{FieldChange, Update};

/// Groups field changes under `$set`, `$unset` and `$inc`, omitting empty groups.
pub(crate) fn update_document(update: &Update) -> Document {
    let mut set = Document::new();
    let mut unset = Document::new();
    let mut inc = Document::new();

    for change in update.changes() {
        match change {
            FieldChange::Set(field, value) => {
                set.insert(field.clone(), value.clone());
            }
            FieldChange::Unset(field) => {
                unset.insert(field.clone(), "");
            }
            FieldChange::Inc(field, by) => {
                inc.insert(field.clone(), by.clone());
            }
        }
    }

    let mut document = Document::new();
    for (operator, fields) in [("$set", set), ("$unset", unset), ("$inc", inc)] {
        if !fields.is_empty() {
            document.insert(operator, fields);
        }
    }

    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn groups_changes_by_operator() {
        let update = Update::new().set("age", 22).set("college", "JNU").unset("status").inc("credits", 3);

        assert_eq!(
            update_document(&update),
            doc! {
                "$set": { "age": 22, "college": "JNU" },
                "$unset": { "status": "" },
                "$inc": { "credits": 3 },
            }
        );
    }

    #[test]
    fn omits_unused_operators() {
        assert_eq!(update_document(&Update::new().set("age", 22)), doc! { "$set": { "age": 22 } });
    }
}
