//! Query translation from unistore filter expressions to MongoDB query syntax.
//!
//! This module translates the abstract filter expressions into MongoDB BSON
//! documents for execution by the MongoDB query engine.

use bson::{Bson, Document, doc};

use unistore_core::{
    query::{QueryVisitor, Expr, FieldOp, Projection, Sort},
    error::DocumentStoreError,
};


/// Translates filter expressions into MongoDB query documents.
///
/// [`Expr::All`] becomes the empty document, which MongoDB reads as "every
/// document in the collection".
pub(crate) struct MongoQueryTranslator;

impl MongoQueryTranslator {
    pub fn translate(expr: &Expr) -> Result<Document, DocumentStoreError> {
        MongoQueryTranslator.visit_expr(expr)
    }

    fn visit_all_of(&mut self, exprs: &[Expr]) -> Result<Vec<Document>, DocumentStoreError> {
        exprs
            .iter()
            .map(|expr| self.visit_expr(expr))
            .collect()
    }
}

/// Escapes regex metacharacters so a literal string can be matched by pattern.
fn escape_regex(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());

    for ch in literal.chars() {
        if "\\.^$|?*+()[]{}".contains(ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }

    escaped
}

fn require_string<'a>(field: &str, op: &str, value: &'a Bson) -> Result<&'a str, DocumentStoreError> {
    match value {
        Bson::String(s) => Ok(s),
        other => Err(DocumentStoreError::InvalidFilter(format!(
            "{op} on '{field}' requires a string value, got {other}"
        ))),
    }
}

fn require_array<'a>(field: &str, op: &str, value: &'a Bson) -> Result<&'a Bson, DocumentStoreError> {
    match value {
        Bson::Array(_) => Ok(value),
        other => Err(DocumentStoreError::InvalidFilter(format!(
            "{op} on '{field}' requires an array value, got {other}"
        ))),
    }
}

/// Builds a sort specification, keys in precedence order.
pub(crate) fn sort_document(sort: &[Sort]) -> Document {
    sort.iter()
        .map(|key| (key.field.clone(), Bson::Int32(key.direction.as_i32())))
        .collect()
}

pub(crate) fn projection_document(projection: &Projection) -> Document {
    let flag = match projection {
        Projection::Include(_) => 1,
        Projection::Exclude(_) => 0,
    };

    projection
        .fields()
        .iter()
        .map(|field| (field.clone(), Bson::Int32(flag)))
        .collect()
}

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = DocumentStoreError;

    fn visit_all(&mut self) -> Result<Self::Output, Self::Error> {
        Ok(doc! {})
    }

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        if exprs.is_empty() {
            return Ok(doc! {});
        }

        Ok(doc! {
            "$and": self.visit_all_of(exprs)?,
        })
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        if exprs.is_empty() {
            return Err(DocumentStoreError::InvalidFilter("$or needs at least one expression".into()));
        }

        Ok(doc! {
            "$or": self.visit_all_of(exprs)?,
        })
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        // $not only applies to field operators, so negate whole expressions with $nor
        Ok(doc! {
            "$nor": [self.visit_expr(expr)?],
        })
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: { "$exists": should_exist },
        })
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: match op {
                FieldOp::Eq => doc! { "$eq": value },
                FieldOp::Ne => doc! { "$ne": value },
                FieldOp::Gt => doc! { "$gt": value },
                FieldOp::Gte => doc! { "$gte": value },
                FieldOp::Lt => doc! { "$lt": value },
                FieldOp::Lte => doc! { "$lte": value },
                FieldOp::Contains => match value {
                    Bson::String(s) => doc! { "$regex": escape_regex(s) },
                    Bson::Array(arr) => doc! { "$all": arr },
                    other => doc! { "$all": [other] },
                },
                FieldOp::NotContains => match value {
                    Bson::String(s) => doc! { "$not": { "$regex": escape_regex(s) } },
                    Bson::Array(arr) => doc! { "$not": { "$all": arr } },
                    other => doc! { "$not": { "$all": [other] } },
                },
                FieldOp::StartsWith => {
                    doc! { "$regex": format!("^{}", escape_regex(require_string(field, "starts_with", value)?)) }
                },
                FieldOp::EndsWith => {
                    doc! { "$regex": format!("{}$", escape_regex(require_string(field, "ends_with", value)?)) }
                },
                FieldOp::AnyOf => doc! { "$in": require_array(field, "any_of", value)? },
                FieldOp::NoneOf => doc! { "$nin": require_array(field, "none_of", value)? },
                FieldOp::Size => match value {
                    Bson::Int32(_) | Bson::Int64(_) => doc! { "$size": value },
                    other => {
                        return Err(DocumentStoreError::InvalidFilter(format!(
                            "size on '{field}' requires an integer, got {other}"
                        )));
                    }
                },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unistore_core::query::{Filter, SortDirection};

    #[test]
    fn everything_is_the_empty_document() {
        assert_eq!(MongoQueryTranslator::translate(&Filter::all()).unwrap(), doc! {});
    }

    #[test]
    fn comparison_and_logical_operators() {
        let expr = Filter::eq("college", "IIT Delhi").and(Filter::gt("age", 20));

        assert_eq!(
            MongoQueryTranslator::translate(&expr).unwrap(),
            doc! {
                "$and": [
                    { "college": { "$eq": "IIT Delhi" } },
                    { "age": { "$gt": 20 } },
                ]
            }
        );
    }

    #[test]
    fn negation_uses_nor() {
        let expr = Filter::lt("age", 18).not();

        assert_eq!(
            MongoQueryTranslator::translate(&expr).unwrap(),
            doc! { "$nor": [{ "age": { "$lt": 18 } }] }
        );
    }

    #[test]
    fn string_patterns_are_escaped_and_anchored() {
        let starts = MongoQueryTranslator::translate(&Filter::starts_with("college", "IIT (D)")).unwrap();
        assert_eq!(starts, doc! { "college": { "$regex": "^IIT \\(D\\)" } });

        let ends = MongoQueryTranslator::translate(&Filter::ends_with("college", "University")).unwrap();
        assert_eq!(ends, doc! { "college": { "$regex": "University$" } });
    }

    #[test]
    fn substring_match_and_its_negation() {
        assert_eq!(
            MongoQueryTranslator::translate(&Filter::contains("college", "IIT")).unwrap(),
            doc! { "college": { "$regex": "IIT" } }
        );
        assert_eq!(
            MongoQueryTranslator::translate(&Filter::not_contains("college", "Univ.")).unwrap(),
            doc! { "college": { "$not": { "$regex": "Univ\\." } } }
        );
    }

    #[test]
    fn array_operators() {
        assert_eq!(
            MongoQueryTranslator::translate(&Filter::any_of("name", ["Isha Reddy", "Priya Singh"])).unwrap(),
            doc! { "name": { "$in": ["Isha Reddy", "Priya Singh"] } }
        );
        assert_eq!(
            MongoQueryTranslator::translate(&Filter::contains("tags", vec!["hostel", "scholar"])).unwrap(),
            doc! { "tags": { "$all": ["hostel", "scholar"] } }
        );
        assert_eq!(
            MongoQueryTranslator::translate(&Filter::size("tags", 2)).unwrap(),
            doc! { "tags": { "$size": 2_i64 } }
        );
    }

    #[test]
    fn existence() {
        assert_eq!(
            MongoQueryTranslator::translate(&Filter::not_exists("status")).unwrap(),
            doc! { "status": { "$exists": false } }
        );
    }

    #[test]
    fn empty_or_is_rejected() {
        let result = MongoQueryTranslator::translate(&Expr::Or(vec![]));

        assert!(matches!(result, Err(DocumentStoreError::InvalidFilter(_))));
    }

    #[test]
    fn membership_needs_an_array() {
        let expr = Expr::field("name".into(), FieldOp::AnyOf, Bson::String("Priya Singh".into()));

        assert!(matches!(
            MongoQueryTranslator::translate(&expr),
            Err(DocumentStoreError::InvalidFilter(_))
        ));
    }

    #[test]
    fn sort_keeps_key_order() {
        let sort = vec![
            Sort { field: "college".into(), direction: SortDirection::Asc },
            Sort { field: "age".into(), direction: SortDirection::Desc },
        ];

        let document = sort_document(&sort);
        let keys: Vec<&str> = document.keys().map(String::as_str).collect();

        assert_eq!(keys, ["college", "age"]);
        assert_eq!(document.get_i32("age").unwrap(), -1);
    }

    #[test]
    fn projection_documents() {
        assert_eq!(
            projection_document(&Projection::include(["name", "college"])),
            doc! { "name": 1, "college": 1 }
        );
        assert_eq!(projection_document(&Projection::exclude(["age"])), doc! { "age": 0 });
    }
}
