//! Filter evaluation for in-memory document matching.
//!
//! This module walks filter expressions against stored BSON documents, mirroring
//! the matching rules of a document store closely enough for tests and offline runs.

use std::{cmp::Ordering, collections::HashMap};
use bson::{Bson, Document, datetime::DateTime, oid::ObjectId};

use unistore_core::{
    query::{QueryVisitor, Expr, FieldOp, Sort, SortDirection},
    error::{DocumentStoreError, DocumentStoreResult},
};


/// Comparable view of a BSON value.
///
/// Integers and doubles are normalised to f64 so that `age: 21` stored as Int32
/// matches a filter built from an Int64.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    DateTime(DateTime),
    ObjectId(ObjectId),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::ObjectId(value) => Comparable::ObjectId(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            _ => Comparable::Null,
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => Some(Ordering::Equal),
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl Comparable<'_> {
    /// Cross-type sort position: null, numbers, strings, documents, arrays,
    /// object ids, booleans, dates.
    fn type_rank(&self) -> u8 {
        match self {
            Comparable::Null => 0,
            Comparable::Number(_) => 1,
            Comparable::String(_) => 2,
            Comparable::Map(_) => 3,
            Comparable::Array(_) => 4,
            Comparable::ObjectId(_) => 5,
            Comparable::Bool(_) => 6,
            Comparable::DateTime(_) => 7,
        }
    }

    /// Total order used for sorting. Values of different types order by
    /// [`Self::type_rank`]; documents only order by their field count.
    fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => Ordering::Equal,
            (Comparable::Number(a), Comparable::Number(b)) => a.total_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.cmp(b),
            (Comparable::Map(a), Comparable::Map(b)) => a.len().cmp(&b.len()),
            (Comparable::Array(a), Comparable::Array(b)) => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| x.sort_cmp(y))
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a.cmp(b),
            (Comparable::Bool(a), Comparable::Bool(b)) => a.cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

/// Whether a stored value equals a filter value. A stored array also matches
/// when any of its elements does.
fn value_matches(stored: &Comparable<'_>, wanted: &Comparable<'_>) -> bool {
    if stored == wanted {
        return true;
    }

    match stored {
        Comparable::Array(items) => items.iter().any(|item| item == wanted),
        _ => false,
    }
}

/// Orders two documents by a list of sort keys. Missing fields sort as null;
/// values of different types order by type.
pub(crate) fn compare_documents(left: &Document, right: &Document, sort: &[Sort]) -> Ordering {
    for key in sort {
        let left = left.get(&key.field).map(Comparable::from).unwrap_or(Comparable::Null);
        let right = right.get(&key.field).map(Comparable::from).unwrap_or(Comparable::Null);

        let ordering = match key.direction {
            SortDirection::Asc => left.sort_cmp(&right),
            SortDirection::Desc => right.sort_cmp(&left),
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}


pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> DocumentStoreResult<bool> {
        self.visit_expr(expr)
    }

    /// Evaluates `expr` against one document.
    pub fn matches(document: &Document, expr: &Expr) -> DocumentStoreResult<bool> {
        DocumentEvaluator::new(document).evaluate(expr)
    }
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = DocumentStoreError;

    fn visit_all(&mut self) -> Result<Self::Output, Self::Error> {
        Ok(true)
    }

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        if exprs.is_empty() {
            return Err(DocumentStoreError::InvalidFilter("$or needs at least one expression".into()));
        }

        for expr in exprs {
            if self.visit_expr(expr)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(!self.visit_expr(expr)?)
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        Ok(self.document.contains_key(field) == should_exist)
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        let wanted = Comparable::from(value);

        let Some(field_value) = self.document.get(field) else {
            // an absent field only satisfies the negative operators
            return Ok(match op {
                FieldOp::Eq => wanted == Comparable::Null,
                FieldOp::Ne | FieldOp::NotContains | FieldOp::NoneOf => true,
                _ => false,
            });
        };
        let stored = Comparable::from(field_value);

        match op {
            FieldOp::Eq => Ok(value_matches(&stored, &wanted)),
            FieldOp::Ne => Ok(!value_matches(&stored, &wanted)),
            FieldOp::Gt | FieldOp::Gte | FieldOp::Lt | FieldOp::Lte => {
                Ok(match stored.partial_cmp(&wanted) {
                    Some(ordering) => match op {
                        FieldOp::Gt => ordering == Ordering::Greater,
                        FieldOp::Gte => ordering != Ordering::Less,
                        FieldOp::Lt => ordering == Ordering::Less,
                        _ => ordering != Ordering::Greater,
                    },
                    None => false,
                })
            },
            FieldOp::Contains | FieldOp::NotContains => {
                let contained = match (&stored, &wanted) {
                    (Comparable::String(left), Comparable::String(right)) => left.contains(right),
                    (Comparable::Array(items), Comparable::Array(required)) => required
                        .iter()
                        .all(|needle| items.iter().any(|item| item == needle)),
                    (Comparable::Array(items), single) => items.iter().any(|item| item == single),
                    _ => false,
                };

                Ok(contained == matches!(op, FieldOp::Contains))
            },
            FieldOp::StartsWith => match (&stored, &wanted) {
                (Comparable::String(left), Comparable::String(right)) => Ok(left.starts_with(right)),
                _ => Ok(false),
            },
            FieldOp::EndsWith => match (&stored, &wanted) {
                (Comparable::String(left), Comparable::String(right)) => Ok(left.ends_with(right)),
                _ => Ok(false),
            },
            FieldOp::AnyOf | FieldOp::NoneOf => {
                let Comparable::Array(candidates) = &wanted else {
                    return Err(DocumentStoreError::InvalidFilter(format!("membership test on '{field}' needs an array")));
                };
                let any = candidates.iter().any(|candidate| value_matches(&stored, candidate));

                Ok(any == matches!(op, FieldOp::AnyOf))
            },
            FieldOp::Size => match (&stored, &wanted) {
                (Comparable::Array(items), Comparable::Number(len)) => Ok(items.len() as f64 == *len),
                (_, Comparable::Number(_)) => Ok(false),
                _ => Err(DocumentStoreError::InvalidFilter(format!("size test on '{field}' needs a number"))),
            },
        }
    }
}
