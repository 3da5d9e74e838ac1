//! Filter and query construction for document stores.
//!
//! Filters are backend-neutral expression trees. Each backend walks them with a
//! [`QueryVisitor`]: the MongoDB backend turns them into BSON query documents,
//! the in-memory backend evaluates them against stored documents.
//!
//! # Filter Expression API
//!
//! - Everything: `all` (the empty filter, matches every record)
//! - Comparison: `eq`, `ne`, `gt`, `gte`, `lt`, `lte`
//! - String: `starts_with`, `ends_with`, `contains`, `not_contains`
//! - Element: `exists`, `not_exists`
//! - Membership: `any_of`, `none_of`
//! - Array: `contains` (all of), `size`
//! - Logical: `and`, `or`, and [`Expr::not`]
//!
//! ```ignore
//! use unistore_core::query::{Filter, Projection, Query, SortDirection};
//!
//! let query = Query::builder()
//!     .filter(Filter::eq("college", "IIT Delhi").and(Filter::gt("age", 20)))
//!     .sort("age", SortDirection::Desc)
//!     .projection(Projection::include(["name", "college"]))
//!     .batch_size(2)
//!     .build();
//! ```

use bson::{Bson, Document};

use crate::{error::DocumentStoreError, record::ID_FIELD};

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// The numeric form document stores use for sort and index keys.
    pub fn as_i32(&self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

/// A single sort key.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

/// Field comparison operators for filter expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Substring match for strings, "contains all of" for arrays.
    Contains,
    /// Negation of [`FieldOp::Contains`].
    NotContains,
    StartsWith,
    EndsWith,
    /// The field equals (or, for arrays, holds) any of the values.
    AnyOf,
    /// The field equals (or, for arrays, holds) none of the values.
    NoneOf,
    /// The array field has exactly this many elements.
    Size,
}

/// A filter expression for selecting records.
///
/// Expressions can be combined with [`Expr::and`], [`Expr::or`] and [`Expr::not`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Matches every record in the collection.
    All,
    /// Logical AND of multiple expressions (all must match).
    And(Vec<Expr>),
    /// Logical OR of multiple expressions (any must match).
    Or(Vec<Expr>),
    /// Logical NOT of an expression.
    Not(Box<Expr>),
    /// Checks if a field is present or absent.
    Exists(String, bool),
    /// Field comparison expression.
    Field {
        field: String,
        op: FieldOp,
        value: Bson,
    },
}

impl Expr {
    /// Creates a field comparison expression.
    pub fn field(field: String, op: FieldOp, value: Bson) -> Self {
        Expr::Field { field, op, value }
    }

    /// Combines this expression with another using logical AND.
    ///
    /// If this expression is already an AND, the other expression is appended
    /// to the list. `All` is the identity.
    pub fn and(self, other: Expr) -> Self {
        match (self, other) {
            (Expr::All, other) => other,
            (this, Expr::All) => this,
            (Expr::And(mut list), other) => {
                list.push(other);
                Expr::And(list)
            }
            (this, other) => Expr::And(vec![this, other]),
        }
    }

    /// Combines this expression with another using logical OR.
    ///
    /// If this expression is already an OR, the other expression is appended
    /// to the list.
    pub fn or(self, other: Expr) -> Self {
        match self {
            Expr::Or(mut list) => {
                list.push(other);
                Expr::Or(list)
            }
            _ => Expr::Or(vec![self, other]),
        }
    }

    /// Negates this expression (logical NOT).
    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// Whether this is the empty filter.
    pub fn is_all(&self) -> bool {
        matches!(self, Expr::All)
    }
}

impl Default for Expr {
    fn default() -> Self {
        Expr::All
    }
}

/// Helper struct for constructing filter expressions.
///
/// All methods accept field names and values as `Into<String>` and `Into<Bson>`.
///
/// ```ignore
/// let expr = Filter::eq("name", "Aarav Sharma").and(Filter::gt("age", 18));
/// ```
pub struct Filter;

impl Filter {
    /// The empty filter: matches every record in the collection.
    pub fn all() -> Expr {
        Expr::All
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Eq, value.into())
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Ne, value.into())
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gt, value.into())
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gte, value.into())
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Lt, value.into())
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Lte, value.into())
    }

    /// Matches records whose string field starts with the value.
    pub fn starts_with(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::StartsWith, value.into())
    }

    /// Matches records whose string field ends with the value.
    pub fn ends_with(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::EndsWith, value.into())
    }

    /// Matches a substring of a string field, or every listed element of an array field.
    pub fn contains(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Contains, value.into())
    }

    pub fn not_contains(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::NotContains, value.into())
    }

    /// Matches records where the field is present.
    pub fn exists(field: impl Into<String>) -> Expr {
        Expr::Exists(field.into(), true)
    }

    /// Matches records where the field is absent.
    pub fn not_exists(field: impl Into<String>) -> Expr {
        Expr::Exists(field.into(), false)
    }

    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(exprs.into_iter().collect())
    }

    pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Or(exprs.into_iter().collect())
    }

    /// Matches records where the field equals any of the values (`$in`).
    pub fn any_of<V: Into<Bson>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Expr {
        Expr::field(
            field.into(),
            FieldOp::AnyOf,
            Bson::Array(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Matches records where the field equals none of the values (`$nin`).
    pub fn none_of<V: Into<Bson>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Expr {
        Expr::field(
            field.into(),
            FieldOp::NoneOf,
            Bson::Array(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Matches records whose array field holds exactly `len` elements.
    pub fn size(field: impl Into<String>, len: i64) -> Expr {
        Expr::field(field.into(), FieldOp::Size, Bson::Int64(len))
    }
}

/// Selects the top-level fields a read returns.
///
/// The record identifier stays unless an [`Projection::Exclude`] names it.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// Only these fields.
    Include(Vec<String>),
    /// Every field except these.
    Exclude(Vec<String>),
}

impl Projection {
    pub fn include<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Projection::Include(fields.into_iter().map(Into::into).collect())
    }

    pub fn exclude<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Projection::Exclude(fields.into_iter().map(Into::into).collect())
    }

    pub fn fields(&self) -> &[String] {
        match self {
            Projection::Include(fields) | Projection::Exclude(fields) => fields,
        }
    }

    /// Applies the projection to a stored document, keeping field order.
    pub fn apply(&self, document: Document) -> Document {
        match self {
            Projection::Include(fields) => document
                .into_iter()
                .filter(|(key, _)| key == ID_FIELD || fields.contains(key))
                .collect(),
            Projection::Exclude(fields) => document
                .into_iter()
                .filter(|(key, _)| !fields.contains(key))
                .collect(),
        }
    }
}

/// A structured read: filter, ordering, window, projection and batching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Filter expression; [`Expr::All`] when unset.
    pub filter: Expr,
    /// Maximum number of records to return. `Some(0)` reads as no limit.
    pub limit: Option<usize>,
    /// Number of records to skip.
    pub offset: Option<usize>,
    /// Sort keys, applied in order.
    pub sort: Vec<Sort>,
    /// Fields to return; whole records when unset.
    pub projection: Option<Projection>,
    /// Number of records the store returns per round trip.
    pub batch_size: Option<u32>,
}

impl Query {
    /// Creates a query that matches every record.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }
}

impl From<Expr> for Query {
    fn from(filter: Expr) -> Self {
        Query { filter, ..Default::default() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    pub fn new() -> Self {
        QueryBuilder { query: Query::default() }
    }

    /// Sets the filter expression for this query.
    pub fn filter(mut self, filter: Expr) -> Self {
        self.query.filter = filter;
        self
    }

    /// Sets the maximum number of records to return. A limit of zero clears
    /// it, matching MongoDB.
    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = (limit > 0).then_some(limit);
        self
    }

    /// Sets the number of records to skip.
    pub fn offset(mut self, offset: usize) -> Self {
        self.query.offset = Some(offset);
        self
    }

    /// Appends a sort key. Earlier keys take precedence.
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.query.sort.push(Sort { field: field.into(), direction });
        self
    }

    pub fn projection(mut self, projection: Projection) -> Self {
        self.query.projection = Some(projection);
        self
    }

    /// Sets how many records the store hands back per batch.
    pub fn batch_size(mut self, batch_size: u32) -> Self {
        self.query.batch_size = Some(batch_size);
        self
    }

    pub fn build(self) -> Query {
        self.query
    }
}

pub trait QueryVisitor {
    type Output;
    type Error: Into<DocumentStoreError>;

    fn visit_all(&mut self) -> Result<Self::Output, Self::Error>;
    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error>;
    fn visit_exists(
        &mut self,
        field: &str,
        should_exist: bool,
    ) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::All => self.visit_all(),
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Or(exprs) => self.visit_or(exprs),
            Expr::Not(expr) => self.visit_not(expr),
            Expr::Exists(field, should_exist) => self.visit_exists(field, *should_exist),
            Expr::Field { field, op, value } => self.visit_field(field, op, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_flattens_and_drops_all() {
        let expr = Filter::all()
            .and(Filter::eq("name", "Priya Singh"))
            .and(Filter::gt("age", 19))
            .and(Filter::all());

        assert_eq!(
            expr,
            Expr::And(vec![Filter::eq("name", "Priya Singh"), Filter::gt("age", 19)])
        );
    }

    #[test]
    fn or_appends_to_existing_list() {
        let expr = Filter::lt("age", 20).or(Filter::gte("age", 25)).or(Filter::eq("age", 22));

        match expr {
            Expr::Or(list) => assert_eq!(list.len(), 3),
            other => panic!("expected OR, got {other:?}"),
        }
    }

    #[test]
    fn membership_filters_wrap_values_in_array() {
        let expr = Filter::any_of("name", ["Isha Reddy", "Rohan Kumar"]);

        assert_eq!(
            expr,
            Expr::field(
                "name".into(),
                FieldOp::AnyOf,
                Bson::Array(vec!["Isha Reddy".into(), "Rohan Kumar".into()]),
            )
        );
    }

    #[test]
    fn builder_collects_sort_keys_in_order() {
        let query = Query::builder()
            .sort("college", SortDirection::Asc)
            .sort("age", SortDirection::Desc)
            .batch_size(2)
            .limit(5)
            .build();

        assert!(query.filter.is_all());
        assert_eq!(query.sort[0].field, "college");
        assert_eq!(query.sort[1].direction.as_i32(), -1);
        assert_eq!(query.batch_size, Some(2));
        assert_eq!(query.limit, Some(5));
    }

    #[test]
    fn zero_limit_means_no_limit() {
        let query = Query::builder().limit(5).limit(0).build();

        assert_eq!(query.limit, None);
    }

    #[test]
    fn include_projection_keeps_the_identifier() {
        let document = bson::doc! { "_id": 1, "name": "Priya Singh", "age": 20, "college": "Mumbai University" };

        let projected = Projection::include(["college", "name"]).apply(document);

        assert_eq!(projected, bson::doc! { "_id": 1, "name": "Priya Singh", "college": "Mumbai University" });
    }

    #[test]
    fn exclude_projection_drops_named_fields() {
        let document = bson::doc! { "_id": 1, "name": "Priya Singh", "age": 20 };

        let projected = Projection::exclude(["age", "missing"]).apply(document);

        assert_eq!(projected, bson::doc! { "_id": 1, "name": "Priya Singh" });
        assert_eq!(Projection::exclude(["age"]).fields(), ["age".to_string()]);
    }
}
