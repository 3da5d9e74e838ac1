//! Typed collection handles: the insert, read, update, delete, bulk write and
//! cursor operations.
//!
//! A [`TypedCollection`] borrows the backend of a [`crate::store::DocumentStore`]
//! together with its [`Deadline`]. Every call encodes its records, runs one
//! backend operation under the deadline and decodes the outcome. Nothing is
//! cached and nothing is retried.
//!
//! # Example
//!
//! ```ignore
//! let students = store.typed_collection::<Student>();
//!
//! let inserted = students.insert_one(aarav).await?;
//! let result = students
//!     .update_one(Filter::eq("name", "Aarav Sharma"), Update::new().set("age", 22))
//!     .await?;
//!
//! match students.find_one(Filter::eq("name", "Aarav Sharma")).await? {
//!     Some(student) => println!("{student:?}"),
//!     None => println!("No document was found with that filter"),
//! }
//! ```

use std::marker::PhantomData;

use tracing::debug;

use crate::{
    backend::{StoreBackend, WriteOp},
    cursor::RecordCursor,
    deadline::Deadline,
    error::{DocumentStoreError, DocumentStoreResult},
    index::IndexSpec,
    query::{Expr, Query},
    record::{Record, RecordExt},
    result::{BulkWriteResult, DeleteResult, InsertManyResult, InsertOneResult, UpdateResult},
    update::Update,
};

/// One typed operation inside a bulk write.
#[derive(Debug, Clone)]
pub enum WriteModel<D: Record> {
    InsertOne(D),
    UpdateOne { filter: Expr, update: Update },
    UpdateMany { filter: Expr, update: Update },
    DeleteOne { filter: Expr },
    DeleteMany { filter: Expr },
}

impl<D: Record> WriteModel<D> {
    fn into_op(self) -> DocumentStoreResult<WriteOp> {
        Ok(match self {
            WriteModel::InsertOne(record) => WriteOp::InsertOne(record.to_document()?),
            WriteModel::UpdateOne { filter, update } => {
                update.validate()?;
                WriteOp::UpdateOne { filter, update }
            }
            WriteModel::UpdateMany { filter, update } => {
                update.validate()?;
                WriteOp::UpdateMany { filter, update }
            }
            WriteModel::DeleteOne { filter } => WriteOp::DeleteOne { filter },
            WriteModel::DeleteMany { filter } => WriteOp::DeleteMany { filter },
        })
    }
}

/// A collection bound to a record type, a backend and a deadline.
#[derive(Debug)]
pub struct TypedCollection<'a, B: StoreBackend, D: Record> {
    name: String,
    backend: &'a B,
    deadline: Deadline,
    _marker: PhantomData<D>,
}

impl<'a, B: StoreBackend, D: Record> TypedCollection<'a, B, D> {
    pub(crate) fn new(name: String, backend: &'a B, deadline: Deadline) -> Self {
        Self { name, backend, deadline, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reinterprets the same collection with another record type.
    pub fn with_type<T: Record>(&self) -> TypedCollection<'a, B, T> {
        TypedCollection::new(self.name.clone(), self.backend, self.deadline)
    }

    /// Stores one record and returns the identifier the store assigned.
    ///
    /// # Errors
    ///
    /// [`DocumentStoreError::Write`] on a constraint violation, plus transport
    /// and deadline failures.
    pub async fn insert_one(&self, record: D) -> DocumentStoreResult<InsertOneResult> {
        let document = record.to_document()?;

        let result = self
            .deadline
            .run("insert_one", self.backend.insert_one(document, &self.name))
            .await?;

        debug!(collection = %self.name, id = %result.inserted_id, "inserted one record");

        Ok(result)
    }

    /// Stores all records in one request. Identifiers are returned in
    /// submission order.
    pub async fn insert_many(&self, records: Vec<D>) -> DocumentStoreResult<InsertManyResult> {
        if records.is_empty() {
            return Err(DocumentStoreError::InvalidDocument("insert_many needs at least one record".into()));
        }

        let documents = records
            .iter()
            .map(|record| record.to_document())
            .collect::<DocumentStoreResult<Vec<_>>>()?;

        let result = self
            .deadline
            .run("insert_many", self.backend.insert_many(documents, &self.name))
            .await?;

        debug!(collection = %self.name, count = result.inserted_ids.len(), "inserted records");

        Ok(result)
    }

    /// Returns the first record matching `filter`, or `None` when nothing matches.
    pub async fn find_one(&self, filter: Expr) -> DocumentStoreResult<Option<D>> {
        let found = self
            .deadline
            .run("find_one", self.backend.find_one(&filter, &self.name))
            .await?;

        debug!(collection = %self.name, found = found.is_some(), "find_one");

        found.map(D::from_document).transpose()
    }

    /// Opens a forward-only cursor over the records selected by `query`.
    ///
    /// Accepts a bare filter too, since `Expr: Into<Query>`.
    pub async fn find(&self, query: impl Into<Query>) -> DocumentStoreResult<RecordCursor<D>> {
        let query = query.into();

        debug!(collection = %self.name, batch_size = ?query.batch_size, "opening cursor");

        let stream = self
            .deadline
            .run("find", self.backend.find(query, &self.name))
            .await?;

        Ok(RecordCursor::new(stream).with_deadline(self.deadline))
    }

    /// Counts the records matching `filter`.
    pub async fn count_documents(&self, filter: Expr) -> DocumentStoreResult<u64> {
        self.deadline
            .run("count_documents", self.backend.count_documents(&filter, &self.name))
            .await
    }

    /// Applies `update` to at most one record matching `filter`.
    pub async fn update_one(&self, filter: Expr, update: Update) -> DocumentStoreResult<UpdateResult> {
        update.validate()?;

        let result = self
            .deadline
            .run("update_one", self.backend.update_one(&filter, &update, &self.name))
            .await?;

        debug!(
            collection = %self.name,
            matched = result.matched_count,
            modified = result.modified_count,
            "update_one"
        );

        Ok(result)
    }

    /// Applies `update` to every record matching `filter`. [`Expr::All`]
    /// updates the whole collection.
    pub async fn update_many(&self, filter: Expr, update: Update) -> DocumentStoreResult<UpdateResult> {
        update.validate()?;

        let result = self
            .deadline
            .run("update_many", self.backend.update_many(&filter, &update, &self.name))
            .await?;

        debug!(
            collection = %self.name,
            matched = result.matched_count,
            modified = result.modified_count,
            "update_many"
        );

        Ok(result)
    }

    /// Deletes at most one record matching `filter`. No match is a zero count,
    /// not an error.
    pub async fn delete_one(&self, filter: Expr) -> DocumentStoreResult<DeleteResult> {
        let result = self
            .deadline
            .run("delete_one", self.backend.delete_one(&filter, &self.name))
            .await?;

        debug!(collection = %self.name, deleted = result.deleted_count, "delete_one");

        Ok(result)
    }

    /// Deletes every record matching `filter`.
    pub async fn delete_many(&self, filter: Expr) -> DocumentStoreResult<DeleteResult> {
        let result = self
            .deadline
            .run("delete_many", self.backend.delete_many(&filter, &self.name))
            .await?;

        debug!(collection = %self.name, deleted = result.deleted_count, "delete_many");

        Ok(result)
    }

    /// Submits a heterogeneous batch as one request.
    pub async fn bulk_write(&self, models: Vec<WriteModel<D>>) -> DocumentStoreResult<BulkWriteResult> {
        if models.is_empty() {
            return Err(DocumentStoreError::InvalidDocument("bulk_write needs at least one operation".into()));
        }

        let operations = models
            .into_iter()
            .map(WriteModel::into_op)
            .collect::<DocumentStoreResult<Vec<_>>>()?;

        let result = self
            .deadline
            .run("bulk_write", self.backend.bulk_write(operations, &self.name))
            .await?;

        debug!(
            collection = %self.name,
            inserted = result.inserted_count,
            modified = result.modified_count,
            deleted = result.deleted_count,
            "bulk_write"
        );

        Ok(result)
    }

    /// Creates an index and returns its name.
    pub async fn create_index(&self, index: IndexSpec) -> DocumentStoreResult<String> {
        index.validate()?;

        self.deadline
            .run("create_index", self.backend.create_index(index, &self.name))
            .await
    }

    pub async fn drop_index(&self, name: &str) -> DocumentStoreResult<()> {
        self.deadline
            .run("drop_index", self.backend.drop_index(name, &self.name))
            .await
    }
}
