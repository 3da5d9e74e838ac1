//! Storage backend abstraction for the document store.
//!
//! This module defines the client contract a document store driver has to
//! fulfil. Everything above it ([`crate::collection`], [`crate::store`]) is
//! written against [`StoreBackend`] only, so the same operations run against
//! MongoDB or the in-memory store.
//!
//! Backends work on raw BSON [`Document`]s; typed records are encoded and
//! decoded one layer up.
//!
//! # Examples
//!
//! ```ignore
//! use unistore_core::{backend::StoreBackend, query::Filter};
//! use bson::doc;
//!
//! let backend = MyBackendImpl::new();
//!
//! let inserted = backend.insert_one(doc! { "name": "Isha Reddy", "age": 20 }, "students").await?;
//! let found = backend.find_one(&Filter::eq("name", "Isha Reddy"), "students").await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use bson::Document;
use std::{fmt::Debug, sync::Arc};

use crate::{
    cursor::DocumentStream,
    error::DocumentStoreResult,
    index::IndexSpec,
    query::{Expr, Query},
    result::{BulkWriteResult, DeleteResult, InsertManyResult, InsertOneResult, UpdateResult},
    update::Update,
};

/// One operation inside a bulk write, on raw documents.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    InsertOne(Document),
    UpdateOne { filter: Expr, update: Update },
    UpdateMany { filter: Expr, update: Update },
    DeleteOne { filter: Expr },
    DeleteMany { filter: Expr },
}

/// Abstract interface for document storage backends.
///
/// # Semantics
///
/// - The store assigns record identifiers; documents passed to inserts never
///   carry one.
/// - `find_one` returns `Ok(None)` when nothing matches. That is not an error.
/// - Update results count matched and actually modified records separately.
/// - An [`Expr::All`] filter targets the whole collection, for every operation.
/// - No operation retries on failure.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the handle is shared read-only by
/// every operation issued through a [`crate::store::DocumentStore`].
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Human-readable backend name used in log and status lines.
    fn name(&self) -> &str;

    /// Round-trips a no-op command to verify the store is reachable.
    async fn ping(&self) -> DocumentStoreResult<()>;

    /// Stores one document and returns the identifier the store assigned.
    async fn insert_one(
        &self,
        document: Document,
        collection: &str,
    ) -> DocumentStoreResult<InsertOneResult>;

    /// Stores all documents as a single request. Identifiers come back in
    /// submission order. Whether a failed request leaves a prefix behind is up
    /// to the store.
    async fn insert_many(
        &self,
        documents: Vec<Document>,
        collection: &str,
    ) -> DocumentStoreResult<InsertManyResult>;

    /// Returns the first document matching `filter`, in store order.
    async fn find_one(
        &self,
        filter: &Expr,
        collection: &str,
    ) -> DocumentStoreResult<Option<Document>>;

    /// Opens a lazy, batched stream over the documents selected by `query`.
    async fn find(&self, query: Query, collection: &str) -> DocumentStoreResult<DocumentStream>;

    /// Counts the documents matching `filter`.
    async fn count_documents(&self, filter: &Expr, collection: &str) -> DocumentStoreResult<u64>;

    /// Applies `update` to at most one matching document.
    async fn update_one(
        &self,
        filter: &Expr,
        update: &Update,
        collection: &str,
    ) -> DocumentStoreResult<UpdateResult>;

    /// Applies `update` to every matching document.
    async fn update_many(
        &self,
        filter: &Expr,
        update: &Update,
        collection: &str,
    ) -> DocumentStoreResult<UpdateResult>;

    /// Deletes at most one matching document.
    async fn delete_one(&self, filter: &Expr, collection: &str) -> DocumentStoreResult<DeleteResult>;

    /// Deletes every matching document.
    async fn delete_many(&self, filter: &Expr, collection: &str) -> DocumentStoreResult<DeleteResult>;

    /// Submits a heterogeneous batch as one logical request and reports
    /// aggregate counts per operation kind.
    async fn bulk_write(
        &self,
        operations: Vec<WriteOp>,
        collection: &str,
    ) -> DocumentStoreResult<BulkWriteResult>;

    /// Creates an index and returns its name.
    async fn create_index(&self, index: IndexSpec, collection: &str) -> DocumentStoreResult<String>;

    /// Drops an index by name.
    async fn drop_index(&self, name: &str, collection: &str) -> DocumentStoreResult<()>;

    /// Lists the collection names in the database.
    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>>;

    /// Drops a collection with all its documents and indexes.
    async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()>;

    /// Releases the connection. The default is a no-op for backends without
    /// external resources.
    async fn shutdown(&self) -> DocumentStoreResult<()> {
        Ok(())
    }
}

macro_rules! forward_store_backend {
    ($($wrapper:ty),+ $(,)?) => {$(
        #[async_trait]
        impl<B> StoreBackend for $wrapper
        where
            B: StoreBackend + ?Sized,
        {
            fn name(&self) -> &str {
                (**self).name()
            }

            async fn ping(&self) -> DocumentStoreResult<()> {
                (**self).ping().await
            }

            async fn insert_one(
                &self,
                document: Document,
                collection: &str,
            ) -> DocumentStoreResult<InsertOneResult> {
                (**self).insert_one(document, collection).await
            }

            async fn insert_many(
                &self,
                documents: Vec<Document>,
                collection: &str,
            ) -> DocumentStoreResult<InsertManyResult> {
                (**self).insert_many(documents, collection).await
            }

            async fn find_one(
                &self,
                filter: &Expr,
                collection: &str,
            ) -> DocumentStoreResult<Option<Document>> {
                (**self).find_one(filter, collection).await
            }

            async fn find(&self, query: Query, collection: &str) -> DocumentStoreResult<DocumentStream> {
                (**self).find(query, collection).await
            }

            async fn count_documents(&self, filter: &Expr, collection: &str) -> DocumentStoreResult<u64> {
                (**self).count_documents(filter, collection).await
            }

            async fn update_one(
                &self,
                filter: &Expr,
                update: &Update,
                collection: &str,
            ) -> DocumentStoreResult<UpdateResult> {
                (**self).update_one(filter, update, collection).await
            }

            async fn update_many(
                &self,
                filter: &Expr,
                update: &Update,
                collection: &str,
            ) -> DocumentStoreResult<UpdateResult> {
                (**self).update_many(filter, update, collection).await
            }

            async fn delete_one(&self, filter: &Expr, collection: &str) -> DocumentStoreResult<DeleteResult> {
                (**self).delete_one(filter, collection).await
            }

            async fn delete_many(&self, filter: &Expr, collection: &str) -> DocumentStoreResult<DeleteResult> {
                (**self).delete_many(filter, collection).await
            }

            async fn bulk_write(
                &self,
                operations: Vec<WriteOp>,
                collection: &str,
            ) -> DocumentStoreResult<BulkWriteResult> {
                (**self).bulk_write(operations, collection).await
            }

            async fn create_index(&self, index: IndexSpec, collection: &str) -> DocumentStoreResult<String> {
                (**self).create_index(index, collection).await
            }

            async fn drop_index(&self, name: &str, collection: &str) -> DocumentStoreResult<()> {
                (**self).drop_index(name, collection).await
            }

            async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
                (**self).list_collections().await
            }

            async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()> {
                (**self).drop_collection(name).await
            }

            async fn shutdown(&self) -> DocumentStoreResult<()> {
                (**self).shutdown().await
            }
        }
    )+};
}

forward_store_backend!(&B, Box<B>, Arc<B>);

/// A backend chosen at runtime.
pub type BoxedStoreBackend = Box<dyn StoreBackend>;

#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    /// Parses the address and opens the client. Implementations should fail
    /// with [`crate::error::DocumentStoreError::Connection`] when the address is
    /// malformed.
    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}
