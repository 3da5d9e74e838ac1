//! Connection management: the deadline-bounded handle every operation goes through.
//!
//! [`DocumentStore::connect`] builds a backend, verifies it with a ping and fixes
//! the single [`Deadline`] inherited by every operation. The store is passed by
//! reference to whoever issues operations and released with
//! [`DocumentStore::shutdown`].
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use unistore_core::store::DocumentStore;
//!
//! let store = DocumentStore::connect(
//!     MongoDbStore::builder(&uri, "university"),
//!     Duration::from_secs(10),
//! )
//! .await?;
//!
//! let students = store.typed_collection::<Student>();
//! // ...
//! store.shutdown().await?;
//! ```

use std::time::Duration;

use tracing::{debug, info};

use crate::{
    backend::{BoxedStoreBackend, StoreBackend, StoreBackendBuilder},
    collection::TypedCollection,
    deadline::Deadline,
    error::DocumentStoreResult,
    record::Record,
};

/// A live, verified connection to a document store.
#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
    deadline: Deadline,
}

impl<B: StoreBackend> DocumentStore<B> {
    /// Wraps an already connected backend. No liveness check is made.
    pub fn new(backend: B, deadline: Deadline) -> Self {
        Self { backend, deadline }
    }

    /// Opens a connection and pings the store, all within `timeout`.
    ///
    /// The same deadline then bounds every operation issued through the
    /// returned store.
    ///
    /// # Errors
    ///
    /// [`crate::error::DocumentStoreError::Connection`] when the address is
    /// malformed or the store unreachable,
    /// [`crate::error::DocumentStoreError::DeadlineExceeded`] when `timeout`
    /// passes first.
    pub async fn connect<T>(builder: T, timeout: Duration) -> DocumentStoreResult<Self>
    where
        T: StoreBackendBuilder<Backend = B>,
    {
        let deadline = Deadline::after(timeout);

        let backend = deadline.run("connect", builder.build()).await?;
        deadline.run("ping", backend.ping()).await?;

        info!(backend = backend.name(), ?timeout, "Successfully connected to {}", backend.name());

        Ok(Self { backend, deadline })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    /// Re-runs the liveness check.
    pub async fn ping(&self) -> DocumentStoreResult<()> {
        self.deadline.run("ping", self.backend.ping()).await
    }

    /// Gets the collection a record type lives in.
    pub fn typed_collection<D: Record>(&self) -> TypedCollection<'_, B, D> {
        self.collection(D::collection_name())
    }

    /// Gets a collection by name, decoding its records as `D`.
    pub fn collection<D: Record>(&self, name: &str) -> TypedCollection<'_, B, D> {
        TypedCollection::new(name.to_string(), &self.backend, self.deadline)
    }

    pub async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        self.deadline
            .run("list_collections", self.backend.list_collections())
            .await
    }

    /// Drops a collection with all of its records and indexes.
    pub async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()> {
        debug!(collection = name, "dropping collection");

        self.deadline
            .run("drop_collection", self.backend.drop_collection(name))
            .await
    }

    /// Releases the connection.
    ///
    /// Not bounded by the deadline: the connection is released even after the
    /// deadline has passed.
    pub async fn shutdown(self) -> DocumentStoreResult<()> {
        self.backend.shutdown().await?;

        info!(backend = self.backend.name(), "connection closed");

        Ok(())
    }

    /// Erases the backend type, for backends chosen at runtime.
    pub fn into_dyn(self) -> DocumentStore<BoxedStoreBackend>
    where
        B: 'static,
    {
        DocumentStore {
            backend: Box::new(self.backend),
            deadline: self.deadline,
        }
    }
}
