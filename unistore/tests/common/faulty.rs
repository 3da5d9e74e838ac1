//! A store backend that fails or stalls on demand, for connection and
//! shutdown paths the in-memory store never takes.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use unistore::{
    bson::Document,
    cursor::DocumentStream,
    memory::InMemoryStore,
    prelude::*,
};

#[derive(Debug, Clone, Copy, Default)]
pub enum Fault {
    #[default]
    None,
    /// Fails with a connection error.
    Fail,
    /// Sleeps this long, then succeeds.
    Stall(Duration),
}

impl Fault {
    async fn inject(self, operation: &str) -> DocumentStoreResult<()> {
        match self {
            Fault::None => Ok(()),
            Fault::Fail => Err(DocumentStoreError::Connection(format!("{operation} refused"))),
            Fault::Stall(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}

/// Delegates to an [`InMemoryStore`] except where a fault is configured.
#[derive(Debug, Clone, Default)]
pub struct FaultyStore {
    inner: InMemoryStore,
    ping: Fault,
    shutdown: Fault,
    closed: Arc<AtomicBool>,
}

impl FaultyStore {
    pub fn failing_ping(mut self, fault: Fault) -> Self {
        self.ping = fault;
        self
    }

    pub fn failing_shutdown(mut self, fault: Fault) -> Self {
        self.shutdown = fault;
        self
    }

    /// Whether `shutdown` was called, whatever it returned.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }

    pub fn builder(self) -> FaultyStoreBuilder {
        FaultyStoreBuilder { store: self, build: Fault::None }
    }
}

pub struct FaultyStoreBuilder {
    store: FaultyStore,
    build: Fault,
}

impl FaultyStoreBuilder {
    pub fn failing_build(mut self, fault: Fault) -> Self {
        self.build = fault;
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for FaultyStoreBuilder {
    type Backend = FaultyStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        self.build.inject("connect").await?;
        Ok(self.store)
    }
}

#[async_trait]
impl StoreBackend for FaultyStore {
    fn name(&self) -> &str {
        "faulty store"
    }

    async fn ping(&self) -> DocumentStoreResult<()> {
        self.ping.inject("ping").await?;
        self.inner.ping().await
    }

    async fn insert_one(&self, document: Document, collection: &str) -> DocumentStoreResult<InsertOneResult> {
        self.inner.insert_one(document, collection).await
    }

    async fn insert_many(&self, documents: Vec<Document>, collection: &str) -> DocumentStoreResult<InsertManyResult> {
        self.inner.insert_many(documents, collection).await
    }

    async fn find_one(&self, filter: &Expr, collection: &str) -> DocumentStoreResult<Option<Document>> {
        self.inner.find_one(filter, collection).await
    }

    async fn find(&self, query: Query, collection: &str) -> DocumentStoreResult<DocumentStream> {
        self.inner.find(query, collection).await
    }

    async fn count_documents(&self, filter: &Expr, collection: &str) -> DocumentStoreResult<u64> {
        self.inner.count_documents(filter, collection).await
    }

    async fn update_one(&self, filter: &Expr, update: &Update, collection: &str) -> DocumentStoreResult<UpdateResult> {
        self.inner.update_one(filter, update, collection).await
    }

    async fn update_many(&self, filter: &Expr, update: &Update, collection: &str) -> DocumentStoreResult<UpdateResult> {
        self.inner.update_many(filter, update, collection).await
    }

    async fn delete_one(&self, filter: &Expr, collection: &str) -> DocumentStoreResult<DeleteResult> {
        self.inner.delete_one(filter, collection).await
    }

    async fn delete_many(&self, filter: &Expr, collection: &str) -> DocumentStoreResult<DeleteResult> {
        self.inner.delete_many(filter, collection).await
    }

    async fn bulk_write(&self, operations: Vec<WriteOp>, collection: &str) -> DocumentStoreResult<BulkWriteResult> {
        self.inner.bulk_write(operations, collection).await
    }

    async fn create_index(&self, index: IndexSpec, collection: &str) -> DocumentStoreResult<String> {
        self.inner.create_index(index, collection).await
    }

    async fn drop_index(&self, name: &str, collection: &str) -> DocumentStoreResult<()> {
        self.inner.drop_index(name, collection).await
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        self.inner.list_collections().await
    }

    async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.inner.drop_collection(name).await
    }

    async fn shutdown(&self) -> DocumentStoreResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        self.shutdown.inject("shutdown").await?;
        self.inner.shutdown().await
    }
}
