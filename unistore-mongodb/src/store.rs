use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use bson::{Bson, Document, doc};
use mongodb::{
    Client, Collection as MongoCollection, IndexModel,
    error::{Error as MongoError, ErrorKind},
    options::{
        ClientOptions, DeleteManyModel, DeleteOneModel, FindOptions, IndexOptions, InsertOneModel,
        UpdateManyModel, UpdateModifications, UpdateOneModel, WriteModel,
    },
};
use tracing::debug;
use unistore_core::{
    backend::{StoreBackend, StoreBackendBuilder, WriteOp},
    cursor::DocumentStream,
    error::{DocumentStoreError, DocumentStoreResult},
    index::IndexSpec,
    query::{Expr, Query},
    result::{BulkWriteResult, DeleteResult, InsertManyResult, InsertOneResult, RecordId, UpdateResult},
    update::Update,
};

use crate::{
    query::{MongoQueryTranslator, projection_document, sort_document},
    update::update_document,
};


/// Sorts driver failures into the store error kinds callers branch on.
fn map_error(err: MongoError) -> DocumentStoreError {
    match *err.kind {
        ErrorKind::Write(_) | ErrorKind::InsertMany(_) | ErrorKind::BulkWrite(_) => {
            DocumentStoreError::Write(err.to_string())
        }
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::DnsResolve { .. }
        | ErrorKind::Authentication { .. }
        | ErrorKind::ConnectionPoolCleared { .. } => DocumentStoreError::Connection(err.to_string()),
        ErrorKind::InvalidArgument { .. } => DocumentStoreError::Configuration(err.to_string()),
        _ => DocumentStoreError::Backend(err.to_string()),
    }
}

fn to_update_result(result: mongodb::results::UpdateResult) -> UpdateResult {
    UpdateResult {
        matched_count: result.matched_count,
        modified_count: result.modified_count,
    }
}

fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

/// Window, order, projection and batching of a read. A zero limit is left
/// unset; oversized limits saturate instead of wrapping negative.
fn find_options(query: &Query) -> FindOptions {
    let mut options = FindOptions::default();

    if let Some(limit) = query.limit.filter(|limit| *limit > 0) {
        options.limit = Some(i64::try_from(limit).unwrap_or(i64::MAX));
    }
    if let Some(skip) = query.offset {
        options.skip = Some(u64::try_from(skip).unwrap_or(u64::MAX));
    }
    if !query.sort.is_empty() {
        options.sort = Some(sort_document(&query.sort));
    }
    options.projection = query.projection.as_ref().map(projection_document);
    options.batch_size = query.batch_size;

    options
}


#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    fn write_model(&self, operation: WriteOp, collection: &MongoCollection<Document>) -> DocumentStoreResult<WriteModel> {
        let namespace = collection.namespace();

        Ok(match operation {
            WriteOp::InsertOne(document) => InsertOneModel::builder()
                .namespace(namespace)
                .document(document)
                .build()
                .into(),
            WriteOp::UpdateOne { filter, update } => UpdateOneModel::builder()
                .namespace(namespace)
                .filter(MongoQueryTranslator::translate(&filter)?)
                .update(UpdateModifications::Document(update_document(&update)))
                .build()
                .into(),
            WriteOp::UpdateMany { filter, update } => UpdateManyModel::builder()
                .namespace(namespace)
                .filter(MongoQueryTranslator::translate(&filter)?)
                .update(UpdateModifications::Document(update_document(&update)))
                .build()
                .into(),
            WriteOp::DeleteOne { filter } => DeleteOneModel::builder()
                .namespace(namespace)
                .filter(MongoQueryTranslator::translate(&filter)?)
                .build()
                .into(),
            WriteOp::DeleteMany { filter } => DeleteManyModel::builder()
                .namespace(namespace)
                .filter(MongoQueryTranslator::translate(&filter)?)
                .build()
                .into(),
        })
    }
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    fn name(&self) -> &str {
        "MongoDB"
    }

    async fn ping(&self) -> DocumentStoreResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(map_error)?;

        Ok(())
    }

    async fn insert_one(&self, document: Document, collection: &str) -> DocumentStoreResult<InsertOneResult> {
        let result = self.get_collection(collection)
            .insert_one(document)
            .await
            .map_err(map_error)?;

        Ok(InsertOneResult { inserted_id: RecordId::new(result.inserted_id) })
    }

    async fn insert_many(&self, documents: Vec<Document>, collection: &str) -> DocumentStoreResult<InsertManyResult> {
        let result = self.get_collection(collection)
            .insert_many(documents)
            .await
            .map_err(map_error)?;

        // the driver keys identifiers by submission index
        let mut ids = result.inserted_ids.into_iter().collect::<Vec<_>>();
        ids.sort_by_key(|(index, _)| *index);

        Ok(InsertManyResult {
            inserted_ids: ids
                .into_iter()
                .map(|(_, id)| RecordId::new(id))
                .collect(),
        })
    }

    async fn find_one(&self, filter: &Expr, collection: &str) -> DocumentStoreResult<Option<Document>> {
        self.get_collection(collection)
            .find_one(MongoQueryTranslator::translate(filter)?)
            .await
            .map_err(map_error)
    }

    async fn find(&self, query: Query, collection: &str) -> DocumentStoreResult<DocumentStream> {
        let options = find_options(&query);
        let filter = MongoQueryTranslator::translate(&query.filter)?;
        debug!(collection, ?filter, batch_size = ?options.batch_size, "opening MongoDB cursor");

        Ok(
            self.get_collection(collection)
                .find(filter)
                .with_options(options)
                .await
                .map_err(map_error)?
                .map_err(map_error)
                .boxed()
        )
    }

    async fn count_documents(&self, filter: &Expr, collection: &str) -> DocumentStoreResult<u64> {
        self.get_collection(collection)
            .count_documents(MongoQueryTranslator::translate(filter)?)
            .await
            .map_err(map_error)
    }

    async fn update_one(&self, filter: &Expr, update: &Update, collection: &str) -> DocumentStoreResult<UpdateResult> {
        self.get_collection(collection)
            .update_one(MongoQueryTranslator::translate(filter)?, update_document(update))
            .await
            .map(to_update_result)
            .map_err(map_error)
    }

    async fn update_many(&self, filter: &Expr, update: &Update, collection: &str) -> DocumentStoreResult<UpdateResult> {
        self.get_collection(collection)
            .update_many(MongoQueryTranslator::translate(filter)?, update_document(update))
            .await
            .map(to_update_result)
            .map_err(map_error)
    }

    async fn delete_one(&self, filter: &Expr, collection: &str) -> DocumentStoreResult<DeleteResult> {
        let result = self.get_collection(collection)
            .delete_one(MongoQueryTranslator::translate(filter)?)
            .await
            .map_err(map_error)?;

        Ok(DeleteResult { deleted_count: result.deleted_count })
    }

    async fn delete_many(&self, filter: &Expr, collection: &str) -> DocumentStoreResult<DeleteResult> {
        let result = self.get_collection(collection)
            .delete_many(MongoQueryTranslator::translate(filter)?)
            .await
            .map_err(map_error)?;

        Ok(DeleteResult { deleted_count: result.deleted_count })
    }

    async fn bulk_write(&self, operations: Vec<WriteOp>, collection: &str) -> DocumentStoreResult<BulkWriteResult> {
        let target = self.get_collection(collection);
        let models = operations
            .into_iter()
            .map(|operation| self.write_model(operation, &target))
            .collect::<DocumentStoreResult<Vec<_>>>()?;

        let result = self.client
            .bulk_write(models)
            .await
            .map_err(map_error)?;

        Ok(BulkWriteResult {
            inserted_count: count(result.inserted_count),
            matched_count: count(result.matched_count),
            modified_count: count(result.modified_count),
            deleted_count: count(result.deleted_count),
        })
    }

    async fn create_index(&self, index: IndexSpec, collection: &str) -> DocumentStoreResult<String> {
        let keys = index.keys
            .iter()
            .map(|(field, direction)| (field.clone(), Bson::Int32(direction.as_i32())))
            .collect::<Document>();

        let result = self.get_collection(collection)
            .create_index(
                IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                    .unique(index.unique)
                    .name(index.resolved_name())
                    .build()
                )
                .build()
            )
            .await
            .map_err(map_error)?;

        Ok(result.index_name)
    }

    async fn drop_index(&self, name: &str, collection: &str) -> DocumentStoreResult<()> {
        self.get_collection(collection)
            .drop_index(name)
            .await
            .map_err(map_error)?;

        Ok(())
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        self.client
            .database(&self.database)
            .list_collection_names()
            .await
            .map_err(map_error)
    }

    async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.get_collection(name)
            .drop()
            .await
            .map_err(map_error)?;

        Ok(())
    }

    async fn shutdown(&self) -> DocumentStoreResult<()> {
        self.client.clone().shutdown().await;

        Ok(())
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(MongoDbStore::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| DocumentStoreError::Connection(e.to_string()))?,
            )
            .map_err(|e| DocumentStoreError::Connection(e.to_string()))?,
            self.database,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unistore_core::query::Projection;

    #[tokio::test]
    async fn malformed_address_is_a_connection_error() {
        let result = MongoDbStore::builder("not-a-mongo-uri", "university").build().await;

        assert!(matches!(result, Err(DocumentStoreError::Connection(_))));
    }

    #[test]
    fn find_options_normalise_the_window() {
        let unlimited = find_options(&Query { limit: Some(0), ..Query::default() });
        assert_eq!(unlimited.limit, None);

        let huge = find_options(&Query { limit: Some(usize::MAX), offset: Some(3), ..Query::default() });
        assert_eq!(huge.limit, Some(i64::MAX));
        assert_eq!(huge.skip, Some(3));
    }

    #[test]
    fn find_options_carry_projection_and_batch_size() {
        let options = find_options(
            &Query::builder()
                .projection(Projection::include(["name", "college"]))
                .batch_size(2)
                .build(),
        );

        assert_eq!(options.projection, Some(doc! { "name": 1, "college": 1 }));
        assert_eq!(options.batch_size, Some(2));
    }

    #[test]
    fn negative_counts_clamp_to_zero() {
        assert_eq!(count(-1), 0);
        assert_eq!(count(3), 3);
    }
}
