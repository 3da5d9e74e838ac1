//! In-memory storage implementation for document stores.
//!
//! Collections are kept as insertion-ordered vectors of BSON documents behind
//! async-aware read-write locks, so iteration order follows insertion order the
//! way an unindexed collection scan does.

use std::{collections::HashMap, sync::Arc};
use async_trait::async_trait;
use futures::{StreamExt, stream};
use mea::rwlock::RwLock;
use bson::{Bson, Document, oid::ObjectId};
use tracing::debug;

use unistore_core::{
    backend::{StoreBackend, StoreBackendBuilder, WriteOp},
    cursor::DocumentStream,
    error::{DocumentStoreError, DocumentStoreResult},
    index::IndexSpec,
    query::{Expr, Query},
    record::ID_FIELD,
    result::{BulkWriteResult, DeleteResult, InsertManyResult, InsertOneResult, RecordId, UpdateResult},
    update::{FieldChange, Update},
};

use crate::evaluator::{DocumentEvaluator, compare_documents};

type CollectionDocs = Vec<Document>;
type StoreMap = HashMap<String, CollectionDocs>;
type IndexMap = HashMap<String, Vec<IndexSpec>>;

/// Batch size used when a query does not ask for one.
pub const DEFAULT_BATCH_SIZE: u32 = 101;


/// Thread-safe in-memory document storage backend.
///
/// Cloning an `InMemoryStore` yields another handle on the same data.
///
/// Indexes are bookkeeping only, except that unique indexes are enforced on
/// inserts and updates so duplicate-key write errors can be exercised without
/// a server.
///
/// # Example
///
/// ```ignore
/// use unistore_memory::InMemoryStore;
/// use unistore_core::{backend::StoreBackend, query::Filter};
/// use bson::doc;
///
/// let store = InMemoryStore::new();
/// store.insert_one(doc! { "name": "Isha Reddy", "age": 20 }, "students").await?;
///
/// let found = store.find_one(&Filter::eq("name", "Isha Reddy"), "students").await?;
/// assert!(found.is_some());
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection name -> documents, in insertion order
    store: Arc<RwLock<StoreMap>>,
    /// collection name -> index definitions
    indexes: Arc<RwLock<IndexMap>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
            indexes: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Indexes whose uniqueness is enforced for `collection`.
    async fn unique_indexes(&self, collection: &str) -> Vec<IndexSpec> {
        self.indexes
            .read()
            .await
            .get(collection)
            .map(|specs| specs.iter().filter(|spec| spec.unique).cloned().collect())
            .unwrap_or_default()
    }
}

/// Stamps a fresh identifier as the first field, as the store does on insert.
fn assign_id(document: Document) -> DocumentStoreResult<(RecordId, Document)> {
    if document.contains_key(ID_FIELD) {
        return Err(DocumentStoreError::InvalidDocument("documents must not carry an _id".into()));
    }

    let id = ObjectId::new();
    let mut stored = Document::new();
    stored.insert(ID_FIELD, id);
    stored.extend(document);

    Ok((RecordId::from(id), stored))
}

/// Fails with a write error when `candidate` collides with another document on
/// a unique index. `skip` is the candidate's own position when it is already stored.
fn check_unique(
    docs: &[Document],
    candidate: &Document,
    skip: Option<usize>,
    unique: &[IndexSpec],
) -> DocumentStoreResult<()> {
    for spec in unique {
        let key = |doc: &Document| -> Vec<Bson> {
            spec.keys
                .iter()
                .map(|(field, _)| doc.get(field).cloned().unwrap_or(Bson::Null))
                .collect()
        };
        let wanted = key(candidate);

        let duplicate = docs
            .iter()
            .enumerate()
            .any(|(pos, doc)| Some(pos) != skip && key(doc) == wanted);

        if duplicate {
            return Err(DocumentStoreError::Write(format!(
                "duplicate key on index {}",
                spec.resolved_name()
            )));
        }
    }

    Ok(())
}

fn checked_inc(field: &str, current: i64, by: i64) -> DocumentStoreResult<i64> {
    current.checked_add(by).ok_or_else(|| {
        DocumentStoreError::Write(format!("incrementing '{field}' by {by} overflows a 64-bit integer"))
    })
}

/// Applies field changes to a copy of `document`; returns the copy and
/// whether anything changed.
fn apply_update(document: &Document, update: &Update) -> DocumentStoreResult<(Document, bool)> {
    let mut updated = document.clone();

    for change in update.changes() {
        match change {
            FieldChange::Set(field, value) => {
                updated.insert(field.clone(), value.clone());
            }
            FieldChange::Unset(field) => {
                updated.remove(field);
            }
            FieldChange::Inc(field, by) => {
                let next = match (updated.get(field), by) {
                    (None, by) => by.clone(),
                    (Some(Bson::Int32(a)), Bson::Int32(b)) => match a.checked_add(*b) {
                        Some(sum) => Bson::Int32(sum),
                        None => Bson::Int64(*a as i64 + *b as i64),
                    },
                    (Some(Bson::Int32(a)), Bson::Int64(b)) => Bson::Int64(checked_inc(field, *a as i64, *b)?),
                    (Some(Bson::Int64(a)), Bson::Int32(b)) => Bson::Int64(checked_inc(field, *a, *b as i64)?),
                    (Some(Bson::Int64(a)), Bson::Int64(b)) => Bson::Int64(checked_inc(field, *a, *b)?),
                    (Some(Bson::Double(a)), Bson::Int32(b)) => Bson::Double(a + *b as f64),
                    (Some(Bson::Double(a)), Bson::Int64(b)) => Bson::Double(a + *b as f64),
                    (Some(Bson::Double(a)), Bson::Double(b)) => Bson::Double(a + b),
                    (Some(Bson::Int32(a)), Bson::Double(b)) => Bson::Double(*a as f64 + b),
                    (Some(Bson::Int64(a)), Bson::Double(b)) => Bson::Double(*a as f64 + b),
                    (Some(other), _) => {
                        return Err(DocumentStoreError::Write(format!(
                            "cannot increment non-numeric field '{field}' ({other})"
                        )));
                    }
                };
                updated.insert(field.clone(), next);
            }
        }
    }

    let changed = &updated != document;

    Ok((updated, changed))
}

/// Positions of the documents matching `filter`, in storage order.
fn matching_positions(docs: &[Document], filter: &Expr) -> DocumentStoreResult<Vec<usize>> {
    let mut positions = Vec::new();

    for (pos, doc) in docs.iter().enumerate() {
        if DocumentEvaluator::matches(doc, filter)? {
            positions.push(pos);
        }
    }

    Ok(positions)
}

fn insert_into(
    docs: &mut CollectionDocs,
    document: Document,
    unique: &[IndexSpec],
) -> DocumentStoreResult<RecordId> {
    let (id, stored) = assign_id(document)?;
    check_unique(docs, &stored, None, unique)?;
    docs.push(stored);

    Ok(id)
}

fn update_in(
    docs: &mut CollectionDocs,
    filter: &Expr,
    update: &Update,
    limit_one: bool,
    unique: &[IndexSpec],
) -> DocumentStoreResult<UpdateResult> {
    let mut positions = matching_positions(docs, filter)?;
    if limit_one {
        positions.truncate(1);
    }

    let mut result = UpdateResult { matched_count: positions.len() as u64, modified_count: 0 };

    for pos in positions {
        let (updated, changed) = apply_update(&docs[pos], update)?;

        if changed {
            check_unique(docs, &updated, Some(pos), unique)?;
            docs[pos] = updated;
            result.modified_count += 1;
        }
    }

    Ok(result)
}

fn delete_in(docs: &mut CollectionDocs, filter: &Expr, limit_one: bool) -> DocumentStoreResult<DeleteResult> {
    let mut positions = matching_positions(docs, filter)?;
    if limit_one {
        positions.truncate(1);
    }

    for pos in positions.iter().rev() {
        docs.remove(*pos);
    }

    Ok(DeleteResult { deleted_count: positions.len() as u64 })
}

fn id_of(document: &Document) -> Option<ObjectId> {
    document.get_object_id(ID_FIELD).ok()
}


#[async_trait]
impl StoreBackend for InMemoryStore {
    fn name(&self) -> &str {
        "in-memory store"
    }

    async fn ping(&self) -> DocumentStoreResult<()> {
        Ok(())
    }

    async fn insert_one(&self, document: Document, collection: &str) -> DocumentStoreResult<InsertOneResult> {
        let unique = self.unique_indexes(collection).await;
        let mut store = self.store.write().await;
        let docs = store.entry(collection.to_string()).or_default();

        Ok(InsertOneResult { inserted_id: insert_into(docs, document, &unique)? })
    }

    async fn insert_many(&self, documents: Vec<Document>, collection: &str) -> DocumentStoreResult<InsertManyResult> {
        let unique = self.unique_indexes(collection).await;
        let mut store = self.store.write().await;
        let docs = store.entry(collection.to_string()).or_default();

        // ordered insert: stops at the first failure, earlier records stay
        let mut inserted_ids = Vec::with_capacity(documents.len());
        for document in documents {
            inserted_ids.push(insert_into(docs, document, &unique)?);
        }

        Ok(InsertManyResult { inserted_ids })
    }

    async fn find_one(&self, filter: &Expr, collection: &str) -> DocumentStoreResult<Option<Document>> {
        let store = self.store.read().await;
        let Some(docs) = store.get(collection) else {
            return Ok(None);
        };

        for doc in docs {
            if DocumentEvaluator::matches(doc, filter)? {
                return Ok(Some(doc.clone()));
            }
        }

        Ok(None)
    }

    async fn find(&self, query: Query, collection: &str) -> DocumentStoreResult<DocumentStream> {
        // resolve the selection up front, then hand documents out batch by batch
        let ids = {
            let store = self.store.read().await;
            let mut selected = match store.get(collection) {
                Some(docs) => {
                    let mut selected = Vec::new();
                    for doc in docs {
                        if DocumentEvaluator::matches(doc, &query.filter)? {
                            selected.push(doc);
                        }
                    }
                    selected
                }
                None => Vec::new(),
            };

            if !query.sort.is_empty() {
                selected.sort_by(|a, b| compare_documents(a, b, &query.sort));
            }

            selected
                .into_iter()
                .skip(query.offset.unwrap_or(0))
                // a zero limit means no limit, as on MongoDB
                .take(query.limit.filter(|limit| *limit > 0).unwrap_or(usize::MAX))
                .filter_map(id_of)
                .collect::<Vec<_>>()
        };

        let batch_size = query.batch_size.unwrap_or(DEFAULT_BATCH_SIZE).max(1) as usize;
        let store = self.store.clone();
        let collection = collection.to_string();
        let projection = query.projection;

        debug!(collection = %collection, selected = ids.len(), batch_size, "opened in-memory cursor");

        let batches = ids
            .chunks(batch_size)
            .map(<[ObjectId]>::to_vec)
            .collect::<Vec<_>>();

        Ok(stream::iter(batches)
            .then(move |batch| {
                let store = store.clone();
                let collection = collection.clone();
                let projection = projection.clone();

                async move {
                    let store = store.read().await;
                    let docs = store.get(&collection).map(Vec::as_slice).unwrap_or_default();

                    // documents deleted since the cursor opened are skipped
                    batch
                        .into_iter()
                        .filter_map(|id| docs.iter().find(|doc| id_of(doc) == Some(id)).cloned())
                        .map(|doc| match &projection {
                            Some(projection) => Ok(projection.apply(doc)),
                            None => Ok(doc),
                        })
                        .collect::<Vec<_>>()
                }
            })
            .flat_map(stream::iter)
            .boxed())
    }

    async fn count_documents(&self, filter: &Expr, collection: &str) -> DocumentStoreResult<u64> {
        let store = self.store.read().await;

        match store.get(collection) {
            Some(docs) => Ok(matching_positions(docs, filter)?.len() as u64),
            None => Ok(0),
        }
    }

    async fn update_one(&self, filter: &Expr, update: &Update, collection: &str) -> DocumentStoreResult<UpdateResult> {
        let unique = self.unique_indexes(collection).await;
        let mut store = self.store.write().await;

        match store.get_mut(collection) {
            Some(docs) => update_in(docs, filter, update, true, &unique),
            None => Ok(UpdateResult::default()),
        }
    }

    async fn update_many(&self, filter: &Expr, update: &Update, collection: &str) -> DocumentStoreResult<UpdateResult> {
        let unique = self.unique_indexes(collection).await;
        let mut store = self.store.write().await;

        match store.get_mut(collection) {
            Some(docs) => update_in(docs, filter, update, false, &unique),
            None => Ok(UpdateResult::default()),
        }
    }

    async fn delete_one(&self, filter: &Expr, collection: &str) -> DocumentStoreResult<DeleteResult> {
        let mut store = self.store.write().await;

        match store.get_mut(collection) {
            Some(docs) => delete_in(docs, filter, true),
            None => Ok(DeleteResult::default()),
        }
    }

    async fn delete_many(&self, filter: &Expr, collection: &str) -> DocumentStoreResult<DeleteResult> {
        let mut store = self.store.write().await;

        match store.get_mut(collection) {
            Some(docs) => delete_in(docs, filter, false),
            None => Ok(DeleteResult::default()),
        }
    }

    async fn bulk_write(&self, operations: Vec<WriteOp>, collection: &str) -> DocumentStoreResult<BulkWriteResult> {
        let unique = self.unique_indexes(collection).await;
        let mut store = self.store.write().await;
        let docs = store.entry(collection.to_string()).or_default();

        // applied in submission order under one lock, stopping at the first failure
        let mut result = BulkWriteResult::default();
        for operation in operations {
            match operation {
                WriteOp::InsertOne(document) => {
                    insert_into(docs, document, &unique)?;
                    result.inserted_count += 1;
                }
                WriteOp::UpdateOne { filter, update } => {
                    result.absorb_update(update_in(docs, &filter, &update, true, &unique)?);
                }
                WriteOp::UpdateMany { filter, update } => {
                    result.absorb_update(update_in(docs, &filter, &update, false, &unique)?);
                }
                WriteOp::DeleteOne { filter } => {
                    result.deleted_count += delete_in(docs, &filter, true)?.deleted_count;
                }
                WriteOp::DeleteMany { filter } => {
                    result.deleted_count += delete_in(docs, &filter, false)?.deleted_count;
                }
            }
        }

        Ok(result)
    }

    async fn create_index(&self, index: IndexSpec, collection: &str) -> DocumentStoreResult<String> {
        let name = index.resolved_name();

        if index.unique {
            let store = self.store.read().await;
            if let Some(docs) = store.get(collection) {
                for (pos, doc) in docs.iter().enumerate() {
                    check_unique(docs, doc, Some(pos), std::slice::from_ref(&index))?;
                }
            }
        }

        let mut indexes = self.indexes.write().await;
        let specs = indexes.entry(collection.to_string()).or_default();

        match specs.iter().find(|spec| spec.resolved_name() == name) {
            Some(existing) if existing.keys != index.keys || existing.unique != index.unique => {
                return Err(DocumentStoreError::Backend(format!(
                    "index {name} already exists with different options"
                )));
            }
            Some(_) => {}
            None => specs.push(index),
        }

        self.store
            .write()
            .await
            .entry(collection.to_string())
            .or_default();

        Ok(name)
    }

    async fn drop_index(&self, name: &str, collection: &str) -> DocumentStoreResult<()> {
        let mut indexes = self.indexes.write().await;
        let specs = indexes.entry(collection.to_string()).or_default();

        match specs.iter().position(|spec| spec.resolved_name() == name) {
            Some(pos) => {
                specs.remove(pos);
                Ok(())
            }
            None => Err(DocumentStoreError::Backend(format!("index not found with name [{name}]"))),
        }
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        Ok(
            self.store
                .read()
                .await
                .keys()
                .cloned()
                .collect()
        )
    }

    async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()> {
        // dropping a missing collection is not an error
        self.store.write().await.remove(name);
        self.indexes.write().await.remove(name);

        Ok(())
    }
}


/// Builder for constructing [`InMemoryStore`] instances.
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}
