//! Convenient re-exports of commonly used types from unistore.
//!
//! ```ignore
//! use unistore::prelude::*;
//! ```
//!
//! This provides access to:
//! - Record traits
//! - Store backends, builders and the connection handle
//! - Filter, query and update construction
//! - Collection handles, cursors and result types
//! - Error types

pub use unistore_core::{
    backend::{StoreBackend, StoreBackendBuilder, BoxedStoreBackend, WriteOp},
    collection::{TypedCollection, WriteModel},
    cursor::RecordCursor,
    deadline::Deadline,
    error::{DocumentStoreError, DocumentStoreResult},
    index::IndexSpec,
    query::{Expr, FieldOp, Filter, Projection, Query, QueryBuilder, QueryVisitor, Sort, SortDirection},
    record::{Record, RecordExt},
    result::{BulkWriteResult, DeleteResult, InsertManyResult, InsertOneResult, RecordId, UpdateResult},
    store::DocumentStore,
    update::{FieldChange, Update},
};
