//! MongoDB backend implementation for unistore.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend` trait,
//! translating filters, field changes, sort keys and bulk batches into MongoDB's
//! native query language.
//!
//! # Features
//!
//! - **Persistent storage** - Data is persisted to MongoDB Atlas or self-hosted MongoDB
//! - **Full query support** - Leverages MongoDB's query engine for filtering and sorting
//! - **Batched cursors** - `find` streams documents as the driver fetches each batch
//! - **Bulk writes** - Heterogeneous batches go out as a single `bulkWrite` command
//! - **Indexing** - Support for creating and dropping MongoDB indexes
//!
//! Client-level bulk writes need MongoDB 8.0 or newer.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use unistore::{store::DocumentStore, mongodb::MongoDbStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DocumentStore::connect(
//!         MongoDbStore::builder("mongodb://localhost:27017", "university"),
//!         Duration::from_secs(10),
//!     )
//!     .await?;
//!
//!     store.shutdown().await?;
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as unistore_mongodb;

pub mod store;
mod query;
mod update;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
