//! In-memory document storage backend for unistore.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! It uses async-aware read-write locks for concurrent access and is meant for
//! development, tests and running the walkthrough without a server.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Store-assigned identifiers** - Every inserted document gets a fresh `ObjectId`
//! - **Full filter support** - Comparison, logical, element and array operators, sorting and paging
//! - **Batched cursors** - Results are handed out in batches of the requested size
//! - **Unique indexes** - Enforced on inserts and updates
//!
//! # Quick Start
//!
//! ```ignore
//! use std::time::Duration;
//! use unistore_core::store::DocumentStore;
//! use unistore_memory::InMemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DocumentStore::connect(InMemoryStore::builder(), Duration::from_secs(10)).await?;
//!     let students = store.typed_collection::<Student>();
//!
//!     students.insert_one(student).await?;
//!
//!     store.shutdown().await?;
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as unistore_memory;

pub mod store;
pub mod evaluator;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
