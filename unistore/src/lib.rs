//! Main unistore crate: a typed CRUD walkthrough over a remote document store.
//!
//! This crate is the primary entry point. It re-exports the core types from the
//! sub-crates, gives access to the storage backends and carries the `Student`
//! record plus the demo operation groups run by the `unistore` binary.
//!
//! # Features
//!
//! - **Typed records** - Define records with Serde and store them safely
//! - **Multiple backends** - In-memory and MongoDB storage behind one trait
//! - **One deadline** - Every operation inherits the deadline fixed at connect time
//! - **Explicit outcomes** - Not-found is `Ok(None)`, counts come back per call
//!
//! # Quick Start
//!
//! ```ignore
//! use std::time::Duration;
//! use unistore::{prelude::*, memory::InMemoryStore, student::Student};
//!
//! #[tokio::main]
//! async fn main() -> DocumentStoreResult<()> {
//!     let store = DocumentStore::connect(InMemoryStore::builder(), Duration::from_secs(10)).await?;
//!     let students = store.typed_collection::<Student>();
//!
//!     students.insert_one(Student::new("Aarav Sharma", 21, "IIT Delhi")).await?;
//!     students
//!         .update_one(Filter::eq("name", "Aarav Sharma"), Update::new().set("age", 22))
//!         .await?;
//!
//!     match students.find_one(Filter::eq("name", "Aarav Sharma")).await? {
//!         Some(student) => println!("{student}"),
//!         None => println!("No document was found with that filter"),
//!     }
//!
//!     store.shutdown().await
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for tests and offline runs
//! - [`mongodb`] - MongoDB backend (requires the `mongodb` feature, on by default)

pub mod config;
pub mod demo;
pub mod prelude;
pub mod student;

pub use unistore_core::{
    backend, collection, cursor, deadline, error, index, query, record, result, store, update,
};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use unistore_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use unistore_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}
