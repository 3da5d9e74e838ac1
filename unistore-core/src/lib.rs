//! A typed CRUD client layer for remote document stores.
//!
//! This crate is the core of the unistore project and provides:
//!
//! - **Record traits** ([`record`]) - Core traits for defining and serializing stored records
//! - **Store backend abstraction** ([`backend`]) - The minimal contract every document store driver fulfils
//! - **Filter API** ([`query`]) - Type-safe filter, sort and batching construction
//! - **Field changes** ([`update`]) - `$set`/`$unset`/`$inc` style update descriptions
//! - **Collections interface** ([`collection`]) - The insert, read, update, delete, bulk write and cursor operations
//! - **Connection management** ([`store`]) - Deadline-bounded connect, liveness check and shutdown
//! - **Cursors** ([`cursor`]) - Forward-only, batched record iteration with a trailing error
//! - **Error handling** ([`error`]) - Error and result types
//!
//! # Example
//!
//! ```ignore
//! use unistore_core::{record::Record, query::Filter, update::Update};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Student {
//!     pub name: String,
//!     pub age: i32,
//! }
//!
//! impl Record for Student {
//!     fn collection_name() -> &'static str {
//!         "students"
//!     }
//! }
//!
//! let students = store.typed_collection::<Student>();
//! students.insert_one(Student { name: "Aarav".into(), age: 21 }).await?;
//! students.update_one(Filter::eq("name", "Aarav"), Update::new().set("age", 22)).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as unistore_core;

pub mod backend;
pub mod collection;
pub mod cursor;
pub mod deadline;
pub mod error;
pub mod index;
pub mod query;
pub mod record;
pub mod result;
pub mod store;
pub mod update;
