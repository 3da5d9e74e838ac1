#![allow(dead_code)]

pub mod faulty;

use std::time::Duration;

use unistore::{memory::InMemoryStore, store::DocumentStore};

pub async fn connect() -> DocumentStore<InMemoryStore> {
    DocumentStore::connect(InMemoryStore::builder(), Duration::from_secs(10))
        .await
        .unwrap()
}
