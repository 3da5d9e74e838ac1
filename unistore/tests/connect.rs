mod common;

use std::time::Duration;

use common::faulty::{Fault, FaultyStore};
use unistore::prelude::*;

const TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::test(start_paused = true)]
async fn refused_ping_is_a_connection_error() {
    let builder = FaultyStore::default().failing_ping(Fault::Fail).builder();

    let result = DocumentStore::connect(builder, TIMEOUT).await;

    assert!(matches!(result, Err(DocumentStoreError::Connection(_))));
}

#[tokio::test(start_paused = true)]
async fn ping_outliving_the_timeout_exceeds_the_deadline() {
    let builder = FaultyStore::default()
        .failing_ping(Fault::Stall(Duration::from_secs(20)))
        .builder();

    let result = DocumentStore::connect(builder, TIMEOUT).await;

    assert!(matches!(result, Err(DocumentStoreError::DeadlineExceeded(op)) if op == "ping"));
}

#[tokio::test(start_paused = true)]
async fn slow_client_setup_exceeds_the_deadline() {
    let builder = FaultyStore::default()
        .builder()
        .failing_build(Fault::Stall(Duration::from_secs(20)));

    let result = DocumentStore::connect(builder, TIMEOUT).await;

    assert!(matches!(result, Err(DocumentStoreError::DeadlineExceeded(op)) if op == "connect"));
}

#[tokio::test(start_paused = true)]
async fn setup_and_ping_share_one_deadline() {
    // each step fits the timeout alone, together they do not
    let builder = FaultyStore::default()
        .failing_ping(Fault::Stall(Duration::from_secs(6)))
        .builder()
        .failing_build(Fault::Stall(Duration::from_secs(6)));

    let result = DocumentStore::connect(builder, TIMEOUT).await;

    assert!(matches!(result, Err(DocumentStoreError::DeadlineExceeded(op)) if op == "ping"));
}

#[tokio::test(start_paused = true)]
async fn slow_but_timely_ping_leaves_the_rest_of_the_deadline() {
    let builder = FaultyStore::default()
        .failing_ping(Fault::Stall(Duration::from_secs(4)))
        .builder();

    let store = DocumentStore::connect(builder, TIMEOUT).await.unwrap();

    let remaining = store.deadline().remaining();
    assert!(remaining > Duration::from_secs(5) && remaining <= Duration::from_secs(6));
    store.shutdown().await.unwrap();
}
