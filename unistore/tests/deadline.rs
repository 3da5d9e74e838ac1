mod common;

use std::time::Duration;

use unistore::{
    memory::InMemoryStore,
    prelude::*,
    student::Student,
};

#[tokio::test(start_paused = true)]
async fn operations_fail_once_the_deadline_passes() {
    let store = DocumentStore::connect(InMemoryStore::builder(), Duration::from_secs(10))
        .await
        .unwrap();
    let students = store.typed_collection::<Student>();

    students.insert_one(Student::new("Aarav Sharma", 21, "IIT Delhi")).await.unwrap();

    tokio::time::advance(Duration::from_secs(11)).await;

    let result = students.find_one(Filter::eq("name", "Aarav Sharma")).await;
    assert!(matches!(result, Err(DocumentStoreError::DeadlineExceeded(op)) if op == "find_one"));

    assert!(matches!(store.ping().await, Err(DocumentStoreError::DeadlineExceeded(_))));

    // releasing the connection is not bounded by the deadline
    store.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn open_cursor_stops_at_the_deadline() {
    let store = DocumentStore::connect(InMemoryStore::builder(), Duration::from_secs(10))
        .await
        .unwrap();
    let students = store.typed_collection::<Student>();
    students
        .insert_many(unistore::demo::cursor::sample_students(4))
        .await
        .unwrap();

    let mut cursor = students.find(Query::builder().batch_size(2).build()).await.unwrap();
    assert!(cursor.next().await.is_some());

    tokio::time::advance(Duration::from_secs(11)).await;

    assert!(cursor.next().await.is_none());
    assert!(matches!(cursor.finish(), Err(DocumentStoreError::DeadlineExceeded(_))));
}

#[tokio::test(start_paused = true)]
async fn deadline_is_shared_by_every_collection() {
    let store = common::connect().await;

    let a = store.typed_collection::<Student>();
    let b = store.collection::<Student>("alumni");

    assert_eq!(a.count_documents(Filter::all()).await.unwrap(), 0);
    assert!(store.deadline().remaining() <= Duration::from_secs(10));

    tokio::time::advance(Duration::from_secs(10)).await;

    assert!(a.count_documents(Filter::all()).await.is_err());
    assert!(b.count_documents(Filter::all()).await.is_err());
}
