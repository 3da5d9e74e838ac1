mod common;

use std::{sync::atomic::Ordering, time::Duration};

use common::faulty::{Fault, FaultyStore};
use unistore::{
    config::{Config, DemoGroup},
    demo,
    prelude::*,
    student::{Student, StudentSummary},
};

#[tokio::test]
async fn every_group_runs_against_the_memory_store() {
    let store = common::connect().await;
    let mut config = Config::new("memory://");
    let students = store.typed_collection::<Student>();

    // insert/update/delete/bulk leave Isha behind
    config.groups = DemoGroup::ALL[..5].to_vec();
    demo::run_groups(&store, &config).await.unwrap();

    let isha = students.find_one(Filter::eq("name", "Isha Reddy")).await.unwrap();
    assert_eq!(isha, Some(Student::new("Isha Reddy", 20, "JNU")));
    assert!(students.find_one(Filter::eq("name", "Aarav Sharma")).await.unwrap().is_none());

    // the cursor group resets the collection before seeding it
    config.groups = DemoGroup::ALL[5..].to_vec();
    demo::run_groups(&store, &config).await.unwrap();

    assert!(students.find_one(Filter::eq("name", "Isha Reddy")).await.unwrap().is_none());
    assert_eq!(students.count_documents(Filter::all()).await.unwrap(), 10);

    store.shutdown().await.unwrap();
}

#[tokio::test]
async fn repeated_cursor_runs_do_not_pile_up() {
    let store = common::connect().await;
    let mut config = Config::new("memory://");
    config.seed_count = 4;

    demo::run_group(DemoGroup::Cursor, &store, &config).await.unwrap();
    demo::run_group(DemoGroup::Cursor, &store, &config).await.unwrap();

    let students = store.typed_collection::<Student>();
    assert_eq!(students.count_documents(Filter::all()).await.unwrap(), 4);
}

#[tokio::test]
async fn operators_group_reads_projected_summaries() {
    let store = common::connect().await;
    let config = Config::new("memory://");
    demo::run_group(DemoGroup::Cursor, &store, &config).await.unwrap();
    demo::run_group(DemoGroup::Operators, &store, &config).await.unwrap();

    let summaries = store
        .typed_collection::<StudentSummary>()
        .find(
            Query::builder()
                .filter(Filter::eq("college", "JNU"))
                .projection(Projection::include(["name", "college"]))
                .sort("name", SortDirection::Asc)
                .build(),
        )
        .await
        .unwrap()
        .collect_all()
        .await
        .unwrap();

    // the fourth and ninth sample students study at JNU
    assert_eq!(
        summaries,
        [
            StudentSummary { name: "Arjun Mehta".into(), college: "JNU".into() },
            StudentSummary { name: "Diya Banerjee".into(), college: "JNU".into() },
        ]
    );
}

#[tokio::test]
async fn single_groups_can_run_on_their_own() {
    let store = common::connect().await;
    let mut config = Config::new("memory://");
    config.seed_count = 3;

    demo::run_group(DemoGroup::Cursor, &store, &config).await.unwrap();
    demo::run_group(DemoGroup::Read, &store, &config).await.unwrap();
    demo::run_group(DemoGroup::Delete, &store, &config).await.unwrap();

    // the third sample student is at Mumbai University
    let students = store.typed_collection::<Student>();
    assert_eq!(students.count_documents(Filter::all()).await.unwrap(), 2);
}

#[tokio::test]
async fn update_group_marks_everyone_active() {
    let store = common::connect().await;
    let config = Config::new("memory://");

    demo::run_group(DemoGroup::Insert, &store, &config).await.unwrap();
    demo::run_group(DemoGroup::Update, &store, &config).await.unwrap();

    let students = store.typed_collection::<Student>();
    assert_eq!(students.count_documents(Filter::ne("status", "active")).await.unwrap(), 0);

    let aarav = students.find_one(Filter::eq("name", "Aarav Sharma")).await.unwrap().unwrap();
    assert_eq!(aarav.age, 22);
}

#[tokio::test]
async fn config_connects_to_the_memory_backend() {
    let config = Config::new("memory://");

    let store = config.connect().await.unwrap();

    assert_eq!(store.backend().name(), "in-memory store");
    store.shutdown().await.unwrap();
}

#[tokio::test]
async fn failed_group_still_releases_the_connection() {
    let backend = FaultyStore::default();
    let closed = backend.shutdown_flag();
    let store = DocumentStore::new(backend, Deadline::after(Duration::ZERO));

    let result = demo::run_and_shutdown(store, &Config::new("memory://")).await;

    assert!(matches!(result, Err(DocumentStoreError::DeadlineExceeded(_))));
    assert!(closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn group_error_wins_over_shutdown_error() {
    let backend = FaultyStore::default().failing_shutdown(Fault::Fail);
    let closed = backend.shutdown_flag();
    let store = DocumentStore::new(backend, Deadline::after(Duration::ZERO));

    let result = demo::run_and_shutdown(store, &Config::new("memory://")).await;

    assert!(matches!(result, Err(DocumentStoreError::DeadlineExceeded(_))));
    assert!(closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn shutdown_error_surfaces_after_clean_groups() {
    let backend = FaultyStore::default().failing_shutdown(Fault::Fail);
    let store = DocumentStore::connect(backend.builder(), Duration::from_secs(10)).await.unwrap();
    let mut config = Config::new("memory://");
    config.groups = vec![DemoGroup::Insert, DemoGroup::Read];

    let result = demo::run_and_shutdown(store, &config).await;

    assert!(matches!(result, Err(DocumentStoreError::Connection(_))));
}
