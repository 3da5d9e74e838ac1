use unistore_core::{
    backend::StoreBackend,
    error::DocumentStoreResult,
    query::Filter,
    store::DocumentStore,
    update::Update,
};

use crate::student::Student;

pub async fn run<B: StoreBackend>(store: &DocumentStore<B>) -> DocumentStoreResult<()> {
    let students = store.typed_collection::<Student>();

    println!("\n--- Updating one student ---");
    let result = students
        .update_one(Filter::eq("name", "Aarav Sharma"), Update::new().set("age", 22))
        .await?;
    println!(
        "Matched {} documents and updated {} documents.",
        result.matched_count, result.modified_count
    );

    // the empty filter deliberately targets every student
    println!("\n--- Updating many students ---");
    let result = students
        .update_many(Filter::all(), Update::new().set("status", "active"))
        .await?;
    println!(
        "Matched {} documents and updated {} documents.",
        result.matched_count, result.modified_count
    );

    Ok(())
}
