use unistore_core::{
    backend::StoreBackend,
    error::DocumentStoreResult,
    query::Filter,
    store::DocumentStore,
};

use crate::student::Student;

pub async fn run<B: StoreBackend>(store: &DocumentStore<B>) -> DocumentStoreResult<()> {
    let students = store.typed_collection::<Student>();

    println!("\n--- Deleting one student ---");
    let result = students.delete_one(Filter::eq("name", "Rohan Kumar")).await?;
    println!("Deleted {} document.", result.deleted_count);

    println!("\n--- Deleting many students ---");
    let result = students
        .delete_many(Filter::eq("college", "Mumbai University"))
        .await?;
    println!("Deleted {} documents.", result.deleted_count);

    Ok(())
}
