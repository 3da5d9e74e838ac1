use tracing::warn;
use unistore_core::{
    backend::StoreBackend,
    error::DocumentStoreResult,
    query::Filter,
    store::DocumentStore,
};

use crate::student::Student;

pub async fn run<B: StoreBackend>(store: &DocumentStore<B>) -> DocumentStoreResult<()> {
    let students = store.typed_collection::<Student>();

    println!("\n--- Finding one student ---");
    match students.find_one(Filter::eq("name", "Rohan Kumar")).await? {
        Some(student) => println!("Found a single document: {student:?}"),
        None => {
            warn!(name = "Rohan Kumar", "find_one matched nothing");
            println!("No document was found with that filter");
        }
    }

    println!("\n--- Finding all students ---");
    let mut cursor = students.find(Filter::all()).await?;

    while let Some(student) = cursor.next().await {
        println!("Found document: {student:?}");
    }

    cursor.finish()?;

    Ok(())
}
