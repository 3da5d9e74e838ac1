use unistore_core::{
    backend::StoreBackend,
    error::DocumentStoreResult,
    index::IndexSpec,
    query::SortDirection,
    store::DocumentStore,
};

use crate::student::Student;

pub async fn run<B: StoreBackend>(store: &DocumentStore<B>) -> DocumentStoreResult<()> {
    let students = store.typed_collection::<Student>();

    println!("\n--- Creating indexes ---");
    let by_name = students.create_index(IndexSpec::ascending("name")).await?;
    println!("Created index: {by_name}");

    let by_college_age = students
        .create_index(
            IndexSpec::new()
                .key("college", SortDirection::Asc)
                .key("age", SortDirection::Desc),
        )
        .await?;
    println!("Created index: {by_college_age}");

    println!("\n--- Dropping indexes ---");
    for name in [by_name, by_college_age] {
        students.drop_index(&name).await?;
        println!("Dropped index: {name}");
    }

    Ok(())
}
