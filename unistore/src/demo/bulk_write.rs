use unistore_core::{
    backend::StoreBackend,
    collection::WriteModel,
    error::DocumentStoreResult,
    query::Filter,
    store::DocumentStore,
    update::Update,
};

use crate::student::Student;

pub async fn run<B: StoreBackend>(store: &DocumentStore<B>) -> DocumentStoreResult<()> {
    let students = store.typed_collection::<Student>();

    println!("\n--- Performing Bulk Write ---");
    let result = students
        .bulk_write(vec![
            WriteModel::InsertOne(Student::new("Isha Reddy", 20, "JNU")),
            WriteModel::UpdateOne {
                filter: Filter::eq("name", "Priya Singh"),
                update: Update::new().set("age", 21),
            },
            WriteModel::DeleteOne {
                filter: Filter::eq("name", "Aarav Sharma"),
            },
        ])
        .await?;

    println!("Number of documents inserted: {}", result.inserted_count);
    println!("Number of documents updated: {}", result.modified_count);
    println!("Number of documents deleted: {}", result.deleted_count);

    Ok(())
}
