use unistore_core::{backend::StoreBackend, error::DocumentStoreResult, store::DocumentStore};

use crate::student::Student;

pub async fn run<B: StoreBackend>(store: &DocumentStore<B>) -> DocumentStoreResult<()> {
    let students = store.typed_collection::<Student>();

    println!("\n--- Inserting one student ---");
    let result = students
        .insert_one(Student::new("Aarav Sharma", 21, "IIT Delhi"))
        .await?;
    println!("Inserted a single document with ID: {}", result.inserted_id);

    println!("\n--- Inserting multiple students ---");
    let result = students
        .insert_many(vec![
            Student::new("Priya Singh", 20, "Mumbai University"),
            Student::new("Rohan Kumar", 22, "IIT Bombay"),
        ])
        .await?;

    let ids = result
        .inserted_ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    println!("Inserted multiple documents with IDs: [{}]", ids.join(" "));

    Ok(())
}
