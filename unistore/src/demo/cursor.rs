//! Batched iteration over the whole collection.

use tracing::debug;
use unistore_core::{
    backend::StoreBackend,
    error::DocumentStoreResult,
    query::{Filter, Query},
    store::DocumentStore,
};

use crate::student::Student;

const SAMPLE_NAMES: [&str; 10] = [
    "Ananya Iyer",
    "Vikram Patel",
    "Sneha Kapoor",
    "Arjun Mehta",
    "Kavya Nair",
    "Rahul Verma",
    "Meera Joshi",
    "Siddharth Rao",
    "Diya Banerjee",
    "Karan Malhotra",
];

const SAMPLE_COLLEGES: [&str; 5] = [
    "IIT Delhi",
    "IIT Bombay",
    "Mumbai University",
    "JNU",
    "Delhi University",
];

/// Deterministic sample students; names repeat with a numeric suffix past the
/// first ten.
pub fn sample_students(count: usize) -> Vec<Student> {
    (0..count)
        .map(|i| {
            let base = SAMPLE_NAMES[i % SAMPLE_NAMES.len()];
            let name = match i / SAMPLE_NAMES.len() {
                0 => base.to_string(),
                round => format!("{base} {}", round + 1),
            };

            Student::new(name, 18 + (i % 7) as i32, SAMPLE_COLLEGES[i % SAMPLE_COLLEGES.len()])
        })
        .collect()
}

pub async fn run<B: StoreBackend>(
    store: &DocumentStore<B>,
    batch_size: u32,
    seed_count: usize,
) -> DocumentStoreResult<()> {
    let students = store.typed_collection::<Student>();

    if seed_count > 0 {
        println!("\n--- Resetting the collection ---");
        let cleared = students.delete_many(Filter::all()).await?;
        println!("Deleted {} documents.", cleared.deleted_count);

        println!("\n--- Seeding {seed_count} students ---");
        let result = students.insert_many(sample_students(seed_count)).await?;
        println!("Inserted {} documents.", result.inserted_ids.len());
    }

    println!("\n--- Iterating students in batches of {batch_size} ---");
    let mut cursor = students
        .find(Query::builder().batch_size(batch_size).build())
        .await?;

    while let Some(student) = cursor.next().await {
        println!("{student}");
    }

    let seen = cursor.finish()?;
    debug!(seen, batch_size, "cursor drained");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_names_stay_distinct_past_the_list() {
        let students = sample_students(12);

        assert_eq!(students[0].name, "Ananya Iyer");
        assert_eq!(students[10].name, "Ananya Iyer 2");
        assert!(students.iter().all(|s| (18..25).contains(&s.age)));
    }
}
