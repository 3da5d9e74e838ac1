//! Query operators: comparison, logical, membership and element filters, plus
//! sorted, limited and projected reads.

use unistore_core::{
    backend::StoreBackend,
    collection::TypedCollection,
    error::DocumentStoreResult,
    query::{Filter, Projection, Query, SortDirection},
    store::DocumentStore,
};

use crate::student::{Student, StudentSummary};

async fn show<B: StoreBackend>(
    students: &TypedCollection<'_, B, Student>,
    title: &str,
    query: impl Into<Query>,
) -> DocumentStoreResult<()> {
    println!("\n--- {title} ---");

    let found = students.find(query).await?.collect_all().await?;
    if found.is_empty() {
        println!("No document was found with that filter");
    }
    for student in found {
        println!("{student}");
    }

    Ok(())
}

pub async fn run<B: StoreBackend>(store: &DocumentStore<B>) -> DocumentStoreResult<()> {
    let students = store.typed_collection::<Student>();

    show(&students, "Students older than 20", Filter::gt("age", 20)).await?;

    show(
        &students,
        "Students aged 19 to 21",
        Filter::gte("age", 19).and(Filter::lte("age", 21)),
    )
    .await?;

    show(
        &students,
        "Students at an IIT",
        Filter::any_of("college", ["IIT Delhi", "IIT Bombay"]),
    )
    .await?;

    show(
        &students,
        "Students at JNU or younger than 20",
        Filter::or([Filter::eq("college", "JNU"), Filter::lt("age", 20)]),
    )
    .await?;

    show(
        &students,
        "Students not at Delhi University",
        Filter::none_of("college", ["Delhi University"]),
    )
    .await?;

    let with_status = students.count_documents(Filter::exists("status")).await?;
    let without_status = students.count_documents(Filter::not_exists("status")).await?;
    println!("\n--- Status field ---");
    println!("{with_status} documents have a status, {without_status} do not.");

    show(
        &students,
        "Three oldest students",
        Query::builder()
            .sort("age", SortDirection::Desc)
            .sort("name", SortDirection::Asc)
            .limit(3)
            .build(),
    )
    .await?;

    println!("\n--- Names and colleges of IIT students ---");
    let summaries = students
        .with_type::<StudentSummary>()
        .find(
            Query::builder()
                .filter(Filter::starts_with("college", "IIT"))
                .projection(Projection::include(["name", "college"]))
                .sort("name", SortDirection::Asc)
                .build(),
        )
        .await?
        .collect_all()
        .await?;
    for summary in summaries {
        println!("{summary}");
    }

    Ok(())
}
