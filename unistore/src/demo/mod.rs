//! The walkthrough's operation groups.
//!
//! Each group borrows the connected store, prints what it does to stdout and
//! returns the first error it hits. Groups run one after another in the order
//! of [`DemoGroup`]; a failed group stops the run.

use tracing::{error, info};
use unistore_core::{backend::StoreBackend, error::DocumentStoreResult, store::DocumentStore};

use crate::config::{Config, DemoGroup};

pub mod bulk_write;
pub mod cursor;
pub mod delete;
pub mod indexes;
pub mod insert;
pub mod operators;
pub mod read;
pub mod update;

/// Runs one group.
pub async fn run_group<B: StoreBackend>(
    group: DemoGroup,
    store: &DocumentStore<B>,
    config: &Config,
) -> DocumentStoreResult<()> {
    info!(?group, "running group");

    match group {
        DemoGroup::Insert => insert::run(store).await,
        DemoGroup::Read => read::run(store).await,
        DemoGroup::Update => update::run(store).await,
        DemoGroup::Delete => delete::run(store).await,
        DemoGroup::Bulk => bulk_write::run(store).await,
        DemoGroup::Cursor => cursor::run(store, config.batch_size, config.seed_count).await,
        DemoGroup::Operators => operators::run(store).await,
        DemoGroup::Indexes => indexes::run(store).await,
    }
}

/// Runs every configured group in order, stopping at the first failure.
pub async fn run_groups<B: StoreBackend>(store: &DocumentStore<B>, config: &Config) -> DocumentStoreResult<()> {
    for group in &config.groups {
        run_group(*group, store, config).await?;
    }

    Ok(())
}

/// Runs the configured groups, then releases the connection whatever they
/// returned.
///
/// # Errors
///
/// The first group failure, otherwise the shutdown failure. When both fail the
/// shutdown error is logged and the group error returned.
pub async fn run_and_shutdown<B: StoreBackend>(store: DocumentStore<B>, config: &Config) -> DocumentStoreResult<()> {
    let outcome = run_groups(&store, config).await;
    let closed = store.shutdown().await;

    match (outcome, closed) {
        (Err(group_error), Err(shutdown_error)) => {
            error!(error = %shutdown_error, "failed to close the connection after a failed group");
            Err(group_error)
        }
        (outcome, closed) => outcome.and(closed),
    }
}
