//! unistore: CRUD walkthrough against a document store.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use unistore::{
    backend::StoreBackend,
    config::{self, Args},
    demo,
};

#[tokio::main]
async fn main() -> ExitCode {
    // loaded before the subscriber so RUST_LOG may come from .env
    let dotenv = config::load_dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "unistore=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = dotenv {
        tracing::warn!(error = %e, "ignoring unreadable .env file");
    }

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "unistore failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = args.into_config().context("invalid configuration")?;

    let store = config
        .connect()
        .await
        .context("failed to connect to the document store")?;
    println!("Successfully connected to {}!", store.backend().name());

    demo::run_and_shutdown(store, &config)
        .await
        .context("walkthrough did not complete")
}
