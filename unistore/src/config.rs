//! Walkthrough configuration.
//!
//! The store address comes from `--uri` or the `MONGO_URI` environment variable,
//! which the binary may load from a `.env` file first. `memory://` selects the
//! in-memory backend.

use std::{path::Path, time::Duration};

use clap::{Parser, ValueEnum};
use tracing::info;
use unistore_core::{
    backend::BoxedStoreBackend,
    error::{DocumentStoreError, DocumentStoreResult},
    store::DocumentStore,
};
use unistore_memory::InMemoryStore;

use crate::student::DATABASE_NAME;

/// Default deadline for the whole run, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default number of records fetched per cursor round trip.
pub const DEFAULT_BATCH_SIZE: u32 = 2;

/// Default number of sample students the cursor group inserts.
pub const DEFAULT_SEED_COUNT: usize = 10;

/// URI scheme selecting the in-memory backend.
pub const MEMORY_SCHEME: &str = "memory://";

/// Loads a `.env` file from the working directory or its parents. A missing
/// file is not an error; the environment may already carry `MONGO_URI`.
pub fn load_dotenv() -> Result<(), dotenvy::Error> {
    ignore_missing(dotenvy::dotenv().map(drop))
}

/// Like [`load_dotenv`], for an explicit path.
pub fn load_dotenv_from(path: impl AsRef<Path>) -> Result<(), dotenvy::Error> {
    ignore_missing(dotenvy::from_path(path))
}

fn ignore_missing(result: Result<(), dotenvy::Error>) -> Result<(), dotenvy::Error> {
    match result {
        Err(e) if e.not_found() => Ok(()),
        other => other,
    }
}

/// The operation groups, in the order they always run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum DemoGroup {
    Insert,
    Read,
    Update,
    Delete,
    Bulk,
    Cursor,
    Operators,
    Indexes,
}

impl DemoGroup {
    pub const ALL: [DemoGroup; 8] = [
        DemoGroup::Insert,
        DemoGroup::Read,
        DemoGroup::Update,
        DemoGroup::Delete,
        DemoGroup::Bulk,
        DemoGroup::Cursor,
        DemoGroup::Operators,
        DemoGroup::Indexes,
    ];
}

/// Which backend a store address selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    MongoDb,
}

/// Command-line arguments for the walkthrough.
#[derive(Parser, Debug)]
#[command(name = "unistore")]
#[command(version, about = "CRUD walkthrough against a document store", long_about = None)]
pub struct Args {
    /// Store address (`mongodb://`, `mongodb+srv://` or `memory://`).
    #[arg(long, env = "MONGO_URI", hide_env_values = true)]
    pub uri: Option<String>,

    /// Deadline for connecting and for every operation after it, in seconds.
    #[arg(long, env = "UNISTORE_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Records fetched per cursor round trip.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: u32,

    /// Operation groups to run. They always run in their fixed order.
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = DemoGroup::ALL)]
    pub run: Vec<DemoGroup>,

    /// Sample students inserted by the cursor group.
    #[arg(long, default_value_t = DEFAULT_SEED_COUNT)]
    pub seed: usize,
}

impl Args {
    /// Validates the arguments into a [`Config`].
    ///
    /// # Errors
    ///
    /// [`DocumentStoreError::Configuration`] when no store address was given or
    /// a numeric setting is zero.
    pub fn into_config(self) -> DocumentStoreResult<Config> {
        let uri = self
            .uri
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(|| DocumentStoreError::Configuration("MONGO_URI is not set".into()))?;

        if self.timeout_secs == 0 {
            return Err(DocumentStoreError::Configuration("timeout must be at least one second".into()));
        }
        if self.batch_size == 0 {
            return Err(DocumentStoreError::Configuration("batch size must be at least 1".into()));
        }

        let mut groups = self.run;
        groups.sort();
        groups.dedup();

        Ok(Config {
            uri,
            timeout: Duration::from_secs(self.timeout_secs),
            batch_size: self.batch_size,
            groups,
            seed_count: self.seed,
        })
    }
}

/// Validated walkthrough configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub uri: String,
    pub timeout: Duration,
    pub batch_size: u32,
    /// Sorted and free of duplicates.
    pub groups: Vec<DemoGroup>,
    pub seed_count: usize,
}

impl Config {
    /// A configuration running every group against `uri` with the defaults.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            batch_size: DEFAULT_BATCH_SIZE,
            groups: DemoGroup::ALL.to_vec(),
            seed_count: DEFAULT_SEED_COUNT,
        }
    }

    pub fn backend(&self) -> BackendKind {
        if self.uri.starts_with(MEMORY_SCHEME) {
            BackendKind::Memory
        } else {
            BackendKind::MongoDb
        }
    }

    /// Connects to the configured store. The returned store carries the
    /// deadline every later operation runs under.
    pub async fn connect(&self) -> DocumentStoreResult<DocumentStore<BoxedStoreBackend>> {
        let backend = self.backend();
        info!(?backend, timeout = ?self.timeout, database = DATABASE_NAME, "connecting");

        match backend {
            BackendKind::Memory => Ok(
                DocumentStore::connect(InMemoryStore::builder(), self.timeout)
                    .await?
                    .into_dyn()
            ),
            #[cfg(feature = "mongodb")]
            BackendKind::MongoDb => Ok(
                DocumentStore::connect(
                    unistore_mongodb::MongoDbStore::builder(&self.uri, DATABASE_NAME),
                    self.timeout,
                )
                .await?
                .into_dyn()
            ),
            #[cfg(not(feature = "mongodb"))]
            BackendKind::MongoDb => Err(DocumentStoreError::Configuration(
                "built without the mongodb feature; only memory:// addresses are supported".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("unistore").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let config = parse(&["--uri", "memory://"]).into_config().unwrap();

        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.batch_size, 2);
        assert_eq!(config.groups, DemoGroup::ALL);
        assert_eq!(config.seed_count, 10);
        assert_eq!(config.backend(), BackendKind::Memory);
    }

    #[test]
    fn groups_run_in_fixed_order() {
        let config = parse(&["--uri", "mongodb://localhost:27017", "--run", "cursor,insert,cursor"])
            .into_config()
            .unwrap();

        assert_eq!(config.groups, [DemoGroup::Insert, DemoGroup::Cursor]);
        assert_eq!(config.backend(), BackendKind::MongoDb);
    }

    #[test]
    fn blank_uri_is_a_configuration_error() {
        let args = Args {
            uri: Some("  ".into()),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            batch_size: DEFAULT_BATCH_SIZE,
            run: DemoGroup::ALL.to_vec(),
            seed: DEFAULT_SEED_COUNT,
        };

        assert!(matches!(args.into_config(), Err(DocumentStoreError::Configuration(_))));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let result = parse(&["--uri", "memory://", "--batch-size", "0"]).into_config();

        assert!(matches!(result, Err(DocumentStoreError::Configuration(_))));
    }

    #[test]
    fn unknown_group_fails_to_parse() {
        let result = Args::try_parse_from(["unistore", "--uri", "memory://", "--run", "aggregate"]);

        assert!(result.is_err());
    }

    #[test]
    fn missing_dotenv_file_is_ignored() {
        let path = std::env::temp_dir().join(format!("unistore-missing-{}.env", std::process::id()));

        assert!(load_dotenv_from(&path).is_ok());
    }

    #[test]
    fn malformed_dotenv_file_is_reported() {
        let path = std::env::temp_dir().join(format!("unistore-malformed-{}.env", std::process::id()));
        std::fs::write(&path, "UNISTORE_DOTENV_BROKEN=\"unterminated\n").unwrap();

        let result = load_dotenv_from(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(result.is_err());
        assert!(std::env::var("UNISTORE_DOTENV_BROKEN").is_err());
    }
}
