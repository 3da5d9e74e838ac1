//! Forward-only iteration over query results.
//!
//! Backends hand back a [`DocumentStream`] that pulls documents from the store in
//! batches. [`RecordCursor`] decodes it one record at a time. A transport or decode
//! failure ends the sequence early; the failure is kept and only reported through
//! [`RecordCursor::error`] / [`RecordCursor::finish`], so callers drain the cursor
//! first and check for a trailing error afterwards:
//!
//! ```ignore
//! let mut cursor = students.find(Query::builder().batch_size(2).build()).await?;
//!
//! while let Some(student) = cursor.next().await {
//!     println!("{student:?}");
//! }
//!
//! cursor.finish()?;
//! ```

use std::{fmt, marker::PhantomData};

use bson::Document;
use futures::{StreamExt, stream::BoxStream};

use crate::{
    deadline::Deadline,
    error::{DocumentStoreError, DocumentStoreResult},
    record::{Record, RecordExt},
};

/// Raw documents as produced by a backend, fetched lazily.
pub type DocumentStream = BoxStream<'static, DocumentStoreResult<Document>>;

/// A finite, forward-only, non-restartable sequence of decoded records.
pub struct RecordCursor<D: Record> {
    stream: Option<DocumentStream>,
    deadline: Option<Deadline>,
    error: Option<DocumentStoreError>,
    yielded: u64,
    _marker: PhantomData<D>,
}

impl<D: Record> RecordCursor<D> {
    pub fn new(stream: DocumentStream) -> Self {
        Self {
            stream: Some(stream),
            deadline: None,
            error: None,
            yielded: 0,
            _marker: PhantomData,
        }
    }

    /// Bounds every batch fetch by `deadline`.
    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Advances the cursor.
    ///
    /// Returns `None` at the end of the sequence, including when it ended because
    /// of a failure. Once `None` has been returned, every later call returns `None`.
    pub async fn next(&mut self) -> Option<D> {
        let stream = self.stream.as_mut()?;

        let item = match self.deadline {
            Some(deadline) => deadline.run("cursor.next", async { Ok(stream.next().await) }).await,
            None => Ok(stream.next().await),
        };

        match item {
            Ok(Some(Ok(document))) => match D::from_document(document) {
                Ok(record) => {
                    self.yielded += 1;
                    Some(record)
                }
                Err(err) => self.fail(err),
            },
            Ok(Some(Err(err))) | Err(err) => self.fail(err),
            Ok(None) => {
                self.stream = None;
                None
            }
        }
    }

    fn fail(&mut self, err: DocumentStoreError) -> Option<D> {
        tracing::debug!(error = %err, yielded = self.yielded, "cursor ended with error");

        self.stream = None;
        self.error = Some(err);
        None
    }

    /// Whether the end of the sequence has been observed.
    pub fn is_exhausted(&self) -> bool {
        self.stream.is_none()
    }

    /// The failure that ended the sequence, if any.
    pub fn error(&self) -> Option<&DocumentStoreError> {
        self.error.as_ref()
    }

    /// Number of records handed out so far.
    pub fn yielded(&self) -> u64 {
        self.yielded
    }

    /// Closes the cursor, returning the number of records yielded or the
    /// trailing error.
    pub fn finish(self) -> DocumentStoreResult<u64> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.yielded),
        }
    }

    /// Drains the cursor into a vector, failing on a trailing error.
    pub async fn collect_all(mut self) -> DocumentStoreResult<Vec<D>> {
        let mut records = Vec::new();

        while let Some(record) = self.next().await {
            records.push(record);
        }

        self.finish()?;

        Ok(records)
    }
}

impl<D: Record> fmt::Debug for RecordCursor<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordCursor")
            .field("exhausted", &self.is_exhausted())
            .field("yielded", &self.yielded)
            .field("error", &self.error)
            .finish()
    }
}
