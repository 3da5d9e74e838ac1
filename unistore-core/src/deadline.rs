//! The single operation deadline shared by a connection and everything issued through it.

use std::{future::Future, time::Duration};

use tokio::time::{Instant, timeout_at};

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// A point in time after which no store operation may proceed.
///
/// Created once when connecting and copied into every operation. An operation
/// still running when the deadline passes is abandoned with
/// [`DocumentStoreError::DeadlineExceeded`], and so is any operation started
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// A deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self { at: Instant::now() + timeout }
    }

    pub fn at(&self) -> Instant {
        self.at
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_elapsed(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Runs `operation` to completion unless the deadline passes first.
    ///
    /// `name` identifies the operation in the resulting error.
    pub async fn run<T, F>(&self, name: &str, operation: F) -> DocumentStoreResult<T>
    where
        F: Future<Output = DocumentStoreResult<T>>,
    {
        if self.is_elapsed() {
            return Err(DocumentStoreError::DeadlineExceeded(name.to_string()));
        }

        match timeout_at(self.at, operation).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(operation = name, "deadline elapsed");
                Err(DocumentStoreError::DeadlineExceeded(name.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn completes_within_deadline() {
        let deadline = Deadline::after(Duration::from_secs(10));

        let value = deadline
            .run("ping", async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok(7)
            })
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert!(deadline.remaining() <= Duration::from_secs(9));
    }

    #[tokio::test(start_paused = true)]
    async fn abandons_in_flight_operation() {
        let deadline = Deadline::after(Duration::from_secs(1));

        let err = deadline
            .run("find", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DocumentStoreError::DeadlineExceeded(op) if op == "find"));
    }

    #[tokio::test(start_paused = true)]
    async fn refuses_operations_after_expiry() {
        let deadline = Deadline::after(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(deadline.is_elapsed());
        assert_eq!(deadline.remaining(), Duration::ZERO);

        let result = deadline.run("insert_one", async { Ok(()) }).await;
        assert!(matches!(result, Err(DocumentStoreError::DeadlineExceeded(_))));
    }

    #[tokio::test]
    async fn passes_through_operation_errors() {
        let deadline = Deadline::after(Duration::from_secs(10));

        let result: DocumentStoreResult<()> = deadline
            .run("delete_one", async { Err(DocumentStoreError::Backend("boom".into())) })
            .await;

        assert!(matches!(result, Err(DocumentStoreError::Backend(msg)) if msg == "boom"));
    }
}
