//! Per-call cancellation and deadline carrier.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{ConnectorError, ConnectorResult};

/// Call context threaded through every syncer operation.
///
/// Cloning is cheap; clones share the same cancellation token.
#[derive(Debug, Clone, Default)]
pub struct SyncContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl SyncContext {
    /// A context that is never cancelled and has no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context driven by the host's cancellation token.
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    /// Set a deadline relative to now.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fail fast if the call is already cancelled or past its deadline.
    pub fn check(&self) -> ConnectorResult<()> {
        if self.cancel.is_cancelled() {
            return Err(ConnectorError::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(ConnectorError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Run `fut` until it completes, the token is cancelled, or the deadline
    /// passes, whichever comes first. The losing future is dropped, which
    /// aborts any in-flight request.
    pub async fn run<F, T, E>(&self, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<ConnectorError>,
    {
        let deadline = async {
            match self.deadline {
                Some(d) => tokio::time::sleep_until(d).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(ConnectorError::Cancelled.into()),
            () = deadline => Err(ConnectorError::DeadlineExceeded.into()),
            result = fut => result,
        }
    }
}
