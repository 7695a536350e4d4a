//! Background-task lifecycle management
//!
//! Tracks spawned background tasks and tears them down cancellation-safely
//! at process shutdown, built on `tokio-util`'s `CancellationToken` and
//! `TaskTracker`.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

/// Coordinates cancellation and joining of background tasks.
#[derive(Clone, Default)]
pub struct ShutdownCoordinator {
    cancel_token: CancellationToken,
    task_tracker: TaskTracker,
}

impl ShutdownCoordinator {
    /// Create a new coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a child cancellation token, cancelled when shutdown begins.
    pub fn child_token(&self) -> CancellationToken {
        self.cancel_token.child_token()
    }

    /// Spawn and track a background task.
    pub fn spawn<F>(&self, name: &'static str, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        debug!(task = name, "spawning tracked background task");
        tokio::spawn(self.task_tracker.track_future(future))
    }

    /// Cancel all tasks and wait for them to finish, up to `timeout`.
    ///
    /// Returns `true` if every tracked task completed in time.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.cancel_token.cancel();
        self.task_tracker.close();
        match tokio::time::timeout(timeout, self.task_tracker.wait()).await {
            Ok(()) => true,
            Err(_) => {
                warn!(
                    remaining = self.task_tracker.len(),
                    "shutdown timed out with background tasks still running"
                );
                false
            }
        }
    }

    /// Number of tracked tasks still running.
    pub fn active_tasks(&self) -> usize {
        self.task_tracker.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shutdown_cancels_and_joins_tasks() {
        let coordinator = ShutdownCoordinator::new();
        let token = coordinator.child_token();
        coordinator.spawn("waiter", async move {
            token.cancelled().await;
        });
        assert!(coordinator.shutdown(Duration::from_secs(1)).await);
        assert_eq!(coordinator.active_tasks(), 0);
    }

    #[tokio::test]
    async fn shutdown_reports_stuck_tasks() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.spawn("stuck", async {
            tokio::time::sleep(Duration::from_secs(30)).await;
        });
        assert!(!coordinator.shutdown(Duration::from_millis(50)).await);
    }
}
