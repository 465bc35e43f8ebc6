use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::{AbortHandle, JoinHandle};

/// Runs at most one task at a time: each submission aborts whatever the
/// previous one was doing (waiting or running), then waits `delay` before
/// starting. Bursts of submissions therefore only run the last one.
pub struct Superseder {
    delay: Duration,
    pending: Mutex<Option<AbortHandle>>,
}

impl Superseder {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub async fn submit<F, T>(&self, task: F) -> JoinHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let mut pending = self.pending.lock().await;
        if let Some(previous) = pending.take() {
            if !previous.is_finished() {
                tracing::debug!("Superseding pending recomputation");
            }
            previous.abort();
        }

        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await
        });
        *pending = Some(handle.abort_handle());
        handle
    }

    /// Aborts the pending task, if any
    pub async fn cancel(&self) {
        if let Some(previous) = self.pending.lock().await.take() {
            previous.abort();
        }
    }
}
