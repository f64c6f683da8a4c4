use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::error::JobError;

/// A network call running on its own task.
///
/// Awaiting the task yields its output, or [`JobError::Cancelled`] if it was
/// aborted first. Dropping the task aborts the call.
#[derive(Debug)]
pub struct CancellableTask<T> {
    handle: JoinHandle<T>,
}

impl<T: Send + 'static> CancellableTask<T> {
    /// Spawn `future` onto the current runtime.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self { handle: tokio::spawn(future) }
    }
}

impl<T> CancellableTask<T> {
    /// Abort the call. Awaiting afterwards yields `Cancelled`.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<T> Drop for CancellableTask<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl<T> Future for CancellableTask<T> {
    type Output = Result<T, JobError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx).map(|joined| {
            joined.map_err(|err| {
                if err.is_cancelled() {
                    JobError::Cancelled
                } else {
                    JobError::Transport(format!("request task panicked: {err}"))
                }
            })
        })
    }
}

/// Await the task in `slot`, or never resolve if the slot is empty.
///
/// The slot is cleared once the task resolves.
pub async fn join_slot<T>(slot: &mut Option<CancellableTask<T>>) -> Result<T, JobError> {
    let output = match slot.as_mut() {
        Some(task) => task.await,
        None => std::future::pending().await,
    };
    *slot = None;
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn completed_task_yields_output() {
        let task = CancellableTask::spawn(async { 7 });
        assert_eq!(task.await.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_task_yields_cancelled() {
        let task = CancellableTask::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            1
        });
        task.cancel();
        assert!(matches!(task.await, Err(JobError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_task_is_aborted() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let task = CancellableTask::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            flag.store(true, Ordering::SeqCst);
        });
        drop(task);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn join_slot_clears_slot() {
        let mut slot = Some(CancellableTask::spawn(async { "done" }));
        assert_eq!(join_slot(&mut slot).await.unwrap(), "done");
        assert!(slot.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_slot_never_resolves() {
        let mut slot: Option<CancellableTask<()>> = None;
        let raced = tokio::time::timeout(Duration::from_secs(5), join_slot(&mut slot)).await;
        assert!(raced.is_err());
    }
}
