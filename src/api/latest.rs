use std::future::Future;

use tokio::task::JoinHandle;

use crate::prelude::*;

/// Slot for the most recent background task.
///
/// Replacing the task aborts the previous one, so a slow response to an outdated request
/// never overtakes the current one.
pub struct Latest<T> {
    handle: Option<JoinHandle<T>>,
}

impl<T> Default for Latest<T> {
    fn default() -> Self {
        Self { handle: None }
    }
}

impl<T: Send + 'static> Latest<T> {
    pub fn replace<F>(&mut self, future: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        if let Some(handle) = self.handle.replace(tokio::spawn(future)) {
            handle.abort();
        }
    }

    /// Wait for the current task, if any.
    ///
    /// Returns `None` when there is no task or it got aborted.
    pub async fn finish(&mut self) -> Result<Option<T>> {
        let Some(handle) = self.handle.take() else {
            return Ok(None);
        };
        match handle.await {
            Ok(output) => Ok(Some(output)),
            Err(error) if error.is_cancelled() => Ok(None),
            Err(error) => Err(error).context("the background task failed"),
        }
    }
}

impl<T> Drop for Latest<T> {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}
