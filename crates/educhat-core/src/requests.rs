//! One in-flight request per feature.
//!
//! A slot holds the spawned task of the request it is running. Starting while
//! busy is refused, so repeated submissions can't pile up, and cancelling
//! aborts the task outright.

use std::future::Future;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{ClientError, Result};

pub struct RequestSlot<T> {
    name: &'static str,
    task: Option<JoinHandle<Result<T>>>,
}

impl<T: Send + 'static> RequestSlot<T> {
    pub fn new(name: &'static str) -> Self {
        Self { name, task: None }
    }

    pub fn is_busy(&self) -> bool {
        self.task.is_some()
    }

    /// Spawns `request` unless one is already running. Returns whether it started.
    pub fn start<F>(&mut self, request: F) -> bool
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        if self.is_busy() {
            debug!(slot = self.name, "request already in flight; ignoring submit");
            return false;
        }
        self.task = Some(tokio::spawn(request));
        true
    }

    /// Aborts the running request. Returns false when nothing was running.
    pub fn cancel(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                debug!(slot = self.name, "request cancelled");
                true
            }
            None => false,
        }
    }

    /// Takes the outcome once the task has finished; `None` while it is still running.
    pub async fn poll_finished(&mut self) -> Option<Result<T>> {
        if !self.task.as_ref().is_some_and(|t| t.is_finished()) {
            return None;
        }
        let task = self.task.take()?;
        Some(match task.await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Cancelled),
        })
    }
}

impl<T> Drop for RequestSlot<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
