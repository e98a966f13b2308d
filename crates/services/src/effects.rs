//! Deferred side effects.
//!
//! Counter bumps, actor persistence and event publishing must not hold up
//! the caller's response. Instead of firing naked `tokio::spawn`s deep in
//! the pipeline, services return a [`SideEffects`] bundle alongside the
//! response value: the HTTP layer spawns it after replying, and tests run
//! it inline to assert on outcomes deterministically.

use std::future::Future;

use futures::future::BoxFuture;

/// An ordered bundle of post-response tasks.
///
/// Task failures are logged and swallowed: the caller already has its
/// response, and there is no propagation path back. A crash between the
/// primary insert and these tasks leaves a stale counter; no transaction
/// spans the two.
#[derive(Default)]
pub struct SideEffects {
    tasks: Vec<BoxFuture<'static, ()>>,
}

impl SideEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a task. `label` names it in the failure log line.
    pub fn defer<F>(&mut self, label: &'static str, task: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.tasks.push(Box::pin(async move {
            if let Err(err) = task.await {
                tracing::warn!(task = label, error = %err, "deferred side effect failed");
            }
        }));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Runs every queued task in order. Used directly by tests; production
    /// callers go through [`SideEffects::spawn`].
    pub async fn run(self) {
        for task in self.tasks {
            task.await;
        }
    }

    /// Detaches the bundle onto the runtime after the response is sent.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

impl std::fmt::Debug for SideEffects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SideEffects")
            .field("pending", &self.tasks.len())
            .finish()
    }
}
