//! Named queues.

use super::Backend;
use crate::error::{KiqError, KiqResult};
use crate::payload::JobPayload;
use std::sync::Arc;

/// A named Sidekiq queue bound to one dispatcher.
///
/// Cloning a `Queue` yields another handle to the same instance; a fresh
/// instance is only created by [`Queue::new`] or [`Dispatcher::queue`].
///
/// [`Dispatcher::queue`]: super::Dispatcher::queue
#[derive(Clone)]
pub struct Queue {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    name: String,
    backend: Arc<Backend>,
}

impl std::fmt::Debug for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue")
            .field("name", &self.inner.name)
            .finish_non_exhaustive()
    }
}

impl Queue {
    /// Create a queue instance for `dispatcher`. It must still be registered
    /// with [`Dispatcher::register_queue`](super::Dispatcher::register_queue)
    /// before jobs can be bound to it.
    pub fn new(dispatcher: &super::Dispatcher, name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                name: name.into(),
                backend: Arc::clone(dispatcher.backend()),
            }),
        }
    }

    /// Queue name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Whether both handles refer to the same queue instance
    pub fn same_instance(&self, other: &Queue) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn backend(&self) -> &Arc<Backend> {
        &self.inner.backend
    }

    /// Push `payload` for immediate execution.
    ///
    /// Failures are reported to the dispatcher's error handler.
    pub async fn enqueue_now(&self, payload: &JobPayload) -> KiqResult<()> {
        let result = self.submit_now(payload).await;
        self.backend()
            .report(&format!("Failed to enqueue on queue '{}'", self.name()), result)
    }

    /// Add `payload` to the scheduled set, due at the unix time `at`.
    ///
    /// `at` must be finite and equal to the payload's own due time.
    /// Failures are reported to the dispatcher's error handler.
    pub async fn enqueue_at(&self, payload: &JobPayload, at: f64) -> KiqResult<()> {
        let result = self.submit_at(payload, at).await;
        self.backend().report(
            &format!("Failed to schedule on queue '{}'", self.name()),
            result,
        )
    }

    pub(crate) async fn submit_now(&self, payload: &JobPayload) -> KiqResult<()> {
        let encoded = self.encode(payload)?;
        self.backend()
            .connector
            .enqueue(self.name(), &encoded)
            .await
    }

    pub(crate) async fn submit_at(&self, payload: &JobPayload, at: f64) -> KiqResult<()> {
        if !at.is_finite() || payload.scheduled_at != Some(at) {
            return Err(KiqError::config(format!(
                "Payload {} is not scheduled at {}",
                payload.jid, at
            )));
        }
        let encoded = self.encode(payload)?;
        self.backend().connector.schedule(&encoded, at).await
    }

    fn encode(&self, payload: &JobPayload) -> KiqResult<String> {
        if payload.queue_name != self.name() {
            return Err(KiqError::config(format!(
                "Payload for queue '{}' submitted to queue '{}'",
                payload.queue_name,
                self.name()
            )));
        }
        payload.encode()
    }
}
