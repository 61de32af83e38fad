//! Store connectors for kiqforge.
//!
//! A connector is the only component that talks to the store. It exposes the
//! three mutations the Sidekiq protocol needs from a client:
//! - **push**: append a payload to the list polled for a queue
//! - **schedule**: add a payload to the sorted set of delayed jobs
//! - **register_queue_name**: record a queue name so workers discover it
//!
//! Two backends are provided:
//! - **In-Memory**: for tests and local development
//! - **Redis**: the real store shared with Sidekiq workers
//!
//! # Examples
//!
//! ```rust,no_run
//! use kiqforge::prelude::*;
//!
//! # async fn example() -> KiqResult<()> {
//! // In-memory connector
//! let connector = InMemoryConnector::new();
//!
//! // Redis connector (requires redis-connector feature)
//! # #[cfg(feature = "redis-connector")]
//! let connector = RedisConnector::new(RedisConfig::default()).await?;
//! # Ok(())
//! # }
//! ```

use crate::error::KiqResult;
use async_trait::async_trait;
use std::sync::Arc;

pub mod keys;
pub use keys::Keys;

pub mod memory;
pub use memory::{InMemoryConnector, ScheduledEntry};

#[cfg(feature = "redis-connector")]
#[cfg_attr(docsrs, doc(cfg(feature = "redis-connector")))]
pub mod redis;

#[cfg(feature = "redis-connector")]
#[cfg_attr(docsrs, doc(cfg(feature = "redis-connector")))]
pub use self::redis::RedisConnector;

/// Trait that all store backends must implement.
///
/// Implementations must bound every operation with a timeout and report
/// failures as [`KiqError::Store`](crate::error::KiqError::Store). They must
/// not retry.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Append `payload` to the list polled for `queue`.
    async fn push(&self, queue: &str, payload: &str) -> KiqResult<()>;

    /// Add `payload` to the scheduled set, ranked by the unix time `at`.
    async fn schedule(&self, payload: &str, at: f64) -> KiqResult<()>;

    /// Record `queue` in the set of known queue names. Idempotent.
    async fn register_queue_name(&self, queue: &str) -> KiqResult<()>;

    /// Register `queue` and push `payload` to it.
    ///
    /// The default issues two separate store writes. Connectors must
    /// override it to make an immediate enqueue a single mutation.
    async fn enqueue(&self, queue: &str, payload: &str) -> KiqResult<()> {
        self.register_queue_name(queue).await?;
        self.push(queue, payload).await
    }

    /// Health check for the store
    async fn health_check(&self) -> KiqResult<()> {
        Ok(())
    }
}

/// Connector shared between a dispatcher and its queues
pub type SharedConnector = Arc<dyn Connector>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KiqError;
    use tokio::sync::Mutex;

    /// Connector that only implements the three primitives.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Connector for Recorder {
        async fn push(&self, queue: &str, payload: &str) -> KiqResult<()> {
            self.calls.lock().await.push(format!("push {queue} {payload}"));
            Ok(())
        }

        async fn schedule(&self, _payload: &str, _at: f64) -> KiqResult<()> {
            Err(KiqError::store_message("not supported"))
        }

        async fn register_queue_name(&self, queue: &str) -> KiqResult<()> {
            self.calls.lock().await.push(format!("register {queue}"));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_default_enqueue_registers_then_pushes() {
        let recorder = Recorder::default();
        recorder.enqueue("low", "{}").await.unwrap();

        assert_eq!(
            recorder.calls.lock().await.as_slice(),
            ["register low", "push low {}"]
        );
        assert!(recorder.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_connectors_are_object_safe() {
        let connector: SharedConnector = Arc::new(InMemoryConnector::new());
        connector.enqueue("default", "{}").await.unwrap();
        connector.schedule("{}", 10.0).await.unwrap();
    }
}
