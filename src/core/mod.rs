//! The dispatcher and the queues and jobs it owns.
//!
//! The [`Dispatcher`] is the composition root of kiqforge: it holds the store
//! [`Connector`](crate::connector::Connector), the [`ErrorHandler`] and every
//! declared [`Queue`] and [`Job`]. Applications wrap it in their own struct
//! and declare their queues and jobs once, at construction time.

use crate::connector::SharedConnector;
use crate::error::{KiqError, KiqResult};
use crate::handler::{ErrorHandler, NullErrorHandler};
use crate::payload::Retry;
use std::collections::BTreeMap;
use std::sync::Arc;

pub mod job;
pub mod queue;

pub use job::Job;
pub use queue::Queue;

/// Capabilities shared by a dispatcher and all of its queues.
pub(crate) struct Backend {
    pub(crate) connector: SharedConnector,
    pub(crate) error_handler: Arc<dyn ErrorHandler>,
}

impl Backend {
    /// Hand a failed result to the error handler, then pass it on unchanged.
    pub(crate) fn report<T>(&self, context: &str, result: KiqResult<T>) -> KiqResult<T> {
        if let Err(error) = &result {
            self.error_handler.handle(context, error);
        }
        result
    }
}

/// The composition root owning the connector and declared queues and jobs.
///
/// # Examples
///
/// ```rust
/// use kiqforge::prelude::*;
/// use std::sync::Arc;
///
/// struct MyKiq {
///     dispatcher: Dispatcher,
///     say_hello: Job,
/// }
///
/// impl MyKiq {
///     fn new(connector: SharedConnector) -> KiqResult<Self> {
///         let mut dispatcher = Dispatcher::new(connector);
///         let low = dispatcher.queue("low")?;
///         let say_hello = dispatcher.job(&low, "SayHello")?;
///         Ok(Self { dispatcher, say_hello })
///     }
///
///     async fn say_hello(&self, what: &str) -> KiqResult<JobId> {
///         self.say_hello.perform_async((what,)).await
///     }
/// }
///
/// # async fn example() -> KiqResult<()> {
/// let kiq = MyKiq::new(Arc::new(InMemoryConnector::new()))?;
/// let jid = kiq.say_hello("Hello").await?;
/// # Ok(())
/// # }
/// ```
pub struct Dispatcher {
    backend: Arc<Backend>,
    queues: BTreeMap<String, Queue>,
    jobs: Vec<Job>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("queues", &self.queues.keys().collect::<Vec<_>>())
            .field("jobs", &self.jobs.len())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Create a dispatcher whose errors are observed by [`NullErrorHandler`].
    pub fn new(connector: SharedConnector) -> Self {
        Self::with_error_handler(connector, Arc::new(NullErrorHandler))
    }

    /// Create a dispatcher with a custom error handler.
    pub fn with_error_handler(
        connector: SharedConnector,
        error_handler: Arc<dyn ErrorHandler>,
    ) -> Self {
        Self {
            backend: Arc::new(Backend {
                connector,
                error_handler,
            }),
            queues: BTreeMap::new(),
            jobs: Vec::new(),
        }
    }

    /// Create a dispatcher backed by Redis.
    #[cfg(feature = "redis-connector")]
    #[cfg_attr(docsrs, doc(cfg(feature = "redis-connector")))]
    pub async fn with_redis(
        config: crate::config::RedisConfig,
        error_handler: Arc<dyn ErrorHandler>,
    ) -> KiqResult<Self> {
        let connector = crate::connector::RedisConnector::new(config).await?;
        Ok(Self::with_error_handler(Arc::new(connector), error_handler))
    }

    pub(crate) fn backend(&self) -> &Arc<Backend> {
        &self.backend
    }

    /// Declare a new queue called `name` and register it.
    pub fn queue(&mut self, name: impl Into<String>) -> KiqResult<Queue> {
        let queue = Queue::new(self, name);
        self.register_queue(&queue)?;
        Ok(queue)
    }

    /// Register a queue instance.
    ///
    /// Registering the same instance again is a no-op. A different instance
    /// with an already registered name is rejected, since workers address
    /// queues by name only.
    pub fn register_queue(&mut self, queue: &Queue) -> KiqResult<()> {
        if queue.name().is_empty() {
            return Err(KiqError::config("Queue name must not be empty"));
        }

        if !Arc::ptr_eq(queue.backend(), &self.backend) {
            return Err(KiqError::config(format!(
                "Queue '{}' was created for another dispatcher",
                queue.name()
            )));
        }

        if let Some(existing) = self.queues.get(queue.name()) {
            if existing.same_instance(queue) {
                return Ok(());
            }
            tracing::warn!("Rejected duplicate queue: {}", queue.name());
            return Err(KiqError::config(format!(
                "A different queue named '{}' is already registered",
                queue.name()
            )));
        }

        tracing::info!("Registering queue: {}", queue.name());
        self.queues.insert(queue.name().to_string(), queue.clone());
        Ok(())
    }

    /// Declare a job for `remote_class` on `queue` with the default retry policy.
    pub fn job(&mut self, queue: &Queue, remote_class: impl Into<String>) -> KiqResult<Job> {
        self.job_with_retry(queue, remote_class, Retry::default())
    }

    /// Declare a job for `remote_class` on `queue`.
    ///
    /// The queue must have been registered with this dispatcher.
    pub fn job_with_retry(
        &mut self,
        queue: &Queue,
        remote_class: impl Into<String>,
        retry: Retry,
    ) -> KiqResult<Job> {
        let remote_class = remote_class.into();
        if remote_class.is_empty() {
            return Err(KiqError::config("Remote class name must not be empty"));
        }

        let registered = self
            .queues
            .get(queue.name())
            .is_some_and(|existing| existing.same_instance(queue));
        if !registered {
            return Err(KiqError::config(format!(
                "Queue '{}' is not registered with this dispatcher",
                queue.name()
            )));
        }

        tracing::info!(
            "Registering job {} on queue {}",
            remote_class,
            queue.name()
        );
        let job = Job::new(queue.clone(), remote_class, retry);
        self.jobs.push(job.clone());
        Ok(job)
    }

    /// Look up a registered queue by name.
    pub fn get_queue(&self, name: &str) -> Option<&Queue> {
        self.queues.get(name)
    }

    /// All registered queues, ordered by name.
    pub fn queues(&self) -> impl Iterator<Item = &Queue> {
        self.queues.values()
    }

    /// All declared jobs, in declaration order.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// The store connector.
    pub fn connector(&self) -> &SharedConnector {
        &self.backend.connector
    }

    /// Perform a health check on the store.
    pub async fn health_check(&self) -> KiqResult<()> {
        let result = self.backend.connector.health_check().await;
        self.backend.report("Store health check failed", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::InMemoryConnector;
    use crate::error::ErrorKind;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(InMemoryConnector::new()))
    }

    #[test]
    fn test_duplicate_queue_names_are_rejected() {
        let mut dispatcher = dispatcher();
        dispatcher.queue("urgent").unwrap();

        let error = dispatcher.queue("urgent").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);

        let other = Queue::new(&dispatcher, "urgent");
        let error = dispatcher.register_queue(&other).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);
        assert_eq!(dispatcher.queues().count(), 1);
    }

    #[test]
    fn test_reregistering_same_instance_is_noop() {
        let mut dispatcher = dispatcher();
        let queue = dispatcher.queue("urgent").unwrap();

        dispatcher.register_queue(&queue).unwrap();
        dispatcher.register_queue(&queue.clone()).unwrap();
        assert_eq!(dispatcher.queues().count(), 1);
        assert!(dispatcher.get_queue("urgent").unwrap().same_instance(&queue));
    }

    #[test]
    fn test_queue_from_other_dispatcher_is_rejected() {
        let mut first = dispatcher();
        let mut second = dispatcher();
        let queue = first.queue("low").unwrap();

        let error = second.register_queue(&queue).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);
        assert!(second.job(&queue, "SayHello").is_err());
    }

    #[test]
    fn test_jobs_require_registered_queue() {
        let mut dispatcher = dispatcher();
        let unregistered = Queue::new(&dispatcher, "low");

        let error = dispatcher.job(&unregistered, "SayHello").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);

        dispatcher.register_queue(&unregistered).unwrap();
        let job = dispatcher.job(&unregistered, "SayHello").unwrap();
        assert_eq!(job.queue().name(), "low");
        assert_eq!(job.retry(), Retry::ENABLED);
        assert_eq!(dispatcher.jobs().len(), 1);
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        let mut dispatcher = dispatcher();
        assert!(dispatcher.queue("").is_err());

        let queue = dispatcher.queue("low").unwrap();
        let error = dispatcher.job(&queue, "").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_jobs_share_a_queue() {
        let mut dispatcher = dispatcher();
        let queue = dispatcher.queue("default").unwrap();

        let first = dispatcher.job(&queue, "First").unwrap();
        let second = dispatcher
            .job_with_retry(&queue, "Second", Retry::DISABLED)
            .unwrap();

        assert!(first.queue().same_instance(second.queue()));
        assert_eq!(second.retry(), Retry::DISABLED);
        let classes: Vec<&str> = dispatcher.jobs().iter().map(Job::remote_class).collect();
        assert_eq!(classes, ["First", "Second"]);
    }

    #[tokio::test]
    async fn test_health_check() {
        assert!(dispatcher().health_check().await.is_ok());
    }
}
