//! Remote jobs and their dispatch primitives.
//!
//! A [`Job`] binds a remote handler name (the Ruby worker class, e.g.
//! `App::Jobs::CleanUp`) to one [`Queue`]. It offers two primitives,
//! [`Job::perform_async`] and [`Job::perform_in`], that application code
//! wraps in typed methods, usually through the [`remote_job!`] macro.
//!
//! # Examples
//!
//! ```rust
//! use kiqforge::prelude::*;
//! use std::sync::Arc;
//!
//! remote_job! {
//!     /// Deletes stale records on the Ruby side.
//!     pub struct CleanUpJob => "App::Jobs::CleanUp" {
//!         /// Remove at most `limit` stale records.
//!         fn clean_up(limit: u32);
//!     }
//! }
//!
//! # async fn example() -> KiqResult<()> {
//! let mut dispatcher = Dispatcher::new(Arc::new(InMemoryConnector::new()));
//! let urgent = dispatcher.queue("urgent")?;
//! let clean_up = CleanUpJob::new(&mut dispatcher, &urgent)?;
//!
//! let now = clean_up.clean_up(50).await?;
//! let later = clean_up.clean_up_in(30u64.minutes(), 50).await?;
//! # Ok(())
//! # }
//! ```

use super::Queue;
use crate::args::JobArgs;
use crate::error::KiqResult;
use crate::payload::{Delay, JobId, JobPayload, Retry};

/// A remote job bound to one queue.
///
/// Jobs hold no per-call state; clones share the queue and may dispatch
/// concurrently.
#[derive(Debug, Clone)]
pub struct Job {
    queue: Queue,
    remote_class: String,
    retry: Retry,
}

impl Job {
    pub(crate) fn new(queue: Queue, remote_class: String, retry: Retry) -> Self {
        Self {
            queue,
            remote_class,
            retry,
        }
    }

    /// Remote handler name
    pub fn remote_class(&self) -> &str {
        &self.remote_class
    }

    /// Queue this job is enqueued on
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Retry policy sent with every payload
    pub fn retry(&self) -> Retry {
        self.retry
    }

    /// Enqueue the job for immediate execution and return its id.
    pub async fn perform_async<A: JobArgs>(&self, args: A) -> KiqResult<JobId> {
        let result = self.dispatch(None, args).await;
        self.report(result)
    }

    /// Schedule the job to run after `delay` and return its id.
    ///
    /// The delay must be strictly positive; use [`Job::perform_async`] for
    /// immediate execution.
    pub async fn perform_in<A: JobArgs>(
        &self,
        delay: impl Into<Delay>,
        args: A,
    ) -> KiqResult<JobId> {
        let result = self.dispatch(Some(delay.into()), args).await;
        self.report(result)
    }

    async fn dispatch<A: JobArgs>(&self, delay: Option<Delay>, args: A) -> KiqResult<JobId> {
        let args = args.into_args()?;
        let payload = JobPayload::build(
            self.remote_class.as_str(),
            self.queue.name(),
            args,
            Some(self.retry),
            delay,
        )?;

        match payload.scheduled_at {
            Some(at) => self.queue.submit_at(&payload, at).await?,
            None => self.queue.submit_now(&payload).await?,
        }

        tracing::debug!(
            jid = %payload.jid,
            class = %self.remote_class,
            queue = %self.queue.name(),
            scheduled = payload.is_scheduled(),
            "Enqueued job"
        );
        Ok(payload.jid)
    }

    fn report(&self, result: KiqResult<JobId>) -> KiqResult<JobId> {
        self.queue.backend().report(
            &format!(
                "Failed to enqueue {} on queue '{}'",
                self.remote_class,
                self.queue.name()
            ),
            result,
        )
    }
}

/// Declare a typed wrapper around a [`Job`].
///
/// For every `fn name(args...)` the wrapper gets two async methods:
/// `name(args...)`, which enqueues immediately, and
/// `name_in(delay, args...)`, which schedules the job.
#[macro_export]
macro_rules! remote_job {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident => $class:literal {
            $(
                $(#[$method_meta:meta])*
                fn $method:ident($($arg:ident : $ty:ty),* $(,)?);
            )*
        }
    ) => {
        $crate::paste::paste! {
            $(#[$meta])*
            #[derive(Debug, Clone)]
            $vis struct $name {
                job: $crate::core::Job,
            }

            #[allow(dead_code)]
            impl $name {
                /// Remote handler name
                pub const REMOTE_CLASS: &'static str = $class;

                /// Declare this job on `queue`
                pub fn new(
                    dispatcher: &mut $crate::core::Dispatcher,
                    queue: &$crate::core::Queue,
                ) -> $crate::error::KiqResult<Self> {
                    Ok(Self {
                        job: dispatcher.job(queue, $class)?,
                    })
                }

                /// Declare this job on `queue` with a custom retry policy
                pub fn with_retry(
                    dispatcher: &mut $crate::core::Dispatcher,
                    queue: &$crate::core::Queue,
                    retry: $crate::payload::Retry,
                ) -> $crate::error::KiqResult<Self> {
                    Ok(Self {
                        job: dispatcher.job_with_retry(queue, $class, retry)?,
                    })
                }

                /// The underlying job
                pub fn job(&self) -> &$crate::core::Job {
                    &self.job
                }

                $(
                    $(#[$method_meta])*
                    pub async fn $method(
                        &self,
                        $($arg: $ty),*
                    ) -> $crate::error::KiqResult<$crate::payload::JobId> {
                        self.job.perform_async(($($arg,)*)).await
                    }

                    $(#[$method_meta])*
                    pub async fn [<$method _in>](
                        &self,
                        delay: impl Into<$crate::payload::Delay>,
                        $($arg: $ty),*
                    ) -> $crate::error::KiqResult<$crate::payload::JobId> {
                        self.job.perform_in(delay, ($($arg,)*)).await
                    }
                )*
            }
        }
    };
}
