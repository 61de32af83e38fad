//! # kiqforge
//!
//! A typed async client that enqueues jobs for Sidekiq workers.
//!
//! kiqforge never runs jobs. It writes JSON payloads into the Redis
//! structures Sidekiq workers poll, so Rust services can hand work to
//! an existing Ruby (or Sidekiq-compatible) worker fleet.
//!
//! ## Features
//!
//! - **Declarative Jobs**: Use the [`remote_job!`] macro to declare typed job wrappers
//! - **Scheduled Jobs**: Every job can be enqueued now or after a delay
//! - **Atomic Enqueue**: Queue registration and push happen in one transaction
//! - **Namespaces**: Optional key prefix shared with the workers
//! - **Observability**: Structured logging through `tracing` and pluggable error handlers
//!
//! ## Quick Start
//!
//! ```rust
//! use kiqforge::prelude::*;
//! use std::sync::Arc;
//!
//! remote_job! {
//!     /// Purges stale records on the worker side
//!     pub struct CleanUpJob => "App::Jobs::CleanUp" {
//!         fn clean_up(limit: u32);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> KiqResult<()> {
//!     let connector = Arc::new(InMemoryConnector::new());
//!     let mut dispatcher = Dispatcher::with_error_handler(
//!         connector.clone(),
//!         Arc::new(TracingErrorHandler),
//!     );
//!
//!     let low = dispatcher.queue("low")?;
//!     let cleanup = CleanUpJob::new(&mut dispatcher, &low)?;
//!
//!     cleanup.clean_up(50).await?;
//!     cleanup.clean_up_in(30u64.minutes(), 50).await?;
//!
//!     assert_eq!(connector.list("low").await.len(), 1);
//!     assert_eq!(connector.scheduled().await.len(), 1);
//!     Ok(())
//! }
//! ```

pub mod args;
pub mod config;
pub mod connector;
pub mod core;
pub mod error;
pub mod handler;
pub mod payload;

#[doc(hidden)]
pub use paste;

pub mod prelude {
    pub use crate::args::{JobArgs, ToArg};
    pub use crate::config::*;
    pub use crate::connector::{Connector, InMemoryConnector, Keys, SharedConnector};
    pub use crate::core::{Dispatcher, Job, Queue};
    pub use crate::error::{ErrorKind, KiqError, KiqResult};
    pub use crate::handler::{ErrorHandler, NullErrorHandler, TracingErrorHandler};
    pub use crate::payload::{Delay, JobId, JobPayload, Retry};
    pub use crate::remote_job;
    pub use async_trait::async_trait;

    #[cfg(feature = "redis-connector")]
    #[cfg_attr(docsrs, doc(cfg(feature = "redis-connector")))]
    pub use crate::connector::RedisConnector;
}

pub use crate::config::*;
pub use crate::connector::{Connector, InMemoryConnector, SharedConnector};
pub use crate::core::{Dispatcher, Job, Queue};
pub use crate::error::{ErrorKind, KiqError, KiqResult};
pub use crate::handler::{ErrorHandler, NullErrorHandler, TracingErrorHandler};
pub use crate::payload::{Delay, JobId, JobPayload, Retry};
