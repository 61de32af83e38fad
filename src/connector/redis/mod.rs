//! Redis connector implementation for kiqforge.
//!
//! This connector writes into the Redis structures Sidekiq workers poll:
//!
//! - `queue:<name>` lists, fed with `LPUSH` and drained by the workers' `BRPOP`
//! - the `queues` set, which lets the Web UI and workers discover queues
//! - the `schedule` sorted set, polled by Sidekiq's scheduler for due jobs
//!
//! An immediate enqueue registers the queue name and pushes the payload in a
//! single `MULTI`/`EXEC` transaction.

use super::{Connector, Keys};
use crate::config::RedisConfig;
use crate::error::{KiqError, KiqResult};
use async_trait::async_trait;

use ::redis::{AsyncCommands, Client, RedisResult, aio::ConnectionManager};

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

/// Redis connector backend implementation
#[derive(Clone)]
pub struct RedisConnector {
    /// Redis connection manager
    conn: ConnectionManager,
    /// Redis configuration
    config: RedisConfig,
    /// Key layout
    keys: Keys,
}

impl std::fmt::Debug for RedisConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisConnector")
            .field("config", &self.config)
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

impl RedisConnector {
    /// Connect to Redis using the given configuration
    pub async fn new(config: RedisConfig) -> KiqResult<Self> {
        let client = Client::open(config.connection_string.as_str()).map_err(|e| {
            KiqError::store(format!("Failed to create Redis client: {}", e), e)
        })?;

        let conn = timeout(config.connect_timeout(), client.get_connection_manager())
            .await
            .map_err(|e| KiqError::store("Timed out connecting to Redis", e))?
            .map_err(|e| {
                KiqError::store(
                    format!("Failed to create Redis connection manager: {}", e),
                    e,
                )
            })?;

        info!(
            namespace = config.namespace.as_deref().unwrap_or(""),
            "Connected to Redis"
        );

        Ok(Self::from_connection_manager(conn, config))
    }

    /// Reuse an existing connection manager
    pub fn from_connection_manager(conn: ConnectionManager, config: RedisConfig) -> Self {
        let keys = Keys::new(config.namespace.clone());
        Self { conn, config, keys }
    }

    /// Key layout used by this connector
    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    /// Redis configuration
    pub fn config(&self) -> &RedisConfig {
        &self.config
    }

    /// Await a Redis command, bounded by the configured operation timeout
    async fn run<T, F>(&self, operation: &str, command: F) -> KiqResult<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        bounded(operation, self.config.operation_timeout(), command).await
    }
}

async fn bounded<T, F>(operation: &str, limit: Duration, command: F) -> KiqResult<T>
where
    F: Future<Output = RedisResult<T>>,
{
    match timeout(limit, command).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(KiqError::store(
            format!("Redis {} failed: {}", operation, e),
            e,
        )),
        Err(e) => Err(KiqError::store(
            format!("Redis {} timed out after {:?}", operation, limit),
            e,
        )),
    }
}

#[async_trait]
impl Connector for RedisConnector {
    async fn push(&self, queue: &str, payload: &str) -> KiqResult<()> {
        let mut conn = self.conn.clone();
        let key = self.keys.queue(queue);

        self.run("LPUSH", conn.lpush::<_, _, ()>(&key, payload))
            .await?;

        debug!("Pushed payload to {}", key);
        Ok(())
    }

    async fn schedule(&self, payload: &str, at: f64) -> KiqResult<()> {
        let mut conn = self.conn.clone();
        let key = self.keys.schedule();

        self.run("ZADD", conn.zadd::<_, _, _, ()>(&key, payload, at))
            .await?;

        debug!("Scheduled payload in {} at {}", key, at);
        Ok(())
    }

    async fn register_queue_name(&self, queue: &str) -> KiqResult<()> {
        let mut conn = self.conn.clone();

        self.run("SADD", conn.sadd::<_, _, ()>(self.keys.queues(), queue))
            .await
    }

    async fn enqueue(&self, queue: &str, payload: &str) -> KiqResult<()> {
        let mut conn = self.conn.clone();
        let key = self.keys.queue(queue);

        let mut pipe = ::redis::pipe();
        pipe.atomic()
            .sadd(self.keys.queues(), queue)
            .ignore()
            .lpush(&key, payload)
            .ignore();

        self.run("MULTI SADD/LPUSH", pipe.query_async::<()>(&mut conn))
            .await?;

        debug!("Enqueued payload to {}", key);
        Ok(())
    }

    async fn health_check(&self) -> KiqResult<()> {
        let mut conn = self.conn.clone();

        let pong: String = self
            .run("PING", ::redis::cmd("PING").query_async(&mut conn))
            .await?;

        if pong != "PONG" {
            return Err(KiqError::store_message(
                "Redis health check failed: unexpected response",
            ));
        }

        Ok(())
    }
}
