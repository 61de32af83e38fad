//! In-memory connector implementation for kiqforge.
//!
//! This connector mimics the Redis structures Sidekiq uses (lists, a sorted
//! set and a set) with standard collections. It's meant for development and
//! tests: nothing survives the process and no worker can see the jobs.
//!
//! # Features
//!
//! - **Same key layout**: keys are built with [`Keys`] exactly as for Redis
//! - **Thread-safe**: Uses async-friendly locks
//! - **Inspectable**: queued and scheduled payloads can be read back

use super::{Connector, Keys};
use crate::error::KiqResult;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Member of the scheduled set
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEntry {
    /// Due time (unix seconds)
    pub score: f64,
    /// Encoded payload
    pub member: String,
}

#[derive(Debug, Default)]
struct Store {
    /// Lists indexed by key, head first
    lists: HashMap<String, VecDeque<String>>,
    /// Sorted sets indexed by key, ascending by score then member
    sorted_sets: HashMap<String, Vec<ScheduledEntry>>,
    /// Sets indexed by key
    sets: HashMap<String, BTreeSet<String>>,
}

impl Store {
    fn lpush(&mut self, key: String, value: &str) {
        self.lists.entry(key).or_default().push_front(value.to_string());
    }

    fn sadd(&mut self, key: String, member: &str) -> bool {
        self.sets.entry(key).or_default().insert(member.to_string())
    }

    fn zadd(&mut self, key: String, member: &str, score: f64) {
        let entries = self.sorted_sets.entry(key).or_default();
        entries.retain(|entry| entry.member != member);

        let position = entries.partition_point(|entry| {
            entry.score < score || (entry.score == score && entry.member.as_str() < member)
        });
        entries.insert(
            position,
            ScheduledEntry {
                score,
                member: member.to_string(),
            },
        );
    }
}

/// In-memory connector backend implementation
#[derive(Debug, Clone, Default)]
pub struct InMemoryConnector {
    keys: Keys,
    store: Arc<RwLock<Store>>,
}

impl InMemoryConnector {
    /// Create a new in-memory connector without namespace
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new in-memory connector using the given key layout
    pub fn with_keys(keys: Keys) -> Self {
        Self {
            keys,
            store: Arc::default(),
        }
    }

    /// Key layout used by this connector
    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    /// Payloads waiting in `queue`, most recently pushed first (LRANGE order)
    pub async fn list(&self, queue: &str) -> Vec<String> {
        let store = self.store.read().await;
        store
            .lists
            .get(&self.keys.queue(queue))
            .map(|list| list.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Pop the next payload from `queue` the way a worker does (RPOP)
    pub async fn pop(&self, queue: &str) -> Option<String> {
        let mut store = self.store.write().await;
        store
            .lists
            .get_mut(&self.keys.queue(queue))
            .and_then(VecDeque::pop_back)
    }

    /// Scheduled payloads ordered by due time
    pub async fn scheduled(&self) -> Vec<ScheduledEntry> {
        let store = self.store.read().await;
        store
            .sorted_sets
            .get(&self.keys.schedule())
            .cloned()
            .unwrap_or_default()
    }

    /// Registered queue names, sorted
    pub async fn queue_names(&self) -> Vec<String> {
        let store = self.store.read().await;
        store
            .sets
            .get(&self.keys.queues())
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Connector for InMemoryConnector {
    async fn push(&self, queue: &str, payload: &str) -> KiqResult<()> {
        self.store.write().await.lpush(self.keys.queue(queue), payload);
        tracing::debug!("Pushed payload to {}", self.keys.queue(queue));
        Ok(())
    }

    async fn schedule(&self, payload: &str, at: f64) -> KiqResult<()> {
        self.store
            .write()
            .await
            .zadd(self.keys.schedule(), payload, at);
        tracing::debug!("Scheduled payload at {}", at);
        Ok(())
    }

    async fn register_queue_name(&self, queue: &str) -> KiqResult<()> {
        if self.store.write().await.sadd(self.keys.queues(), queue) {
            tracing::debug!("Registered queue name: {}", queue);
        }
        Ok(())
    }

    async fn enqueue(&self, queue: &str, payload: &str) -> KiqResult<()> {
        let mut store = self.store.write().await;
        store.sadd(self.keys.queues(), queue);
        store.lpush(self.keys.queue(queue), payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_push_keeps_list_order() {
        let connector = InMemoryConnector::new();
        connector.push("default", "first").await.unwrap();
        connector.push("default", "second").await.unwrap();

        assert_eq!(connector.list("default").await, ["second", "first"]);
        assert_eq!(connector.pop("default").await.as_deref(), Some("first"));
        assert_eq!(connector.pop("default").await.as_deref(), Some("second"));
        assert_eq!(connector.pop("default").await, None);
    }

    #[tokio::test]
    async fn test_register_queue_name_is_idempotent() {
        let connector = InMemoryConnector::new();
        connector.register_queue_name("low").await.unwrap();
        connector.register_queue_name("low").await.unwrap();
        connector.register_queue_name("critical").await.unwrap();

        assert_eq!(connector.queue_names().await, ["critical", "low"]);
    }

    #[tokio::test]
    async fn test_schedule_orders_by_score() {
        let connector = InMemoryConnector::new();
        connector.schedule("late", 300.0).await.unwrap();
        connector.schedule("early", 100.0).await.unwrap();
        connector.schedule("middle", 200.0).await.unwrap();

        let members: Vec<String> = connector
            .scheduled()
            .await
            .into_iter()
            .map(|entry| entry.member)
            .collect();
        assert_eq!(members, ["early", "middle", "late"]);
    }

    #[tokio::test]
    async fn test_schedule_same_member_updates_score() {
        let connector = InMemoryConnector::new();
        connector.schedule("job", 300.0).await.unwrap();
        connector.schedule("job", 50.0).await.unwrap();

        let scheduled = connector.scheduled().await;
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].score, 50.0);
    }

    #[tokio::test]
    async fn test_enqueue_registers_and_pushes() {
        let connector = InMemoryConnector::with_keys(Keys::new(Some("app".to_string())));
        connector.enqueue("mailers", "{}").await.unwrap();

        assert_eq!(connector.queue_names().await, ["mailers"]);
        assert_eq!(connector.list("mailers").await, ["{}"]);
        assert_eq!(connector.keys().queue("mailers"), "app:queue:mailers");
    }
}
