//! Redis key layout shared with Sidekiq workers.

/// List of pending payloads for one queue: `queue:<name>`
pub const QUEUE_PREFIX: &str = "queue";

/// Set of all known queue names
pub const QUEUES_KEY: &str = "queues";

/// Sorted set of scheduled payloads, scored by due time
pub const SCHEDULE_KEY: &str = "schedule";

/// Redis key builder, optionally scoped to a namespace.
///
/// With a namespace every key is prefixed with `<namespace>:`, the layout
/// used by `redis-namespace` deployments of Sidekiq.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keys {
    namespace: Option<String>,
}

impl Keys {
    /// Key builder for the given namespace
    pub fn new(namespace: Option<String>) -> Self {
        Self { namespace }
    }

    /// The namespace, if any
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Queue Key (List)
    /// Example: queue:default
    pub fn queue(&self, queue_name: &str) -> String {
        self.scoped(&format!("{}:{}", QUEUE_PREFIX, queue_name))
    }

    /// All queues set Key (Set)
    pub fn queues(&self) -> String {
        self.scoped(QUEUES_KEY)
    }

    /// Scheduled jobs Key (ZSet)
    pub fn schedule(&self) -> String {
        self.scoped(SCHEDULE_KEY)
    }

    fn scoped(&self, key: &str) -> String {
        match &self.namespace {
            Some(namespace) => format!("{}:{}", namespace, key),
            None => key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_formats() {
        let keys = Keys::default();
        assert_eq!(keys.queue("default"), "queue:default");
        assert_eq!(keys.queues(), "queues");
        assert_eq!(keys.schedule(), "schedule");
        assert_eq!(keys.namespace(), None);
    }

    #[test]
    fn test_namespaced_key_formats() {
        let keys = Keys::new(Some("myapp".to_string()));
        assert_eq!(keys.queue("urgent"), "myapp:queue:urgent");
        assert_eq!(keys.queues(), "myapp:queues");
        assert_eq!(keys.schedule(), "myapp:schedule");
    }
}
