//! Per-topic serialization of message processing.
//!
//! The pending-action read, decide and write sequence spans several storage
//! calls, so two messages for the same topic must not interleave. Messages
//! for different topics never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::foundation::TopicId;

/// Registry of one async mutex per active topic.
#[derive(Debug, Clone, Default)]
pub struct TopicLocks {
    locks: Arc<Mutex<HashMap<TopicId, Arc<Mutex<()>>>>>,
}

/// Exclusive access to one topic until dropped.
#[derive(Debug)]
pub struct TopicGuard {
    _guard: OwnedMutexGuard<()>,
}

impl TopicLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `topic_id`.
    ///
    /// Entries nobody holds or waits on are pruned on the way in.
    pub async fn acquire(&self, topic_id: TopicId) -> TopicGuard {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(topic_id).or_default())
        };

        TopicGuard {
            _guard: lock.lock_owned().await,
        }
    }

    /// Number of topics currently tracked.
    pub async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn same_topic_waits_for_release() {
        let locks = TopicLocks::new();
        let topic = TopicId::new();

        let first = locks.acquire(topic).await;
        let blocked = timeout(Duration::from_millis(50), locks.acquire(topic)).await;
        assert!(blocked.is_err());

        drop(first);
        let second = timeout(Duration::from_millis(50), locks.acquire(topic)).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn different_topics_do_not_block() {
        let locks = TopicLocks::new();

        let _a = locks.acquire(TopicId::new()).await;
        let b = timeout(Duration::from_millis(50), locks.acquire(TopicId::new())).await;

        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn released_entries_are_pruned() {
        let locks = TopicLocks::new();

        drop(locks.acquire(TopicId::new()).await);
        drop(locks.acquire(TopicId::new()).await);
        let _held = locks.acquire(TopicId::new()).await;

        assert_eq!(locks.tracked().await, 1);
    }
}
