//! Per-target serialization of mutating operations

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

/// Hands out one lock per target identifier, so read-then-write sequences
/// against the same service or node never interleave.
///
/// Entries are pruned once no operation references them anymore, keeping
/// the map bounded by the number of in-flight operations.
pub(crate) struct TargetLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TargetLocks {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Lock handle for the given target, created on first use
    pub(crate) async fn acquire(&self, id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.inner.lock().await;
        locks.entry(id.to_string()).or_default().clone()
    }

    /// Drop the target's entry if no operation holds or awaits it
    pub(crate) async fn prune(&self, id: &str) {
        let mut locks = self.inner.lock().await;
        if let Some(lock) = locks.get(id) {
            if Arc::strong_count(lock) == 1 {
                locks.remove(id);
            }
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_target_shares_one_lock() {
        let locks = TargetLocks::new();
        let a1 = locks.acquire("a").await;
        let a2 = locks.acquire("a").await;
        let b = locks.acquire("b").await;

        assert!(Arc::ptr_eq(&a1, &a2));
        assert!(!Arc::ptr_eq(&a1, &b));
    }

    #[tokio::test]
    async fn test_prune_keeps_held_entries() {
        let locks = TargetLocks::new();
        let held = locks.acquire("a").await;

        locks.prune("a").await;
        assert_eq!(locks.len().await, 1);

        drop(held);
        locks.prune("a").await;
        assert_eq!(locks.len().await, 0);
    }
}
