use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{ContainuError, ContainuResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A table of per-resource async locks.
///
/// Operations on the same id queue behind each other while operations on distinct ids never
/// contend. A guard is held for a whole lifecycle operation, simulated latency included.
#[derive(Debug, Default)]
pub struct ResourceLocks {
    table: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

/// Exclusive access to one id. Dropping it unlocks the id and prunes its table entry when no
/// other operation is waiting on it.
#[derive(Debug)]
pub struct ResourceGuard {
    id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<ResourceLocks>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ResourceLocks {
    /// Creates an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `id`.
    pub async fn acquire(self: &Arc<Self>, id: Uuid) -> ContainuResult<ResourceGuard> {
        let lock = {
            let mut table = self
                .table
                .lock()
                .map_err(|e| ContainuError::LockPoisoned(e.to_string()))?;
            table.entry(id).or_default().clone()
        };

        Ok(ResourceGuard {
            id,
            guard: Some(lock.lock_owned().await),
            locks: self.clone(),
        })
    }

    /// Returns the number of ids with a live lock entry.
    pub fn len(&self) -> usize {
        self.table.lock().map(|table| table.len()).unwrap_or_default()
    }

    /// Returns `true` if no id has a live lock entry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Guards and waiters each hold a clone of the entry, so a count of one means only the
    // table refers to it.
    fn release(&self, id: Uuid) {
        let Ok(mut table) = self.table.lock() else {
            tracing::warn!(%id, "lock table poisoned; entry not released");
            return;
        };

        if table.get(&id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            table.remove(&id);
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.release(self.id);
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_same_id_is_serialized() {
        let locks = Arc::new(ResourceLocks::new());
        let id = Uuid::new_v4();

        let guard = locks.acquire(id).await.unwrap();

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(id).await.unwrap();
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
        assert!(locks.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_distinct_ids_do_not_contend() {
        let locks = Arc::new(ResourceLocks::new());
        let _a = locks.acquire(Uuid::new_v4()).await.unwrap();
        let b = tokio::time::timeout(Duration::from_millis(50), locks.acquire(Uuid::new_v4())).await;

        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[test_log::test(tokio::test)]
    async fn test_dropped_guard_prunes_entry() {
        let locks = Arc::new(ResourceLocks::new());

        for _ in 0..100 {
            let _guard = locks.acquire(Uuid::new_v4()).await.unwrap();
        }

        assert!(locks.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_entry_kept_while_another_waits() {
        let locks = Arc::new(ResourceLocks::new());
        let id = Uuid::new_v4();

        let first = locks.acquire(id).await.unwrap();
        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move { locks.acquire(id).await.unwrap() })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        drop(first);
        assert_eq!(locks.len(), 1);

        let second = waiter.await.unwrap();
        assert_eq!(locks.len(), 1);

        drop(second);
        assert!(locks.is_empty());
    }
}
