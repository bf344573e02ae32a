//! Per-user serialization of read-modify-write sequences.

use std::sync::Arc;

use dashmap::DashMap;
use questbound_domain::UserId;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = DashMap<UserId, Arc<Mutex<()>>>;

/// One async mutex per user, created on first use and dropped from the table
/// when its last holder or waiter lets go.
#[derive(Default)]
pub struct UserLocks {
    locks: Arc<LockTable>,
}

/// Exclusive access to one user's records.
pub struct UserLockGuard {
    user_id: UserId,
    table: Arc<LockTable>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user_id`'s records. Held until the guard
    /// is dropped.
    pub async fn lock(&self, user_id: UserId) -> UserLockGuard {
        // Clone the Arc out so the shard lock is released before awaiting
        let lock = self.locks.entry(user_id).or_default().clone();
        let guard = lock.lock_owned().await;
        UserLockGuard {
            user_id,
            table: self.locks.clone(),
            guard: Some(guard),
        }
    }

    pub fn tracked_users(&self) -> usize {
        self.locks.len()
    }
}

impl Drop for UserLockGuard {
    fn drop(&mut self) {
        // The table and our guard hold the only references: nobody is waiting.
        // `remove_if` holds the shard lock, so no new waiter can clone it meanwhile.
        self.table
            .remove_if(&self.user_id, |_, lock| Arc::strong_count(lock) == 2);
        self.guard.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_user_is_serialized() {
        let locks = Arc::new(UserLocks::new());
        let user = UserId::new();

        let guard = locks.lock(user).await;
        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock(user).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(locks.tracked_users(), 0);
    }

    #[tokio::test]
    async fn different_users_do_not_block_each_other() {
        let locks = UserLocks::new();
        let _first = locks.lock(UserId::new()).await;
        let second = tokio::time::timeout(Duration::from_millis(100), locks.lock(UserId::new())).await;
        assert!(second.is_ok());
        assert_eq!(locks.tracked_users(), 2);
    }

    #[tokio::test]
    async fn released_locks_leave_the_table() {
        let locks = UserLocks::new();
        for _ in 0..50 {
            let _guard = locks.lock(UserId::new()).await;
        }
        assert_eq!(locks.tracked_users(), 0);
    }

    #[tokio::test]
    async fn entry_survives_while_someone_waits() {
        let locks = Arc::new(UserLocks::new());
        let user = UserId::new();

        let guard = locks.lock(user).await;
        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock(user).await;
                tokio::time::sleep(Duration::from_millis(20)).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(guard);
        assert_eq!(locks.tracked_users(), 1);

        waiter.await.unwrap();
        assert_eq!(locks.tracked_users(), 0);
    }
}
