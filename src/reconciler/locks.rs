//! In-process serialization of resource creation.
//!
//! Creating a resource is a check-then-create sequence (resolve the external
//! id, probe group names, then create). Two requests carrying the same key
//! would otherwise both see "absent" and both create. [`CreationLocks`] hands
//! out one async mutex per key so that such sequences run one at a time
//! within this process. Entries are removed once no request holds or awaits
//! them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockTable = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// Registry of per-key creation locks.
#[derive(Clone, Default)]
pub struct CreationLocks {
    enabled: bool,
    table: LockTable,
}

impl CreationLocks {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            table: LockTable::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Wait for exclusive use of `key`. Returns `None` when locking is off.
    pub async fn acquire(&self, key: impl Into<String>) -> Option<CreationGuard> {
        if !self.enabled {
            return None;
        }

        let key = key.into();
        let entry = {
            let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            table.entry(key.clone()).or_default().clone()
        };
        let guard = entry.lock_owned().await;

        Some(CreationGuard {
            key,
            guard: Some(guard),
            table: self.table.clone(),
        })
    }

    /// Number of keys currently held or awaited.
    pub fn active_keys(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Exclusive hold on one creation key, released on drop.
pub struct CreationGuard {
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
    table: LockTable,
}

impl Drop for CreationGuard {
    fn drop(&mut self) {
        self.guard.take();

        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        let idle = table
            .get(&self.key)
            .is_some_and(|entry| Arc::strong_count(entry) == 1);
        if idle {
            table.remove(&self.key);
        }
    }
}

/// Lock key for an external id. Matching is case-insensitive, so is the key.
pub fn external_id_key(resource_type: &str, external_id: &str) -> String {
    format!("{}:external-id:{}", resource_type, external_id.to_lowercase())
}

/// Lock key for a user name.
pub fn user_name_key(user_name: &str) -> String {
    format!("User:user-name:{}", user_name)
}

/// Lock key for a sanitized group base name.
pub fn group_name_key(base_name: &str) -> String {
    format!("Group:name:{}", base_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_disabled_locks_return_none() {
        let locks = CreationLocks::new(false);
        assert!(locks.acquire("key").await.is_none());
        assert_eq!(locks.active_keys(), 0);
    }

    #[tokio::test]
    async fn test_entry_removed_after_release() {
        let locks = CreationLocks::new(true);
        {
            let _guard = locks.acquire("key").await;
            assert_eq!(locks.active_keys(), 1);
        }
        assert_eq!(locks.active_keys(), 0);
    }

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = CreationLocks::new(true);
        let guard = locks.acquire("key").await;

        let contender = locks.clone();
        let waiter = tokio::spawn(async move {
            let _guard = contender.acquire("key").await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
        assert_eq!(locks.active_keys(), 0);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let locks = CreationLocks::new(true);
        let _first = locks.acquire("a").await;
        let second = tokio::time::timeout(Duration::from_millis(100), locks.acquire("b")).await;
        assert!(second.is_ok());
    }

    #[test]
    fn test_external_id_key_is_case_insensitive() {
        assert_eq!(external_id_key("User", "ABC"), external_id_key("User", "abc"));
        assert_ne!(external_id_key("User", "abc"), external_id_key("Group", "abc"));
    }
}
