//! In-process per-account transfer locks.
//!
//! Transfers debiting the same origin are serialized through one async mutex
//! per account. The row lock taken inside the database transaction covers
//! other processes; this map keeps a single server from racing itself on
//! backends without row locks (SQLite).

use std::sync::Arc;

use banca_shared::types::AccountId;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Map of account id to its transfer mutex.
#[derive(Debug, Clone, Default)]
pub struct AccountLocks {
    inner: Arc<DashMap<AccountId, Arc<Mutex<()>>>>,
}

impl AccountLocks {
    /// Creates an empty lock map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `account`.
    ///
    /// The guard releases the lock when dropped.
    pub async fn acquire(&self, account: AccountId) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(self.inner.entry(account).or_default().value());
        lock.lock_owned().await
    }

    /// Number of accounts that have been locked at least once.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if no account has been locked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
