//! Time-bounded exclusive holds on resource keys.
//!
//! A hold whose `expires_at` is not after "now" is treated as absent even
//! while it is still stored. It is evicted lazily by `acquire`/`is_held` or
//! proactively by [`crate::reaper::Reaper`].

mod hold;
mod lock_table;
mod sharded_lock_table;

use crate::error::LockError;
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

pub use hold::Hold;
pub use lock_table::LockTable;
pub use sharded_lock_table::ShardedLockTable;

/// Opaque caller-supplied identifier of a lockable resource, e.g. a seat code.
pub type ResourceKey = String;

pub trait HoldTable: Send + Sync {
    /// Grants `owner` the hold on `key` for `ttl` if nobody holds it.
    ///
    /// Returns `Ok(false)` without touching the table when an unexpired hold
    /// exists, including one owned by `owner` itself.
    fn acquire(&self, key: &str, owner: &str, ttl: Duration) -> Result<bool>;

    /// `true` iff an unexpired hold exists. Evicts the entry if it expired.
    fn is_held(&self, key: &str) -> bool;

    /// Removes the entry regardless of owner or expiry.
    fn release(&self, key: &str) -> bool;

    /// Removes the entry only if it belongs to `owner`.
    fn release_by(&self, key: &str, owner: &str) -> bool;

    /// Pushes the expiry of an existing entry forward by `delta`.
    ///
    /// Expired entries that have not been evicted yet are extended too, which
    /// brings them back to life.
    fn extend(&self, key: &str, delta: Duration) -> Result<bool>;

    /// Snapshot of the stored entry, expired or not.
    fn info(&self, key: &str) -> Option<Hold>;

    /// Every stored key, including expired entries not yet evicted.
    fn list_active(&self) -> HashSet<ResourceKey>;

    /// Removes at most `max` expired entries and returns how many were removed.
    ///
    /// `max` bounds removals, not the scan: a call may walk every stored entry
    /// while holding the lock (or, for the sharded table, one shard at a time).
    fn reap_expired(&self, max: usize) -> usize;

    fn len(&self) -> usize;

    fn default_ttl(&self) -> Duration;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn acquire_default(&self, key: &str, owner: &str) -> Result<bool> {
        self.acquire(key, owner, self.default_ttl())
    }
}

pub(crate) fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>> {
    if ttl <= Duration::zero() {
        return Err(LockError::InvalidTtl);
    }
    now.checked_add_signed(ttl).ok_or(LockError::InvalidTtl)
}

pub(crate) fn check_delta(delta: Duration) -> Result<()> {
    if delta <= Duration::zero() {
        Err(LockError::InvalidDelta)
    } else {
        Ok(())
    }
}
