use crate::clock::{Clock, SystemClock};
use crate::error::LockError;
use crate::lock::{check_delta, expiry_after, Hold, HoldTable, ResourceKey};
use crate::options::LockTableOptions;
use crate::Result;
use chrono::Duration;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashSet;

/// Hold table sharded by key.
///
/// Each read-modify-write runs under the lock of the shard owning the key, so
/// operations on one key stay linearizable while different keys rarely
/// contend.
pub struct ShardedLockTable<C: Clock = SystemClock> {
    holds: DashMap<ResourceKey, Hold>,
    clock: C,
    default_ttl: Duration,
}

impl ShardedLockTable<SystemClock> {
    pub fn new() -> ShardedLockTable<SystemClock> {
        ShardedLockTable::with_clock(SystemClock)
    }
}

impl Default for ShardedLockTable<SystemClock> {
    fn default() -> Self {
        ShardedLockTable::new()
    }
}

impl<C: Clock> ShardedLockTable<C> {
    pub fn with_clock(clock: C) -> ShardedLockTable<C> {
        ShardedLockTable {
            holds: DashMap::with_capacity(16),
            clock,
            default_ttl: LockTableOptions::default().default_ttl,
        }
    }

    pub fn with_options(clock: C, options: &LockTableOptions) -> Result<ShardedLockTable<C>> {
        options.validate()?;
        let mut table = ShardedLockTable::with_clock(clock);
        table.default_ttl = options.default_ttl;
        Ok(table)
    }

}

impl<C: Clock> HoldTable for ShardedLockTable<C> {
    fn acquire(&self, key: &str, owner: &str, ttl: Duration) -> Result<bool> {
        match self.holds.entry(key.to_string()) {
            Entry::Occupied(mut e) => {
                let now = self.clock.now();
                let expires_at = expiry_after(now, ttl)?;
                if !e.get().is_expired(now) {
                    return Ok(false);
                }
                e.insert(Hold::new(owner, expires_at));
            }
            Entry::Vacant(e) => {
                let expires_at = expiry_after(self.clock.now(), ttl)?;
                e.insert(Hold::new(owner, expires_at));
            }
        }
        Ok(true)
    }

    fn is_held(&self, key: &str) -> bool {
        match self.holds.entry(key.to_string()) {
            Entry::Occupied(e) => {
                if e.get().is_expired(self.clock.now()) {
                    e.remove();
                    false
                } else {
                    true
                }
            }
            Entry::Vacant(_) => false,
        }
    }

    fn release(&self, key: &str) -> bool {
        self.holds.remove(key).is_some()
    }

    fn release_by(&self, key: &str, owner: &str) -> bool {
        self.holds
            .remove_if(key, |_, hold| hold.owner == owner)
            .is_some()
    }

    fn extend(&self, key: &str, delta: Duration) -> Result<bool> {
        check_delta(delta)?;

        let resurrected = {
            let mut hold = match self.holds.get_mut(key) {
                Some(hold) => hold,
                None => return Ok(false),
            };
            let now = self.clock.now();
            let expires_at = hold
                .expires_at
                .checked_add_signed(delta)
                .ok_or(LockError::ExpiryOverflow)?;
            let was_expired = hold.is_expired(now);
            hold.expires_at = expires_at;
            was_expired && !hold.is_expired(now)
        };

        if resurrected {
            debug!("extend revived expired hold on `{}`", key);
        }
        Ok(true)
    }

    fn info(&self, key: &str) -> Option<Hold> {
        self.holds.get(key).map(|hold| hold.value().clone())
    }

    fn list_active(&self) -> HashSet<ResourceKey> {
        self.holds.iter().map(|hold| hold.key().clone()).collect()
    }

    fn reap_expired(&self, max: usize) -> usize {
        let now = self.clock.now();
        let mut removed = 0;
        self.holds.retain(|_, hold| {
            if removed < max && hold.is_expired(now) {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    fn len(&self) -> usize {
        self.holds.len()
    }

    fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}

#[cfg(test)]
mod tests {
    use crate::clock::ManualClock;
    use crate::lock::tests::{check_table, secs};
    use crate::lock::{HoldTable, ShardedLockTable};
    use rand::Rng;
    use std::collections::HashMap;

    #[test]
    fn test_sharded_lock_table() {
        let clock = ManualClock::default();
        check_table(ShardedLockTable::with_clock(clock.clone()), clock);
    }

    #[test]
    fn test_random_keys() {
        let clock = ManualClock::default();
        let table = ShardedLockTable::with_clock(clock.clone());
        let mut rng = rand::thread_rng();
        let mut owners: HashMap<String, String> = HashMap::new();

        for i in 0..2000 {
            let key = format!("seat{}", rng.gen_range(0..500));
            let owner = format!("user{}", i);
            let granted = table.acquire(&key, &owner, secs(60)).unwrap();
            assert_eq!(!owners.contains_key(&key), granted);
            owners.entry(key).or_insert(owner);
        }

        assert_eq!(owners.len(), table.len());
        for (key, owner) in &owners {
            assert_eq!(*owner, table.info(key).unwrap().owner);
        }

        clock.advance(secs(60));
        assert_eq!(owners.len(), table.reap_expired(usize::MAX));
        assert!(table.is_empty());
    }
}
