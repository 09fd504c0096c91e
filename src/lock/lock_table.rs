use crate::clock::{Clock, SystemClock};
use crate::error::LockError;
use crate::lock::{check_delta, expiry_after, Hold, HoldTable, ResourceKey};
use crate::options::LockTableOptions;
use crate::Result;
use chrono::Duration;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// Hold table guarded by a single mutex.
///
/// Every operation is one constant-time critical section over the whole map,
/// so operations on the same key are linearizable.
pub struct LockTable<C: Clock = SystemClock> {
    holds: Mutex<HashMap<ResourceKey, Hold>>,
    clock: C,
    default_ttl: Duration,
}

impl LockTable<SystemClock> {
    pub fn new() -> LockTable<SystemClock> {
        LockTable::with_clock(SystemClock)
    }
}

impl Default for LockTable<SystemClock> {
    fn default() -> Self {
        LockTable::new()
    }
}

impl<C: Clock> LockTable<C> {
    pub fn with_clock(clock: C) -> LockTable<C> {
        LockTable {
            holds: Mutex::new(HashMap::with_capacity(16)),
            clock,
            default_ttl: LockTableOptions::default().default_ttl,
        }
    }

    pub fn with_options(clock: C, options: &LockTableOptions) -> Result<LockTable<C>> {
        options.validate()?;
        let mut table = LockTable::with_clock(clock);
        table.default_ttl = options.default_ttl;
        Ok(table)
    }


    #[inline]
    fn holds(&self) -> MutexGuard<'_, HashMap<ResourceKey, Hold>> {
        self.holds.lock().expect("lock table mutex poisoned")
    }
}

impl<C: Clock> HoldTable for LockTable<C> {
    fn acquire(&self, key: &str, owner: &str, ttl: Duration) -> Result<bool> {
        let mut guard = self.holds();
        let now = self.clock.now();
        let expires_at = expiry_after(now, ttl)?;

        match guard.entry(key.to_string()) {
            Entry::Occupied(mut e) => {
                if !e.get().is_expired(now) {
                    return Ok(false);
                }
                e.insert(Hold::new(owner, expires_at));
            }
            Entry::Vacant(e) => {
                e.insert(Hold::new(owner, expires_at));
            }
        }
        Ok(true)
    }

    fn is_held(&self, key: &str) -> bool {
        let mut guard = self.holds();
        let now = self.clock.now();
        let expired = match guard.get(key) {
            Some(hold) => hold.is_expired(now),
            None => return false,
        };
        if expired {
            guard.remove(key);
        }
        !expired
    }

    fn release(&self, key: &str) -> bool {
        self.holds().remove(key).is_some()
    }

    fn release_by(&self, key: &str, owner: &str) -> bool {
        let mut guard = self.holds();
        let owned = matches!(guard.get(key), Some(hold) if hold.owner == owner);
        if owned {
            guard.remove(key);
        }
        owned
    }

    fn extend(&self, key: &str, delta: Duration) -> Result<bool> {
        check_delta(delta)?;

        let resurrected = {
            let mut guard = self.holds();
            let now = self.clock.now();
            let hold = match guard.get_mut(key) {
                Some(hold) => hold,
                None => return Ok(false),
            };
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
        self.holds().get(key).cloned()
    }

    fn list_active(&self) -> HashSet<ResourceKey> {
        self.holds().keys().cloned().collect()
    }

    fn reap_expired(&self, max: usize) -> usize {
        let mut guard = self.holds();
        let now = self.clock.now();
        let expired: Vec<ResourceKey> = guard
            .iter()
            .filter(|(_, hold)| hold.is_expired(now))
            .map(|(key, _)| key.clone())
            .take(max)
            .collect();
        for key in &expired {
            guard.remove(key);
        }
        expired.len()
    }

    fn len(&self) -> usize {
        self.holds().len()
    }

    fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}
