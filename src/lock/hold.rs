use chrono::{DateTime, Duration, Utc};

/// An exclusive claim on a resource key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hold {
    pub owner: String,
    pub expires_at: DateTime<Utc>,
}

impl Hold {
    pub fn new(owner: impl Into<String>, expires_at: DateTime<Utc>) -> Hold {
        Hold {
            owner: owner.into(),
            expires_at,
        }
    }

    /// A hold is dead from its expiry instant onwards.
    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        if self.is_expired(now) {
            Duration::zero()
        } else {
            self.expires_at - now
        }
    }
}
