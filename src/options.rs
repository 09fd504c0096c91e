use crate::error::LockError;
use crate::Result;
use chrono::Duration;

/// TTL used by `acquire_default` when the caller does not pick one.
pub const DEFAULT_TTL_SECS: i64 = 60;

#[cfg(debug_assertions)]
pub const DEFAULT_REAP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);
#[cfg(not(debug_assertions))]
pub const DEFAULT_REAP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(5);

/// Upper bound on entries removed per table-lock acquisition during a sweep.
pub const DEFAULT_MAX_SWEEP: usize = 1024;

#[derive(Debug, Clone)]
pub struct LockTableOptions {
    pub default_ttl: Duration,
    pub reap_interval: std::time::Duration,
    pub max_sweep: usize,
}

impl Default for LockTableOptions {
    fn default() -> Self {
        LockTableOptions {
            default_ttl: Duration::seconds(DEFAULT_TTL_SECS),
            reap_interval: DEFAULT_REAP_INTERVAL,
            max_sweep: DEFAULT_MAX_SWEEP,
        }
    }
}

impl LockTableOptions {
    pub fn validate(&self) -> Result<()> {
        if self.default_ttl <= Duration::zero() {
            return Err(LockError::InvalidOptions(format!(
                "default_ttl must be positive, got {}",
                self.default_ttl
            )));
        }
        if self.reap_interval.as_nanos() == 0 {
            return Err(LockError::InvalidOptions(
                "reap_interval must be non-zero".to_string(),
            ));
        }
        if self.max_sweep == 0 {
            return Err(LockError::InvalidOptions(
                "max_sweep must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::LockError;
    use crate::options::{LockTableOptions, DEFAULT_MAX_SWEEP, DEFAULT_REAP_INTERVAL};
    use chrono::Duration;

    #[test]
    fn test_default() {
        let options = LockTableOptions::default();
        assert_eq!(Duration::seconds(60), options.default_ttl);
        assert_eq!(DEFAULT_REAP_INTERVAL, options.reap_interval);
        assert_eq!(DEFAULT_MAX_SWEEP, options.max_sweep);

        #[cfg(debug_assertions)]
        assert_eq!(std::time::Duration::from_secs(1), options.reap_interval);
        #[cfg(not(debug_assertions))]
        assert_eq!(std::time::Duration::from_secs(5), options.reap_interval);
    }

    #[test]
    fn test_validate() {
        assert!(LockTableOptions::default().validate().is_ok());

        let options = LockTableOptions {
            default_ttl: Duration::zero(),
            ..LockTableOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(LockError::InvalidOptions(_))
        ));

        let options = LockTableOptions {
            reap_interval: std::time::Duration::from_secs(0),
            ..LockTableOptions::default()
        };
        assert!(options.validate().is_err());

        let options = LockTableOptions {
            max_sweep: 0,
            ..LockTableOptions::default()
        };
        assert_eq!(
            Err(LockError::InvalidOptions(
                "max_sweep must be non-zero".to_string()
            )),
            options.validate()
        );
    }
}
