#[macro_use]
extern crate log;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::LockError;
pub use lock::{Hold, HoldTable, LockTable, ShardedLockTable};
pub use options::LockTableOptions;
pub use reaper::Reaper;

pub mod clock;
pub mod error;
pub mod lock;
pub mod options;
pub mod reaper;

pub type Result<T> = std::result::Result<T, error::LockError>;
