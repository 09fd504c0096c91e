//! Background eviction of expired holds.
//!
//! The reaper thread wakes every `reap_interval` and removes expired entries
//! in batches of at most `max_sweep`, taking the table lock once per batch.
//! Dropping the [`Reaper`] closes its channel, which wakes the thread at once,
//! and joins it.

use crate::lock::HoldTable;
use crate::options::LockTableOptions;
use crate::Result;
use crossbeam_channel::{RecvTimeoutError, Sender, TrySendError};
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;

const REAPER_THREAD_NAME: &str = "hold reaper";

pub struct Reaper {
    waker: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Reaper {
    /// Start a thread evicting expired holds from `table`.
    pub fn start<T: HoldTable + 'static>(
        table: Arc<T>,
        options: &LockTableOptions,
    ) -> Result<Reaper> {
        options.validate()?;
        let interval = options.reap_interval;
        let max_sweep = options.max_sweep;
        let (sender, receiver) = crossbeam_channel::bounded(1);

        let handle = thread::Builder::new()
            .name(REAPER_THREAD_NAME.to_owned())
            .spawn(move || {
                info!("thread `{}` start!", REAPER_THREAD_NAME);
                loop {
                    match receiver.recv_timeout(interval) {
                        Ok(()) | Err(RecvTimeoutError::Timeout) => {
                            let evicted = sweep(table.as_ref(), max_sweep);
                            if evicted > 0 {
                                debug!("evicted {} expired holds", evicted);
                            }
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                info!("thread `{}` exit!", REAPER_THREAD_NAME);
            })?;

        Ok(Reaper {
            waker: Some(sender),
            handle: Some(handle),
        })
    }

    /// Ask the thread to sweep now instead of waiting for the next tick.
    pub fn wake(&self) {
        if let Some(waker) = &self.waker {
            match waker.try_send(()) {
                // a sweep is already pending
                Ok(()) | Err(TrySendError::Full(())) => {}
                Err(e @ TrySendError::Disconnected(())) => warn!("{}", e),
            }
        }
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        self.waker.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("thread `{}` panicked", REAPER_THREAD_NAME);
            }
        }
    }
}

/// Evict every expired hold, releasing the table lock between batches.
pub fn sweep<T: HoldTable + ?Sized>(table: &T, max_sweep: usize) -> usize {
    let max_sweep = max_sweep.max(1);
    let mut total = 0;
    loop {
        let evicted = table.reap_expired(max_sweep);
        total += evicted;
        if evicted < max_sweep {
            return total;
        }
    }
}
