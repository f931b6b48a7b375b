use core::time::Duration;
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

/// Bounded worker pool gate that can be paused when an API reports a rate limit.
///
/// Callers hold the permit returned by [`Throttler::acquire`] for the duration of one unit
/// of work. [`Throttler::pause_for`] stops new work from starting until the pause expires;
/// work already running is left alone.
#[derive(Debug)]
pub struct Throttler {
    slots: Arc<Semaphore>,
    paused_until: Mutex<Option<Instant>>,
}

impl Throttler {
    /// Create a throttler allowing at most `max_concurrent` units of work at once.
    ///
    /// A limit of zero is treated as one.
    #[must_use]
    pub fn new(max_concurrent: usize) -> Arc<Self> {
        Arc::new(Self {
            slots: Arc::new(Semaphore::new(max_concurrent.max(1))),
            paused_until: Mutex::new(None),
        })
    }

    /// Wait out any active pause, then take a slot.
    pub async fn acquire(&self) -> OwnedSemaphorePermit {
        loop {
            if let Some(deadline) = self.pause_deadline() {
                tokio::time::sleep_until(deadline).await;
                continue;
            }

            if let Ok(permit) = Arc::clone(&self.slots).acquire_owned().await {
                // A pause may have started while we were queued for the slot
                if self.pause_deadline().is_none() {
                    return permit;
                }
            }
        }
    }

    /// Whether new work is currently held back.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.pause_deadline().is_some()
    }

    /// Hold back new work for `duration`.
    ///
    /// Returns `false` when an existing pause already lasts at least as long, in which case nothing changes.
    pub fn pause_for(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut guard = self.paused_until.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match *guard {
            Some(existing) if existing >= deadline => false,
            _ => {
                *guard = Some(deadline);
                true
            }
        }
    }

    fn pause_deadline(&self) -> Option<Instant> {
        let mut guard = self.paused_until.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match *guard {
            Some(deadline) if deadline > Instant::now() => Some(deadline),
            Some(_) => {
                *guard = None;
                None
            }
            None => None,
        }
    }
}
