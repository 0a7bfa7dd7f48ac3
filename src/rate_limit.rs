use std::{cell::Cell, time::Duration};

use serde::{Deserialize, Serialize};
use web_time::Instant;

/// Minimum spacing between two history writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PushDelay {
    /// Commit inside the call that requested it, without batching.
    Immediate,
    /// Batch requests and keep consecutive requests at least this far apart.
    Debounce(Duration),
}
impl PushDelay {
    /// Negative values select [`PushDelay::Immediate`].
    pub fn from_millis(ms: i64) -> Self {
        match u64::try_from(ms) {
            Ok(ms) => PushDelay::Debounce(Duration::from_millis(ms)),
            Err(_) => PushDelay::Immediate,
        }
    }
}
impl Default for PushDelay {
    fn default() -> Self {
        PushDelay::Debounce(Duration::from_millis(300))
    }
}

/// When a requested commit may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Synchronous,
    After(Duration),
}

/// Rate limiter stamped on request.
///
/// Every call to [`request`](Self::request) records its own time as the last request,
/// regardless of when the resulting commit runs. A burst that starts right after a
/// previous burst therefore waits the full delay, even if the earlier commit landed late.
#[derive(Debug)]
pub struct RateLimiter {
    delay: PushDelay,
    last_request: Cell<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(delay: PushDelay) -> Self {
        Self {
            delay,
            last_request: Cell::new(None),
        }
    }

    pub fn delay(&self) -> PushDelay {
        self.delay
    }

    /// Time of the latest request. Never moves backwards.
    pub fn last_request(&self) -> Option<Instant> {
        self.last_request.get()
    }

    pub fn request(&self, now: Instant) -> Admission {
        let last = self.last_request.get();
        let elapsed = last.map(|last| now.saturating_duration_since(last));
        self.last_request.set(Some(match last {
            Some(last) if last > now => last,
            _ => now,
        }));
        match self.delay {
            PushDelay::Immediate => Admission::Synchronous,
            PushDelay::Debounce(min) => match elapsed {
                Some(elapsed) if elapsed <= min => Admission::After(min),
                _ => Admission::After(Duration::ZERO),
            },
        }
    }
}
