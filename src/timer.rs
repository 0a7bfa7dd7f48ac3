use std::collections::BTreeMap;

use slabmap::SlabMap;
use web_time::Instant;


#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
struct Key {
    instant: Instant,
    seq: usize,
}

/// Deferred work ordered by deadline, then by scheduling order.
///
/// Nothing runs by itself: the owner pops due entries with [`pop_due`](Self::pop_due).
pub(crate) struct TimerQueue<T> {
    next_seq: usize,
    tasks: BTreeMap<Key, usize>,
    entries: SlabMap<T>,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            next_seq: 0,
            tasks: BTreeMap::new(),
            entries: SlabMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn schedule(&mut self, instant: Instant, value: T) {
        let key = Key {
            instant,
            seq: self.next_seq,
        };
        self.next_seq = self.next_seq.wrapping_add(1);
        let id = self.entries.insert(value);
        self.tasks.insert(key, id);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.first_key_value().map(|(key, _)| key.instant)
    }

    /// Removes the earliest entry whose deadline is not after `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<T> {
        let entry = self.tasks.first_entry()?;
        if entry.key().instant > now {
            return None;
        }
        let id = entry.remove();
        self.entries.remove(id)
    }
}
impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
