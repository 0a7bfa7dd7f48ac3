use std::{collections::VecDeque, rc::Rc};

use crate::{Location, ParamHandle};

/// Per-location handles, looked up by location identity.
///
/// Holds at most `capacity` handles; the oldest is dropped first.
pub(crate) struct ParamViewCache {
    capacity: usize,
    entries: VecDeque<(Rc<Location>, Rc<ParamHandle>)>,
}

impl ParamViewCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, location: &Rc<Location>) -> Option<Rc<ParamHandle>> {
        self.entries
            .iter()
            .find(|(l, _)| Rc::ptr_eq(l, location))
            .map(|(_, h)| h.clone())
    }

    pub fn insert(&mut self, location: Rc<Location>, handle: Rc<ParamHandle>) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back((location, handle));
    }
}
