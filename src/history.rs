use std::{cell::RefCell, rc::Rc};

use slabmap::SlabMap;

use crate::{Location, NavigationError, Subscription};


pub type Listener = Rc<dyn Fn(&Rc<Location>)>;

/// Navigation sink and location source.
///
/// Every successful navigation produces a new `Rc<Location>` and notifies the listeners
/// registered with [`listen`](History::listen) before `push` returns.
pub trait History {
    /// The location currently displayed.
    fn location(&self) -> Rc<Location>;

    /// Records a new entry for `path` (path, query and fragment).
    fn push(&self, path: &str) -> Result<(), NavigationError>;

    /// Registers a listener called after every navigation.
    fn listen(self: Rc<Self>, f: Listener) -> Subscription;
}

/// In-memory [`History`] with a stack of entries and a cursor.
pub struct MemoryHistory {
    data: RefCell<HistoryData>,
    listeners: RefCell<SlabMap<Listener>>,
}

struct HistoryData {
    entries: Vec<Rc<Location>>,
    index: usize,
}

impl MemoryHistory {
    pub fn new(initial: &str) -> Rc<Self> {
        Self::with_entries([initial])
    }

    /// Creates a history positioned at the last of `paths` (or `/` when empty).
    pub fn with_entries<'a>(paths: impl IntoIterator<Item = &'a str>) -> Rc<Self> {
        let mut entries: Vec<_> = paths
            .into_iter()
            .map(|p| Rc::new(Location::from_path(p)))
            .collect();
        if entries.is_empty() {
            entries.push(Rc::new(Location::from_path("/")));
        }
        let index = entries.len() - 1;
        Rc::new(Self {
            data: RefCell::new(HistoryData { entries, index }),
            listeners: RefCell::new(SlabMap::new()),
        })
    }

    pub fn len(&self) -> usize {
        self.data.borrow().entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.borrow().entries.is_empty()
    }
    pub fn index(&self) -> usize {
        self.data.borrow().index
    }
    pub fn entries(&self) -> Vec<Rc<Location>> {
        self.data.borrow().entries.clone()
    }

    /// Replaces the current entry.
    pub fn replace(&self, path: &str) {
        let location = Rc::new(Location::from_path(path));
        {
            let d = &mut *self.data.borrow_mut();
            d.entries[d.index] = location.clone();
        }
        self.notify(&location);
    }

    /// Moves the cursor by `delta`, clamped to the existing entries.
    ///
    /// Returns `false` without notifying when the cursor does not move.
    pub fn go(&self, delta: isize) -> bool {
        let location = {
            let d = &mut *self.data.borrow_mut();
            let last = d.entries.len() as isize - 1;
            let index = (d.index as isize + delta).clamp(0, last) as usize;
            if index == d.index {
                return false;
            }
            d.index = index;
            d.entries[index].clone()
        };
        self.notify(&location);
        true
    }
    pub fn back(&self) -> bool {
        self.go(-1)
    }
    pub fn forward(&self) -> bool {
        self.go(1)
    }

    fn notify(&self, location: &Rc<Location>) {
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(location);
        }
    }
}

impl History for MemoryHistory {
    fn location(&self) -> Rc<Location> {
        let d = self.data.borrow();
        d.entries[d.index].clone()
    }

    fn push(&self, path: &str) -> Result<(), NavigationError> {
        let location = Rc::new(Location::from_path(path));
        {
            let d = &mut *self.data.borrow_mut();
            d.entries.truncate(d.index + 1);
            d.entries.push(location.clone());
            d.index = d.entries.len() - 1;
        }
        self.notify(&location);
        Ok(())
    }

    fn listen(self: Rc<Self>, f: Listener) -> Subscription {
        let key = self.listeners.borrow_mut().insert(f);
        Subscription::from_weak_key(Rc::downgrade(&self), key, |this, key| {
            this.listeners.borrow_mut().remove(key);
        })
    }
}
