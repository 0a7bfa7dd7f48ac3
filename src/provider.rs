use std::{
    cell::{Cell, RefCell},
    future::Future,
    mem::{replace, take},
    rc::Rc,
    time::Duration,
};

use web_time::Instant;

use crate::{
    cache::ParamViewCache, registry::SetterRegistry, resolve, scheduler::PushScheduler,
    timer::TimerQueue, Clock, History, Location, ParamError, ParamHandle, ParamValue,
    ProviderConfig, RateLimiter, Setter, Subscription, SystemClock,
};

#[cfg(test)]
mod tests;

/// Owner of the shared state of every handle built from one history.
///
/// Dropping the provider (or calling [`teardown`](Self::teardown)) cancels the commits
/// that have not run yet and detaches every handle and setter.
pub struct ParamProvider {
    node: Rc<ProviderNode>,
}

pub(crate) struct ProviderNode {
    config: ProviderConfig,
    history: Rc<dyn History>,
    clock: Rc<dyn Clock>,
    limiter: RateLimiter,
    current: RefCell<Rc<Location>>,
    cache: RefCell<ParamViewCache>,
    setters: RefCell<SetterRegistry>,
    timers: RefCell<TimerQueue<Rc<PushScheduler>>>,
    listen: RefCell<Subscription>,
    is_torn_down: Cell<bool>,
}

impl ParamProvider {
    pub fn new(history: Rc<dyn History>, clock: Rc<dyn Clock>, config: ProviderConfig) -> Self {
        let node = Rc::new(ProviderNode {
            limiter: RateLimiter::new(config.push_delay()),
            cache: RefCell::new(ParamViewCache::new(config.cache_capacity)),
            current: RefCell::new(history.location()),
            setters: RefCell::new(SetterRegistry::new()),
            timers: RefCell::new(TimerQueue::new()),
            listen: RefCell::new(Subscription::empty()),
            is_torn_down: Cell::new(false),
            config,
            history: history.clone(),
            clock,
        });
        let this = Rc::downgrade(&node);
        let listen = history.listen(Rc::new(move |location: &Rc<Location>| {
            if let Some(node) = this.upgrade() {
                node.set_current_location(location.clone());
            }
        }));
        *node.listen.borrow_mut() = listen;
        Self { node }
    }

    /// Creates a provider driven by the wall clock.
    pub fn with_system_clock(history: Rc<dyn History>, config: ProviderConfig) -> Self {
        Self::new(history, Rc::new(SystemClock), config)
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.node.config
    }

    /// The latest location reported by the history.
    pub fn location(&self) -> Rc<Location> {
        self.node.current_location()
    }

    /// Returns the handle of the current location, building it on first use.
    ///
    /// Calls made while the location does not change return the same handle.
    pub fn search_params(&self) -> Rc<ParamHandle> {
        let location = self.node.current_location();
        if let Some(handle) = self.node.cache.borrow().get(&location) {
            return handle;
        }
        let handle = Rc::new(ParamHandle::new(
            Rc::downgrade(&self.node),
            location.clone(),
        ));
        self.node
            .cache
            .borrow_mut()
            .insert(location, handle.clone());
        handle
    }

    /// Builds a link from the current location, keeping the configured parameters.
    ///
    /// See [`resolve`](crate::resolve).
    pub fn url<K, V>(
        &self,
        to: Option<&str>,
        overrides: impl IntoIterator<Item = (K, Option<V>)>,
    ) -> Result<String, ParamError>
    where
        K: AsRef<str>,
        V: ToString,
    {
        let location = self.node.current_location();
        resolve(&location, &self.node.config.keep, to, overrides)
    }

    /// Runs every commit whose deadline has passed.
    ///
    /// Returns the number of commits that ran. Stops at the first history failure;
    /// the remaining commits stay queued.
    pub fn update(&self) -> Result<usize, ParamError> {
        let mut count = 0;
        loop {
            let now = self.node.now();
            let Some(scheduler) = self.node.timers.borrow_mut().pop_due(now) else {
                break;
            };
            scheduler.commit(&self.node)?;
            count += 1;
        }
        Ok(count)
    }

    /// Deadline of the next pending commit.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.node.timers.borrow().next_deadline()
    }

    pub fn has_pending(&self) -> bool {
        !self.node.timers.borrow().is_empty()
    }

    /// Runs pending commits as their deadlines pass, until none is left.
    ///
    /// `sleep` waits for the given duration; pass the timer of the host executor.
    pub async fn settle<F, Fut>(&self, mut sleep: F) -> Result<(), ParamError>
    where
        F: FnMut(Duration) -> Fut,
        Fut: Future<Output = ()>,
    {
        loop {
            self.update()?;
            let Some(deadline) = self.next_deadline() else {
                return Ok(());
            };
            sleep(deadline.saturating_duration_since(self.node.now())).await;
        }
    }

    /// Cancels pending commits and releases every handle and setter.
    pub fn teardown(&self) {
        self.node.teardown();
    }
    pub fn is_torn_down(&self) -> bool {
        self.node.is_torn_down()
    }
}
impl Drop for ParamProvider {
    fn drop(&mut self) {
        self.node.teardown();
    }
}

impl ProviderNode {
    pub fn now(&self) -> Instant {
        self.clock.now()
    }
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
    pub fn history(&self) -> &dyn History {
        &*self.history
    }
    pub fn is_torn_down(&self) -> bool {
        self.is_torn_down.get()
    }

    pub fn current_location(&self) -> Rc<Location> {
        self.current.borrow().clone()
    }
    fn set_current_location(&self, location: Rc<Location>) {
        // The previous location is dropped after the borrow ends.
        let _old = replace(&mut *self.current.borrow_mut(), location);
    }

    pub fn schedule_commit(&self, instant: Instant, scheduler: Rc<PushScheduler>) {
        self.timers.borrow_mut().schedule(instant, scheduler);
    }

    pub fn setter(
        &self,
        name: &str,
        default: &ParamValue,
        scheduler: &Rc<PushScheduler>,
    ) -> Setter {
        self.setters
            .borrow_mut()
            .get_or_create(name, default, scheduler)
    }

    fn teardown(&self) {
        if self.is_torn_down.replace(true) {
            return;
        }
        let timers = take(&mut *self.timers.borrow_mut());
        let cache = replace(&mut *self.cache.borrow_mut(), ParamViewCache::new(1));
        let setters = replace(&mut *self.setters.borrow_mut(), SetterRegistry::new());
        let listen = take(&mut *self.listen.borrow_mut());
        tracing::debug!(
            cancelled = timers.len(),
            setters = setters.len(),
            handles = cache.len(),
            "param provider torn down"
        );
        drop((timers, cache, setters));
        listen.unsubscribe();
    }
}

#[cfg(test)]
impl ParamProvider {
    pub(crate) fn setter_count(&self) -> usize {
        self.node.setters.borrow().len()
    }
    pub(crate) fn cached_handles(&self) -> usize {
        self.node.cache.borrow().len()
    }
}
