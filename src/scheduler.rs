use std::{
    cell::{Cell, Ref, RefCell},
    rc::{Rc, Weak},
    time::Duration,
};

use crate::{
    codec::Change, provider::ProviderNode, rate_limit::Admission, Location, ParamError,
    QueryParams,
};


/// What a push did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The query was already in the requested state.
    Unchanged,
    /// A commit was already pending and will carry this change.
    Batched,
    /// A commit was scheduled to run after the given delay.
    Scheduled(Duration),
    /// The change was written to the history before returning.
    Committed,
}

/// Accumulates the mutations of one handle and writes them as a single history entry.
///
/// At most one commit is pending at a time. The commit serializes the accumulator
/// as it is when the commit runs, so every change made before then is included.
pub(crate) struct PushScheduler {
    provider: Weak<ProviderNode>,
    accumulator: RefCell<QueryParams>,
    is_pending: Cell<bool>,
}

impl PushScheduler {
    pub fn new(provider: Weak<ProviderNode>, location: &Location) -> Rc<Self> {
        Rc::new(Self {
            provider,
            accumulator: RefCell::new(location.query()),
            is_pending: Cell::new(false),
        })
    }

    pub fn params(&self) -> Ref<'_, QueryParams> {
        self.accumulator.borrow()
    }

    pub fn is_pending(&self) -> bool {
        self.is_pending.get()
    }

    fn provider(&self) -> Result<Rc<ProviderNode>, ParamError> {
        match self.provider.upgrade() {
            Some(provider) if !provider.is_torn_down() => Ok(provider),
            _ => Err(ParamError::Detached),
        }
    }

    pub fn ensure_attached(&self) -> Result<(), ParamError> {
        self.provider().map(|_| ())
    }

    /// Applies `changes` in order and arranges for them to reach the history.
    pub fn push(
        self: &Rc<Self>,
        changes: impl IntoIterator<Item = Change>,
    ) -> Result<PushOutcome, ParamError> {
        let provider = self.provider()?;
        let changed = {
            let params = &mut *self.accumulator.borrow_mut();
            let before = params.clone();
            for (name, value) in changes {
                match value {
                    Some(value) => params.set(&name, &value),
                    None => params.delete(&name),
                }
            }
            *params != before
        };
        if !changed {
            tracing::trace!("push left the query unchanged");
            return Ok(PushOutcome::Unchanged);
        }
        if self.is_pending.get() {
            tracing::trace!("push batched into the pending commit");
            return Ok(PushOutcome::Batched);
        }
        let now = provider.now();
        match provider.limiter().request(now) {
            Admission::Synchronous => {
                self.commit(&provider)?;
                Ok(PushOutcome::Committed)
            }
            Admission::After(delay) => {
                self.is_pending.set(true);
                provider.schedule_commit(now + delay, self.clone());
                tracing::debug!(?delay, "commit scheduled");
                Ok(PushOutcome::Scheduled(delay))
            }
        }
    }

    /// Writes the accumulator to the history, keeping the path and fragment of the latest location.
    pub fn commit(&self, provider: &ProviderNode) -> Result<(), ParamError> {
        self.is_pending.set(false);
        let location = provider.current_location();
        let mut path = self.accumulator.borrow().append_to(&location.pathname);
        path.push_str(&location.hash);
        tracing::debug!(path = %path, "committing query to history");
        if let Err(e) = provider.history().push(&path) {
            tracing::warn!(error = %e, "history rejected commit");
            return Err(e.into());
        }
        Ok(())
    }
}
