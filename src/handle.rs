use std::{
    cell::RefCell,
    collections::HashMap,
    fmt,
    rc::{Rc, Weak},
};

use crate::{
    codec::decode, provider::ProviderNode, scheduler::PushScheduler, Location, ParamError,
    ParamPair, ParamValue, PushOutcome, Setter,
};

/// Read/write view of the query string of one location.
///
/// Reads reflect every write made through this handle, including writes not yet
/// committed to the history.
pub struct ParamHandle {
    location: Rc<Location>,
    scheduler: Rc<PushScheduler>,
    provider: Weak<ProviderNode>,
    pairs: RefCell<HashMap<String, Rc<ParamPair>>>,
}

impl ParamHandle {
    pub(crate) fn new(provider: Weak<ProviderNode>, location: Rc<Location>) -> Self {
        Self {
            scheduler: PushScheduler::new(provider.clone(), &location),
            location,
            provider,
            pairs: RefCell::new(HashMap::new()),
        }
    }

    /// The location this handle was built for.
    pub fn location(&self) -> &Rc<Location> {
        &self.location
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.scheduler.params().get(name).map(str::to_string)
    }

    pub fn entries(&self) -> Vec<(String, String)> {
        self.scheduler.params().entries()
    }

    /// Returns the decoded value of `name` and its setter.
    ///
    /// The kind of the value follows the variant of `default`. Later calls with the
    /// same name on this handle return the same pair.
    pub fn param(&self, name: &str, default: impl Into<ParamValue>) -> Rc<ParamPair> {
        if let Some(pair) = self.pairs.borrow().get(name) {
            return pair.clone();
        }
        let default = default.into();
        let value = decode(&self.scheduler.params(), name, &default);
        let setter = match self.provider.upgrade() {
            Some(provider) => provider.setter(name, &default, &self.scheduler),
            None => Setter::new(name, default, self.scheduler.clone()),
        };
        let pair = Rc::new(ParamPair::new(value, setter));
        self.pairs
            .borrow_mut()
            .insert(name.to_string(), pair.clone());
        pair
    }

    /// Writes raw query values: `None` deletes a name, `Some` sets it.
    pub fn push<K, V>(
        &self,
        changes: impl IntoIterator<Item = (K, Option<V>)>,
    ) -> Result<PushOutcome, ParamError>
    where
        K: Into<String>,
        V: ToString,
    {
        self.scheduler.push(
            changes
                .into_iter()
                .map(|(k, v)| (k.into(), v.map(|v| v.to_string()))),
        )
    }

    /// Whether a commit of this handle's writes is waiting for its deadline.
    pub fn has_pending(&self) -> bool {
        self.scheduler.is_pending()
    }
}
impl fmt::Debug for ParamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamHandle")
            .field("location", &self.location)
            .field("query", &self.scheduler.params().serialize())
            .finish()
    }
}
