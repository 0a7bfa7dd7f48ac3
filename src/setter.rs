use std::{cell::RefCell, fmt, rc::Rc};

use derive_ex::derive_ex;

use crate::{
    codec::{decode, encode},
    scheduler::PushScheduler,
    ParamError, ParamValue, PushOutcome,
};

/// Writes one parameter.
///
/// A setter is shared by every consumer of the same name and default for the life of
/// its provider, and always writes through the scheduler of the most recent handle that
/// resolved it.
#[derive_ex(Clone)]
pub struct Setter(Rc<SetterNode>);

struct SetterNode {
    name: String,
    default: ParamValue,
    scheduler: RefCell<Rc<PushScheduler>>,
}

impl Setter {
    pub(crate) fn new(name: &str, default: ParamValue, scheduler: Rc<PushScheduler>) -> Self {
        Self(Rc::new(SetterNode {
            name: name.to_string(),
            default,
            scheduler: RefCell::new(scheduler),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }
    pub fn default_value(&self) -> &ParamValue {
        &self.0.default
    }

    pub(crate) fn matches(&self, name: &str, default: &ParamValue) -> bool {
        self.0.name == name && self.0.default.is_identical(default)
    }

    pub(crate) fn repoint(&self, scheduler: &Rc<PushScheduler>) {
        let mut current = self.0.scheduler.borrow_mut();
        if !Rc::ptr_eq(&current, scheduler) {
            *current = scheduler.clone();
        }
    }

    /// Stores `value`, or removes the parameter when `value` is the default.
    ///
    /// Does nothing if the query already decodes to `value`, unless `value` is the
    /// default and the query still spells it out.
    pub fn set(&self, value: impl Into<ParamValue>) -> Result<PushOutcome, ParamError> {
        let value = value.into();
        let scheduler = self.0.scheduler.borrow().clone();
        scheduler.ensure_attached()?;
        let changes = {
            let params = scheduler.params();
            if !value.is_identical(&self.0.default)
                && decode(&params, &self.0.name, &self.0.default).is_identical(&value)
            {
                return Ok(PushOutcome::Unchanged);
            }
            encode(&params, &self.0.name, &value, &self.0.default)?
        };
        scheduler.push(changes)
    }

    /// Removes the parameter, which makes it decode to its default.
    pub fn reset(&self) -> Result<PushOutcome, ParamError> {
        self.set(self.0.default.clone())
    }

    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Rc::ptr_eq(&this.0, &other.0)
    }
}
impl fmt::Debug for Setter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter")
            .field("name", &self.0.name)
            .field("default", &self.0.default)
            .finish()
    }
}

/// The decoded value of a parameter together with its setter.
#[derive(Debug)]
pub struct ParamPair {
    value: ParamValue,
    setter: Setter,
}
impl ParamPair {
    pub(crate) fn new(value: ParamValue, setter: Setter) -> Self {
        Self { value, setter }
    }

    /// The value decoded when the pair was created.
    pub fn value(&self) -> &ParamValue {
        &self.value
    }
    pub fn setter(&self) -> &Setter {
        &self.setter
    }
    pub fn set(&self, value: impl Into<ParamValue>) -> Result<PushOutcome, ParamError> {
        self.setter.set(value)
    }
}
