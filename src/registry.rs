use std::{collections::HashMap, rc::Rc};

use slabmap::SlabMap;

use crate::{scheduler::PushScheduler, ParamValue, Setter};

/// Setters of a provider, keyed by parameter name and default value.
///
/// Defaults compare structurally, so a default rebuilt on every render still finds
/// the setter created for an equal default.
pub(crate) struct SetterRegistry {
    setters: SlabMap<Setter>,
    by_name: HashMap<String, Vec<usize>>,
}

impl SetterRegistry {
    pub fn new() -> Self {
        Self {
            setters: SlabMap::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.setters.len()
    }

    pub fn get_or_create(
        &mut self,
        name: &str,
        default: &ParamValue,
        scheduler: &Rc<PushScheduler>,
    ) -> Setter {
        let keys = self.by_name.entry(name.to_string()).or_default();
        for &key in keys.iter() {
            let setter = &self.setters[key];
            if setter.matches(name, default) {
                setter.repoint(scheduler);
                return setter.clone();
            }
        }
        let setter = Setter::new(name, default.clone(), scheduler.clone());
        keys.push(self.setters.insert(setter.clone()));
        setter
    }
}
