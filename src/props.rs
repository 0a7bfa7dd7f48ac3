//! Maps parameters onto named properties of a view.

use std::collections::BTreeMap;

use crate::{ParamHandle, ParamValue, Setter};

/// Declares one parameter exposed as a property.
#[derive(Debug, Clone)]
pub struct ParamProp {
    prop: String,
    name: Option<String>,
    default: ParamValue,
    getter_prop: Option<String>,
    setter_prop: Option<String>,
}

impl ParamProp {
    pub fn new(prop: impl Into<String>, default: impl Into<ParamValue>) -> Self {
        Self {
            prop: prop.into(),
            name: None,
            default: default.into(),
            getter_prop: None,
            setter_prop: None,
        }
    }

    /// Name of the parameter in the URL. Defaults to the property name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
    pub fn getter(mut self, prop: impl Into<String>) -> Self {
        self.getter_prop = Some(prop.into());
        self
    }
    pub fn setter(mut self, prop: impl Into<String>) -> Self {
        self.setter_prop = Some(prop.into());
        self
    }

    pub fn param_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.prop)
    }
    pub fn getter_prop(&self) -> &str {
        self.getter_prop.as_deref().unwrap_or(&self.prop)
    }
    pub fn setter_prop(&self) -> String {
        match &self.setter_prop {
            Some(prop) => prop.clone(),
            None => setter_prop_name(self.getter_prop()),
        }
    }
}

/// `selected` → `setSelected`.
pub fn setter_prop_name(getter: &str) -> String {
    let mut chars = getter.chars();
    match chars.next() {
        Some(head) => format!("set{}{}", head.to_uppercase(), chars.as_str()),
        None => "set".to_string(),
    }
}

/// Values and setters of a set of [`ParamProp`], keyed by property name.
#[derive(Debug, Default)]
pub struct BoundProps {
    pub values: BTreeMap<String, ParamValue>,
    pub setters: BTreeMap<String, Setter>,
}

impl BoundProps {
    pub fn value(&self, prop: &str) -> Option<&ParamValue> {
        self.values.get(prop)
    }
    pub fn setter(&self, prop: &str) -> Option<&Setter> {
        self.setters.get(prop)
    }
}

pub fn bind_props(handle: &ParamHandle, props: &[ParamProp]) -> BoundProps {
    let mut bound = BoundProps::default();
    for prop in props {
        let pair = handle.param(prop.param_name(), prop.default.clone());
        bound
            .values
            .insert(prop.getter_prop().to_string(), pair.value().clone());
        bound
            .setters
            .insert(prop.setter_prop(), pair.setter().clone());
    }
    bound
}
