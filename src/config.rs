use serde::{Deserialize, Serialize};

use crate::PushDelay;

/// Settings of a [`ParamProvider`](crate::ParamProvider).
///
/// Deserializes from partial input; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Parameters carried over when navigating to a different path.
    pub keep: Vec<String>,

    /// Minimum spacing of history writes in milliseconds. Negative values commit synchronously.
    pub minimum_delay_ms: i64,

    /// Number of per-location handles kept alive.
    pub cache_capacity: usize,
}

impl ProviderConfig {
    pub const DEFAULT_MINIMUM_DELAY_MS: i64 = 300;
    pub const DEFAULT_CACHE_CAPACITY: usize = 16;

    pub fn new() -> Self {
        Self {
            keep: Vec::new(),
            minimum_delay_ms: Self::DEFAULT_MINIMUM_DELAY_MS,
            cache_capacity: Self::DEFAULT_CACHE_CAPACITY,
        }
    }

    pub fn keep<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.keep = names.into_iter().map(Into::into).collect();
        self
    }
    pub fn minimum_delay_ms(mut self, ms: i64) -> Self {
        self.minimum_delay_ms = ms;
        self
    }
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn push_delay(&self) -> PushDelay {
        PushDelay::from_millis(self.minimum_delay_ms)
    }
}
impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new()
    }
}
