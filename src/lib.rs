//! Keeps typed parameters in sync with the query string of a navigation history.
//!
//! A [`ParamProvider`] wraps a [`History`] and hands out one [`ParamHandle`] per
//! location. Handles decode parameters into [`ParamValue`]s and write them back
//! through a rate limited scheduler, so bursts of writes become a single history entry.

mod cache;
mod clock;
mod codec;
mod config;
mod error;
mod handle;
mod history;
mod location;
mod props;
mod provider;
mod query;
mod rate_limit;
mod registry;
mod resolve;
mod scheduler;
mod setter;
mod subscription;
mod timer;
mod value;

pub use clock::*;
pub use codec::*;
pub use config::*;
pub use error::*;
pub use handle::*;
pub use history::*;
pub use location::*;
pub use props::*;
pub use provider::*;
pub use query::*;
pub use rate_limit::*;
pub use resolve::*;
pub use scheduler::*;
pub use setter::*;
pub use subscription::*;
pub use value::*;

pub use web_time::Instant;
