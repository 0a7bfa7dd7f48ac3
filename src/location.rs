use std::fmt;

use serde::{Deserialize, Serialize};

use crate::QueryParams;

/// A navigable address split into its path, query and fragment.
///
/// `search` is empty or starts with `?`, `hash` is empty or starts with `#`.
///
/// Locations are shared as `Rc<Location>`; caches compare them by reference,
/// so two navigations to the same address still produce distinct locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub pathname: String,
    pub search: String,
    pub hash: String,
}

impl Location {
    /// Splits a path such as `/items?page=2#top`.
    pub fn from_path(path: &str) -> Self {
        let (rest, hash) = match path.find('#') {
            Some(i) => path.split_at(i),
            None => (path, ""),
        };
        let (pathname, search) = match rest.find('?') {
            Some(i) => rest.split_at(i),
            None => (rest, ""),
        };
        let pathname = if pathname.starts_with('/') {
            pathname.to_string()
        } else {
            format!("/{pathname}")
        };
        Self {
            pathname,
            search: normalize_part(search),
            hash: normalize_part(hash),
        }
    }

    pub fn query(&self) -> QueryParams {
        QueryParams::parse(&self.search)
    }

    pub fn path(&self) -> String {
        format!("{}{}{}", self.pathname, self.search, self.hash)
    }
}
impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.pathname, self.search, self.hash)
    }
}

// A lone `?` or `#` carries nothing.
fn normalize_part(s: &str) -> String {
    if s.len() <= 1 {
        String::new()
    } else {
        s.to_string()
    }
}
