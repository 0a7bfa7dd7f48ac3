use url::Url;

use crate::{Location, ParamError, QueryParams};


/// Computes the path of a link from `location` to `to`, carrying query parameters over.
///
/// When `to` has the same path as `location` (or is `None`), every current parameter is kept;
/// otherwise only the names in `keep`. The query of `to` is applied on top, then `overrides`,
/// where `None` removes the parameter.
pub fn resolve<K, V>(
    location: &Location,
    keep: &[String],
    to: Option<&str>,
    overrides: impl IntoIterator<Item = (K, Option<V>)>,
) -> Result<String, ParamError>
where
    K: AsRef<str>,
    V: ToString,
{
    let to = to.unwrap_or(&location.pathname);
    // Only the path and query of `to` matter; the origin is a placeholder.
    let url = Url::parse(&format!("https://localhost{to}")).map_err(|source| {
        ParamError::InvalidPath {
            path: to.to_string(),
            source,
        }
    })?;
    let path = url.path();

    let mut query = if path == location.pathname {
        location.query()
    } else {
        kept_params(location, keep)
    };
    for (name, value) in url.query_pairs() {
        query.set(&name, &value);
    }
    for (name, value) in overrides {
        let name = name.as_ref();
        query.delete(name);
        if let Some(value) = value {
            query.set(name, &value.to_string());
        }
    }
    Ok(query.append_to(path))
}

fn kept_params(location: &Location, keep: &[String]) -> QueryParams {
    let current = location.query();
    let mut query = QueryParams::new();
    for name in keep {
        if let Some(value) = current.get(name) {
            query.set(name, value);
        }
    }
    query
}
