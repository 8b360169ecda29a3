//! Router location value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::{QueryError, QueryValues};

/// Path, query and fragment of a URL as seen by the router.
///
/// `search` is empty or starts with `?`; `hash` is empty or starts with `#`.
/// A `Location` is never modified in place: operations return new values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub pathname: String,
    pub search: String,
    pub hash: String,
}

impl Location {
    pub fn new(
        pathname: impl Into<String>,
        search: impl Into<String>,
        hash: impl Into<String>,
    ) -> Self {
        Self {
            pathname: pathname.into(),
            search: with_prefix('?', search.into()),
            hash: with_prefix('#', hash.into()),
        }
    }

    /// Splits `"/path?query#hash"` into its parts.
    pub fn parse(url: &str) -> Self {
        let (rest, hash) = match url.find('#') {
            Some(i) => (&url[..i], &url[i..]),
            None => (url, ""),
        };
        let (pathname, search) = match rest.find('?') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, ""),
        };
        Self::new(pathname, search, hash)
    }

    pub fn query(&self) -> Result<QueryValues, QueryError> {
        QueryValues::parse(&self.search)
    }

    /// Returns a copy with `search` rebuilt from `query`.
    pub fn with_query(&self, query: &QueryValues) -> Result<Location, QueryError> {
        let encoded = query.to_query_string()?;
        let search = if encoded.is_empty() {
            String::new()
        } else {
            format!("?{encoded}")
        };
        Ok(Location {
            search,
            ..self.clone()
        })
    }
}

fn with_prefix(prefix: char, value: String) -> String {
    if value.is_empty() || value.starts_with(prefix) {
        value
    } else {
        format!("{prefix}{value}")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.pathname, self.search, self.hash)
    }
}
