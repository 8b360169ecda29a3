//! Ordered query-string values.

use indexmap::IndexMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query parse error: {0}")]
    Parse(#[from] serde_urlencoded::de::Error),
    #[error("query serialize error: {0}")]
    Serialize(#[from] serde_urlencoded::ser::Error),
}

/// Decoded `key=value&...` pairs.
///
/// Keys keep the order of their first appearance. A key that appears more
/// than once keeps every value, in order. Values are held decoded, so a
/// round trip preserves them by value rather than by byte: `flag` comes
/// back as `flag=` and `a%20b` as `a+b`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryValues {
    entries: IndexMap<String, Vec<String>>,
}

impl QueryValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a query string, with or without the leading `?`.
    ///
    /// `+` decodes to a space and percent escapes are decoded. A pair
    /// without `=` has an empty value.
    pub fn parse(query: &str) -> Result<Self, QueryError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)?;
        Ok(pairs.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// First value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Appends a value, keeping any existing values of `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .entry(key.into())
            .or_default()
            .push(value.into());
    }

    /// Makes `value` the only value of `key`. An existing key keeps its
    /// position; a new key goes last.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), vec![value.into()]);
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.entries.shift_remove(key)
    }

    /// Shallow merge: every key of `other` replaces the same key here.
    pub fn merge(&mut self, other: QueryValues) {
        for (key, values) in other.entries {
            self.entries.insert(key, values);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// `application/x-www-form-urlencoded` serialization, without `?`.
    pub fn to_query_string(&self) -> Result<String, QueryError> {
        let pairs: Vec<(&str, &str)> = self
            .entries
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |v| (key.as_str(), v.as_str())))
            .collect();
        Ok(serde_urlencoded::to_string(pairs)?)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = QueryValues::new();
        for (key, value) in iter {
            query.append(key, value);
        }
        query
    }
}
