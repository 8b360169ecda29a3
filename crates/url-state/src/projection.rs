//! Mappings between typed view state and the generic object stored in the URL.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("state conversion error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("state must serialize to an object, got {0}")]
    NotAnObject(&'static str),
    #[error("{0}")]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl ProjectionError {
    pub fn custom<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        ProjectionError::Custom(err.into())
    }
}

/// Converts between a view's state type and the object kept in the URL.
///
/// `to_object` may return a partial object: only its keys overwrite what
/// the URL already holds.
pub trait StateProjection {
    type State;

    fn to_state(&self, object: Map<String, Value>) -> Result<Self::State, ProjectionError>;

    fn to_object(&self, state: &Self::State) -> Result<Map<String, Value>, ProjectionError>;
}

/// The state is the decoded object itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityProjection;

impl StateProjection for IdentityProjection {
    type State = Map<String, Value>;

    fn to_state(&self, object: Map<String, Value>) -> Result<Self::State, ProjectionError> {
        Ok(object)
    }

    fn to_object(&self, state: &Self::State) -> Result<Map<String, Value>, ProjectionError> {
        Ok(state.clone())
    }
}

/// Projection through serde.
///
/// Fields left out by `Serialize` (e.g. `skip_serializing_if = "Option::is_none"`)
/// are left untouched in the URL, which is how a typed state expresses a
/// partial update.
pub struct SerdeProjection<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> SerdeProjection<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for SerdeProjection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SerdeProjection<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for SerdeProjection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SerdeProjection")
    }
}

impl<T: Serialize + DeserializeOwned> StateProjection for SerdeProjection<T> {
    type State = T;

    fn to_state(&self, object: Map<String, Value>) -> Result<T, ProjectionError> {
        Ok(serde_json::from_value(Value::Object(object))?)
    }

    fn to_object(&self, state: &T) -> Result<Map<String, Value>, ProjectionError> {
        match serde_json::to_value(state)? {
            Value::Object(map) => Ok(map),
            other => Err(ProjectionError::NotAnObject(json_type_name(&other))),
        }
    }
}

/// Projection built from a pair of closures.
pub struct FnProjection<S, D, E> {
    decode: D,
    encode: E,
    _marker: PhantomData<fn() -> S>,
}

impl<S, D, E> FnProjection<S, D, E>
where
    D: Fn(Map<String, Value>) -> Result<S, ProjectionError>,
    E: Fn(&S) -> Result<Map<String, Value>, ProjectionError>,
{
    pub fn new(decode: D, encode: E) -> Self {
        Self {
            decode,
            encode,
            _marker: PhantomData,
        }
    }
}

impl<S, D, E> StateProjection for FnProjection<S, D, E>
where
    D: Fn(Map<String, Value>) -> Result<S, ProjectionError>,
    E: Fn(&S) -> Result<Map<String, Value>, ProjectionError>,
{
    type State = S;

    fn to_state(&self, object: Map<String, Value>) -> Result<S, ProjectionError> {
        (self.decode)(object)
    }

    fn to_object(&self, state: &S) -> Result<Map<String, Value>, ProjectionError> {
        (self.encode)(state)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct TimeRange {
        from: String,
        to: String,
    }

    #[test]
    fn serde_projection_roundtrip() {
        let projection = SerdeProjection::<TimeRange>::new();
        let range = TimeRange {
            from: "now-1h".into(),
            to: "now".into(),
        };
        let object = projection.to_object(&range).unwrap();
        assert_eq!(Value::Object(object.clone()), json!({"from": "now-1h", "to": "now"}));
        assert_eq!(projection.to_state(object).unwrap(), range);
    }

    #[test]
    fn serde_projection_rejects_non_objects() {
        let projection = SerdeProjection::<Vec<u8>>::new();
        let err = projection.to_object(&vec![1, 2]).unwrap_err();
        assert!(matches!(err, ProjectionError::NotAnObject("array")));

        let ranges = SerdeProjection::<TimeRange>::new();
        assert!(matches!(
            ranges.to_state(Map::new()),
            Err(ProjectionError::Serde(_))
        ));
    }

    #[test]
    fn fn_projection_wraps_closures() {
        let projection = FnProjection::new(
            |object: Map<String, Value>| {
                object
                    .get("page")
                    .and_then(Value::as_u64)
                    .ok_or_else(|| ProjectionError::custom("page missing"))
            },
            |page: &u64| {
                let mut object = Map::new();
                object.insert("page".into(), json!(page));
                Ok(object)
            },
        );
        let object = projection.to_object(&3).unwrap();
        assert_eq!(projection.to_state(object).unwrap(), 3);
        let err = projection.to_state(Map::new()).unwrap_err();
        assert_eq!(err.to_string(), "page missing");
    }
}
