//! State <-> location codec.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace};
use url_state_rison::{RisonDecoder, RisonEncoder, RisonError, DEFAULT_MAX_DEPTH};

use crate::error::LocationStateError;
use crate::location::Location;
use crate::projection::{IdentityProjection, StateProjection};
use crate::query::QueryValues;

/// Query parameter holding the encoded application state.
pub const DEFAULT_STATE_KEY: &str = "_a";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Name of the reserved query parameter.
    pub state_key: String,
    /// Deepest array/object nesting accepted when decoding or encoding the
    /// fragment.
    pub max_depth: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            state_key: DEFAULT_STATE_KEY.to_owned(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Decoded fragment plus whether it came from a well-formed parameter.
struct Fragment {
    object: Map<String, Value>,
    clean: bool,
}

/// Keeps view state in a single O-Rison query parameter.
///
/// Both directions are pure: `decode` reads a [`Location`], `encode`
/// returns a new one. Malformed fragments read as an empty object; every
/// other failure is returned to the caller.
#[derive(Debug, Clone)]
pub struct LocationStateCodec<P = IdentityProjection> {
    options: CodecOptions,
    decoder: RisonDecoder,
    projection: P,
}

impl Default for LocationStateCodec<IdentityProjection> {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationStateCodec<IdentityProjection> {
    pub fn new() -> Self {
        Self::with_projection(IdentityProjection)
    }
}

impl<P: StateProjection> LocationStateCodec<P> {
    pub fn with_projection(projection: P) -> Self {
        let options = CodecOptions::default();
        Self {
            decoder: RisonDecoder::with_max_depth(options.max_depth),
            options,
            projection,
        }
    }

    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.decoder = RisonDecoder::with_max_depth(options.max_depth);
        self.options = options;
        self
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }

    /// Reads the state stored in `location`.
    pub fn decode(&self, location: &Location) -> Result<P::State, LocationStateError> {
        let object = self.decode_object(location)?;
        Ok(self.projection.to_state(object)?)
    }

    /// Reads the raw object stored in `location`, before projection.
    pub fn decode_object(
        &self,
        location: &Location,
    ) -> Result<Map<String, Value>, LocationStateError> {
        let query = location.query()?;
        Ok(self.read_fragment(&query)?.object)
    }

    /// Merges `state` over the state already in `location` and returns the
    /// resulting location. Keys absent from the projected state keep their
    /// previous values; query parameters other than the state key are kept
    /// as they were.
    pub fn encode(
        &self,
        state: &P::State,
        location: &Location,
    ) -> Result<Location, LocationStateError> {
        let update = self.projection.to_object(state)?;
        self.encode_object(update, location)
    }

    /// [`encode`](Self::encode) without the projection step.
    ///
    /// Returns a location equal to `location` when the merge changes
    /// nothing, so callers can skip the navigation.
    pub fn encode_object(
        &self,
        update: Map<String, Value>,
        location: &Location,
    ) -> Result<Location, LocationStateError> {
        let key = self.options.state_key.as_str();
        let mut query = location.query()?;
        let previous = self.read_fragment(&query)?;

        let unchanged = previous.clean
            && query.get_all(key).len() == 1
            && update
                .iter()
                .all(|(k, v)| previous.object.get(k) == Some(v));
        if unchanged {
            return Ok(location.clone());
        }

        let mut merged = previous.object;
        merged.extend(update);
        let fragment =
            RisonEncoder::with_max_depth(self.options.max_depth).try_encode_object(&merged)?;
        trace!(key, fragment = %fragment, "encoded location state");

        query.set(key, fragment);
        Ok(location.with_query(&query)?)
    }

    fn read_fragment(&self, query: &QueryValues) -> Result<Fragment, RisonError> {
        let key = self.options.state_key.as_str();
        let text = match query.get(key) {
            Some(text) if !text.is_empty() => text,
            _ => {
                return Ok(Fragment {
                    object: Map::new(),
                    clean: false,
                })
            }
        };
        match self.decoder.decode_object(text) {
            Ok(object) => Ok(Fragment {
                object,
                clean: true,
            }),
            Err(err) if err.is_malformed_input() => {
                debug!(key, offset = err.offset(), error = %err, "discarding malformed location state");
                Ok(Fragment {
                    object: Map::new(),
                    clean: false,
                })
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn encodes_next_to_unrelated_parameters() {
        let codec = LocationStateCodec::new();
        let location = Location::new("/app", "?foo=bar", "");
        let next = codec
            .encode(&object(json!({"sort": "asc"})), &location)
            .unwrap();
        assert_eq!(next.search, "?foo=bar&_a=sort%3Aasc");
        assert_eq!(next.pathname, "/app");
        assert_eq!(
            Value::Object(codec.decode(&next).unwrap()),
            json!({"sort": "asc"})
        );
    }

    #[test]
    fn malformed_fragment_reads_as_empty() {
        let codec = LocationStateCodec::new();
        for search in ["?_a=(", "?_a=a:1)", "?_a=!x", "?_a='open", "?_a=a"] {
            let location = Location::new("/", search, "");
            assert_eq!(codec.decode(&location).unwrap(), Map::new(), "{search}");
        }
        assert_eq!(
            codec.decode(&Location::new("/", "?_a=", "")).unwrap(),
            Map::new()
        );
        assert_eq!(
            codec.decode(&Location::new("/", "", "")).unwrap(),
            Map::new()
        );
    }

    #[test]
    fn malformed_fragment_is_replaced_on_encode() {
        let codec = LocationStateCodec::new();
        let location = Location::new("/", "?_a=(&x=1", "");
        let next = codec.encode(&object(json!({"a": 1})), &location).unwrap();
        assert_eq!(next.search, "?_a=a%3A1&x=1");
    }

    #[test]
    fn depth_limit_propagates() {
        let codec = LocationStateCodec::new().with_options(CodecOptions {
            max_depth: 2,
            ..CodecOptions::default()
        });
        let location = Location::new("/", "?_a=a:!(!(1))", "");
        let err = codec.decode(&location).unwrap_err();
        assert!(matches!(
            err,
            LocationStateError::Rison(RisonError::DepthLimitExceeded { limit: 2, .. })
        ));
    }

    #[test]
    fn encode_refuses_state_deeper_than_the_limit() {
        let codec = LocationStateCodec::new().with_options(CodecOptions {
            max_depth: 2,
            ..CodecOptions::default()
        });
        let location = Location::new("/app", "?foo=bar", "");
        let err = codec
            .encode(&object(json!({"a": {"b": {"c": 1}}})), &location)
            .unwrap_err();
        assert!(matches!(
            err,
            LocationStateError::Rison(RisonError::DepthLimitExceeded {
                offset: 5,
                limit: 2
            })
        ));

        let next = codec
            .encode(&object(json!({"a": {"b": 1}})), &location)
            .unwrap();
        assert_eq!(
            Value::Object(codec.decode(&next).unwrap()),
            json!({"a": {"b": 1}})
        );
        let later = codec.encode(&object(json!({"x": 1})), &next).unwrap();
        assert_eq!(
            Value::Object(codec.decode(&later).unwrap()),
            json!({"a": {"b": 1}, "x": 1})
        );
    }

    #[test]
    fn encode_refuses_state_deeper_than_the_default_limit() {
        let codec = LocationStateCodec::new();
        let location = Location::new("/app", "?foo=bar", "");

        let nested = |levels: usize| {
            let mut value = json!(1);
            for _ in 0..levels {
                value = Value::Array(vec![value]);
            }
            value
        };

        let err = codec
            .encode(&object(json!({"a": nested(600)})), &location)
            .unwrap_err();
        assert!(matches!(
            err,
            LocationStateError::Rison(RisonError::DepthLimitExceeded {
                limit: DEFAULT_MAX_DEPTH,
                ..
            })
        ));

        // The object body is one level, so the value may add one less.
        let deepest = object(json!({"a": nested(DEFAULT_MAX_DEPTH - 1)}));
        let next = codec.encode(&deepest, &location).unwrap();
        assert_eq!(codec.decode(&next).unwrap(), deepest);
        assert!(codec.encode(&object(json!({"b": 2})), &next).is_ok());
    }

    #[test]
    fn custom_state_key() {
        let codec = LocationStateCodec::new().with_options(CodecOptions {
            state_key: "_g".into(),
            ..CodecOptions::default()
        });
        let location = Location::new("/", "?_a=a:1", "");
        let next = codec.encode(&object(json!({"b": 2})), &location).unwrap();
        assert_eq!(next.search, "?_a=a%3A1&_g=b%3A2");
        assert_eq!(Value::Object(codec.decode(&next).unwrap()), json!({"b": 2}));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: CodecOptions = serde_json::from_value(json!({"state_key": "_s"})).unwrap();
        assert_eq!(options.state_key, "_s");
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
    }
}
