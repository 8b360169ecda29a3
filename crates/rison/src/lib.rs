//! Rison: a compact, URL-friendly serialization of JSON values.
//!
//! | JSON | Rison |
//! |---|---|
//! | `null`, `true`, `false` | `!n`, `!t`, `!f` |
//! | `"asc"`, `"a b"`, `""` | `asc`, `'a b'`, `''` |
//! | `[1,2]` | `!(1,2)` |
//! | `{"a":1,"b":"x"}` | `(a:1,b:x)` |
//!
//! Two variants drop the outermost brackets for use in query values:
//! O-Rison for objects (`a:1,b:x`) and A-Rison for arrays (`1,2`).

mod constants;
mod decoder;
mod encoder;
mod error;
mod uri;

pub use constants::{is_id, DEFAULT_MAX_DEPTH};
pub use decoder::RisonDecoder;
pub use encoder::RisonEncoder;
pub use error::{RisonError, RisonErrorKind};
pub use uri::{encode_uri, quote};

use serde_json::{Map, Value};

pub fn encode(value: &Value) -> String {
    RisonEncoder::new().encode(value)
}

pub fn decode(input: &str) -> Result<Value, RisonError> {
    RisonDecoder::new().decode(input)
}

pub fn encode_object(map: &Map<String, Value>) -> String {
    RisonEncoder::new().encode_object(map)
}

pub fn decode_object(input: &str) -> Result<Map<String, Value>, RisonError> {
    RisonDecoder::new().decode_object(input)
}

pub fn encode_array(items: &[Value]) -> String {
    RisonEncoder::new().encode_array(items)
}

pub fn decode_array(input: &str) -> Result<Vec<Value>, RisonError> {
    RisonDecoder::new().decode_array(input)
}
