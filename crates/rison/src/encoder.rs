//! Rison text encoder.

use serde_json::{Map, Number, Value};

use crate::constants::is_id;
use crate::error::RisonError;

/// Rison encoder.
///
/// Encoding is total: every [`Value`] has a Rison form. Object keys are
/// written in sorted order so equal objects always encode to the same text.
///
/// The `try_encode*` methods additionally enforce a nesting limit, counted
/// the way [`RisonDecoder`](crate::RisonDecoder) counts it, so their output
/// always decodes under the same limit.
pub struct RisonEncoder {
    pub out: String,
    max_depth: usize,
    depth: usize,
    overflow: Option<usize>,
}

impl Default for RisonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RisonEncoder {
    pub fn new() -> Self {
        Self::with_max_depth(usize::MAX)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            out: String::new(),
            max_depth,
            depth: 0,
            overflow: None,
        }
    }

    /// Encodes any value, e.g. `{"a":[1,"x y"]}` -> `(a:!(1,'x y'))`.
    pub fn encode(&mut self, value: &Value) -> String {
        self.reset();
        self.write_any(value);
        std::mem::take(&mut self.out)
    }

    /// O-Rison: an object without the enclosing parentheses.
    pub fn encode_object(&mut self, map: &Map<String, Value>) -> String {
        self.reset();
        self.write_object_body(map);
        std::mem::take(&mut self.out)
    }

    /// A-Rison: an array without the enclosing `!(` and `)`.
    pub fn encode_array(&mut self, items: &[Value]) -> String {
        self.reset();
        self.write_array_body(items);
        std::mem::take(&mut self.out)
    }

    /// [`encode`](Self::encode) under the depth limit.
    pub fn try_encode(&mut self, value: &Value) -> Result<String, RisonError> {
        self.reset();
        self.write_any(value);
        self.finish()
    }

    /// [`encode_object`](Self::encode_object) under the depth limit. The
    /// unbracketed body counts as one level, as in `decode_object`.
    pub fn try_encode_object(&mut self, map: &Map<String, Value>) -> Result<String, RisonError> {
        self.reset();
        self.open();
        self.write_object_body(map);
        self.close();
        self.finish()
    }

    /// [`encode_array`](Self::encode_array) under the depth limit.
    pub fn try_encode_array(&mut self, items: &[Value]) -> Result<String, RisonError> {
        self.reset();
        self.open();
        self.write_array_body(items);
        self.close();
        self.finish()
    }

    fn reset(&mut self) {
        self.out.clear();
        self.depth = 0;
        self.overflow = None;
    }

    /// Records the offset of the first container past the limit.
    fn open(&mut self) {
        self.depth += 1;
        if self.depth > self.max_depth && self.overflow.is_none() {
            self.overflow = Some(self.out.len());
        }
    }

    fn close(&mut self) {
        self.depth -= 1;
    }

    fn finish(&mut self) -> Result<String, RisonError> {
        let out = std::mem::take(&mut self.out);
        match self.overflow.take() {
            Some(offset) => Err(RisonError::DepthLimitExceeded {
                offset,
                limit: self.max_depth,
            }),
            None => Ok(out),
        }
    }

    pub fn write_any(&mut self, value: &Value) {
        match value {
            Value::Null => self.write_null(),
            Value::Bool(b) => self.write_boolean(*b),
            Value::Number(n) => self.write_number(n),
            Value::String(s) => self.write_str(s),
            Value::Array(items) => self.write_array(items),
            Value::Object(map) => self.write_object(map),
        }
    }

    pub fn write_null(&mut self) {
        self.out.push_str("!n");
    }

    pub fn write_boolean(&mut self, b: bool) {
        self.out.push_str(if b { "!t" } else { "!f" });
    }

    /// Writes the shortest round-tripping form; exponents carry no `+`.
    pub fn write_number(&mut self, n: &Number) {
        let text = n.to_string();
        if text.contains('+') {
            self.out.extend(text.chars().filter(|&c| c != '+'));
        } else {
            self.out.push_str(&text);
        }
    }

    pub fn write_str(&mut self, s: &str) {
        if s.is_empty() {
            self.out.push_str("''");
            return;
        }
        if is_id(s) {
            self.out.push_str(s);
            return;
        }
        self.out.reserve(s.len() + 2);
        self.out.push('\'');
        for ch in s.chars() {
            if ch == '!' || ch == '\'' {
                self.out.push('!');
            }
            self.out.push(ch);
        }
        self.out.push('\'');
    }

    pub fn write_array(&mut self, items: &[Value]) {
        self.open();
        self.out.push_str("!(");
        self.write_array_body(items);
        self.out.push(')');
        self.close();
    }

    pub fn write_object(&mut self, map: &Map<String, Value>) {
        self.open();
        self.out.push('(');
        self.write_object_body(map);
        self.out.push(')');
        self.close();
    }

    fn write_array_body(&mut self, items: &[Value]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.write_any(item);
        }
    }

    fn write_object_body(&mut self, map: &Map<String, Value>) {
        let mut entries: Vec<(&String, &Value)> = map.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (i, (key, value)) in entries.into_iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.write_str(key);
            self.out.push(':');
            self.write_any(value);
        }
    }
}
