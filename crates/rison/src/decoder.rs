//! Rison text decoder.

use serde_json::{Map, Number, Value};

use crate::constants::{is_id_char, is_id_start, DEFAULT_MAX_DEPTH};
use crate::error::RisonError;

/// Rison decoder.
///
/// Whitespace is significant: nothing is skipped between tokens.
#[derive(Debug, Clone, Copy)]
pub struct RisonDecoder {
    pub max_depth: usize,
}

impl Default for RisonDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RisonDecoder {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn decode(&self, input: &str) -> Result<Value, RisonError> {
        let mut cursor = Cursor::new(input, self.max_depth);
        let value = cursor.read_value()?;
        cursor.finish()?;
        Ok(value)
    }

    /// Decodes O-Rison; the empty string is the empty object.
    pub fn decode_object(&self, input: &str) -> Result<Map<String, Value>, RisonError> {
        let mut cursor = Cursor::new(input, self.max_depth);
        cursor.enter(0)?;
        let map = cursor.read_object_body(None)?;
        cursor.finish()?;
        Ok(map)
    }

    /// Decodes A-Rison; the empty string is the empty array.
    pub fn decode_array(&self, input: &str) -> Result<Vec<Value>, RisonError> {
        let mut cursor = Cursor::new(input, self.max_depth);
        cursor.enter(0)?;
        let items = cursor.read_array_body(None)?;
        cursor.finish()?;
        Ok(items)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum NumberState {
    Int,
    Frac,
    Exp,
}

struct Cursor<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str, max_depth: usize) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            depth: 0,
            max_depth,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    fn char_at(&self, offset: usize) -> char {
        self.input[offset..].chars().next().unwrap_or('\u{FFFD}')
    }

    fn finish(&self) -> Result<(), RisonError> {
        if self.pos < self.bytes.len() {
            return Err(RisonError::TrailingInput(self.pos));
        }
        Ok(())
    }

    fn enter(&mut self, offset: usize) -> Result<(), RisonError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(RisonError::DepthLimitExceeded {
                offset,
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn read_value(&mut self) -> Result<Value, RisonError> {
        let start = self.pos;
        let Some(c) = self.next() else {
            return Err(RisonError::EmptyExpression(start));
        };
        match c {
            b'!' => self.read_bang(start),
            b'(' => {
                self.enter(start)?;
                let map = self.read_object_body(Some(start))?;
                self.leave();
                Ok(Value::Object(map))
            }
            b'\'' => self.read_quoted(start).map(Value::String),
            b'-' | b'0'..=b'9' => self.read_number(start).map(Value::Number),
            _ => {
                self.pos = start;
                self.read_id().map(Value::String)
            }
        }
    }

    fn read_bang(&mut self, start: usize) -> Result<Value, RisonError> {
        match self.next() {
            None => Err(RisonError::UnexpectedEnd(start)),
            Some(b't') => Ok(Value::Bool(true)),
            Some(b'f') => Ok(Value::Bool(false)),
            Some(b'n') => Ok(Value::Null),
            Some(b'(') => {
                self.enter(start)?;
                let items = self.read_array_body(Some(start))?;
                self.leave();
                Ok(Value::Array(items))
            }
            Some(_) => Err(RisonError::UnknownLiteral {
                offset: start,
                literal: self.char_at(start + 1),
            }),
        }
    }

    fn read_id(&mut self) -> Result<String, RisonError> {
        let start = self.pos;
        match self.peek() {
            Some(first) if is_id_start(first) => {}
            Some(_) => {
                return Err(RisonError::InvalidCharacter {
                    offset: start,
                    ch: self.char_at(start),
                })
            }
            None => return Err(RisonError::EmptyExpression(start)),
        }
        self.pos += 1;
        while matches!(self.peek(), Some(b) if is_id_char(b)) {
            self.pos += 1;
        }
        Ok(self.input[start..self.pos].to_owned())
    }

    /// `start` is the offset of the opening quote, already consumed.
    fn read_quoted(&mut self, start: usize) -> Result<String, RisonError> {
        let mut out = String::new();
        let mut segment = self.pos;
        loop {
            match self.peek() {
                None => return Err(RisonError::UnmatchedQuote(start)),
                Some(b'\'') => {
                    out.push_str(&self.input[segment..self.pos]);
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'!') => {
                    out.push_str(&self.input[segment..self.pos]);
                    let bang = self.pos;
                    self.pos += 1;
                    match self.next() {
                        Some(b'!') => out.push('!'),
                        Some(b'\'') => out.push('\''),
                        Some(_) => {
                            return Err(RisonError::InvalidEscape {
                                offset: bang,
                                ch: self.char_at(bang + 1),
                            })
                        }
                        None => return Err(RisonError::UnmatchedQuote(start)),
                    }
                    segment = self.pos;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// `start` is the offset of the first character, already consumed.
    fn read_number(&mut self, start: usize) -> Result<Number, RisonError> {
        let mut state = NumberState::Int;
        let mut sign_permitted = true;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.pos += 1;
                continue;
            }
            if c == b'-' && sign_permitted {
                sign_permitted = false;
                self.pos += 1;
                continue;
            }
            state = match (state, c.to_ascii_lowercase()) {
                (NumberState::Int, b'.') => NumberState::Frac,
                (NumberState::Int, b'e') | (NumberState::Frac, b'e') => {
                    sign_permitted = true;
                    NumberState::Exp
                }
                _ => break,
            };
            self.pos += 1;
        }
        parse_number(&self.input[start..self.pos]).ok_or(RisonError::InvalidNumber(start))
    }

    /// Reads `k:v,...` up to `)` when `open` is set, or to the end of input
    /// for O-Rison.
    fn read_object_body(&mut self, open: Option<usize>) -> Result<Map<String, Value>, RisonError> {
        let mut map = Map::new();
        let mut count = 0usize;
        loop {
            let at = self.pos;
            match self.peek() {
                None if open.is_none() => return Ok(map),
                None => return Err(RisonError::UnmatchedParen(open.unwrap_or(at))),
                Some(b')') if open.is_some() => {
                    self.pos += 1;
                    return Ok(map);
                }
                Some(b')') => return Err(RisonError::TrailingInput(at)),
                Some(c) => {
                    if count > 0 {
                        if c != b',' {
                            return Err(RisonError::MissingComma(at));
                        }
                        self.pos += 1;
                    } else if c == b',' {
                        return Err(RisonError::ExtraComma(at));
                    }
                }
            }
            let key = self.read_key()?;
            let colon = self.pos;
            if self.next() != Some(b':') {
                return Err(RisonError::MissingColon(colon));
            }
            let value = self.read_value()?;
            map.insert(key, value);
            count += 1;
        }
    }

    fn read_array_body(&mut self, open: Option<usize>) -> Result<Vec<Value>, RisonError> {
        let mut items = Vec::new();
        loop {
            let at = self.pos;
            match self.peek() {
                None if open.is_none() => return Ok(items),
                None => return Err(RisonError::UnmatchedParen(open.unwrap_or(at))),
                Some(b')') if open.is_some() => {
                    self.pos += 1;
                    return Ok(items);
                }
                Some(b')') => return Err(RisonError::TrailingInput(at)),
                Some(c) => {
                    if !items.is_empty() {
                        if c != b',' {
                            return Err(RisonError::MissingComma(at));
                        }
                        self.pos += 1;
                    } else if c == b',' {
                        return Err(RisonError::ExtraComma(at));
                    }
                }
            }
            items.push(self.read_value()?);
        }
    }

    fn read_key(&mut self) -> Result<String, RisonError> {
        let start = self.pos;
        match self.read_value()? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(key_text(&n)),
            _ => Err(RisonError::InvalidKey(start)),
        }
    }
}

/// Text of a numeric object key, as JavaScript would print the number:
/// `1.0` and `1e3` name the keys `"1"` and `"1000"`, `1e21` names `"1e+21"`.
fn key_text(n: &Number) -> String {
    let Some(f) = n.as_f64().filter(|_| n.is_f64()) else {
        return n.to_string();
    };
    if f == 0.0 {
        return "0".to_owned();
    }
    if f.fract() == 0.0 && f.abs() < 1e21 {
        return format!("{f:.0}");
    }
    let text = n.to_string();
    let Some((mantissa, exp)) = text.split_once('e') else {
        return text;
    };
    match exp.parse::<i32>() {
        // Fixed notation down to 1e-6.
        Ok(exp @ -6..=-1) => {
            let (sign, mantissa) = match mantissa.strip_prefix('-') {
                Some(rest) => ("-", rest),
                None => ("", mantissa),
            };
            let digits: String = mantissa.chars().filter(|&c| c != '.').collect();
            let zeros = "0".repeat((-exp - 1) as usize);
            format!("{sign}0.{zeros}{digits}")
        }
        Ok(exp) if exp >= 0 => format!("{mantissa}e+{exp}"),
        _ => text,
    }
}

fn parse_number(text: &str) -> Option<Number> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() {
        return None;
    }
    if digits.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(i) = text.parse::<i64>() {
            return Some(Number::from(i));
        }
        if let Ok(u) = text.parse::<u64>() {
            return Some(Number::from(u));
        }
    }
    let f = text.parse::<f64>().ok()?;
    Number::from_f64(f)
}
