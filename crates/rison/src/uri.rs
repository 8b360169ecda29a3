//! URI quoting tuned for Rison text.

use serde_json::Value;

use crate::RisonEncoder;

/// Bytes `encodeURIComponent` leaves alone, plus the Rison punctuation
/// `,:@$/` that is safe in a query value.
fn is_uri_ok(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')' | b',' | b':' | b'@'
                | b'$' | b'/'
        )
}

/// Percent-encodes `s` for use in a URI, keeping Rison readable.
/// Spaces become `+`.
pub fn quote(s: &str) -> String {
    if s.bytes().all(is_uri_ok) {
        return s.to_owned();
    }
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(s.len() * 3);
    for byte in s.bytes() {
        if is_uri_ok(byte) {
            out.push(byte as char);
        } else if byte == b' ' {
            out.push('+');
        } else {
            out.push('%');
            out.push(HEX[(byte >> 4) as usize] as char);
            out.push(HEX[(byte & 0x0f) as usize] as char);
        }
    }
    out
}

/// Rison-encodes `value` and quotes the result for a URI.
pub fn encode_uri(value: &Value) -> String {
    quote(&RisonEncoder::new().encode(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quote_matrix() {
        assert_eq!(quote("(a:!(1,2))"), "(a:!(1,2))");
        assert_eq!(quote("'a b'"), "'a+b'");
        assert_eq!(quote("a&b=c"), "a%26b%3Dc");
        assert_eq!(quote("100%"), "100%25");
        assert_eq!(quote("é"), "%C3%A9");
        assert_eq!(quote("/x@y$z"), "/x@y$z");
    }

    #[test]
    fn encode_uri_quotes_encoded_value() {
        assert_eq!(
            encode_uri(&json!({"q": "status:200 AND a&b"})),
            "(q:'status:200+AND+a%26b')"
        );
    }
}
