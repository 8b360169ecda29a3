//! Rison alphabet.

/// Characters that may not appear anywhere in a bare identifier.
pub const NOT_IDCHAR: &[u8] = b" '!:(),*@$";

/// Characters that may not start a bare identifier.
pub const NOT_IDSTART: &[u8] = b"-0123456789";

/// Default limit on array/object nesting accepted by the decoder.
pub const DEFAULT_MAX_DEPTH: usize = 512;

#[inline]
pub fn is_id_char(byte: u8) -> bool {
    !NOT_IDCHAR.contains(&byte)
}

#[inline]
pub fn is_id_start(byte: u8) -> bool {
    is_id_char(byte) && !NOT_IDSTART.contains(&byte)
}

/// Returns `true` when `s` can be written without quotes.
///
/// Non-ASCII bytes are always identifier characters.
pub fn is_id(s: &str) -> bool {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(&first) => is_id_start(first) && bytes[1..].iter().all(|&b| is_id_char(b)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_matrix() {
        assert!(is_id("asc"));
        assert!(is_id("a-b.c_d"));
        assert!(is_id("true"));
        assert!(is_id("ünïcode"));
        assert!(is_id("now-15m"));
        assert!(!is_id(""));
        assert!(!is_id("-a"));
        assert!(!is_id("1a"));
        assert!(!is_id("a b"));
        assert!(!is_id("a:b"));
        assert!(!is_id("it's"));
        assert!(!is_id("a*"));
    }
}
