use crate::error::TagError;
use std::fmt;

pub const TAG_WIDTH: usize = 4;
/// Number of distinct four-character tags (`0000` through `ZZZZ`).
pub const TAG_CAPACITY: u64 = 36 * 36 * 36 * 36;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A four-character uppercase base-36 note identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(String);

impl Tag {
    pub fn from_counter(value: u64) -> Result<Self, TagError> {
        if value >= TAG_CAPACITY {
            return Err(TagError::Overflow(value));
        }
        Ok(Self(encode_base36_width(value, TAG_WIDTH)))
    }

    /// Parse the canonical form: exactly four characters from `0-9A-Z`.
    pub fn parse(raw: &str) -> Result<Self, TagError> {
        let canonical = raw.len() == TAG_WIDTH
            && raw.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase());
        if !canonical {
            return Err(TagError::Invalid(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn value(&self) -> u64 {
        // Canonical tags always decode.
        decode_base36(&self.0).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self) -> String {
        format!("{}.md", self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decode a base-36 string of either letter case. Empty input, characters
/// outside `[0-9A-Za-z]` and values above `u64::MAX` yield `None`.
pub fn decode_base36(raw: &str) -> Option<u64> {
    if raw.is_empty() {
        return None;
    }
    let mut value: u64 = 0;
    for ch in raw.chars() {
        let digit = ch.to_digit(36)?;
        value = value.checked_mul(36)?.checked_add(u64::from(digit))?;
    }
    Some(value)
}

/// Decode the leading run of base-36 characters, ignoring whatever follows.
/// `None` when the input does not start with one.
pub fn decode_base36_prefix(raw: &str) -> Option<u64> {
    let end = raw
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_alphanumeric())
        .map_or(raw.len(), |(idx, _)| idx);
    decode_base36(&raw[..end])
}

fn encode_base36(num: u64) -> String {
    if num == 0 {
        return "0".to_string();
    }
    let mut n = num;
    let base = ALPHABET.len() as u64;
    let mut out = Vec::new();
    while n > 0 {
        let idx = (n % base) as usize;
        out.push(ALPHABET[idx] as char);
        n /= base;
    }
    out.iter().rev().collect()
}

fn encode_base36_width(num: u64, width: usize) -> String {
    let base = encode_base36(num);
    if base.len() >= width {
        base
    } else {
        format!("{}{}", "0".repeat(width - base.len()), base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_counter_pads_to_four() {
        assert_eq!(Tag::from_counter(1).unwrap().as_str(), "0001");
        assert_eq!(Tag::from_counter(10).unwrap().as_str(), "000A");
        assert_eq!(Tag::from_counter(36).unwrap().as_str(), "0010");
        assert_eq!(Tag::from_counter(TAG_CAPACITY - 1).unwrap().as_str(), "ZZZZ");
    }

    #[test]
    fn test_round_trip_at_boundaries() {
        for n in [1, 35, 36, 1295, 1296, 46655, 46656, TAG_CAPACITY - 1] {
            let tag = Tag::from_counter(n).unwrap();
            assert_eq!(tag.as_str().len(), 4);
            assert_eq!(tag.value(), n);
            assert_eq!(decode_base36(tag.as_str()), Some(n));
        }
    }

    #[test]
    fn test_round_trip_sampled_range() {
        let mut n = 1;
        while n < TAG_CAPACITY {
            let tag = Tag::from_counter(n).unwrap();
            assert_eq!(tag.as_str().len(), 4);
            assert_eq!(tag.value(), n);
            n += 997;
        }
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert!(matches!(
            Tag::from_counter(TAG_CAPACITY),
            Err(TagError::Overflow(v)) if v == TAG_CAPACITY
        ));
    }

    #[test]
    fn test_parse_rejects_non_canonical() {
        assert!(Tag::parse("00A1").is_ok());
        assert!(Tag::parse("00a1").is_err());
        assert!(Tag::parse("001").is_err());
        assert!(Tag::parse("00001").is_err());
        assert!(Tag::parse("00-1").is_err());
    }

    #[test]
    fn test_decode_base36() {
        assert_eq!(decode_base36("ZZZZ"), Some(1_679_615));
        assert_eq!(decode_base36("zz"), Some(1295));
        assert_eq!(decode_base36(""), None);
        assert_eq!(decode_base36("ab_c"), None);
    }

    #[test]
    fn test_decode_base36_prefix_stops_at_separator() {
        assert_eq!(decode_base36_prefix("00ZZ_md"), Some(1295));
        assert_eq!(decode_base36_prefix("0010"), Some(36));
        assert_eq!(decode_base36_prefix("_0010"), None);
        assert_eq!(decode_base36_prefix(""), None);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(Tag::from_counter(11).unwrap().file_name(), "000B.md");
    }
}
