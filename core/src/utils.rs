//! Utility functions and types.

use std::fmt::Debug;

/// Redacts a string by replacing all but the first and last three characters with asterisks.
///
/// - If the input string has fewer than 12 characters, it should be entirely redacted.
/// - If the input string has 12 or more characters, only the first three and the last three.
///
/// This design is to allow users to distinguish between different redacted strings but avoid
/// leaking sensitive information.
pub struct Redact<'a>(&'a str);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value.as_str())
    }
}

impl<'a> From<&'a Option<String>> for Redact<'a> {
    fn from(value: &'a Option<String>) -> Self {
        match value {
            None => Redact(""),
            Some(v) => Redact(v),
        }
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let length = self.0.chars().count();
        if length == 0 {
            f.write_str("EMPTY")
        } else if length < 12 {
            f.write_str("***")
        } else {
            // Cut on char boundaries, byte offsets may fall inside a char.
            let head = self.0.char_indices().nth(3).map_or(0, |(i, _)| i);
            let tail = self.0.char_indices().nth_back(2).map_or(0, |(i, _)| i);
            f.write_str(&self.0[..head])?;
            f.write_str("***")?;
            f.write_str(&self.0[tail..])
        }
    }
}

/// Redacts raw secret bytes, only their length is shown.
pub struct RedactBytes<'a>(&'a [u8]);

impl<'a> From<&'a [u8]> for RedactBytes<'a> {
    fn from(value: &'a [u8]) -> Self {
        RedactBytes(value)
    }
}

impl<'a> From<&'a Vec<u8>> for RedactBytes<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        RedactBytes(value.as_slice())
    }
}

impl Debug for RedactBytes<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            f.write_str("EMPTY")
        } else {
            write!(f, "*** ({} bytes)", self.0.len())
        }
    }
}
