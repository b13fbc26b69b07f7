//! Error types for the Strata core crate.

use std::fmt;

/// Errors from encoding or decoding binary data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CodecError {
    /// Failed to encode a value to bytes.
    Encode(String),
    /// Failed to decode a value from bytes.
    Decode(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Encode(msg) => write!(f, "encode failed: {}", msg),
            CodecError::Decode(msg) => write!(f, "decode failed: {}", msg),
        }
    }
}

impl std::error::Error for CodecError {}

/// Errors from parsing a content id out of its text form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdParseError {
    /// The string is not the expected number of hex characters.
    BadLength(usize),
    /// The string contains non-hex characters.
    InvalidHex,
}

impl fmt::Display for IdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdParseError::BadLength(len) => {
                write!(f, "content id must be 32 hex characters, got {}", len)
            }
            IdParseError::InvalidHex => write!(f, "content id contains non-hex characters"),
        }
    }
}

impl std::error::Error for IdParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = CodecError::Encode("oops".into());
        assert!(e.to_string().contains("encode failed"));

        let e = IdParseError::BadLength(7);
        assert!(e.to_string().contains("got 7"));
    }
}
