//! Typed byte buffer threaded through the pipeline
//!
//! A [`ByteBuffer`] is a canonical byte sequence carrying a display format
//! tag and an endianness flag. Conversions between tags never change the
//! underlying bytes, only how they are rendered; parsing a rendered form
//! back always yields the same bytes.

use crate::error::{ChainError, Result};

/// How the buffer is rendered for display and parsed from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatTag {
    /// UTF-8 text
    Utf8,
    /// Lowercase hex string, two digits per byte
    Hex,
    /// Decimal byte values separated by spaces, e.g. `72 101 108`
    AsciiArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteBuffer {
    bytes: Vec<u8>,
    format: FormatTag,
    endianness: Endianness,
}

impl ByteBuffer {
    pub fn new(bytes: Vec<u8>, format: FormatTag) -> Self {
        Self {
            bytes,
            format,
            endianness: Endianness::Big,
        }
    }

    /// Parse a rendered form according to `format`.
    pub fn parse(text: &str, format: FormatTag) -> Result<Self> {
        let bytes = match format {
            FormatTag::Utf8 => text.as_bytes().to_vec(),
            FormatTag::Hex => parse_hex(text)?,
            FormatTag::AsciiArray => parse_ascii_array(text)?,
        };
        Ok(Self::new(bytes, format))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn format(&self) -> FormatTag {
        self.format
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Render the bytes in the buffer's current format.
    ///
    /// UTF-8 rendering of bytes that are not valid UTF-8 falls back to a
    /// lossy rendering; the canonical bytes are unaffected.
    pub fn render(&self) -> String {
        match self.format {
            FormatTag::Utf8 => String::from_utf8_lossy(&self.bytes).into_owned(),
            FormatTag::Hex => hex::encode(&self.bytes),
            FormatTag::AsciiArray => self
                .bytes
                .iter()
                .map(|b| b.to_string())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Retag the buffer; the bytes are untouched.
    pub fn with_format(mut self, format: FormatTag) -> Self {
        self.format = format;
        self
    }

    pub fn to_hex(self) -> Self {
        self.with_format(FormatTag::Hex)
    }

    pub fn to_utf8(self) -> Self {
        self.with_format(FormatTag::Utf8)
    }

    pub fn to_ascii_array(self) -> Self {
        self.with_format(FormatTag::AsciiArray)
    }

    /// Reverse the byte order. Applying twice yields the original buffer.
    pub fn swap_endianness(mut self) -> Self {
        self.bytes.reverse();
        self.endianness = match self.endianness {
            Endianness::Big => Endianness::Little,
            Endianness::Little => Endianness::Big,
        };
        self
    }
}

/// Parse a hex string, tolerating whitespace and `0x`/`\x` prefixes the way
/// pasted dumps tend to carry them.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let cleaned: String = text
        .replace("0x", "")
        .replace("\\x", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.len() % 2 != 0 {
        return Err(ChainError::InvalidInputFormat(
            "hex string has odd length".into(),
        ));
    }
    hex::decode(&cleaned)
        .map_err(|e| ChainError::InvalidInputFormat(format!("invalid hex: {e}")))
}

fn parse_ascii_array(text: &str) -> Result<Vec<u8>> {
    let trimmed = text.trim().trim_start_matches('[').trim_end_matches(']');
    if trimmed.trim().is_empty() {
        return Ok(Vec::new());
    }
    trimmed
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u16>()
                .ok()
                .and_then(|v| u8::try_from(v).ok())
                .ok_or_else(|| {
                    ChainError::InvalidInputFormat(format!("invalid byte value `{s}`"))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let buf = ByteBuffer::parse("48656c6c6f", FormatTag::Hex).unwrap();
        assert_eq!(buf.bytes(), b"Hello");
        assert_eq!(buf.clone().to_utf8().render(), "Hello");
        assert_eq!(buf.to_hex().render(), "48656c6c6f");
    }

    #[test]
    fn test_hex_with_noise() {
        let buf = ByteBuffer::parse("0x48 0x65 0x6c", FormatTag::Hex).unwrap();
        assert_eq!(buf.bytes(), &[0x48, 0x65, 0x6c]);
    }

    #[test]
    fn test_odd_hex_fails() {
        let err = ByteBuffer::parse("abc", FormatTag::Hex).unwrap_err();
        assert!(matches!(err, ChainError::InvalidInputFormat(_)));
    }

    #[test]
    fn test_non_hex_fails() {
        assert!(ByteBuffer::parse("zz", FormatTag::Hex).is_err());
    }

    #[test]
    fn test_ascii_array() {
        let buf = ByteBuffer::parse("[72, 101, 108]", FormatTag::AsciiArray).unwrap();
        assert_eq!(buf.bytes(), &[72, 101, 108]);
        assert_eq!(buf.render(), "72 101 108");
    }

    #[test]
    fn test_ascii_array_overflow_fails() {
        let err = ByteBuffer::parse("72 300", FormatTag::AsciiArray).unwrap_err();
        assert!(matches!(err, ChainError::InvalidInputFormat(_)));
    }

    #[test]
    fn test_endianness_involution() {
        let buf = ByteBuffer::new(vec![1, 2, 3, 4], FormatTag::Hex);
        let twice = buf.clone().swap_endianness().swap_endianness();
        assert_eq!(buf, twice);
    }

    #[test]
    fn test_endianness_reverses() {
        let buf = ByteBuffer::new(vec![1, 2, 3], FormatTag::Hex).swap_endianness();
        assert_eq!(buf.bytes(), &[3, 2, 1]);
        assert_eq!(buf.endianness(), Endianness::Little);
    }

    #[test]
    fn test_format_conversions_lossless() {
        let original = ByteBuffer::parse("Hello World", FormatTag::Utf8).unwrap();
        let via_hex =
            ByteBuffer::parse(&original.clone().to_hex().render(), FormatTag::Hex).unwrap();
        let via_array = ByteBuffer::parse(
            &original.clone().to_ascii_array().render(),
            FormatTag::AsciiArray,
        )
        .unwrap();
        assert_eq!(original.bytes(), via_hex.bytes());
        assert_eq!(original.bytes(), via_array.bytes());
    }
}
