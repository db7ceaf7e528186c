//! Text encodings available as pipeline operations

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::{ChainError, Result};

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

pub fn base64_encode(data: &[u8]) -> String {
    BASE64.encode(data)
}

pub fn base64_decode(text: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(text.trim())
        .map_err(|e| ChainError::InvalidInputFormat(format!("invalid base64: {e}")))
}

/// RFC 4648 base32 with `=` padding.
pub fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(5) * 8);
    for chunk in data.chunks(5) {
        let mut buf = [0u8; 5];
        buf[..chunk.len()].copy_from_slice(chunk);
        let bits = u64::from_be_bytes([0, 0, 0, buf[0], buf[1], buf[2], buf[3], buf[4]]);

        let symbols = [2, 4, 5, 7, 8][chunk.len() - 1];
        for i in 0..8 {
            if i < symbols {
                let index = ((bits >> (35 - 5 * i)) & 0x1f) as usize;
                out.push(BASE32_ALPHABET[index] as char);
            } else {
                out.push('=');
            }
        }
    }
    out
}

pub fn base32_decode(text: &str) -> Result<Vec<u8>> {
    let trimmed: String = text
        .trim()
        .trim_end_matches('=')
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let mut out = Vec::with_capacity(trimmed.len() * 5 / 8);
    let mut bits = 0u64;
    let mut bit_count = 0u32;
    for c in trimmed.chars() {
        let value = BASE32_ALPHABET
            .iter()
            .position(|&a| a as char == c)
            .ok_or_else(|| {
                ChainError::InvalidInputFormat(format!("invalid base32 character `{c}`"))
            })?;
        bits = (bits << 5) | value as u64;
        bit_count += 5;
        if bit_count >= 8 {
            bit_count -= 8;
            out.push((bits >> bit_count) as u8);
        }
    }
    Ok(out)
}

/// Percent-encode every byte outside the unreserved set.
pub fn url_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len());
    for &b in data {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

pub fn url_decode(text: &str) -> Result<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let digits = bytes.get(i + 1..i + 3).ok_or_else(|| {
                ChainError::InvalidInputFormat("truncated percent escape".into())
            })?;
            let value = u8::from_str_radix(
                std::str::from_utf8(digits).map_err(|_| {
                    ChainError::InvalidInputFormat("invalid percent escape".into())
                })?,
                16,
            )
            .map_err(|_| ChainError::InvalidInputFormat("invalid percent escape".into()))?;
            out.push(value);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}
