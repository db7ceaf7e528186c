//! PKCS#7 padding for the block modes

use crate::error::{ChainError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Padding {
    #[default]
    Pkcs7,
    None,
}

/// Apply padding. PKCS#7 always appends 1..=block_size bytes.
pub fn pad(data: &[u8], block_size: usize, padding: Padding) -> Vec<u8> {
    match padding {
        Padding::None => data.to_vec(),
        Padding::Pkcs7 => {
            let pad_len = block_size - (data.len() % block_size);
            let mut padded = data.to_vec();
            padded.extend(std::iter::repeat(pad_len as u8).take(pad_len));
            padded
        }
    }
}

/// Strip and validate padding. Every PKCS#7 pad byte must equal the pad
/// length; anything else is a `PaddingError`, never silent truncation.
pub fn unpad(data: &[u8], block_size: usize, padding: Padding) -> Result<Vec<u8>> {
    match padding {
        Padding::None => Ok(data.to_vec()),
        Padding::Pkcs7 => {
            let &pad_len = data.last().ok_or(ChainError::PaddingError)?;
            let pad_len = pad_len as usize;
            if pad_len == 0 || pad_len > block_size || pad_len > data.len() {
                return Err(ChainError::PaddingError);
            }
            let (body, tail) = data.split_at(data.len() - pad_len);
            if tail.iter().any(|&b| b as usize != pad_len) {
                return Err(ChainError::PaddingError);
            }
            Ok(body.to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pkcs7_round_trip() {
        for len in 0..33 {
            let data: Vec<u8> = (0..len as u8).collect();
            let padded = pad(&data, 16, Padding::Pkcs7);
            assert_eq!(padded.len() % 16, 0);
            assert_eq!(unpad(&padded, 16, Padding::Pkcs7).unwrap(), data);
        }
    }

    #[test]
    fn test_full_block_appended_on_aligned_input() {
        let padded = pad(&[0u8; 16], 16, Padding::Pkcs7);
        assert_eq!(padded.len(), 32);
        assert_eq!(padded[31], 16);
    }

    #[test]
    fn test_invalid_pad_rejected() {
        // pad length larger than block
        assert_eq!(
            unpad(&[1, 2, 3, 17], 16, Padding::Pkcs7).unwrap_err(),
            ChainError::PaddingError
        );
        // inconsistent pad bytes
        assert_eq!(
            unpad(&[1, 2, 2, 3], 4, Padding::Pkcs7).unwrap_err(),
            ChainError::PaddingError
        );
        // zero pad length
        assert_eq!(
            unpad(&[1, 2, 3, 0], 4, Padding::Pkcs7).unwrap_err(),
            ChainError::PaddingError
        );
    }
}
