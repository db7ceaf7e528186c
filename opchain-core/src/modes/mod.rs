//! Modes of operation, generic over any [`BlockCipher`] context
//!
//! ECB and CBC carry PKCS#7 padding; CFB, OFB and CTR use the cipher as a
//! keystream generator and leave the length alone. CBC, CFB and OFB
//! require an IV of exactly one block; CTR reads its IV as a big-endian
//! counter that increments once per block.

pub mod cbc;
pub mod cfb;
pub mod ctr;
pub mod ecb;
pub mod ofb;

use crate::cipher::BlockCipher;
use crate::error::{ChainError, Result};

use crate::padding::Padding;

/// Mode selector used at the operation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CipherMode {
    Ecb,
    #[default]
    Cbc,
    Cfb,
    Ofb,
    Ctr,
}

impl std::str::FromStr for CipherMode {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ecb" => Ok(Self::Ecb),
            "cbc" => Ok(Self::Cbc),
            "cfb" => Ok(Self::Cfb),
            "ofb" => Ok(Self::Ofb),
            "ctr" => Ok(Self::Ctr),
            other => Err(ChainError::UnsupportedMode(other.to_string())),
        }
    }
}

impl CipherMode {
    pub fn needs_iv(self) -> bool {
        !matches!(self, Self::Ecb)
    }

    /// Padding applies to the block modes only; the keystream modes keep
    /// the input length.
    pub fn uses_padding(self) -> bool {
        matches!(self, Self::Ecb | Self::Cbc)
    }
}

/// Main struct for the mode implementations; each mode lives in its own
/// file as an impl block.
pub struct BlockModes;

impl BlockModes {
    /// Encrypt under any mode. `iv` is ignored by ECB, `padding` by the
    /// keystream modes.
    pub fn encrypt<C: BlockCipher>(
        cipher: &C,
        mode: CipherMode,
        plaintext: &[u8],
        iv: &[u8],
        padding: Padding,
    ) -> Result<Vec<u8>> {
        match mode {
            CipherMode::Ecb => Self::ecb_encrypt(cipher, plaintext, padding),
            CipherMode::Cbc => Self::cbc_encrypt(cipher, plaintext, iv, padding),
            CipherMode::Cfb => Self::cfb_encrypt(cipher, plaintext, iv),
            CipherMode::Ofb => Self::ofb_encrypt(cipher, plaintext, iv),
            CipherMode::Ctr => Self::ctr_encrypt(cipher, plaintext, iv),
        }
    }

    /// Decrypt under any mode.
    pub fn decrypt<C: BlockCipher>(
        cipher: &C,
        mode: CipherMode,
        ciphertext: &[u8],
        iv: &[u8],
        padding: Padding,
    ) -> Result<Vec<u8>> {
        match mode {
            CipherMode::Ecb => Self::ecb_decrypt(cipher, ciphertext, padding),
            CipherMode::Cbc => Self::cbc_decrypt(cipher, ciphertext, iv, padding),
            CipherMode::Cfb => Self::cfb_decrypt(cipher, ciphertext, iv),
            CipherMode::Ofb => Self::ofb_decrypt(cipher, ciphertext, iv),
            CipherMode::Ctr => Self::ctr_decrypt(cipher, ciphertext, iv),
        }
    }
}

impl BlockModes {
    pub(crate) fn validate_iv(iv: &[u8], block_size: usize) -> Result<()> {
        if iv.len() != block_size {
            return Err(ChainError::IvSizeMismatch {
                got: iv.len(),
                expected: block_size,
            });
        }
        Ok(())
    }

    pub(crate) fn validate_alignment(len: usize, block_size: usize) -> Result<()> {
        if len % block_size != 0 {
            return Err(ChainError::BlockAlignmentError(len));
        }
        Ok(())
    }

    pub(crate) fn xor_blocks(a: &[u8], b: &[u8]) -> Vec<u8> {
        a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect()
    }

    /// Keystream XOR shared by CFB, OFB and CTR: each input block is XORed
    /// with the encryption of a feedback value; `next` picks the feedback
    /// for the following block from (previous feedback, keystream, input
    /// chunk, output chunk).
    pub(crate) fn stream_xor<C, F>(
        cipher: &C,
        data: &[u8],
        iv: &[u8],
        mut next: F,
    ) -> Result<Vec<u8>>
    where
        C: BlockCipher,
        F: FnMut(&[u8], &[u8], &[u8], &[u8]) -> Vec<u8>,
    {
        let block_size = cipher.block_size();
        Self::validate_iv(iv, block_size)?;

        let mut out = Vec::with_capacity(data.len());
        let mut feedback = iv.to_vec();
        for chunk in data.chunks(block_size) {
            let keystream = cipher.encrypt_block(&feedback)?;
            let xored = Self::xor_blocks(chunk, &keystream[..chunk.len()]);
            out.extend_from_slice(&xored);
            feedback = next(&feedback, &keystream, chunk, &xored);
        }
        Ok(out)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::cipher::aes::Aes;
    use crate::cipher::RoundMutation;
    use crate::sbox::{SBoxTable, AES_SBOX};
    use std::sync::Arc;

    pub fn test_cipher() -> Aes {
        let sbox = Arc::new(SBoxTable::new(AES_SBOX).unwrap());
        Aes::new(&[0x2bu8; 16], sbox, RoundMutation::default()).unwrap()
    }
}
