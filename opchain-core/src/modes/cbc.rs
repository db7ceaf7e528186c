//! CBC (Cipher Block Chaining) mode implementation

use crate::cipher::BlockCipher;
use crate::error::Result;
use crate::padding::{self, Padding};

use super::BlockModes;

impl BlockModes {
    /// CBC mode encryption
    pub fn cbc_encrypt<C: BlockCipher>(
        cipher: &C,
        plaintext: &[u8],
        iv: &[u8],
        padding: Padding,
    ) -> Result<Vec<u8>> {
        let block_size = cipher.block_size();
        Self::validate_iv(iv, block_size)?;

        let padded = padding::pad(plaintext, block_size, padding);
        Self::validate_alignment(padded.len(), block_size)?;

        let mut ciphertext = Vec::with_capacity(padded.len());
        let mut previous = iv.to_vec();
        for chunk in padded.chunks(block_size) {
            let xored = Self::xor_blocks(chunk, &previous);
            let encrypted = cipher.encrypt_block(&xored)?;
            ciphertext.extend_from_slice(&encrypted);
            previous = encrypted;
        }
        Ok(ciphertext)
    }

    /// CBC mode decryption
    pub fn cbc_decrypt<C: BlockCipher>(
        cipher: &C,
        ciphertext: &[u8],
        iv: &[u8],
        padding: Padding,
    ) -> Result<Vec<u8>> {
        let block_size = cipher.block_size();
        Self::validate_iv(iv, block_size)?;
        Self::validate_alignment(ciphertext.len(), block_size)?;

        let mut plaintext = Vec::with_capacity(ciphertext.len());
        let mut previous = iv.to_vec();
        for chunk in ciphertext.chunks(block_size) {
            let decrypted = cipher.decrypt_block(chunk)?;
            plaintext.extend(Self::xor_blocks(&decrypted, &previous));
            previous = chunk.to_vec();
        }
        padding::unpad(&plaintext, block_size, padding)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::test_cipher;
    use super::*;
    use crate::error::ChainError;

    #[test]
    fn test_cbc_round_trip() {
        let cipher = test_cipher();
        let iv = [0xa5u8; 16];
        let plaintext = b"chaining hides repeated plaintext blocks";
        let ct = BlockModes::cbc_encrypt(&cipher, plaintext, &iv, Padding::Pkcs7).unwrap();
        let pt = BlockModes::cbc_decrypt(&cipher, &ct, &iv, Padding::Pkcs7).unwrap();
        assert_eq!(pt, plaintext);
    }

    #[test]
    fn test_cbc_identical_blocks_differ() {
        let cipher = test_cipher();
        let iv = [1u8; 16];
        let ct = BlockModes::cbc_encrypt(&cipher, &[7u8; 32], &iv, Padding::None).unwrap();
        assert_ne!(ct[..16], ct[16..32]);
    }

    #[test]
    fn test_cbc_iv_length_checked() {
        let cipher = test_cipher();
        let err =
            BlockModes::cbc_encrypt(&cipher, b"data", &[0u8; 8], Padding::Pkcs7).unwrap_err();
        assert_eq!(
            err,
            ChainError::IvSizeMismatch {
                got: 8,
                expected: 16
            }
        );
    }

    #[test]
    fn test_cbc_wrong_iv_garbles_first_block_only() {
        let cipher = test_cipher();
        let iv = [2u8; 16];
        let plaintext = [0x11u8; 32];
        let ct = BlockModes::cbc_encrypt(&cipher, &plaintext, &iv, Padding::None).unwrap();
        let wrong_iv = [3u8; 16];
        let pt = BlockModes::cbc_decrypt(&cipher, &ct, &wrong_iv, Padding::None).unwrap();
        assert_ne!(pt[..16], plaintext[..16]);
        assert_eq!(pt[16..], plaintext[16..]);
    }
}
