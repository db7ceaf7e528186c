//! ECB (Electronic Code Book) mode implementation

use crate::cipher::BlockCipher;
use crate::error::Result;
use crate::padding::{self, Padding};

use super::BlockModes;

impl BlockModes {
    /// ECB mode encryption
    pub fn ecb_encrypt<C: BlockCipher>(
        cipher: &C,
        plaintext: &[u8],
        padding: Padding,
    ) -> Result<Vec<u8>> {
        let block_size = cipher.block_size();
        let padded = padding::pad(plaintext, block_size, padding);
        Self::validate_alignment(padded.len(), block_size)?;

        let mut ciphertext = Vec::with_capacity(padded.len());
        for chunk in padded.chunks(block_size) {
            ciphertext.extend(cipher.encrypt_block(chunk)?);
        }
        Ok(ciphertext)
    }

    /// ECB mode decryption
    pub fn ecb_decrypt<C: BlockCipher>(
        cipher: &C,
        ciphertext: &[u8],
        padding: Padding,
    ) -> Result<Vec<u8>> {
        let block_size = cipher.block_size();
        Self::validate_alignment(ciphertext.len(), block_size)?;

        let mut plaintext = Vec::with_capacity(ciphertext.len());
        for chunk in ciphertext.chunks(block_size) {
            plaintext.extend(cipher.decrypt_block(chunk)?);
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
    fn test_ecb_round_trip() {
        let cipher = test_cipher();
        let plaintext = b"ECB leaks patterns but round-trips fine";
        let ct = BlockModes::ecb_encrypt(&cipher, plaintext, Padding::Pkcs7).unwrap();
        assert_eq!(ct.len() % 16, 0);
        let pt = BlockModes::ecb_decrypt(&cipher, &ct, Padding::Pkcs7).unwrap();
        assert_eq!(pt, plaintext);
    }

    #[test]
    fn test_ecb_identical_blocks_repeat() {
        let cipher = test_cipher();
        let plaintext = [7u8; 32];
        let ct = BlockModes::ecb_encrypt(&cipher, &plaintext, Padding::None).unwrap();
        assert_eq!(ct[..16], ct[16..32]);
    }

    #[test]
    fn test_ecb_unaligned_without_padding() {
        let cipher = test_cipher();
        let err = BlockModes::ecb_encrypt(&cipher, &[0u8; 17], Padding::None).unwrap_err();
        assert!(matches!(err, ChainError::BlockAlignmentError(17)));
    }

    #[test]
    fn test_ecb_invalid_padding_detected() {
        // all-zero plaintext can never carry a valid PKCS#7 pad
        let cipher = test_cipher();
        let ct = BlockModes::ecb_encrypt(&cipher, &[0u8; 16], Padding::None).unwrap();
        assert_eq!(
            BlockModes::ecb_decrypt(&cipher, &ct, Padding::Pkcs7).unwrap_err(),
            ChainError::PaddingError
        );
    }
}
