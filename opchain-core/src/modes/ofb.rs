//! OFB (Output Feedback) mode implementation

use crate::cipher::BlockCipher;
use crate::error::Result;

use super::BlockModes;

impl BlockModes {
    /// OFB mode encryption: the keystream block itself is fed back, so the
    /// keystream is independent of the data.
    pub fn ofb_encrypt<C: BlockCipher>(cipher: &C, plaintext: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
        Self::stream_xor(cipher, plaintext, iv, |_, keystream, _, _| {
            keystream.to_vec()
        })
    }

    /// OFB mode decryption is identical to encryption.
    pub fn ofb_decrypt<C: BlockCipher>(cipher: &C, ciphertext: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
        Self::ofb_encrypt(cipher, ciphertext, iv)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::test_cipher;
    use super::*;

    #[test]
    fn test_ofb_round_trip() {
        let cipher = test_cipher();
        let iv = [4u8; 16];
        let plaintext = b"output feedback is symmetric";
        let ct = BlockModes::ofb_encrypt(&cipher, plaintext, &iv).unwrap();
        let pt = BlockModes::ofb_decrypt(&cipher, &ct, &iv).unwrap();
        assert_eq!(pt, plaintext);
    }

    #[test]
    fn test_ofb_keystream_independent_of_data() {
        let cipher = test_cipher();
        let iv = [6u8; 16];
        let a = BlockModes::ofb_encrypt(&cipher, &[0u8; 32], &iv).unwrap();
        let b = BlockModes::ofb_encrypt(&cipher, &[0xffu8; 32], &iv).unwrap();
        // XOR of the two ciphertexts equals XOR of the two plaintexts
        let x = BlockModes::xor_blocks(&a, &b);
        assert!(x.iter().all(|&v| v == 0xff));
    }
}
