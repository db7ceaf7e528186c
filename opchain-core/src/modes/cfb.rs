//! CFB (Cipher Feedback) mode implementation

use crate::cipher::BlockCipher;
use crate::error::Result;

use super::BlockModes;

impl BlockModes {
    /// CFB mode encryption: the previous ciphertext block feeds the next
    /// keystream block.
    pub fn cfb_encrypt<C: BlockCipher>(cipher: &C, plaintext: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
        Self::stream_xor(cipher, plaintext, iv, |_, _, _, output| output.to_vec())
    }

    /// CFB mode decryption: feedback comes from the received ciphertext,
    /// so only the forward block transform is ever used.
    pub fn cfb_decrypt<C: BlockCipher>(cipher: &C, ciphertext: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
        Self::stream_xor(cipher, ciphertext, iv, |_, _, input, _| input.to_vec())
    }
}
