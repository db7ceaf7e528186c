//! CTR (Counter) mode implementation

use crate::cipher::BlockCipher;
use crate::error::Result;

use super::BlockModes;

impl BlockModes {
    /// CTR mode encryption. The IV is read as one big-endian counter over
    /// the full block width and incremented once per block; a counter
    /// value is never consumed twice within a call.
    pub fn ctr_encrypt<C: BlockCipher>(cipher: &C, plaintext: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
        Self::stream_xor(cipher, plaintext, iv, |feedback, _, _, _| {
            let mut counter = feedback.to_vec();
            increment_be(&mut counter);
            counter
        })
    }

    /// CTR mode decryption is identical to encryption.
    pub fn ctr_decrypt<C: BlockCipher>(cipher: &C, ciphertext: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
        Self::ctr_encrypt(cipher, ciphertext, iv)
    }
}

/// Big-endian increment with wraparound across the whole width.
fn increment_be(counter: &mut [u8]) {
    for byte in counter.iter_mut().rev() {
        let (next, overflow) = byte.overflowing_add(1);
        *byte = next;
        if !overflow {
            break;
        }
    }
}
