//! RC4 stream cipher with a substitutable KSA seed permutation
//!
//! The customization point is the initial 256-byte permutation the key
//! schedule starts from; the standard cipher seeds with the identity. A
//! context is consumed by one call so the keystream can never be reused.

use crate::error::{ChainError, Result};
use crate::sbox::SBoxTable;

#[derive(Debug)]
pub struct Rc4 {
    state: [u8; 256],
}

impl Rc4 {
    /// Key-scheduling algorithm over the given seed permutation (identity
    /// when `seed` is `None`). Keys are 1 to 256 bytes.
    pub fn new(key: &[u8], seed: Option<&SBoxTable>) -> Result<Self> {
        if key.is_empty() || key.len() > 256 {
            return Err(ChainError::KeySizeMismatch {
                got: key.len(),
                expected: "1 to 256",
            });
        }

        let mut state = match seed {
            Some(table) => *table.forward(),
            None => {
                let mut s = [0u8; 256];
                for (i, b) in s.iter_mut().enumerate() {
                    *b = i as u8;
                }
                s
            }
        };

        let mut j = 0u8;
        for i in 0..256 {
            j = j
                .wrapping_add(state[i])
                .wrapping_add(key[i % key.len()]);
            state.swap(i, j as usize);
        }

        Ok(Self { state })
    }

    /// XOR `data` with the keystream. Encryption and decryption are the
    /// same operation; the context is consumed.
    pub fn process(mut self, data: &[u8]) -> Vec<u8> {
        let mut i = 0u8;
        let mut j = 0u8;
        data.iter()
            .map(|&byte| {
                i = i.wrapping_add(1);
                j = j.wrapping_add(self.state[i as usize]);
                self.state.swap(i as usize, j as usize);
                let k = self.state[(self.state[i as usize]
                    .wrapping_add(self.state[j as usize]))
                    as usize];
                byte ^ k
            })
            .collect()
    }
}
