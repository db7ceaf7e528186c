//! Block cipher engines with substitutable internals

pub mod aes;
pub mod des;
pub mod rc4;
pub mod sm4;

use crate::error::Result;

/// Trait for a block cipher context holding its own expanded key schedule.
pub trait BlockCipher {
    /// Encrypts a single block
    fn encrypt_block(&self, block: &[u8]) -> Result<Vec<u8>>;

    /// Decrypts a single block
    fn decrypt_block(&self, block: &[u8]) -> Result<Vec<u8>>;

    /// Returns the block size of the cipher
    fn block_size(&self) -> usize;
}

/// Per-context round-structure mutation knobs ("Magic Swap").
///
/// `swap_key_schedule` mutates the key expansion, `swap_data_round` mutates
/// the intra-round step order. With both flags held fixed across encrypt
/// and decrypt, round trips are preserved. The exact effect is
/// algorithm-specific and documented on each cipher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundMutation {
    pub swap_key_schedule: bool,
    pub swap_data_round: bool,
}
