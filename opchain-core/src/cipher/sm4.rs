//! SM4 (GB/T 32907-2016) with a substitutable S-box and Magic Swap
//!
//! Magic Swap semantics: the τ substitution writes its four S-box outputs
//! in reversed byte order. `swap_key_schedule` applies that variant inside
//! the key expansion, `swap_data_round` inside the data rounds. Decryption
//! is the same round walk over the reversed round-key sequence, so round
//! trips hold for any fixed flag combination.

use std::sync::Arc;

use crate::cipher::{BlockCipher, RoundMutation};
use crate::error::{ChainError, Result};
use crate::sbox::SBoxTable;

const FK: [u32; 4] = [0xa3b1bac6, 0x56aa3350, 0x677d9197, 0xb27022dc];

const CK: [u32; 32] = [
    0x00070e15, 0x1c232a31, 0x383f464d, 0x545b6269,
    0x70777e85, 0x8c939aa1, 0xa8afb6bd, 0xc4cbd2d9,
    0xe0e7eef5, 0xfc030a11, 0x181f262d, 0x343b4249,
    0x50575e65, 0x6c737a81, 0x888f969d, 0xa4abb2b9,
    0xc0c7ced5, 0xdce3eaf1, 0xf8ff060d, 0x141b2229,
    0x30373e45, 0x4c535a61, 0x686f767d, 0x848b9299,
    0xa0a7aeb5, 0xbcc3cad1, 0xd8dfe6ed, 0xf4fb0209,
    0x10171e25, 0x2c333a41, 0x484f565d, 0x646b7279,
];

#[derive(Debug)]
pub struct Sm4 {
    round_keys: [u32; 32],
    sbox: Arc<SBoxTable>,
    swap_data_round: bool,
}

impl Sm4 {
    /// Expand a 16-byte key under the given S-box and mutation flags.
    pub fn new(key: &[u8], sbox: Arc<SBoxTable>, mutation: RoundMutation) -> Result<Self> {
        if key.len() != 16 {
            return Err(ChainError::KeySizeMismatch {
                got: key.len(),
                expected: "16",
            });
        }

        let mk = [
            u32::from_be_bytes(key[0..4].try_into().expect("length checked")),
            u32::from_be_bytes(key[4..8].try_into().expect("length checked")),
            u32::from_be_bytes(key[8..12].try_into().expect("length checked")),
            u32::from_be_bytes(key[12..16].try_into().expect("length checked")),
        ];

        let mut k = [0u32; 36];
        for i in 0..4 {
            k[i] = mk[i] ^ FK[i];
        }

        let mut round_keys = [0u32; 32];
        for i in 0..32 {
            let mut rk = k[i + 1] ^ k[i + 2] ^ k[i + 3] ^ CK[i];
            rk = tau(&sbox, rk, mutation.swap_key_schedule);
            rk = l_key(rk);
            k[i + 4] = k[i] ^ rk;
            round_keys[i] = k[i + 4];
        }

        Ok(Self {
            round_keys,
            sbox,
            swap_data_round: mutation.swap_data_round,
        })
    }

    /// The 32-round walk shared by both directions; only the round-key
    /// order differs.
    fn crypt<I>(&self, block: &[u8], keys: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = u32>,
    {
        if block.len() != 16 {
            return Err(ChainError::BlockAlignmentError(block.len()));
        }

        let mut x = [
            u32::from_be_bytes(block[0..4].try_into().expect("length checked")),
            u32::from_be_bytes(block[4..8].try_into().expect("length checked")),
            u32::from_be_bytes(block[8..12].try_into().expect("length checked")),
            u32::from_be_bytes(block[12..16].try_into().expect("length checked")),
        ];

        for rk in keys {
            let mut temp = x[1] ^ x[2] ^ x[3] ^ rk;
            temp = tau(&self.sbox, temp, self.swap_data_round);
            temp = l_data(temp);
            let new = x[0] ^ temp;
            x = [x[1], x[2], x[3], new];
        }

        let mut out = Vec::with_capacity(16);
        for word in [x[3], x[2], x[1], x[0]] {
            out.extend_from_slice(&word.to_be_bytes());
        }
        Ok(out)
    }
}

impl BlockCipher for Sm4 {
    fn encrypt_block(&self, block: &[u8]) -> Result<Vec<u8>> {
        self.crypt(block, self.round_keys)
    }

    fn decrypt_block(&self, block: &[u8]) -> Result<Vec<u8>> {
        self.crypt(block, self.round_keys.iter().rev().copied())
    }

    fn block_size(&self) -> usize {
        16
    }
}

/// Nonlinear substitution. With `swapped` the four outputs land in
/// reversed byte order.
fn tau(sbox: &SBoxTable, a: u32, swapped: bool) -> u32 {
    let b0 = sbox.sub((a >> 24) as u8) as u32;
    let b1 = sbox.sub((a >> 16) as u8) as u32;
    let b2 = sbox.sub((a >> 8) as u8) as u32;
    let b3 = sbox.sub(a as u8) as u32;
    if swapped {
        (b3 << 24) | (b2 << 16) | (b1 << 8) | b0
    } else {
        (b0 << 24) | (b1 << 16) | (b2 << 8) | b3
    }
}

fn l_key(b: u32) -> u32 {
    b ^ b.rotate_left(13) ^ b.rotate_left(23)
}

fn l_data(b: u32) -> u32 {
    b ^ b.rotate_left(2) ^ b.rotate_left(10) ^ b.rotate_left(18) ^ b.rotate_left(24)
}
