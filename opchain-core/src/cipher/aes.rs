//! AES with a substitutable S-box and Magic Swap round mutations
//!
//! The round walk is declarative: each context builds its encrypt and
//! decrypt step sequences once from the mutation flags, and the block
//! routines just execute them. Magic Swap semantics:
//!
//! - `swap_key_schedule`: in the key expansion, the rotated and substituted
//!   word is reversed before the round-constant XOR.
//! - `swap_data_round`: after every SubBytes the state columns are mirrored
//!   vertically (rows 0↔3 and 1↔2). The mirror is an involution and
//!   commutes with byte substitution, so the decrypt sequence applies it
//!   directly after InvSubBytes.

use std::sync::Arc;

use crate::cipher::{BlockCipher, RoundMutation};
use crate::error::{ChainError, Result};
use crate::sbox::SBoxTable;

const RCON: [u8; 11] = [
    0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1b, 0x36,
];

/// One sub-step of an AES round. Encrypt and decrypt walk prebuilt
/// sequences of these instead of branching on flags per block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    SubBytes,
    InvSubBytes,
    MagicSwap,
    ShiftRows,
    InvShiftRows,
    MixColumns,
    InvMixColumns,
    AddRoundKey,
}

/// AES state as a 4x4 matrix, filled column-wise per FIPS-197.
#[derive(Clone, Copy)]
struct State {
    data: [[u8; 4]; 4],
}

impl State {
    fn new(bytes: &[u8]) -> Self {
        let mut data = [[0u8; 4]; 4];
        for col in 0..4 {
            for row in 0..4 {
                data[row][col] = bytes[col * 4 + row];
            }
        }
        State { data }
    }

    fn to_bytes(self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        for col in 0..4 {
            for row in 0..4 {
                bytes[col * 4 + row] = self.data[row][col];
            }
        }
        bytes
    }
}

/// Galois field multiplication in GF(2^8) over x^8 + x^4 + x^3 + x + 1.
fn gf_mult(a: u8, b: u8) -> u8 {
    let mut result = 0;
    let mut a = a;
    let mut b = b;

    for _ in 0..8 {
        if b & 1 != 0 {
            result ^= a;
        }
        let high_bit = a & 0x80;
        a <<= 1;
        if high_bit != 0 {
            a ^= 0x1b;
        }
        b >>= 1;
    }
    result
}

#[derive(Debug)]
pub struct Aes {
    round_keys: Vec<[u8; 16]>,
    rounds: usize,
    sbox: Arc<SBoxTable>,
    enc_round: Vec<Step>,
    dec_round: Vec<Step>,
}

impl Aes {
    /// Expand `key` (16, 24 or 32 bytes) under the given S-box and
    /// mutation flags.
    pub fn new(key: &[u8], sbox: Arc<SBoxTable>, mutation: RoundMutation) -> Result<Self> {
        let rounds = match key.len() {
            16 => 10,
            24 => 12,
            32 => 14,
            got => {
                return Err(ChainError::KeySizeMismatch {
                    got,
                    expected: "16, 24 or 32",
                })
            }
        };

        let round_keys = expand_key(key, rounds, &sbox, mutation.swap_key_schedule);

        // Sub, (Swap), Shift, Mix, AddKey — and the exact inverse walked
        // in the FIPS-197 InvCipher order, with the swap placed after
        // InvSubBytes (the two commute).
        let mut enc_round = vec![Step::SubBytes];
        let mut dec_round = vec![Step::InvShiftRows, Step::InvSubBytes];
        if mutation.swap_data_round {
            enc_round.push(Step::MagicSwap);
            dec_round.push(Step::MagicSwap);
        }
        enc_round.extend([Step::ShiftRows, Step::MixColumns, Step::AddRoundKey]);
        dec_round.extend([Step::AddRoundKey, Step::InvMixColumns]);

        Ok(Self {
            round_keys,
            rounds,
            sbox,
            enc_round,
            dec_round,
        })
    }

    fn apply(&self, state: &mut State, step: Step, round_key: &[u8; 16]) {
        match step {
            Step::SubBytes => {
                for row in &mut state.data {
                    for b in row {
                        *b = self.sbox.sub(*b);
                    }
                }
            }
            Step::InvSubBytes => {
                for row in &mut state.data {
                    for b in row {
                        *b = self.sbox.inv_sub(*b);
                    }
                }
            }
            Step::MagicSwap => {
                // vertical mirror of every column: rows 0<->3 and 1<->2
                state.data.swap(0, 3);
                state.data.swap(1, 2);
            }
            Step::ShiftRows => {
                for row in 1..4 {
                    let temp = state.data[row];
                    for col in 0..4 {
                        state.data[row][col] = temp[(col + row) % 4];
                    }
                }
            }
            Step::InvShiftRows => {
                for row in 1..4 {
                    let temp = state.data[row];
                    for col in 0..4 {
                        state.data[row][col] = temp[(col + 4 - row) % 4];
                    }
                }
            }
            Step::MixColumns => mix_columns(state),
            Step::InvMixColumns => inv_mix_columns(state),
            Step::AddRoundKey => add_round_key(state, round_key),
        }
    }

    fn walk(&self, state: &mut State, steps: &[Step], round_key: &[u8; 16], skip: Option<Step>) {
        for &step in steps {
            if Some(step) == skip {
                continue;
            }
            self.apply(state, step, round_key);
        }
    }
}

impl BlockCipher for Aes {
    fn encrypt_block(&self, block: &[u8]) -> Result<Vec<u8>> {
        if block.len() != 16 {
            return Err(ChainError::BlockAlignmentError(block.len()));
        }
        let mut state = State::new(block);

        add_round_key(&mut state, &self.round_keys[0]);
        for round in 1..self.rounds {
            self.walk(&mut state, &self.enc_round, &self.round_keys[round], None);
        }
        // final round has no MixColumns
        self.walk(
            &mut state,
            &self.enc_round,
            &self.round_keys[self.rounds],
            Some(Step::MixColumns),
        );

        Ok(state.to_bytes().to_vec())
    }

    fn decrypt_block(&self, block: &[u8]) -> Result<Vec<u8>> {
        if block.len() != 16 {
            return Err(ChainError::BlockAlignmentError(block.len()));
        }
        let mut state = State::new(block);

        add_round_key(&mut state, &self.round_keys[self.rounds]);
        for round in (1..self.rounds).rev() {
            self.walk(&mut state, &self.dec_round, &self.round_keys[round], None);
        }
        // final: inverse steps without InvMixColumns, keyed with round key 0
        self.walk(
            &mut state,
            &self.dec_round,
            &self.round_keys[0],
            Some(Step::InvMixColumns),
        );

        Ok(state.to_bytes().to_vec())
    }

    fn block_size(&self) -> usize {
        16
    }
}

fn add_round_key(state: &mut State, round_key: &[u8; 16]) {
    let key_block = State::new(round_key);
    for row in 0..4 {
        for col in 0..4 {
            state.data[row][col] ^= key_block.data[row][col];
        }
    }
}

/// MixColumns matrix multiplication in GF(2^8).
fn mix_columns(state: &mut State) {
    for col in 0..4 {
        let temp = [
            state.data[0][col],
            state.data[1][col],
            state.data[2][col],
            state.data[3][col],
        ];

        state.data[0][col] = gf_mult(2, temp[0]) ^ gf_mult(3, temp[1]) ^ temp[2] ^ temp[3];
        state.data[1][col] = temp[0] ^ gf_mult(2, temp[1]) ^ gf_mult(3, temp[2]) ^ temp[3];
        state.data[2][col] = temp[0] ^ temp[1] ^ gf_mult(2, temp[2]) ^ gf_mult(3, temp[3]);
        state.data[3][col] = gf_mult(3, temp[0]) ^ temp[1] ^ temp[2] ^ gf_mult(2, temp[3]);
    }
}

fn inv_mix_columns(state: &mut State) {
    for col in 0..4 {
        let temp = [
            state.data[0][col],
            state.data[1][col],
            state.data[2][col],
            state.data[3][col],
        ];

        state.data[0][col] = gf_mult(0x0e, temp[0])
            ^ gf_mult(0x0b, temp[1])
            ^ gf_mult(0x0d, temp[2])
            ^ gf_mult(0x09, temp[3]);
        state.data[1][col] = gf_mult(0x09, temp[0])
            ^ gf_mult(0x0e, temp[1])
            ^ gf_mult(0x0b, temp[2])
            ^ gf_mult(0x0d, temp[3]);
        state.data[2][col] = gf_mult(0x0d, temp[0])
            ^ gf_mult(0x09, temp[1])
            ^ gf_mult(0x0e, temp[2])
            ^ gf_mult(0x0b, temp[3]);
        state.data[3][col] = gf_mult(0x0b, temp[0])
            ^ gf_mult(0x0d, temp[1])
            ^ gf_mult(0x09, temp[2])
            ^ gf_mult(0x0e, temp[3]);
    }
}

/// Key expansion per FIPS-197, substitution drawn from the context S-box.
fn expand_key(key: &[u8], rounds: usize, sbox: &SBoxTable, swap_key_schedule: bool) -> Vec<[u8; 16]> {
    let nk = key.len() / 4;
    let total_words = 4 * (rounds + 1);

    let mut words: Vec<[u8; 4]> = Vec::with_capacity(total_words);
    for i in 0..nk {
        words.push([key[4 * i], key[4 * i + 1], key[4 * i + 2], key[4 * i + 3]]);
    }

    for i in nk..total_words {
        let mut temp = words[i - 1];
        if i % nk == 0 {
            temp.rotate_left(1);
            for b in &mut temp {
                *b = sbox.sub(*b);
            }
            if swap_key_schedule {
                temp.reverse();
            }
            temp[0] ^= RCON[i / nk];
        } else if nk > 6 && i % nk == 4 {
            for b in &mut temp {
                *b = sbox.sub(*b);
            }
        }
        let prev = words[i - nk];
        words.push([
            prev[0] ^ temp[0],
            prev[1] ^ temp[1],
            prev[2] ^ temp[2],
            prev[3] ^ temp[3],
        ]);
    }

    words
        .chunks(4)
        .map(|quad| {
            let mut rk = [0u8; 16];
            for (w, word) in quad.iter().enumerate() {
                rk[4 * w..4 * w + 4].copy_from_slice(word);
            }
            rk
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbox::{SBoxTable, AES_SBOX};

    fn standard_sbox() -> Arc<SBoxTable> {
        Arc::new(SBoxTable::new(AES_SBOX).unwrap())
    }

    #[test]
    fn test_fips197_vector() {
        // FIPS-197 appendix B
        let key = hex::decode("2b7e151628aed2a6abf7158809cf4f3c").unwrap();
        let plaintext = hex::decode("3243f6a8885a308d313198a2e0370734").unwrap();
        let aes = Aes::new(&key, standard_sbox(), RoundMutation::default()).unwrap();
        let ct = aes.encrypt_block(&plaintext).unwrap();
        assert_eq!(hex::encode(&ct), "3925841d02dc09fbdc118597196a0b32");
        assert_eq!(aes.decrypt_block(&ct).unwrap(), plaintext);
    }

    #[test]
    fn test_aes256_vector() {
        // FIPS-197 appendix C.3
        let key =
            hex::decode("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f")
                .unwrap();
        let plaintext = hex::decode("00112233445566778899aabbccddeeff").unwrap();
        let aes = Aes::new(&key, standard_sbox(), RoundMutation::default()).unwrap();
        let ct = aes.encrypt_block(&plaintext).unwrap();
        assert_eq!(hex::encode(&ct), "8ea2b7ca516745bfeafc49904b496089");
    }

    #[test]
    fn test_key_size_rejected() {
        let err = Aes::new(&[0u8; 10], standard_sbox(), RoundMutation::default()).unwrap_err();
        assert!(matches!(err, ChainError::KeySizeMismatch { .. }));
    }

    #[test]
    fn test_round_trip_all_key_sizes() {
        for key_len in [16usize, 24, 32] {
            let key: Vec<u8> = (0..key_len as u8).collect();
            let aes = Aes::new(&key, standard_sbox(), RoundMutation::default()).unwrap();
            let plaintext = b"opchain test blk";
            let ct = aes.encrypt_block(plaintext).unwrap();
            assert_eq!(aes.decrypt_block(&ct).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_round_trip_with_mutations() {
        let key = [7u8; 16];
        let plaintext = b"sixteen byte msg";
        for (swap_key, swap_data) in [(true, false), (false, true), (true, true)] {
            let mutation = RoundMutation {
                swap_key_schedule: swap_key,
                swap_data_round: swap_data,
            };
            let aes = Aes::new(&key, standard_sbox(), mutation).unwrap();
            let ct = aes.encrypt_block(plaintext).unwrap();
            assert_eq!(aes.decrypt_block(&ct).unwrap(), plaintext);

            // a mutated variant must not match the standard cipher
            let standard = Aes::new(&key, standard_sbox(), RoundMutation::default()).unwrap();
            assert_ne!(ct, standard.encrypt_block(plaintext).unwrap());
        }
    }

    #[test]
    fn test_round_trip_custom_sbox() {
        let mut table = [0u8; 256];
        for (i, b) in table.iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(167).wrapping_add(13);
        }
        let sbox = Arc::new(SBoxTable::new(table).unwrap());
        let aes = Aes::new(&[3u8; 16], sbox, RoundMutation::default()).unwrap();
        let plaintext = b"custom sbox test";
        let ct = aes.encrypt_block(plaintext).unwrap();
        assert_eq!(aes.decrypt_block(&ct).unwrap(), plaintext);
    }

    #[test]
    fn test_wrong_block_length() {
        let aes = Aes::new(&[0u8; 16], standard_sbox(), RoundMutation::default()).unwrap();
        assert!(matches!(
            aes.encrypt_block(&[0u8; 15]).unwrap_err(),
            ChainError::BlockAlignmentError(15)
        ));
    }
}
