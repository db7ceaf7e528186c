//! DES and 3DES (EDE) Feistel ciphers
//!
//! The eight S-boxes are the fixed tables from FIPS 46-3; DES does not
//! expose a substitution point for user tables and carries no Magic Swap
//! flags. 3DES composes three independently keyed DES instances.

use crate::cipher::BlockCipher;
use crate::error::{ChainError, Result};

#[rustfmt::skip]
const IP: [u8; 64] = [
    58, 50, 42, 34, 26, 18, 10,  2, 60, 52, 44, 36, 28, 20, 12,  4,
    62, 54, 46, 38, 30, 22, 14,  6, 64, 56, 48, 40, 32, 24, 16,  8,
    57, 49, 41, 33, 25, 17,  9,  1, 59, 51, 43, 35, 27, 19, 11,  3,
    61, 53, 45, 37, 29, 21, 13,  5, 63, 55, 47, 39, 31, 23, 15,  7,
];

#[rustfmt::skip]
const FP: [u8; 64] = [
    40,  8, 48, 16, 56, 24, 64, 32, 39,  7, 47, 15, 55, 23, 63, 31,
    38,  6, 46, 14, 54, 22, 62, 30, 37,  5, 45, 13, 53, 21, 61, 29,
    36,  4, 44, 12, 52, 20, 60, 28, 35,  3, 43, 11, 51, 19, 59, 27,
    34,  2, 42, 10, 50, 18, 58, 26, 33,  1, 41,  9, 49, 17, 57, 25,
];

#[rustfmt::skip]
const EXPANSION: [u8; 48] = [
    32,  1,  2,  3,  4,  5,  4,  5,  6,  7,  8,  9,
     8,  9, 10, 11, 12, 13, 12, 13, 14, 15, 16, 17,
    16, 17, 18, 19, 20, 21, 20, 21, 22, 23, 24, 25,
    24, 25, 26, 27, 28, 29, 28, 29, 30, 31, 32,  1,
];

#[rustfmt::skip]
const PBOX: [u8; 32] = [
    16,  7, 20, 21, 29, 12, 28, 17,  1, 15, 23, 26,  5, 18, 31, 10,
     2,  8, 24, 14, 32, 27,  3,  9, 19, 13, 30,  6, 22, 11,  4, 25,
];

#[rustfmt::skip]
const PC1: [u8; 56] = [
    57, 49, 41, 33, 25, 17,  9,  1, 58, 50, 42, 34, 26, 18,
    10,  2, 59, 51, 43, 35, 27, 19, 11,  3, 60, 52, 44, 36,
    63, 55, 47, 39, 31, 23, 15,  7, 62, 54, 46, 38, 30, 22,
    14,  6, 61, 53, 45, 37, 29, 21, 13,  5, 28, 20, 12,  4,
];

#[rustfmt::skip]
const PC2: [u8; 48] = [
    14, 17, 11, 24,  1,  5,  3, 28, 15,  6, 21, 10,
    23, 19, 12,  4, 26,  8, 16,  7, 27, 20, 13,  2,
    41, 52, 31, 37, 47, 55, 30, 40, 51, 45, 33, 48,
    44, 49, 39, 56, 34, 53, 46, 42, 50, 36, 29, 32,
];

const SHIFTS: [u32; 16] = [1, 1, 2, 2, 2, 2, 2, 2, 1, 2, 2, 2, 2, 2, 2, 1];

#[rustfmt::skip]
const SBOXES: [[u8; 64]; 8] = [
    [
        14,  4, 13,  1,  2, 15, 11,  8,  3, 10,  6, 12,  5,  9,  0,  7,
         0, 15,  7,  4, 14,  2, 13,  1, 10,  6, 12, 11,  9,  5,  3,  8,
         4,  1, 14,  8, 13,  6,  2, 11, 15, 12,  9,  7,  3, 10,  5,  0,
        15, 12,  8,  2,  4,  9,  1,  7,  5, 11,  3, 14, 10,  0,  6, 13,
    ],
    [
        15,  1,  8, 14,  6, 11,  3,  4,  9,  7,  2, 13, 12,  0,  5, 10,
         3, 13,  4,  7, 15,  2,  8, 14, 12,  0,  1, 10,  6,  9, 11,  5,
         0, 14,  7, 11, 10,  4, 13,  1,  5,  8, 12,  6,  9,  3,  2, 15,
        13,  8, 10,  1,  3, 15,  4,  2, 11,  6,  7, 12,  0,  5, 14,  9,
    ],
    [
        10,  0,  9, 14,  6,  3, 15,  5,  1, 13, 12,  7, 11,  4,  2,  8,
        13,  7,  0,  9,  3,  4,  6, 10,  2,  8,  5, 14, 12, 11, 15,  1,
        13,  6,  4,  9,  8, 15,  3,  0, 11,  1,  2, 12,  5, 10, 14,  7,
         1, 10, 13,  0,  6,  9,  8,  7,  4, 15, 14,  3, 11,  5,  2, 12,
    ],
    [
         7, 13, 14,  3,  0,  6,  9, 10,  1,  2,  8,  5, 11, 12,  4, 15,
        13,  8, 11,  5,  6, 15,  0,  3,  4,  7,  2, 12,  1, 10, 14,  9,
        10,  6,  9,  0, 12, 11,  7, 13, 15,  1,  3, 14,  5,  2,  8,  4,
         3, 15,  0,  6, 10,  1, 13,  8,  9,  4,  5, 11, 12,  7,  2, 14,
    ],
    [
         2, 12,  4,  1,  7, 10, 11,  6,  8,  5,  3, 15, 13,  0, 14,  9,
        14, 11,  2, 12,  4,  7, 13,  1,  5,  0, 15, 10,  3,  9,  8,  6,
         4,  2,  1, 11, 10, 13,  7,  8, 15,  9, 12,  5,  6,  3,  0, 14,
        11,  8, 12,  7,  1, 14,  2, 13,  6, 15,  0,  9, 10,  4,  5,  3,
    ],
    [
        12,  1, 10, 15,  9,  2,  6,  8,  0, 13,  3,  4, 14,  7,  5, 11,
        10, 15,  4,  2,  7, 12,  9,  5,  6,  1, 13, 14,  0, 11,  3,  8,
         9, 14, 15,  5,  2,  8, 12,  3,  7,  0,  4, 10,  1, 13, 11,  6,
         4,  3,  2, 12,  9,  5, 15, 10, 11, 14,  1,  7,  6,  0,  8, 13,
    ],
    [
         4, 11,  2, 14, 15,  0,  8, 13,  3, 12,  9,  7,  5, 10,  6,  1,
        13,  0, 11,  7,  4,  9,  1, 10, 14,  3,  5, 12,  2, 15,  8,  6,
         1,  4, 11, 13, 12,  3,  7, 14, 10, 15,  6,  8,  0,  5,  9,  2,
         6, 11, 13,  8,  1,  4, 10,  7,  9,  5,  0, 15, 14,  2,  3, 12,
    ],
    [
        13,  2,  8,  4,  6, 15, 11,  1, 10,  9,  3, 14,  5,  0, 12,  7,
         1, 15, 13,  8, 10,  3,  7,  4, 12,  5,  6, 11,  0, 14,  9,  2,
         7, 11,  4,  1,  9, 12, 14,  2,  0,  6, 10, 13, 15,  3,  5,  8,
         2,  1, 14,  7,  4, 10,  8, 13, 15, 12,  9,  0,  3,  5,  6, 11,
    ],
];

/// Bit permutation with 1-based, MSB-first table entries.
fn permute(input: u64, in_bits: u32, table: &[u8]) -> u64 {
    let mut out = 0u64;
    for &pos in table {
        out <<= 1;
        out |= (input >> (in_bits - pos as u32)) & 1;
    }
    out
}

fn feistel(right: u32, subkey: u64) -> u32 {
    let expanded = permute(right as u64, 32, &EXPANSION) ^ subkey;
    let mut out = 0u32;
    for (i, sbox) in SBOXES.iter().enumerate() {
        let six = ((expanded >> (42 - 6 * i)) & 0x3f) as u8;
        let row = ((six & 0x20) >> 4) | (six & 0x01);
        let col = (six >> 1) & 0x0f;
        out = (out << 4) | sbox[(row * 16 + col) as usize] as u32;
    }
    permute(out as u64, 32, &PBOX) as u32
}

/// Derive the sixteen 48-bit subkeys via PC1, the shift schedule, and PC2.
fn subkeys(key: &[u8; 8]) -> [u64; 16] {
    let key = u64::from_be_bytes(*key);
    let permuted = permute(key, 64, &PC1);
    let mut c = ((permuted >> 28) & 0x0fff_ffff) as u32;
    let mut d = (permuted & 0x0fff_ffff) as u32;

    let mut keys = [0u64; 16];
    for (i, &shift) in SHIFTS.iter().enumerate() {
        c = ((c << shift) | (c >> (28 - shift))) & 0x0fff_ffff;
        d = ((d << shift) | (d >> (28 - shift))) & 0x0fff_ffff;
        let cd = ((c as u64) << 28) | d as u64;
        keys[i] = permute(cd, 56, &PC2);
    }
    keys
}

#[derive(Debug)]
pub struct Des {
    subkeys: [u64; 16],
}

impl Des {
    pub fn new(key: &[u8]) -> Result<Self> {
        let key: [u8; 8] = key.try_into().map_err(|_| ChainError::KeySizeMismatch {
            got: key.len(),
            expected: "8",
        })?;
        Ok(Self {
            subkeys: subkeys(&key),
        })
    }

    /// The sixteen Feistel rounds between IP and FP; direction is just the
    /// subkey order.
    fn crypt<I>(&self, block: &[u8], keys: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = u64>,
    {
        if block.len() != 8 {
            return Err(ChainError::BlockAlignmentError(block.len()));
        }
        let input = u64::from_be_bytes(block.try_into().expect("length checked"));
        let permuted = permute(input, 64, &IP);
        let mut left = (permuted >> 32) as u32;
        let mut right = permuted as u32;

        for key in keys {
            let next = left ^ feistel(right, key);
            left = right;
            right = next;
        }

        // the halves are swapped before the final permutation
        let preoutput = ((right as u64) << 32) | left as u64;
        Ok(permute(preoutput, 64, &FP).to_be_bytes().to_vec())
    }
}

impl BlockCipher for Des {
    fn encrypt_block(&self, block: &[u8]) -> Result<Vec<u8>> {
        self.crypt(block, self.subkeys)
    }

    fn decrypt_block(&self, block: &[u8]) -> Result<Vec<u8>> {
        self.crypt(block, self.subkeys.iter().rev().copied())
    }

    fn block_size(&self) -> usize {
        8
    }
}

/// 3DES in encrypt-decrypt-encrypt composition over a 24-byte key.
#[derive(Debug)]
pub struct TripleDes {
    first: Des,
    second: Des,
    third: Des,
}

impl TripleDes {
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() != 24 {
            return Err(ChainError::KeySizeMismatch {
                got: key.len(),
                expected: "24",
            });
        }
        Ok(Self {
            first: Des::new(&key[0..8])?,
            second: Des::new(&key[8..16])?,
            third: Des::new(&key[16..24])?,
        })
    }
}

impl BlockCipher for TripleDes {
    fn encrypt_block(&self, block: &[u8]) -> Result<Vec<u8>> {
        let step = self.first.encrypt_block(block)?;
        let step = self.second.decrypt_block(&step)?;
        self.third.encrypt_block(&step)
    }

    fn decrypt_block(&self, block: &[u8]) -> Result<Vec<u8>> {
        let step = self.third.decrypt_block(block)?;
        let step = self.second.encrypt_block(&step)?;
        self.first.decrypt_block(&step)
    }

    fn block_size(&self) -> usize {
        8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_vector() {
        // the worked example from the FIPS 46 walkthroughs
        let key = hex::decode("133457799bbcdff1").unwrap();
        let plaintext = hex::decode("0123456789abcdef").unwrap();
        let des = Des::new(&key).unwrap();
        let ct = des.encrypt_block(&plaintext).unwrap();
        assert_eq!(hex::encode(&ct), "85e813540f0ab405");
        assert_eq!(des.decrypt_block(&ct).unwrap(), plaintext);
    }

    #[test]
    fn test_weak_key_vector() {
        let key = hex::decode("0e329232ea6d0d73").unwrap();
        let plaintext = hex::decode("8787878787878787").unwrap();
        let des = Des::new(&key).unwrap();
        let ct = des.encrypt_block(&plaintext).unwrap();
        assert_eq!(hex::encode(&ct), "0000000000000000");
    }

    #[test]
    fn test_key_size_rejected() {
        assert!(matches!(
            Des::new(&[0u8; 7]).unwrap_err(),
            ChainError::KeySizeMismatch { .. }
        ));
        assert!(matches!(
            TripleDes::new(&[0u8; 16]).unwrap_err(),
            ChainError::KeySizeMismatch { .. }
        ));
    }

    #[test]
    fn test_triple_des_degenerate_key() {
        // with K1 == K2 == K3, EDE collapses to single DES
        let key8 = hex::decode("133457799bbcdff1").unwrap();
        let mut key24 = key8.clone();
        key24.extend_from_slice(&key8);
        key24.extend_from_slice(&key8);

        let des = Des::new(&key8).unwrap();
        let tdes = TripleDes::new(&key24).unwrap();
        let plaintext = b"CTFdata!";
        assert_eq!(
            tdes.encrypt_block(plaintext).unwrap(),
            des.encrypt_block(plaintext).unwrap()
        );
    }

    #[test]
    fn test_triple_des_round_trip() {
        let key: Vec<u8> = (0..24).collect();
        let tdes = TripleDes::new(&key).unwrap();
        let plaintext = b"8bytemsg";
        let ct = tdes.encrypt_block(plaintext).unwrap();
        assert_eq!(tdes.decrypt_block(&ct).unwrap(), plaintext);
    }

    #[test]
    fn test_wrong_block_length() {
        let des = Des::new(&[1u8; 8]).unwrap();
        assert!(matches!(
            des.encrypt_block(&[0u8; 7]).unwrap_err(),
            ChainError::BlockAlignmentError(7)
        ));
    }
}
