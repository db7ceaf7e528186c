//! MD5 as a parameterized Merkle–Damgård compression loop
//!
//! The initial state vector, the 64 additive constants and the 64 rotation
//! amounts are all override points; with everything left at the defaults
//! the digest is bit-for-bit RFC 1321 MD5. Overrides let a non-standard
//! variant found in a binary be reproduced without touching the loop.

/// Default initial state (A, B, C, D).
pub const MD5_INIT: [u32; 4] = [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476];

/// K[i] = floor(2^32 * abs(sin(i + 1)))
pub const MD5_K: [u32; 64] = [
    0xd76aa478, 0xe8c7b756, 0x242070db, 0xc1bdceee,
    0xf57c0faf, 0x4787c62a, 0xa8304613, 0xfd469501,
    0x698098d8, 0x8b44f7af, 0xffff5bb1, 0x895cd7be,
    0x6b901122, 0xfd987193, 0xa679438e, 0x49b40821,
    0xf61e2562, 0xc040b340, 0x265e5a51, 0xe9b6c7aa,
    0xd62f105d, 0x02441453, 0xd8a1e681, 0xe7d3fbc8,
    0x21e1cde6, 0xc33707d6, 0xf4d50d87, 0x455a14ed,
    0xa9e3e905, 0xfcefa3f8, 0x676f02d9, 0x8d2a4c8a,
    0xfffa3942, 0x8771f681, 0x6d9d6122, 0xfde5380c,
    0xa4beea44, 0x4bdecfa9, 0xf6bb4b60, 0xbebfbc70,
    0x289b7ec6, 0xeaa127fa, 0xd4ef3085, 0x04881d05,
    0xd9d4d039, 0xe6db99e5, 0x1fa27cf8, 0xc4ac5665,
    0xf4292244, 0x432aff97, 0xab9423a7, 0xfc93a039,
    0x655b59c3, 0x8f0ccc92, 0xffeff47d, 0x85845dd1,
    0x6fa87e4f, 0xfe2ce6e0, 0xa3014314, 0x4e0811a1,
    0xf7537e82, 0xbd3af235, 0x2ad7d2bb, 0xeb86d391,
];

/// Per-round left-rotation amounts, grouped by quartile.
pub const MD5_SHIFTS: [u32; 64] = [
    7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22,
    5, 9, 14, 20, 5, 9, 14, 20, 5, 9, 14, 20, 5, 9, 14, 20,
    4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23,
    6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21,
];

/// Override points of the compression loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Md5Params {
    pub init: [u32; 4],
    pub constants: [u32; 64],
    pub shifts: [u32; 64],
}

impl Default for Md5Params {
    fn default() -> Self {
        Self {
            init: MD5_INIT,
            constants: MD5_K,
            shifts: MD5_SHIFTS,
        }
    }
}

/// Digest `message` under `params`. Stateless; one shot per call.
pub fn digest(message: &[u8], params: &Md5Params) -> [u8; 16] {
    let mut padded = message.to_vec();
    let bit_len = (message.len() as u64).wrapping_mul(8);

    // length-suffix padding: 0x80, zeros to 56 mod 64, length in bits LE
    padded.push(0x80);
    while padded.len() % 64 != 56 {
        padded.push(0);
    }
    padded.extend_from_slice(&bit_len.to_le_bytes());

    let mut state = params.init;
    for block in padded.chunks_exact(64) {
        compress(&mut state, block, params);
    }

    let mut out = [0u8; 16];
    for (i, word) in state.iter().enumerate() {
        out[4 * i..4 * i + 4].copy_from_slice(&word.to_le_bytes());
    }
    out
}

fn compress(state: &mut [u32; 4], block: &[u8], params: &Md5Params) {
    let mut m = [0u32; 16];
    for (i, chunk) in block.chunks_exact(4).enumerate() {
        m[i] = u32::from_le_bytes(chunk.try_into().expect("chunk is 4 bytes"));
    }

    let [mut a, mut b, mut c, mut d] = *state;

    for i in 0..64 {
        // nonlinear mixing function and message-word permutation are
        // selected by round quartile
        let (f, g) = match i / 16 {
            0 => ((b & c) | (!b & d), i),
            1 => ((d & b) | (!d & c), (5 * i + 1) % 16),
            2 => (b ^ c ^ d, (3 * i + 5) % 16),
            _ => (c ^ (b | !d), (7 * i) % 16),
        };

        let temp = d;
        d = c;
        c = b;
        b = b.wrapping_add(
            a.wrapping_add(f)
                .wrapping_add(params.constants[i])
                .wrapping_add(m[g])
                .rotate_left(params.shifts[i]),
        );
        a = temp;
    }

    state[0] = state[0].wrapping_add(a);
    state[1] = state[1].wrapping_add(b);
    state[2] = state[2].wrapping_add(c);
    state[3] = state[3].wrapping_add(d);
}
