//! # Operation Chain Engine
//!
//! This library implements a CyberChef-style pipeline of operations over a
//! typed byte buffer, with cipher and hash internals rebuilt from first
//! principles so that their substitution tables and round structure can be
//! mutated for CTF analysis.
//!
//! ## Components
//!
//! - **Pipeline** - ordered operation descriptors resolved through a
//!   registry and executed with a per-step trace
//! - **Ciphers** - AES, SM4, DES, 3DES and RC4 with user-substitutable
//!   S-boxes and "magic swap" round mutations where the cipher supports them
//! - **Modes** - ECB, CBC, CFB, OFB and CTR, generic over any block cipher
//! - **MD5** - parameterized digest with overridable init, constants and
//!   shift tables
//! - **Encodings** - hex, base64, base32, URL escaping, endianness swap
//!
//! ## Usage
//!
//! ```rust
//! use opchain_core::buffer::{ByteBuffer, FormatTag};
//! use opchain_core::pipeline::{self, OperationDescriptor};
//! use opchain_core::sbox::SBoxStore;
//!
//! let store = SBoxStore::with_standards();
//! let input = ByteBuffer::parse("Hello World", FormatTag::Utf8)?;
//! let steps = [
//!     OperationDescriptor::new("base64_encode"),
//!     OperationDescriptor::new("url_encode"),
//! ];
//! let outcome = pipeline::run(input, &steps, &store).expect("pipeline runs");
//! assert_eq!(outcome.buffer.render(), "SGVsbG8gV29ybGQ%3D");
//! # Ok::<(), opchain_core::ChainError>(())
//! ```

pub mod buffer;
pub mod cipher;
pub mod encode;
pub mod error;
pub mod hash;
pub mod modes;
pub mod padding;
pub mod pipeline;
pub mod sbox;

pub use buffer::{ByteBuffer, Endianness, FormatTag};
pub use cipher::{BlockCipher, RoundMutation};
pub use error::{ChainError, Result};
pub use modes::{BlockModes, CipherMode};
pub use padding::Padding;
pub use pipeline::{build, run, Operation, OperationDescriptor, RunFailure, RunOutcome, REGISTRY};
pub use sbox::{SBoxStore, SBoxTable};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
