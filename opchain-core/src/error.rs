//! Error types shared by every engine in the crate

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("Invalid input format: {0}")]
    InvalidInputFormat(String),

    #[error("Key size mismatch: got {got} bytes, expected {expected}")]
    KeySizeMismatch { got: usize, expected: &'static str },

    #[error("IV size mismatch: got {got} bytes, expected {expected}")]
    IvSizeMismatch { got: usize, expected: usize },

    #[error("Padding error")]
    PaddingError,

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("S-box not found: {0}")]
    SBoxNotFound(String),

    #[error("Invalid S-box (table is not a bijection of 0..=255)")]
    InvalidSBox,

    #[error("Unsupported mode: {0}")]
    UnsupportedMode(String),

    #[error("Input length {0} is not a multiple of the block size")]
    BlockAlignmentError(usize),
}

pub type Result<T> = std::result::Result<T, ChainError>;
