//! Parameterized Merkle–Damgård hash engines

pub mod md5;
