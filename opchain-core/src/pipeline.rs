//! Pipeline executor and operation registry
//!
//! Operations form a closed set of tagged variants, each carrying its own
//! typed parameters; dispatch is an exhaustive match. The string-keyed
//! registry exists only at the external boundary, where descriptors are
//! resolved into variants and callers enumerate what is available.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::buffer::{parse_hex, ByteBuffer};
use crate::cipher::aes::Aes;
use crate::cipher::des::{Des, TripleDes};
use crate::cipher::rc4::Rc4;
use crate::cipher::sm4::Sm4;
use crate::cipher::{BlockCipher, RoundMutation};
use crate::encode;
use crate::error::{ChainError, Result};
use crate::hash::md5::{self, Md5Params};
use crate::modes::{BlockModes, CipherMode};
use crate::padding::Padding;
use crate::sbox::{SBoxStore, STANDARD_AES, STANDARD_SM4};

/// One step of a pipeline as supplied by a caller: a registry name, its
/// string parameters, and an enable switch. Order in the containing
/// sequence is significant.
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    pub name: String,
    pub params: BTreeMap<String, String>,
    pub enabled: bool,
}

impl OperationDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            params: BTreeMap::new(),
            enabled: true,
        }
    }

    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Parameters shared by the S-box-bearing block ciphers.
#[derive(Debug, Clone)]
pub struct CipherParams {
    pub key: Vec<u8>,
    pub iv: Vec<u8>,
    pub mode: CipherMode,
    pub padding: Padding,
    pub sbox_name: String,
    pub mutation: RoundMutation,
}

/// Parameters for DES/3DES, which expose no substitution point.
#[derive(Debug, Clone)]
pub struct DesParams {
    pub key: Vec<u8>,
    pub iv: Vec<u8>,
    pub mode: CipherMode,
    pub padding: Padding,
}

#[derive(Debug, Clone)]
pub struct Rc4Params {
    pub key: Vec<u8>,
    pub sbox_name: Option<String>,
}

/// The closed set of pipeline operations.
#[derive(Debug, Clone)]
pub enum Operation {
    HexEncode,
    HexDecode,
    Base64Encode,
    Base64Decode,
    Base32Encode,
    Base32Decode,
    UrlEncode,
    UrlDecode,
    SwapEndianness,
    Md5(Box<Md5Params>),
    Aes(Direction, CipherParams),
    Sm4(Direction, CipherParams),
    Des(Direction, DesParams),
    TripleDes(Direction, DesParams),
    Rc4(Rc4Params),
}

impl Operation {
    /// Apply the operation to raw bytes. Cipher contexts are constructed
    /// fresh here and dropped on return; the S-box store is the only
    /// shared collaborator.
    pub fn apply(&self, data: &[u8], store: &SBoxStore) -> Result<Vec<u8>> {
        match self {
            Operation::HexEncode => Ok(hex::encode(data).into_bytes()),
            Operation::HexDecode => parse_hex(&String::from_utf8_lossy(data)),
            Operation::Base64Encode => Ok(encode::base64_encode(data).into_bytes()),
            Operation::Base64Decode => encode::base64_decode(&String::from_utf8_lossy(data)),
            Operation::Base32Encode => Ok(encode::base32_encode(data).into_bytes()),
            Operation::Base32Decode => encode::base32_decode(&String::from_utf8_lossy(data)),
            Operation::UrlEncode => Ok(encode::url_encode(data).into_bytes()),
            Operation::UrlDecode => encode::url_decode(&String::from_utf8_lossy(data)),
            Operation::SwapEndianness => {
                let mut reversed = data.to_vec();
                reversed.reverse();
                Ok(reversed)
            }
            Operation::Md5(params) => Ok(md5::digest(data, params).to_vec()),
            Operation::Aes(direction, params) => {
                let sbox = store.get(&params.sbox_name)?;
                let cipher = Aes::new(&params.key, sbox, params.mutation)?;
                run_mode(&cipher, *direction, params.mode, data, &params.iv, params.padding)
            }
            Operation::Sm4(direction, params) => {
                let sbox = store.get(&params.sbox_name)?;
                let cipher = Sm4::new(&params.key, sbox, params.mutation)?;
                run_mode(&cipher, *direction, params.mode, data, &params.iv, params.padding)
            }
            Operation::Des(direction, params) => {
                let cipher = Des::new(&params.key)?;
                run_mode(&cipher, *direction, params.mode, data, &params.iv, params.padding)
            }
            Operation::TripleDes(direction, params) => {
                let cipher = TripleDes::new(&params.key)?;
                run_mode(&cipher, *direction, params.mode, data, &params.iv, params.padding)
            }
            Operation::Rc4(params) => {
                let seed = match &params.sbox_name {
                    Some(name) => Some(store.get(name)?),
                    None => None,
                };
                let rc4 = Rc4::new(&params.key, seed.as_deref())?;
                Ok(rc4.process(data))
            }
        }
    }
}

fn run_mode<C: BlockCipher>(
    cipher: &C,
    direction: Direction,
    mode: CipherMode,
    data: &[u8],
    iv: &[u8],
    padding: Padding,
) -> Result<Vec<u8>> {
    match direction {
        Direction::Encrypt => BlockModes::encrypt(cipher, mode, data, iv, padding),
        Direction::Decrypt => BlockModes::decrypt(cipher, mode, data, iv, padding),
    }
}

/// A successful run: the final buffer plus the output of every enabled
/// step, in order.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub buffer: ByteBuffer,
    pub trace: Vec<ByteBuffer>,
}

/// A failed run: which step failed (1-based over the full descriptor
/// list), why, and everything computed before it.
#[derive(Debug, Clone)]
pub struct RunFailure {
    pub step: usize,
    pub error: ChainError,
    pub trace: Vec<ByteBuffer>,
}

/// Execute a pipeline left to right. Disabled steps pass the buffer
/// through untouched and leave no trace entry. The first failure stops
/// execution; nothing is rolled back, since the partial trace is the
/// diagnostic value.
pub fn run(
    initial: ByteBuffer,
    pipeline: &[OperationDescriptor],
    store: &SBoxStore,
) -> std::result::Result<RunOutcome, RunFailure> {
    let mut buffer = initial;
    let mut trace = Vec::new();

    for (position, descriptor) in pipeline.iter().enumerate() {
        if !descriptor.enabled {
            continue;
        }
        let step = position + 1;
        let fail = |error: ChainError, trace: &[ByteBuffer]| RunFailure {
            step,
            error,
            trace: trace.to_vec(),
        };

        let operation = match build(descriptor) {
            Ok(op) => op,
            Err(error) => return Err(fail(error, &trace)),
        };
        let next = match operation.apply(buffer.bytes(), store) {
            Ok(bytes) => ByteBuffer::new(bytes, buffer.format()),
            Err(error) => return Err(fail(error, &trace)),
        };
        trace.push(next.clone());
        buffer = next;
    }

    Ok(RunOutcome { buffer, trace })
}

/// Discovery record for one registry entry.
#[derive(Debug, Clone, Copy)]
pub struct OperationSpec {
    pub name: &'static str,
    pub params: &'static [ParamSpec],
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

const KEY: ParamSpec = ParamSpec {
    name: "key",
    required: true,
    description: "key as a hex string",
};
const IV: ParamSpec = ParamSpec {
    name: "iv",
    required: false,
    description: "IV as a hex string, one block long (unused by ECB)",
};
const MODE: ParamSpec = ParamSpec {
    name: "mode",
    required: false,
    description: "ecb|cbc|cfb|ofb|ctr (default cbc)",
};
const PADDING: ParamSpec = ParamSpec {
    name: "padding",
    required: false,
    description: "pkcs7|none (default pkcs7; ECB/CBC only)",
};
const SBOX: ParamSpec = ParamSpec {
    name: "sbox",
    required: false,
    description: "named S-box from the store (default: the standard table)",
};
const SWAP_KEY: ParamSpec = ParamSpec {
    name: "swap_key_schedule",
    required: false,
    description: "true to mutate the key schedule (default false)",
};
const SWAP_DATA: ParamSpec = ParamSpec {
    name: "swap_data_round",
    required: false,
    description: "true to mutate the data rounds (default false)",
};

const CIPHER_PARAMS: &[ParamSpec] = &[KEY, IV, MODE, PADDING, SBOX, SWAP_KEY, SWAP_DATA];
const DES_PARAMS: &[ParamSpec] = &[KEY, IV, MODE, PADDING];
const MD5_PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "init",
        required: false,
        description: "4 comma-separated hex words overriding the initial state",
    },
    ParamSpec {
        name: "constants",
        required: false,
        description: "64 comma-separated hex words overriding the K table",
    },
    ParamSpec {
        name: "shifts",
        required: false,
        description: "64 comma-separated rotation amounts",
    },
];
const RC4_PARAMS: &[ParamSpec] = &[
    KEY,
    ParamSpec {
        name: "sbox",
        required: false,
        description: "named S-box used as the KSA seed permutation",
    },
];

/// The discovery table: every operation name a descriptor may carry.
pub const REGISTRY: &[OperationSpec] = &[
    OperationSpec { name: "hex_encode", params: &[] },
    OperationSpec { name: "hex_decode", params: &[] },
    OperationSpec { name: "base64_encode", params: &[] },
    OperationSpec { name: "base64_decode", params: &[] },
    OperationSpec { name: "base32_encode", params: &[] },
    OperationSpec { name: "base32_decode", params: &[] },
    OperationSpec { name: "url_encode", params: &[] },
    OperationSpec { name: "url_decode", params: &[] },
    OperationSpec { name: "swap_endianness", params: &[] },
    OperationSpec { name: "md5_hash", params: MD5_PARAMS },
    OperationSpec { name: "aes_encrypt", params: CIPHER_PARAMS },
    OperationSpec { name: "aes_decrypt", params: CIPHER_PARAMS },
    OperationSpec { name: "sm4_encrypt", params: CIPHER_PARAMS },
    OperationSpec { name: "sm4_decrypt", params: CIPHER_PARAMS },
    OperationSpec { name: "des_encrypt", params: DES_PARAMS },
    OperationSpec { name: "des_decrypt", params: DES_PARAMS },
    OperationSpec { name: "triple_des_encrypt", params: DES_PARAMS },
    OperationSpec { name: "triple_des_decrypt", params: DES_PARAMS },
    OperationSpec { name: "rc4_apply", params: RC4_PARAMS },
];

/// Resolve a descriptor into an operation variant. Fails with
/// `UnknownOperation` for names outside the registry and with parameter
/// errors before any data is touched.
pub fn build(descriptor: &OperationDescriptor) -> Result<Operation> {
    let params = &descriptor.params;
    match descriptor.name.as_str() {
        "hex_encode" => Ok(Operation::HexEncode),
        "hex_decode" => Ok(Operation::HexDecode),
        "base64_encode" => Ok(Operation::Base64Encode),
        "base64_decode" => Ok(Operation::Base64Decode),
        "base32_encode" => Ok(Operation::Base32Encode),
        "base32_decode" => Ok(Operation::Base32Decode),
        "url_encode" => Ok(Operation::UrlEncode),
        "url_decode" => Ok(Operation::UrlDecode),
        "swap_endianness" => Ok(Operation::SwapEndianness),
        "md5_hash" => Ok(Operation::Md5(Box::new(md5_params(params)?))),
        "aes_encrypt" => Ok(Operation::Aes(
            Direction::Encrypt,
            cipher_params(params, STANDARD_AES)?,
        )),
        "aes_decrypt" => Ok(Operation::Aes(
            Direction::Decrypt,
            cipher_params(params, STANDARD_AES)?,
        )),
        "sm4_encrypt" => Ok(Operation::Sm4(
            Direction::Encrypt,
            cipher_params(params, STANDARD_SM4)?,
        )),
        "sm4_decrypt" => Ok(Operation::Sm4(
            Direction::Decrypt,
            cipher_params(params, STANDARD_SM4)?,
        )),
        "des_encrypt" => Ok(Operation::Des(Direction::Encrypt, des_params(params)?)),
        "des_decrypt" => Ok(Operation::Des(Direction::Decrypt, des_params(params)?)),
        "triple_des_encrypt" => Ok(Operation::TripleDes(
            Direction::Encrypt,
            des_params(params)?,
        )),
        "triple_des_decrypt" => Ok(Operation::TripleDes(
            Direction::Decrypt,
            des_params(params)?,
        )),
        "rc4_apply" => Ok(Operation::Rc4(Rc4Params {
            key: required_hex(params, "key")?,
            sbox_name: params.get("sbox").cloned(),
        })),
        other => Err(ChainError::UnknownOperation(other.to_string())),
    }
}

fn required_hex(params: &BTreeMap<String, String>, name: &str) -> Result<Vec<u8>> {
    let value = params
        .get(name)
        .ok_or_else(|| ChainError::InvalidInputFormat(format!("missing parameter `{name}`")))?;
    parse_hex(value)
}

fn optional_hex(params: &BTreeMap<String, String>, name: &str) -> Result<Vec<u8>> {
    match params.get(name) {
        Some(value) => parse_hex(value),
        None => Ok(Vec::new()),
    }
}

fn parse_flag(params: &BTreeMap<String, String>, name: &str) -> bool {
    params
        .get(name)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}

fn parse_mode(params: &BTreeMap<String, String>) -> Result<CipherMode> {
    match params.get("mode") {
        Some(value) => CipherMode::from_str(value),
        None => Ok(CipherMode::default()),
    }
}

fn parse_padding(params: &BTreeMap<String, String>) -> Result<Padding> {
    match params.get("padding").map(String::as_str) {
        None | Some("pkcs7") => Ok(Padding::Pkcs7),
        Some("none") | Some("nopadding") => Ok(Padding::None),
        Some(other) => Err(ChainError::InvalidInputFormat(format!(
            "unknown padding `{other}`"
        ))),
    }
}

fn cipher_params(
    params: &BTreeMap<String, String>,
    default_sbox: &str,
) -> Result<CipherParams> {
    Ok(CipherParams {
        key: required_hex(params, "key")?,
        iv: optional_hex(params, "iv")?,
        mode: parse_mode(params)?,
        padding: parse_padding(params)?,
        sbox_name: params
            .get("sbox")
            .cloned()
            .unwrap_or_else(|| default_sbox.to_string()),
        mutation: RoundMutation {
            swap_key_schedule: parse_flag(params, "swap_key_schedule"),
            swap_data_round: parse_flag(params, "swap_data_round"),
        },
    })
}

fn des_params(params: &BTreeMap<String, String>) -> Result<DesParams> {
    Ok(DesParams {
        key: required_hex(params, "key")?,
        iv: optional_hex(params, "iv")?,
        mode: parse_mode(params)?,
        padding: parse_padding(params)?,
    })
}

fn parse_words<const N: usize>(value: &str) -> Result<[u32; N]> {
    let words: Vec<u32> = value
        .split(',')
        .map(|w| {
            let w = w.trim().trim_start_matches("0x");
            u32::from_str_radix(w, 16)
                .map_err(|_| ChainError::InvalidInputFormat(format!("invalid word `{w}`")))
        })
        .collect::<Result<_>>()?;
    words.try_into().map_err(|_| {
        ChainError::InvalidInputFormat(format!("expected {N} comma-separated words"))
    })
}

fn md5_params(params: &BTreeMap<String, String>) -> Result<Md5Params> {
    let mut out = Md5Params::default();
    if let Some(value) = params.get("init") {
        out.init = parse_words::<4>(value)?;
    }
    if let Some(value) = params.get("constants") {
        out.constants = parse_words::<64>(value)?;
    }
    if let Some(value) = params.get("shifts") {
        out.shifts = parse_words::<64>(value)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::FormatTag;

    fn store() -> SBoxStore {
        SBoxStore::with_standards()
    }

    fn utf8(text: &str) -> ByteBuffer {
        ByteBuffer::new(text.as_bytes().to_vec(), FormatTag::Utf8)
    }

    #[test]
    fn test_encode_then_decode_chain() {
        let store = store();
        let forward = [
            OperationDescriptor::new("base64_encode"),
            OperationDescriptor::new("url_encode"),
        ];
        let encoded = run(utf8("Hello World"), &forward, &store).unwrap();

        let backward = [
            OperationDescriptor::new("url_decode"),
            OperationDescriptor::new("base64_decode"),
        ];
        let decoded = run(encoded.buffer, &backward, &store).unwrap();
        assert_eq!(decoded.buffer.bytes(), b"Hello World");
    }

    #[test]
    fn test_disabled_step_skipped() {
        let store = store();
        let pipeline = [
            OperationDescriptor::new("hex_encode"),
            OperationDescriptor::new("base64_encode").disabled(),
            OperationDescriptor::new("hex_decode"),
        ];
        let outcome = run(utf8("abc"), &pipeline, &store).unwrap();
        assert_eq!(outcome.trace.len(), 2);
        assert_eq!(outcome.buffer.bytes(), b"abc");
    }

    #[test]
    fn test_failure_carries_partial_trace() {
        let store = store();
        let pipeline = [
            OperationDescriptor::new("base64_encode"),
            OperationDescriptor::new("hex_decode"), // base64 output is not hex
            OperationDescriptor::new("url_encode"),
        ];
        let failure = run(utf8("zzz?"), &pipeline, &store).unwrap_err();
        assert_eq!(failure.step, 2);
        assert_eq!(failure.trace.len(), 1);
        assert!(matches!(failure.error, ChainError::InvalidInputFormat(_)));
    }

    #[test]
    fn test_unknown_operation_fails_before_running() {
        let store = store();
        let pipeline = [
            OperationDescriptor::new("base64_encode"),
            OperationDescriptor::new("rot13"),
        ];
        let failure = run(utf8("x"), &pipeline, &store).unwrap_err();
        assert_eq!(failure.step, 2);
        assert!(matches!(failure.error, ChainError::UnknownOperation(_)));
    }

    #[test]
    fn test_aes_cbc_through_pipeline() {
        let store = store();
        let key = "000102030405060708090a0b0c0d0e0f";
        let iv = "0f0e0d0c0b0a09080706050403020100";
        let encrypt = [OperationDescriptor::new("aes_encrypt")
            .with_param("key", key)
            .with_param("iv", iv)
            .with_param("mode", "cbc")];
        let ct = run(utf8("the secret flag"), &encrypt, &store).unwrap();

        let decrypt = [OperationDescriptor::new("aes_decrypt")
            .with_param("key", key)
            .with_param("iv", iv)
            .with_param("mode", "cbc")];
        let pt = run(ct.buffer, &decrypt, &store).unwrap();
        assert_eq!(pt.buffer.bytes(), b"the secret flag");
    }

    #[test]
    fn test_mutated_sm4_round_trip_through_pipeline() {
        let store = store();
        let key = "0123456789abcdeffedcba9876543210";
        let encrypt = [OperationDescriptor::new("sm4_encrypt")
            .with_param("key", key)
            .with_param("mode", "ecb")
            .with_param("swap_data_round", "true")];
        let ct = run(utf8("magic swapped!"), &encrypt, &store).unwrap();

        let decrypt = [OperationDescriptor::new("sm4_decrypt")
            .with_param("key", key)
            .with_param("mode", "ecb")
            .with_param("swap_data_round", "true")];
        let pt = run(ct.buffer, &decrypt, &store).unwrap();
        assert_eq!(pt.buffer.bytes(), b"magic swapped!");
    }

    #[test]
    fn test_rc4_with_named_seed() {
        let store = store();
        let mut custom = [0u8; 256];
        for (i, b) in custom.iter_mut().enumerate() {
            *b = (255 - i) as u8;
        }
        store.save("reversed", custom).unwrap();

        let apply = [OperationDescriptor::new("rc4_apply")
            .with_param("key", "deadbeef")
            .with_param("sbox", "reversed")];
        let ct = run(utf8("stream me"), &apply, &store).unwrap();
        let pt = run(ct.buffer, &apply, &store).unwrap();
        assert_eq!(pt.buffer.bytes(), b"stream me");
    }

    #[test]
    fn test_missing_sbox_reported() {
        let store = store();
        let pipeline = [OperationDescriptor::new("aes_encrypt")
            .with_param("key", "00112233445566778899aabbccddeeff")
            .with_param("mode", "ecb")
            .with_param("sbox", "missing")];
        let failure = run(utf8("data"), &pipeline, &store).unwrap_err();
        assert!(matches!(failure.error, ChainError::SBoxNotFound(_)));
    }

    #[test]
    fn test_md5_through_pipeline() {
        let store = store();
        let pipeline = [
            OperationDescriptor::new("md5_hash"),
            OperationDescriptor::new("hex_encode"),
        ];
        let outcome = run(utf8("abc"), &pipeline, &store).unwrap();
        assert_eq!(
            outcome.buffer.bytes(),
            b"900150983cd24fb0d6963f7d28e17f72"
        );
    }

    #[test]
    fn test_registry_covers_every_buildable_name() {
        for spec in REGISTRY {
            let mut descriptor = OperationDescriptor::new(spec.name);
            for param in spec.params {
                if param.required {
                    descriptor = descriptor.with_param(param.name, "00112233445566778899aabbccddeeff");
                }
            }
            assert!(
                build(&descriptor).is_ok(),
                "registry entry `{}` did not build",
                spec.name
            );
        }
    }

    #[test]
    fn test_unsupported_mode_rejected() {
        let descriptor = OperationDescriptor::new("aes_encrypt")
            .with_param("key", "00112233445566778899aabbccddeeff")
            .with_param("mode", "gcm");
        assert!(matches!(
            build(&descriptor).unwrap_err(),
            ChainError::UnsupportedMode(_)
        ));
    }
}
