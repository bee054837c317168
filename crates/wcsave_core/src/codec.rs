//! Stateless conversions between on-disk byte spans and typed values.
//!
//! Integers are little-endian two's complement. Character names are stored
//! in Big5, the traditional-Chinese double-byte encoding; names are decoded
//! for display only and never encoded back.

use encoding_rs::BIG5;
use log::warn;

use crate::error::{Result, SaveError};

/// Shown when a name field holds nothing but NULs.
pub const UNKNOWN_NAME: &str = "未知";

pub fn decode_i32_le(bytes: [u8; 4]) -> i32 {
    i32::from_le_bytes(bytes)
}

pub fn decode_i16_le(bytes: [u8; 2]) -> i16 {
    i16::from_le_bytes(bytes)
}

pub fn encode_i32_le(value: i32) -> [u8; 4] {
    value.to_le_bytes()
}

pub fn encode_i16_le(value: i16) -> [u8; 2] {
    value.to_le_bytes()
}

/// Strict Big5 decode; fails on malformed or truncated sequences.
pub fn try_decode_legacy_text(bytes: &[u8]) -> Result<String> {
    BIG5.decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.trim_matches('\0').to_string())
        .ok_or_else(|| SaveError::Decode {
            bytes: bytes.to_vec(),
        })
}

/// Decodes a name field for display. Never fails: bytes that are not valid
/// Big5 are shown one code point per byte, which keeps every raw byte visible.
/// NUL padding is trimmed from both ends.
pub fn decode_legacy_text(bytes: &[u8]) -> String {
    let text = match try_decode_legacy_text(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("{e}; showing raw bytes");
            raw_text(bytes)
        }
    };

    if text.is_empty() {
        UNKNOWN_NAME.to_string()
    } else {
        text
    }
}

fn raw_text(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| char::from(b))
        .collect::<String>()
        .trim_matches('\0')
        .to_string()
}
