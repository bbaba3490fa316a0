//! In-process SRI conversion for SHA-256 digests
//!
//! Accepts the two digest spellings the sync flows produce: 64-character hex
//! (checksum listings) and 52-character Nix base32 (`nix-prefetch-url`).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::ToolError;
use crate::tools::HashConverter;

const SHA256_LEN: usize = 32;
const SHA256_HEX_LEN: usize = SHA256_LEN * 2;
const SHA256_NIX32_LEN: usize = (SHA256_LEN * 8 - 1) / 5 + 1;

/// Nix's base32 alphabet (no `e`, `o`, `t`, `u`)
const NIX32_ALPHABET: &[u8; 32] = b"0123456789abcdfghijklmnpqrsvwxyz";

/// Converts SHA-256 digests to `sha256-<base64>` without spawning `nix`
#[derive(Debug, Default, Clone, Copy)]
pub struct SriHashConverter;

impl SriHashConverter {
    pub fn convert(digest: &str) -> Result<String, ToolError> {
        let trimmed = digest.trim();
        let bytes = match trimmed.len() {
            SHA256_HEX_LEN => hex::decode(trimmed).ok(),
            SHA256_NIX32_LEN => decode_nix32(trimmed, SHA256_LEN),
            _ => None,
        }
        .ok_or_else(|| ToolError::InvalidDigest(digest.to_string()))?;

        Ok(format!("sha256-{}", STANDARD.encode(bytes)))
    }
}

/// Decodes Nix base32 into `size` bytes.
///
/// Nix reads the string from its last character, five bits at a time, least
/// significant bits first. Returns `None` on a foreign character or when set
/// bits would overflow the last byte.
fn decode_nix32(s: &str, size: usize) -> Option<Vec<u8>> {
    let mut bytes = vec![0u8; size];

    for (n, c) in s.bytes().rev().enumerate() {
        let digit = NIX32_ALPHABET.iter().position(|&a| a == c)? as u16;
        let bit = n * 5;
        let (i, j) = (bit / 8, bit % 8);

        *bytes.get_mut(i)? |= (digit << j) as u8;
        let carry = digit >> (8 - j);
        if i + 1 < size {
            bytes[i + 1] |= carry as u8;
        } else if carry != 0 {
            return None;
        }
    }

    Some(bytes)
}

#[async_trait::async_trait]
impl HashConverter for SriHashConverter {
    async fn to_sri(&self, digest: &str) -> Result<String, ToolError> {
        Self::convert(digest)
    }
}
