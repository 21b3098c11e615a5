use serde::Serialize;
use sha2::{Digest, Sha256};
use snow_core::errors::SnowError;

use crate::serde::to_canonical_json_bytes;

/// Hex SHA-256 digest of raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Computes a stable SHA-256 hash of a value's canonical JSON form.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, SnowError> {
    let bytes = to_canonical_json_bytes(value)?;
    Ok(sha256_hex(&bytes))
}
