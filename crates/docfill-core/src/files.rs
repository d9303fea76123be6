//! Transport helpers for document payloads

use crate::error::{DocfillError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};

/// Decode standard padded base64, ignoring surrounding whitespace
pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(text.trim())
        .map_err(|e| DocfillError::Validation(format!("invalid base64: {}", e)))
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Lowercase hex SHA-256 digest
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

pub fn size_bytes(bytes: &[u8]) -> u64 {
    bytes.len() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64_trims_whitespace() {
        assert_eq!(decode_base64("  aG9sYQ==\n").unwrap(), b"hola");
    }

    #[test]
    fn test_decode_base64_rejects_garbage() {
        let err = decode_base64("no es base64!").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("invalid base64"));
    }

    #[test]
    fn test_decode_base64_rejects_missing_padding() {
        assert!(decode_base64("aG9sYQ").is_err());
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(sha256_hex(b"abc").len(), 64);
    }

    #[test]
    fn test_size_bytes() {
        assert_eq!(size_bytes(b"hola"), 4);
        assert_eq!(encode_base64(b"hola"), "aG9sYQ==");
    }
}
