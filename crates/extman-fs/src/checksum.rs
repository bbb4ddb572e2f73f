//! SHA-256 digest utilities
//!
//! Extension identifiers are plain lowercase hex digests so they can be
//! surfaced to telemetry without revealing the value they were derived from.

use sha2::{Digest, Sha256};

/// Compute the lowercase hex SHA-256 digest of string content.
pub fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(sha256_hex("test"), sha256_hex("test"));
    }

    #[test]
    fn different_content_different_digest() {
        assert_ne!(sha256_hex("aaa"), sha256_hex("bbb"));
    }

    #[test]
    fn digest_known_value() {
        assert_eq!(
            sha256_hex("hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }
}
