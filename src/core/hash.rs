//! Digest Helpers
//!
//! SHA-256 hashing for commitments. Digests travel on the wire as
//! lowercase hex, so helpers exist for both raw and hex forms.

use sha2::{Digest as _, Sha256};

/// Hash output type (256 bits / 32 bytes)
pub type Digest = [u8; 32];

/// Length of a hex-encoded digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Compute a simple hash of arbitrary data.
pub fn hash_bytes(data: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash several parts as one contiguous payload.
///
/// No separator is inserted; `hash_parts(&[a, b]) == hash_bytes(a ++ b)`.
pub fn hash_parts(parts: &[&[u8]]) -> Digest {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Lowercase hex SHA-256 of a UTF-8 string.
pub fn sha256_hex(text: &str) -> String {
    hex::encode(hash_bytes(text.as_bytes()))
}

/// Check that a string looks like a hex-encoded digest.
pub fn is_digest_hex(text: &str) -> bool {
    text.len() == DIGEST_HEX_LEN && text.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            sha256_hex("[]"),
            "4f53cda18c2baa0c0354bb5f9a3ecbe5ed12ab4d8e11ba873c2f11161202b945"
        );
    }

    #[test]
    fn test_parts_equal_concatenation() {
        let joined = hash_bytes(b"[1,2]abc123");
        let parts = hash_parts(&[b"[1,2]".as_slice(), b"abc123".as_slice()]);
        assert_eq!(joined, parts);
    }

    #[test]
    fn test_hash_order_matters() {
        let ab = hash_parts(&[b"a".as_slice(), b"b".as_slice()]);
        let ba = hash_parts(&[b"b".as_slice(), b"a".as_slice()]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_is_digest_hex() {
        assert!(is_digest_hex(&sha256_hex("x")));
        assert!(is_digest_hex(&"AB".repeat(32)));
        assert!(!is_digest_hex("abc"));
        assert!(!is_digest_hex(&"zz".repeat(32)));
    }
}
