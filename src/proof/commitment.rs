//! Action Commitment Protocol
//!
//! Commit to a tick's actions before anyone reveals theirs:
//!
//! ```text
//! commit = hex(SHA-256(canonical(actions) ++ nonce))
//! ```
//!
//! The nonce is supplied by the caller so the same function serves the
//! committing bot and any peer verifying the reveal.

use rand::{rngs::OsRng, RngCore};
use serde::Serialize;

use crate::core::canonical::canonical_json;
use crate::core::hash::{hash_parts, is_digest_hex};

/// Random bytes per nonce (hex encoded to twice as many characters).
pub const NONCE_BYTES: usize = 8;

/// Errors that can occur while building a commitment.
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    /// The action list could not be turned into a JSON value.
    #[error("actions are not serializable: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors that can occur during reveal verification.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The stored commitment is not a hex SHA-256 digest.
    #[error("malformed commitment: {0:?}")]
    MalformedCommit(String),

    /// The revealed data hashes to a different digest.
    #[error("commitment mismatch: expected {expected}, computed {computed}")]
    Mismatch {
        /// Digest published at commit time.
        expected: String,
        /// Digest recomputed from the reveal.
        computed: String,
    },

    /// The revealed actions could not be canonicalized.
    #[error(transparent)]
    Commit(#[from] CommitError),
}

/// Canonical text of an action list.
pub fn canonical_actions<T: Serialize + ?Sized>(actions: &T) -> Result<String, CommitError> {
    Ok(canonical_json(actions)?)
}

/// Commitment digest over pre-canonicalized actions.
pub fn commit_canonical(canonical: &str, nonce: &str) -> String {
    hex::encode(hash_parts(&[canonical.as_bytes(), nonce.as_bytes()]))
}

/// Commitment digest for an action list and nonce, as lowercase hex.
pub fn commit_hash<T: Serialize + ?Sized>(actions: &T, nonce: &str) -> Result<String, CommitError> {
    let canonical = canonical_actions(actions)?;
    Ok(commit_canonical(&canonical, nonce))
}

/// Fresh nonce from the operating system CSPRNG.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Check a reveal against the digest published at commit time.
///
/// The published digest is compared case-insensitively.
pub fn verify_reveal<T: Serialize + ?Sized>(
    commit: &str,
    actions: &T,
    nonce: &str,
) -> Result<(), VerifyError> {
    if !is_digest_hex(commit) {
        return Err(VerifyError::MalformedCommit(commit.to_string()));
    }

    let computed = commit_hash(actions, nonce)?;
    if computed.eq_ignore_ascii_case(commit) {
        Ok(())
    } else {
        Err(VerifyError::Mismatch { expected: commit.to_ascii_lowercase(), computed })
    }
}
