//! Core deterministic primitives.
//!
//! Everything here must produce identical output on every platform and in
//! every language implementation of the protocol.

pub mod canonical;
pub mod hash;
pub mod rng;

// Re-export core types
pub use canonical::{canonical_json, canonicalize};
pub use hash::{sha256_hex, Digest, DIGEST_HEX_LEN};
pub use rng::DeterministicRng;
