//! Commit-Reveal Proof Layer
//!
//! Binds a bot to its actions before any opponent reveals:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PROOF LAYER                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  commitment.rs   - Digest over canonical actions + nonce    │
//! │  pending.rs      - Tick-keyed store of unrevealed entries   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod commitment;
pub mod pending;

// Re-export key types
pub use commitment::{
    canonical_actions, commit_hash, generate_nonce, verify_reveal, CommitError, VerifyError,
    NONCE_BYTES,
};
pub use pending::{PendingEntry, PendingStore, Tick};
