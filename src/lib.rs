//! # Open Forest Bot
//!
//! Commit-reveal action protocol for Open Forest bots.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    OPEN FOREST BOT                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── canonical.rs- Canonical JSON text                       │
//! │  ├── hash.rs     - SHA-256 helpers                           │
//! │  └── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │                                                              │
//! │  game/           - What a bot sees and does                  │
//! │  ├── action.rs   - Action variants                           │
//! │  ├── observation.rs - Per-tick view of the forest            │
//! │  ├── bot.rs      - Decision trait                            │
//! │  └── strategy.rs - Built-in strategies                       │
//! │                                                              │
//! │  proof/          - Commit-reveal                             │
//! │  ├── commitment.rs - Digests, nonces, verification           │
//! │  └── pending.rs  - Unrevealed commitments by tick            │
//! │                                                              │
//! │  network/        - Protocol and transports                   │
//! │  ├── protocol.rs - Message types                             │
//! │  ├── adapter.rs  - Commit/reveal state machine               │
//! │  ├── stdio.rs    - Line stream                               │
//! │  ├── http.rs     - POST /act                                 │
//! │  └── ws.rs       - WebSocket client                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Hash Agreement
//!
//! A commitment is `SHA-256(canonical(actions) ++ nonce)`. The canonical
//! text is byte-identical to what the match server computes, so the server
//! can recompute the digest from the revealed pair.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;
pub mod proof;

// Re-export commonly used types
pub use core::canonical::{canonical_json, canonicalize};
pub use core::rng::DeterministicRng;
pub use game::action::{Action, UpgradeKind};
pub use game::bot::{Bot, BotError};
pub use game::observation::Observation;
pub use game::strategy::Strategy;
pub use network::adapter::{AdapterConfig, CommitRevealAdapter, RevealPolicy};
pub use proof::commitment::{commit_hash, generate_nonce, verify_reveal};
pub use proof::pending::PendingStore;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
